//! Headless stand-in for the presentation layer.
//!
//! A session owns the scenario and the turn manager and turns
//! [`ClientIntent`]s into engine calls, the way map clicks and editor
//! buttons would.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use imperialism_core::{
    load_rules, load_scenario, reload_scenario, save_scenario, AssetError, PersistenceError,
    PlanError, RulesError, RulesSource, ScenarioError, ServerScenario, TurnError, TurnManager,
    Workforce, WorkforceFactory, WorkforceRejected,
};
use imperialism_protocol::{
    ClientIntent, NationId, ProvinceId, TerrainId, TilePosition, TurnEvent, WorkforceAction,
    WorkforceId,
};

use crate::config::ServerConfig;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no scenario configured")]
    NoScenario,
    #[error("no workforce selected")]
    NoSelection,
    #[error("unknown workforce {0}")]
    UnknownWorkforce(WorkforceId),
    #[error("ruleset has no terrain named {0:?}")]
    UnknownTerrainName(String),
    #[error(transparent)]
    Rejected(#[from] WorkforceRejected),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// What a handled intent did.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "ack", rename_all = "snake_case")]
pub enum SessionAck {
    Selected {
        position: TilePosition,
        workforce: Option<WorkforceId>,
    },
    Planned {
        workforce: WorkforceId,
        target: TilePosition,
        action: WorkforceAction,
    },
    Withdrawn {
        workforce: WorkforceId,
    },
    WorkforceAdded {
        workforce: WorkforceId,
        nation: NationId,
    },
    WorkforceRemoved {
        workforce: WorkforceId,
    },
    TerrainChanged {
        position: TilePosition,
        terrain: TerrainId,
    },
    ProvinceAssigned {
        position: TilePosition,
        province: Option<ProvinceId>,
    },
    ProvinceHandedOver {
        province: ProvinceId,
        nation: Option<NationId>,
    },
    NationAdded {
        nation: NationId,
    },
    ProvinceAdded {
        province: ProvinceId,
    },
    PropertySet {
        key: String,
    },
    TurnEnded {
        turn: u32,
        accepted: usize,
        rejected: usize,
    },
    Loaded {
        path: PathBuf,
    },
    Saved {
        path: PathBuf,
    },
}

pub struct GameSession {
    config: ServerConfig,
    scenario: ServerScenario,
    turns: TurnManager,
    selected: Option<WorkforceId>,
}

impl GameSession {
    pub fn new(config: ServerConfig, scenario: ServerScenario) -> Self {
        let turns = TurnManager::new(config.active_nation);
        Self {
            config,
            scenario,
            turns,
            selected: None,
        }
    }

    /// Loads the configured ruleset and scenario.
    pub fn from_config(config: ServerConfig) -> Result<Self, SessionError> {
        let rules = load_rules(match &config.rules {
            Some(path) => RulesSource::Path(path.clone()),
            None => RulesSource::Embedded,
        })?;
        let path = config.scenario.clone().ok_or(SessionError::NoScenario)?;
        let scenario = load_scenario(&path, rules)?;
        Ok(Self::new(config, scenario))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn scenario(&self) -> &ServerScenario {
        &self.scenario
    }

    pub fn turns(&self) -> &TurnManager {
        &self.turns
    }

    pub fn selected(&self) -> Option<WorkforceId> {
        self.selected
    }

    /// The tile under a point of the presentation scene, in pixels.
    pub fn tile_at_scene(&self, x: f64, y: f64) -> TilePosition {
        let (column, row) = self.config.to_tile_units(x, y);
        self.scenario.map_position(column, row)
    }

    pub fn drain_events(&mut self) -> Vec<TurnEvent> {
        self.turns.drain_events()
    }

    pub fn shutdown(&mut self) {
        self.turns.shutdown();
        self.selected = None;
    }

    pub fn handle(&mut self, intent: ClientIntent) -> Result<SessionAck, SessionError> {
        debug!(?intent, "handling intent");
        match intent {
            ClientIntent::SelectTile { row, column } => Ok(self.select(TilePosition::new(row, column))),
            ClientIntent::ActOnTile { row, column } => {
                let id = self.selected.ok_or(SessionError::NoSelection)?;
                let workforce = self.workforce(id)?.clone();
                let target = TilePosition::new(row, column);
                let action = workforce.default_action_at(&self.scenario, target);
                self.plan(&workforce, target, action)
            }
            ClientIntent::PlanAction {
                workforce,
                row,
                column,
                action,
            } => {
                let workforce = self.workforce(workforce)?.clone();
                self.plan(&workforce, TilePosition::new(row, column), action)
            }
            ClientIntent::WithdrawOrder { workforce } => {
                let nation = self
                    .turns
                    .plans()
                    .values()
                    .find(|plan| plan.contains(workforce))
                    .map(|plan| plan.get_nation())
                    .ok_or(PlanError::NotPlanned(workforce))?;
                self.turns
                    .turn_planned_for(nation)?
                    .remove_workforce(workforce)?;
                Ok(SessionAck::Withdrawn { workforce })
            }
            ClientIntent::AddWorkforce { row, column, kind } => {
                let nation = self
                    .scenario
                    .nation_at(row, column)
                    .unwrap_or(self.config.active_nation);
                let primitive = Workforce::new(WorkforceId::new_v4(), row, column, nation, kind);
                let workforce =
                    WorkforceFactory::create_new_workforce(&self.scenario, None, primitive)?
                        .placed_by_editor();
                let id = workforce.get_id();
                self.scenario
                    .get_nation_asset_mut(nation)?
                    .add_or_update_workforce(workforce)?;
                info!(workforce = %id, %nation, %kind, row, column, "workforce added");
                Ok(SessionAck::WorkforceAdded {
                    workforce: id,
                    nation,
                })
            }
            ClientIntent::RemoveWorkforce { workforce } => {
                let existing = self.workforce(workforce)?.clone();
                self.scenario
                    .get_nation_asset_mut(existing.get_nation())?
                    .delete_workforce(&existing)?;
                if let Ok(plan) = self.turns.turn_planned_for(existing.get_nation()) {
                    // Nothing may have been queued for it.
                    let _ = plan.remove_workforce(workforce);
                }
                if self.selected == Some(workforce) {
                    self.selected = None;
                }
                info!(%workforce, "workforce removed");
                Ok(SessionAck::WorkforceRemoved { workforce })
            }
            ClientIntent::SetTerrain {
                row,
                column,
                terrain,
            } => {
                let id = self
                    .scenario
                    .rules()
                    .terrain_id(&terrain)
                    .ok_or(SessionError::UnknownTerrainName(terrain))?;
                let position = TilePosition::new(row, column);
                self.scenario.set_terrain(position, id)?;
                debug!(%position, terrain = ?id, "terrain changed");
                Ok(SessionAck::TerrainChanged {
                    position,
                    terrain: id,
                })
            }
            ClientIntent::SetProvince {
                row,
                column,
                province,
            } => {
                let position = TilePosition::new(row, column);
                self.scenario.set_province(position, province)?;
                Ok(SessionAck::ProvinceAssigned { position, province })
            }
            ClientIntent::SetProvinceNation { province, nation } => {
                self.scenario.set_province_nation(province, nation)?;
                info!(?province, ?nation, "province handed over");
                Ok(SessionAck::ProvinceHandedOver { province, nation })
            }
            ClientIntent::AddNation { nation, name } => {
                self.scenario.add_nation(nation, name)?;
                info!(%nation, "nation added");
                Ok(SessionAck::NationAdded { nation })
            }
            ClientIntent::AddProvince {
                province,
                name,
                nation,
            } => {
                self.scenario.add_province(province, name, nation)?;
                info!(?province, ?nation, "province added");
                Ok(SessionAck::ProvinceAdded { province })
            }
            ClientIntent::SetProperty { key, value } => {
                self.scenario.set_property(key.clone(), value);
                Ok(SessionAck::PropertySet { key })
            }
            ClientIntent::EndTurn => {
                let result = self.turns.end_turn(&mut self.scenario)?;
                Ok(SessionAck::TurnEnded {
                    turn: result.turn,
                    accepted: result.accepted.len(),
                    rejected: result.rejected.len(),
                })
            }
            ClientIntent::LoadScenario { path } => {
                reload_scenario(&mut self.scenario, &path)?;
                self.turns = TurnManager::new(self.config.active_nation);
                self.selected = None;
                Ok(SessionAck::Loaded { path })
            }
            ClientIntent::SaveScenario { path } => {
                save_scenario(&self.scenario, &path)?;
                Ok(SessionAck::Saved { path })
            }
        }
    }

    fn select(&mut self, position: TilePosition) -> SessionAck {
        let active = self.config.active_nation;
        self.selected = self
            .scenario
            .workforce_at(position)
            .filter(|w| w.get_nation() == active)
            .map(|w| w.get_id());
        SessionAck::Selected {
            position,
            workforce: self.selected,
        }
    }

    fn plan(
        &mut self,
        workforce: &Workforce,
        target: TilePosition,
        action: WorkforceAction,
    ) -> Result<SessionAck, SessionError> {
        self.turns
            .turn_planned_for(workforce.get_nation())?
            .plan_action(workforce, target, action)?;
        debug!(workforce = %workforce.get_id(), %target, %action, "order planned");
        Ok(SessionAck::Planned {
            workforce: workforce.get_id(),
            target,
            action,
        })
    }

    fn workforce(&self, id: WorkforceId) -> Result<&Workforce, SessionError> {
        self.scenario
            .get_workforce(id)
            .ok_or(SessionError::UnknownWorkforce(id))
    }
}
