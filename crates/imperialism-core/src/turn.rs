//! Turn state machine and order resolution.
//!
//! Resolution visits nations in ascending id order and, within a nation,
//! workforces in ascending id order. Each order is checked against the state
//! left by the orders before it; a failing order is skipped and reported,
//! never fatal. All work happens on a copy of the scenario which is published
//! in one step once every order has been visited.

use std::collections::{BTreeMap, VecDeque};

use thiserror::Error;
use tracing::{debug, info, warn};

use imperialism_protocol::{
    NationId, PlannedAction, RejectedOrder, RejectionReason, RoadSegment, StructureType,
    TurnEvent, TurnResult, WorkforceAction, WorkforceId,
};

use crate::{
    scenario::{ScenarioBase, ScenarioError, ServerScenario},
    structure::{rules_for, Structure},
    turn_planned::TurnPlanned,
    workforce::Workforce,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    /// Accepting orders.
    Idle,
    Resolving,
    /// Shut down; every further call fails.
    Closed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TurnError {
    #[error("turn manager is closed")]
    Closed,
    #[error("a turn is being resolved")]
    Resolving,
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

pub struct TurnManager {
    phase: TurnPhase,
    active_nation: NationId,
    planned: BTreeMap<NationId, TurnPlanned>,
    events: VecDeque<TurnEvent>,
}

impl TurnManager {
    pub fn new(active_nation: NationId) -> Self {
        Self {
            phase: TurnPhase::Idle,
            active_nation,
            planned: BTreeMap::new(),
            events: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn active_nation(&self) -> NationId {
        self.active_nation
    }

    pub fn set_active_nation(&mut self, nation: NationId) -> Result<(), TurnError> {
        self.ensure_idle()?;
        self.active_nation = nation;
        Ok(())
    }

    /// The plan of the active nation.
    pub fn get_turn_planned(&mut self) -> Result<&mut TurnPlanned, TurnError> {
        self.turn_planned_for(self.active_nation)
    }

    /// The plan of any nation (hot seat).
    pub fn turn_planned_for(&mut self, nation: NationId) -> Result<&mut TurnPlanned, TurnError> {
        self.ensure_idle()?;
        Ok(self
            .planned
            .entry(nation)
            .or_insert_with(|| TurnPlanned::new(nation)))
    }

    /// Pending plans, by nation.
    pub fn plans(&self) -> &BTreeMap<NationId, TurnPlanned> {
        &self.planned
    }

    /// Resolves every queued order, publishes the new state into `scenario`
    /// and queues the resulting events.
    ///
    /// On error the scenario and the plans are left as they were.
    pub fn end_turn(&mut self, scenario: &mut ServerScenario) -> Result<TurnResult, TurnError> {
        self.ensure_idle()?;
        self.phase = TurnPhase::Resolving;
        let plans = std::mem::take(&mut self.planned);

        let published = resolve_turn(scenario, &plans)
            .and_then(|(base, result)| scenario.update_scenario_base(base).map(|()| result));
        self.phase = TurnPhase::Idle;

        let result = match published {
            Ok(result) => result,
            Err(err) => {
                self.planned = plans;
                return Err(err.into());
            }
        };

        for rejected in &result.rejected {
            self.events.push_back(TurnEvent::OrderRejected {
                turn: result.turn,
                nation: rejected.nation,
                workforce: rejected.workforce,
                reason: rejected.reason,
            });
        }
        self.events.push_back(TurnEvent::TurnCompleted {
            result: result.clone(),
        });

        info!(
            turn = result.turn,
            accepted = result.accepted.len(),
            rejected = result.rejected.len(),
            roads = result.roads.len(),
            structures = result.structures.len(),
            "turn resolved"
        );
        Ok(result)
    }

    pub fn shutdown(&mut self) {
        self.phase = TurnPhase::Closed;
        self.planned.clear();
    }

    /// Hands queued events over. Events queued before a shutdown can still be drained.
    pub fn drain_events(&mut self) -> Vec<TurnEvent> {
        self.events.drain(..).collect()
    }

    fn ensure_idle(&self) -> Result<(), TurnError> {
        match self.phase {
            TurnPhase::Idle => Ok(()),
            TurnPhase::Resolving => Err(TurnError::Resolving),
            TurnPhase::Closed => Err(TurnError::Closed),
        }
    }
}

/// What an accepted order changes besides moving its workforce.
enum Effect {
    None,
    Road(RoadSegment),
    Prospect,
    Upgrade(Structure),
    Build(StructureType),
}

/// Resolves `plans` against a copy of `scenario`.
///
/// Returns the next scenario base (turn counter advanced) and the result
/// describing what changed. Pure: identical inputs give identical outputs.
pub fn resolve_turn(
    scenario: &ServerScenario,
    plans: &BTreeMap<NationId, TurnPlanned>,
) -> Result<(ScenarioBase, TurnResult), ScenarioError> {
    let mut working = scenario.clone();
    let mut result = TurnResult {
        turn: scenario.turn(),
        ..TurnResult::default()
    };

    for plan in plans.values() {
        let nation = plan.get_nation();
        for (id, planned) in plan.get_workforces() {
            let order = planned.order();
            match check_order(&working, nation, *id, order) {
                Ok((workforce, effect)) => {
                    debug!(workforce = %id, %nation, action = %order.action, target = %order.target, "order accepted");
                    apply_order(&mut working, workforce, order, effect, &mut result)?;
                    result.accepted.push(*id);
                }
                Err(reason) => {
                    warn!(workforce = %id, %nation, action = %order.action, target = %order.target, %reason, "order skipped");
                    result.rejected.push(RejectedOrder {
                        workforce: *id,
                        nation,
                        order,
                        reason,
                    });
                }
            }
        }
    }

    result.workforces = working
        .base()
        .workforces()
        .map(|w| (w.get_id(), w.snapshot()))
        .collect();

    let mut base = working.into_base();
    base.turn += 1;
    Ok((base, result))
}

fn check_order(
    scenario: &ServerScenario,
    nation: NationId,
    id: WorkforceId,
    order: PlannedAction,
) -> Result<(Workforce, Effect), RejectionReason> {
    let workforce = scenario
        .get_nation_asset(nation)
        .ok()
        .and_then(|asset| asset.get_workforce(id))
        .cloned()
        .ok_or(RejectionReason::UnknownWorkforce)?;
    if !workforce.get_type().can_perform(order.action) {
        return Err(RejectionReason::ActionNotAllowed);
    }

    let target = order.target;
    if !scenario.contains(target) {
        return Err(RejectionReason::OutOfBounds);
    }
    if scenario.is_water(target) {
        return Err(RejectionReason::WaterTile);
    }
    if scenario.nation_at(target.row, target.column) != Some(nation) {
        return Err(RejectionReason::ForeignTerritory);
    }
    if let Some(other) = scenario.workforce_at(target).filter(|w| w.get_id() != id) {
        return Err(RejectionReason::Occupied { by: other.get_id() });
    }

    let effect = match order.action {
        WorkforceAction::Stand | WorkforceAction::Editor | WorkforceAction::Move => Effect::None,
        WorkforceAction::BuildRoad => {
            let from = workforce.get_current_position();
            if !from.is_adjacent(target) {
                return Err(RejectionReason::NotAdjacent);
            }
            let road = RoadSegment::new(from, target);
            if scenario.has_road(road) {
                return Err(RejectionReason::RoadExists);
            }
            Effect::Road(road)
        }
        WorkforceAction::Prospect => {
            if scenario.map().get(target).is_some_and(|tile| tile.prospected) {
                return Err(RejectionReason::AlreadyProspected);
            }
            Effect::Prospect
        }
        WorkforceAction::Build => {
            let kind = workforce
                .get_type()
                .structure()
                .ok_or(RejectionReason::ActionNotAllowed)?;
            match scenario.structure_at(target) {
                Some(existing) if existing.get_type() == kind && existing.get_nation() == nation => {
                    let mut upgraded = existing.clone();
                    rules_for(kind)
                        .upgrade(scenario, &mut upgraded)
                        .map_err(|_| RejectionReason::NotUpgradable)?;
                    Effect::Upgrade(upgraded)
                }
                Some(_) => return Err(RejectionReason::StructureConflict),
                None if scenario.base().next_structure_id == u32::MAX => {
                    return Err(RejectionReason::CannotBuild)
                }
                None if scenario.can_build_structure(nation, kind, target) => Effect::Build(kind),
                None => return Err(RejectionReason::CannotBuild),
            }
        }
    };

    Ok((workforce, effect))
}

fn apply_order(
    scenario: &mut ServerScenario,
    mut workforce: Workforce,
    order: PlannedAction,
    effect: Effect,
    result: &mut TurnResult,
) -> Result<(), ScenarioError> {
    let nation = workforce.get_nation();
    let target = order.target;

    match effect {
        Effect::None => {}
        Effect::Road(road) => {
            scenario.add_road(road)?;
            result.roads.push(road);
        }
        Effect::Prospect => {
            scenario.base_mut().mark_prospected(target)?;
            result.prospected.push(target);
        }
        Effect::Upgrade(structure) => {
            result.structures.push(structure.snapshot());
            scenario
                .get_nation_asset_mut(nation)?
                .add_or_update_structure(structure)?;
        }
        Effect::Build(kind) => {
            let id = scenario.base_mut().allocate_structure_id()?;
            let structure = Structure::new(id, nation, kind, target);
            result.structures.push(structure.snapshot());
            scenario
                .get_nation_asset_mut(nation)?
                .add_or_update_structure(structure)?;
        }
    }

    workforce.complete_order(order);
    scenario
        .get_nation_asset_mut(nation)?
        .add_or_update_workforce(workforce)?;
    Ok(())
}
