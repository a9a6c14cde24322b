use thiserror::Error;
use tracing::warn;

use imperialism_protocol::{NationId, TilePosition, WorkforceId, WorkforceType};

use crate::{scenario::ServerScenario, turn_planned::TurnPlanned, workforce::Workforce};

/// Why a workforce could not be created. Returned, never raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkforceRejected {
    #[error("{0} is not registered in the scenario")]
    UnknownNation(NationId),
    #[error("{0} is outside the map")]
    OutOfBounds(TilePosition),
    #[error("{0} is water")]
    WaterTile(TilePosition),
    #[error("{position} does not belong to {nation}")]
    ForeignTerritory {
        nation: NationId,
        position: TilePosition,
    },
    #[error("{position} is occupied by {by}")]
    Occupied {
        position: TilePosition,
        by: WorkforceId,
    },
    #[error("{nation} may not field {kind}")]
    TypeNotPermitted { nation: NationId, kind: WorkforceType },
    #[error("plan of {plan} cannot take a workforce of {nation}")]
    PlanBelongsToOtherNation { plan: NationId, nation: NationId },
}

/// Validates and builds new workforces.
pub struct WorkforceFactory;

impl WorkforceFactory {
    /// Checks `primitive` against the scenario and returns a standing workforce.
    ///
    /// When a plan is supplied the new workforce is registered there as well.
    /// Adding it to the nation's asset is left to the caller.
    pub fn create_new_workforce(
        scenario: &ServerScenario,
        turn_planned: Option<&mut TurnPlanned>,
        primitive: Workforce,
    ) -> Result<Workforce, WorkforceRejected> {
        let outcome = Self::validate(scenario, turn_planned.as_deref(), &primitive);
        if let Err(reason) = &outcome {
            warn!(
                workforce = %primitive.get_id(),
                nation = %primitive.get_nation(),
                kind = %primitive.get_type(),
                position = %primitive.get_current_position(),
                %reason,
                "workforce creation rejected"
            );
        }
        outcome?;

        let position = primitive.get_current_position();
        let workforce = Workforce::new(
            primitive.get_id(),
            position.row,
            position.column,
            primitive.get_nation(),
            primitive.get_type(),
        );
        if let Some(plan) = turn_planned {
            // Nation equality was checked above.
            if plan.add_workforce(workforce.clone()).is_err() {
                return Err(WorkforceRejected::PlanBelongsToOtherNation {
                    plan: plan.get_nation(),
                    nation: workforce.get_nation(),
                });
            }
        }
        Ok(workforce)
    }

    fn validate(
        scenario: &ServerScenario,
        turn_planned: Option<&TurnPlanned>,
        primitive: &Workforce,
    ) -> Result<(), WorkforceRejected> {
        let nation = primitive.get_nation();
        let position = primitive.get_current_position();

        if !scenario.nations().contains_key(&nation) {
            return Err(WorkforceRejected::UnknownNation(nation));
        }
        if let Some(plan) = turn_planned {
            if plan.get_nation() != nation {
                return Err(WorkforceRejected::PlanBelongsToOtherNation {
                    plan: plan.get_nation(),
                    nation,
                });
            }
        }
        if !scenario.contains(position) {
            return Err(WorkforceRejected::OutOfBounds(position));
        }
        if scenario.is_water(position) {
            return Err(WorkforceRejected::WaterTile(position));
        }
        if scenario.nation_at(position.row, position.column) != Some(nation) {
            return Err(WorkforceRejected::ForeignTerritory { nation, position });
        }
        if let Some(other) = scenario
            .workforce_at(position)
            .filter(|w| w.get_id() != primitive.get_id())
        {
            return Err(WorkforceRejected::Occupied {
                position,
                by: other.get_id(),
            });
        }
        if let Some(by) = turn_planned.and_then(|plan| plan.claims(position, primitive.get_id())) {
            return Err(WorkforceRejected::Occupied { position, by });
        }
        if !scenario
            .rules()
            .workforce_permitted(nation, primitive.get_type())
        {
            return Err(WorkforceRejected::TypeNotPermitted {
                nation,
                kind: primitive.get_type(),
            });
        }
        Ok(())
    }
}
