use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    NationId, PlannedAction, RoadSegment, StructureSnapshot, TilePosition, WorkforceId,
    WorkforceSnapshot,
};

/// Why an individual order was skipped during turn resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The workforce is not registered in its nation's asset.
    UnknownWorkforce,
    /// The workforce type cannot perform the planned action.
    ActionNotAllowed,
    OutOfBounds,
    WaterTile,
    ForeignTerritory,
    /// Another workforce already stands (or will stand) on the target.
    Occupied { by: WorkforceId },
    NotAdjacent,
    RoadExists,
    AlreadyProspected,
    /// A structure of another kind or nation stands on the target.
    StructureConflict,
    CannotBuild,
    NotUpgradable,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UnknownWorkforce => f.write_str("workforce is not registered"),
            RejectionReason::ActionNotAllowed => {
                f.write_str("workforce type cannot perform this action")
            }
            RejectionReason::OutOfBounds => f.write_str("target is outside the map"),
            RejectionReason::WaterTile => f.write_str("target is water"),
            RejectionReason::ForeignTerritory => f.write_str("target is not own territory"),
            RejectionReason::Occupied { by } => write!(f, "target occupied by {by}"),
            RejectionReason::NotAdjacent => f.write_str("road target is not adjacent"),
            RejectionReason::RoadExists => f.write_str("road already built"),
            RejectionReason::AlreadyProspected => f.write_str("tile already prospected"),
            RejectionReason::StructureConflict => f.write_str("another structure stands here"),
            RejectionReason::CannotBuild => f.write_str("structure cannot be built here"),
            RejectionReason::NotUpgradable => f.write_str("structure has no further tier"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedOrder {
    pub workforce: WorkforceId,
    pub nation: NationId,
    pub order: PlannedAction,
    pub reason: RejectionReason,
}

/// Everything one turn resolution changed. Produced once, consumed by the
/// presentation layer, then discarded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    /// The turn that was resolved.
    pub turn: u32,
    /// Every workforce in the scenario after resolution.
    pub workforces: BTreeMap<WorkforceId, WorkforceSnapshot>,
    pub roads: Vec<RoadSegment>,
    /// Structures built or upgraded this turn, in resolution order.
    pub structures: Vec<StructureSnapshot>,
    pub prospected: Vec<TilePosition>,
    pub accepted: Vec<WorkforceId>,
    pub rejected: Vec<RejectedOrder>,
}

impl TurnResult {
    pub fn get_workforces(&self) -> &BTreeMap<WorkforceId, WorkforceSnapshot> {
        &self.workforces
    }

    pub fn get_roads(&self) -> &[RoadSegment] {
        &self.roads
    }

    pub fn get_structures(&self) -> &[StructureSnapshot] {
        &self.structures
    }

    pub fn was_rejected(&self, workforce: WorkforceId) -> bool {
        self.rejected.iter().any(|r| r.workforce == workforce)
    }
}
