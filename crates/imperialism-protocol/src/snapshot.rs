use serde::{Deserialize, Serialize};

use crate::{
    NationId, StructureId, StructureType, TilePosition, WorkforceAction, WorkforceId,
    WorkforceType,
};

/// An order attached to a workforce: go to `target` and perform `action` there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub target: TilePosition,
    pub action: WorkforceAction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkforceSnapshot {
    pub id: WorkforceId,
    pub nation: NationId,
    pub kind: WorkforceType,
    pub position: TilePosition,
    pub action: WorkforceAction,
    #[serde(default)]
    pub planned: Option<PlannedAction>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSnapshot {
    pub id: StructureId,
    pub nation: NationId,
    pub kind: StructureType,
    pub position: TilePosition,
    pub level: u8,
}
