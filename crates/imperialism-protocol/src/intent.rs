use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{NationId, ProvinceId, WorkforceAction, WorkforceId, WorkforceType};

/// Everything the presentation layer can ask of a session. Fully serializable
/// so sessions can be scripted from files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientIntent {
    // Map interaction
    SelectTile {
        row: i32,
        column: i32,
    },
    /// Plan the selected workforce's default action for the given tile.
    ActOnTile {
        row: i32,
        column: i32,
    },
    PlanAction {
        workforce: WorkforceId,
        row: i32,
        column: i32,
        action: WorkforceAction,
    },
    WithdrawOrder {
        workforce: WorkforceId,
    },

    // Editor
    AddWorkforce {
        row: i32,
        column: i32,
        kind: WorkforceType,
    },
    RemoveWorkforce {
        workforce: WorkforceId,
    },
    /// `terrain` is a name from the ruleset's `terrain.names`.
    SetTerrain {
        row: i32,
        column: i32,
        terrain: String,
    },
    SetProvince {
        row: i32,
        column: i32,
        province: Option<ProvinceId>,
    },
    SetProvinceNation {
        province: ProvinceId,
        nation: Option<NationId>,
    },
    AddNation {
        nation: NationId,
        name: String,
    },
    AddProvince {
        province: ProvinceId,
        name: String,
        #[serde(default)]
        nation: Option<NationId>,
    },
    SetProperty {
        key: String,
        value: serde_json::Value,
    },

    // Turn flow
    EndTurn,

    // Persistence
    LoadScenario {
        path: PathBuf,
    },
    SaveScenario {
        path: PathBuf,
    },
}
