use std::collections::{BTreeMap, BTreeSet};

use imperialism_protocol::{NationId, StructureType, TerrainId, WorkforceType};
use serde::{Deserialize, Serialize};

/// Ruleset document as it appears on disk. Keys follow the dotted naming of
/// the original ruleset files (`"terrain.names"` and friends).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRuleset {
    #[serde(rename = "terrain.names")]
    pub terrain_names: BTreeMap<String, String>,
    #[serde(rename = "terrain.water", default)]
    pub water: Vec<String>,
    #[serde(rename = "workforce.types", default = "all_workforce_types")]
    pub workforce_types: Vec<WorkforceType>,
    /// Per-nation restriction of the types above. Nations not listed may field every type.
    #[serde(rename = "workforce.restrictions", default)]
    pub workforce_restrictions: Vec<RawRestriction>,
    #[serde(default)]
    pub structures: BTreeMap<StructureType, RawStructureRule>,
    /// Keys this engine does not interpret; kept so documents round-trip.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn all_workforce_types() -> Vec<WorkforceType> {
    WorkforceType::ALL.to_vec()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRestriction {
    pub nation: NationId,
    pub types: Vec<WorkforceType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStructureRule {
    pub terrains: Vec<String>,
    #[serde(default = "default_max_level")]
    pub max_level: u8,
}

fn default_max_level() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainType {
    pub name: String,
    pub water: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureRule {
    pub terrains: BTreeSet<TerrainId>,
    pub max_level: u8,
}

/// Compiled ruleset: names resolved to runtime ids, ready for O(log n) lookups.
#[derive(Debug, Clone)]
pub struct Ruleset {
    pub terrains: BTreeMap<TerrainId, TerrainType>,
    pub terrain_ids: BTreeMap<String, TerrainId>,
    pub workforce_types: BTreeSet<WorkforceType>,
    pub workforce_restrictions: BTreeMap<NationId, BTreeSet<WorkforceType>>,
    pub structures: BTreeMap<StructureType, StructureRule>,
    pub(crate) raw: RawRuleset,
}

impl Ruleset {
    pub fn terrain(&self, id: TerrainId) -> Option<&TerrainType> {
        self.terrains.get(&id)
    }

    pub fn terrain_id(&self, name: &str) -> Option<TerrainId> {
        self.terrain_ids.get(name).copied()
    }

    pub fn terrain_name(&self, id: TerrainId) -> Option<&str> {
        self.terrain(id).map(|t| t.name.as_str())
    }

    /// Unknown terrain counts as water: nothing may stand on it.
    pub fn is_water(&self, id: TerrainId) -> bool {
        self.terrain(id).map_or(true, |t| t.water)
    }

    /// The terrain new scenarios are filled with.
    pub fn default_water(&self) -> Option<TerrainId> {
        self.terrains
            .iter()
            .find_map(|(id, t)| t.water.then_some(*id))
    }

    pub fn structure(&self, kind: StructureType) -> Option<&StructureRule> {
        self.structures.get(&kind)
    }

    pub fn workforce_permitted(&self, nation: NationId, kind: WorkforceType) -> bool {
        if !self.workforce_types.contains(&kind) {
            return false;
        }
        self.workforce_restrictions
            .get(&nation)
            .map_or(true, |allowed| allowed.contains(&kind))
    }

    /// Workforce types offered by the editor, in a stable order.
    pub fn workforce_settings(&self) -> Vec<WorkforceType> {
        self.workforce_types.iter().copied().collect()
    }

    pub fn raw(&self) -> &RawRuleset {
        &self.raw
    }
}
