use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use imperialism_protocol::{NationId, ProvinceId, StructureId, TilePosition, WorkforceId};

use crate::{structure::Structure, workforce::Workforce};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
    /// Free-form nation properties (color, capital, ...) carried through unchanged.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub name: String,
    #[serde(default)]
    pub nation: Option<NationId>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("{nation} owns no workforce {workforce}")]
    UnknownWorkforce {
        nation: NationId,
        workforce: WorkforceId,
    },
    #[error("{nation} owns no {structure}")]
    UnknownStructure {
        nation: NationId,
        structure: StructureId,
    },
    #[error("entity owned by {owner} cannot be stored in the asset of {nation}")]
    ForeignOwner { nation: NationId, owner: NationId },
}

/// Everything one nation owns in a scenario.
///
/// Both maps iterate in ascending id order; turn resolution relies on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationAsset {
    nation: NationId,
    #[serde(default)]
    workforces: BTreeMap<WorkforceId, Workforce>,
    #[serde(default)]
    structures: BTreeMap<StructureId, Structure>,
}

impl NationAsset {
    pub fn new(nation: NationId) -> Self {
        Self {
            nation,
            workforces: BTreeMap::new(),
            structures: BTreeMap::new(),
        }
    }

    pub fn get_nation(&self) -> NationId {
        self.nation
    }

    /// Inserts the workforce or replaces the stored snapshot with the same id.
    pub fn add_or_update_workforce(&mut self, workforce: Workforce) -> Result<(), AssetError> {
        self.ensure_owner(workforce.get_nation())?;
        self.workforces.insert(workforce.get_id(), workforce);
        Ok(())
    }

    pub fn delete_workforce(&mut self, workforce: &Workforce) -> Result<Workforce, AssetError> {
        self.delete_workforce_by_id(workforce.get_id())
    }

    pub fn delete_workforce_by_id(&mut self, id: WorkforceId) -> Result<Workforce, AssetError> {
        self.workforces
            .remove(&id)
            .ok_or(AssetError::UnknownWorkforce {
                nation: self.nation,
                workforce: id,
            })
    }

    pub fn get_workforces(&self) -> &BTreeMap<WorkforceId, Workforce> {
        &self.workforces
    }

    pub fn get_workforce(&self, id: WorkforceId) -> Option<&Workforce> {
        self.workforces.get(&id)
    }

    pub fn workforce_at(&self, position: TilePosition) -> Option<&Workforce> {
        self.workforces
            .values()
            .find(|w| w.get_current_position() == position)
    }

    pub fn add_or_update_structure(&mut self, structure: Structure) -> Result<(), AssetError> {
        self.ensure_owner(structure.get_nation())?;
        self.structures.insert(structure.get_id(), structure);
        Ok(())
    }

    pub fn delete_structure(&mut self, id: StructureId) -> Result<Structure, AssetError> {
        self.structures
            .remove(&id)
            .ok_or(AssetError::UnknownStructure {
                nation: self.nation,
                structure: id,
            })
    }

    pub fn get_structures(&self) -> &BTreeMap<StructureId, Structure> {
        &self.structures
    }

    pub fn structure_at(&self, position: TilePosition) -> Option<&Structure> {
        self.structures
            .values()
            .find(|s| s.get_position() == position)
    }

    fn ensure_owner(&self, owner: NationId) -> Result<(), AssetError> {
        if owner == self.nation {
            Ok(())
        } else {
            Err(AssetError::ForeignOwner {
                nation: self.nation,
                owner,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imperialism_protocol::{StructureType, WorkforceType};

    fn farmer(raw: u128, nation: NationId) -> Workforce {
        Workforce::new(WorkforceId::from_u128(raw), 2, 3, nation, WorkforceType::Farmer)
    }

    #[test]
    fn upsert_replaces_the_snapshot_with_the_same_id() {
        let mut asset = NationAsset::new(NationId(1));
        asset.add_or_update_workforce(farmer(1, NationId(1))).unwrap();

        let mut moved = farmer(1, NationId(1));
        moved
            .plan_action(2, 4, imperialism_protocol::WorkforceAction::Move)
            .unwrap();
        asset.add_or_update_workforce(moved.clone()).unwrap();

        assert_eq!(asset.get_workforces().len(), 1);
        assert_eq!(asset.get_workforce(moved.get_id()), Some(&moved));
    }

    #[test]
    fn deleting_an_absent_workforce_is_an_error() {
        let mut asset = NationAsset::new(NationId(1));
        let stranger = farmer(9, NationId(1));
        assert_eq!(
            asset.delete_workforce(&stranger),
            Err(AssetError::UnknownWorkforce {
                nation: NationId(1),
                workforce: stranger.get_id(),
            })
        );
    }

    #[test]
    fn delete_returns_the_removed_workforce() {
        let mut asset = NationAsset::new(NationId(1));
        let w = farmer(1, NationId(1));
        asset.add_or_update_workforce(w.clone()).unwrap();
        assert_eq!(asset.delete_workforce(&w), Ok(w));
        assert!(asset.get_workforces().is_empty());
    }

    #[test]
    fn foreign_entities_are_refused() {
        let mut asset = NationAsset::new(NationId(1));
        assert_eq!(
            asset.add_or_update_workforce(farmer(1, NationId(2))),
            Err(AssetError::ForeignOwner {
                nation: NationId(1),
                owner: NationId(2),
            })
        );
        let structure = Structure::new(
            StructureId(0),
            NationId(2),
            StructureType::Farm,
            TilePosition::new(0, 0),
        );
        assert!(asset.add_or_update_structure(structure).is_err());
        assert!(asset.get_workforces().is_empty());
        assert!(asset.get_structures().is_empty());
    }

    #[test]
    fn workforces_iterate_by_ascending_id() {
        let mut asset = NationAsset::new(NationId(1));
        for raw in [5u128, 1, 3] {
            asset.add_or_update_workforce(farmer(raw, NationId(1))).unwrap();
        }
        let ids: Vec<_> = asset.get_workforces().keys().copied().collect();
        assert_eq!(
            ids,
            vec![
                WorkforceId::from_u128(1),
                WorkforceId::from_u128(3),
                WorkforceId::from_u128(5)
            ]
        );
    }
}
