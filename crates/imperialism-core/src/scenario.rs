use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use imperialism_protocol::{
    NationId, ProvinceId, RoadSegment, StructureId, StructureType, TerrainId, TilePosition,
    WorkforceId,
};

use crate::{
    map::GameMap,
    nation::{AssetError, Nation, NationAsset, Province},
    rules::Ruleset,
    structure::{rules_for, Structure},
    workforce::Workforce,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("ruleset defines no water terrain")]
    NoWaterTerrain,
    #[error("unknown nation {0}")]
    UnknownNation(NationId),
    #[error("nation {0} is already registered")]
    DuplicateNation(NationId),
    #[error("unknown province {0:?}")]
    UnknownProvince(ProvinceId),
    #[error("province {0:?} is already registered")]
    DuplicateProvince(ProvinceId),
    #[error("unknown terrain {0:?}")]
    UnknownTerrain(TerrainId),
    #[error("{0} is outside the map")]
    OutOfBounds(TilePosition),
    #[error("road {0:?} does not join two adjacent tiles on the map")]
    InvalidRoad(RoadSegment),
    #[error("{kind} cannot be built at {position} by {nation}")]
    CannotBuild {
        nation: NationId,
        kind: StructureType,
        position: TilePosition,
    },
    #[error("map tiles do not match its dimensions")]
    MalformedMap,
    #[error("{entity} is filed under {key} but belongs to {owner}")]
    OwnerMismatch {
        entity: String,
        key: String,
        owner: String,
    },
    #[error("two workforces stand on {0}")]
    DuplicateWorkforceTile(TilePosition),
    #[error("two structures stand on {0}")]
    DuplicateStructureTile(TilePosition),
    #[error("workforce {0} holds an action its type cannot perform")]
    InconsistentWorkforce(WorkforceId),
    #[error("{0} was allocated twice")]
    DuplicateStructureId(StructureId),
    #[error("structure counter {next} does not exceed allocated {used}")]
    StructureCounterBehind { next: u32, used: StructureId },
    #[error("structure ids are exhausted")]
    StructureIdsExhausted,
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// The persisted part of a scenario. Everything a save file holds.
///
/// Top-level document fields the engine does not know are kept in `extra`
/// and written back on save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioBase {
    pub map: GameMap,
    pub nations: BTreeMap<NationId, Nation>,
    pub provinces: BTreeMap<ProvinceId, Province>,
    pub assets: BTreeMap<NationId, NationAsset>,
    pub roads: BTreeSet<RoadSegment>,
    pub turn: u32,
    pub next_structure_id: u32,
    /// Scenario-level key/value properties (title, description, ...).
    pub properties: BTreeMap<String, serde_json::Value>,
    pub extra: BTreeMap<String, serde_json::Value>,
}

const BASE_FIELDS: [&str; 8] = [
    "map",
    "nations",
    "provinces",
    "assets",
    "roads",
    "turn",
    "next_structure_id",
    "properties",
];

// Written by hand: `#[serde(flatten)]` buffers the document and then
// cannot read the integer map keys of `nations` and `assets` from JSON.
impl Serialize for ScenarioBase {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let extra: Vec<_> = self
            .extra
            .iter()
            .filter(|(key, _)| !BASE_FIELDS.contains(&key.as_str()))
            .collect();
        let mut map = serializer.serialize_map(Some(BASE_FIELDS.len() + extra.len()))?;
        map.serialize_entry("map", &self.map)?;
        map.serialize_entry("nations", &self.nations)?;
        map.serialize_entry("provinces", &self.provinces)?;
        map.serialize_entry("assets", &self.assets)?;
        map.serialize_entry("roads", &self.roads)?;
        map.serialize_entry("turn", &self.turn)?;
        map.serialize_entry("next_structure_id", &self.next_structure_id)?;
        map.serialize_entry("properties", &self.properties)?;
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScenarioBase {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ScenarioBaseVisitor)
    }
}

struct ScenarioBaseVisitor;

impl<'de> Visitor<'de> for ScenarioBaseVisitor {
    type Value = ScenarioBase;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a scenario document")
    }

    fn visit_map<A>(self, mut access: A) -> Result<ScenarioBase, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = None;
        let mut nations = BTreeMap::new();
        let mut provinces = BTreeMap::new();
        let mut assets = BTreeMap::new();
        let mut roads = BTreeSet::new();
        let mut turn = 0;
        let mut next_structure_id = 0;
        let mut properties = BTreeMap::new();
        let mut extra = BTreeMap::new();

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                "map" => map = Some(access.next_value()?),
                "nations" => nations = access.next_value()?,
                "provinces" => provinces = access.next_value()?,
                "assets" => assets = access.next_value()?,
                "roads" => roads = access.next_value()?,
                "turn" => turn = access.next_value()?,
                "next_structure_id" => next_structure_id = access.next_value()?,
                "properties" => properties = access.next_value()?,
                _ => {
                    let value = access.next_value()?;
                    extra.insert(key, value);
                }
            }
        }

        Ok(ScenarioBase {
            map: map.ok_or_else(|| <A::Error as de::Error>::missing_field("map"))?,
            nations,
            provinces,
            assets,
            roads,
            turn,
            next_structure_id,
            properties,
            extra,
        })
    }
}

impl ScenarioBase {
    pub fn new(map: GameMap) -> Self {
        Self {
            map,
            nations: BTreeMap::new(),
            provinces: BTreeMap::new(),
            assets: BTreeMap::new(),
            roads: BTreeSet::new(),
            turn: 0,
            next_structure_id: 0,
            properties: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn allocate_structure_id(&mut self) -> Result<StructureId, ScenarioError> {
        let id = StructureId(self.next_structure_id);
        self.next_structure_id = self
            .next_structure_id
            .checked_add(1)
            .ok_or(ScenarioError::StructureIdsExhausted)?;
        Ok(id)
    }

    pub fn mark_prospected(&mut self, position: TilePosition) -> Result<(), ScenarioError> {
        let tile = self
            .map
            .get_mut(position)
            .ok_or(ScenarioError::OutOfBounds(position))?;
        tile.prospected = true;
        Ok(())
    }

    pub fn nation_at(&self, rules: &Ruleset, position: TilePosition) -> Option<NationId> {
        let tile = self.map.get(position)?;
        if rules.is_water(tile.terrain) {
            return None;
        }
        self.provinces.get(&tile.province?)?.nation
    }

    pub fn workforces(&self) -> impl Iterator<Item = &Workforce> {
        self.assets.values().flat_map(|a| a.get_workforces().values())
    }

    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.assets.values().flat_map(|a| a.get_structures().values())
    }

    pub fn workforce_at(&self, position: TilePosition) -> Option<&Workforce> {
        self.assets.values().find_map(|a| a.workforce_at(position))
    }

    pub fn structure_at(&self, position: TilePosition) -> Option<&Structure> {
        self.assets.values().find_map(|a| a.structure_at(position))
    }

    /// Checks every cross-reference a scenario relies on.
    pub fn validate(&self, rules: &Ruleset) -> Result<(), ScenarioError> {
        if !self.map.is_well_formed() {
            return Err(ScenarioError::MalformedMap);
        }

        for (id, nation) in &self.nations {
            if nation.id != *id {
                return Err(mismatch(format!("nation {}", nation.id), id, nation.id));
            }
        }

        for (id, province) in &self.provinces {
            if province.id != *id {
                return Err(ScenarioError::UnknownProvince(province.id));
            }
            if let Some(nation) = province.nation {
                if !self.nations.contains_key(&nation) {
                    return Err(ScenarioError::UnknownNation(nation));
                }
            }
        }

        for (_, tile) in self.map.iter() {
            if rules.terrain(tile.terrain).is_none() {
                return Err(ScenarioError::UnknownTerrain(tile.terrain));
            }
            if let Some(province) = tile.province {
                if !self.provinces.contains_key(&province) {
                    return Err(ScenarioError::UnknownProvince(province));
                }
            }
        }

        for road in &self.roads {
            if !self.map.contains(road.from())
                || !self.map.contains(road.to())
                || !road.from().is_adjacent(road.to())
            {
                return Err(ScenarioError::InvalidRoad(*road));
            }
        }

        let mut workforce_tiles = BTreeSet::new();
        let mut structure_tiles = BTreeSet::new();
        let mut structure_ids = BTreeSet::new();
        for (key, asset) in &self.assets {
            if !self.nations.contains_key(key) {
                return Err(ScenarioError::UnknownNation(*key));
            }
            if asset.get_nation() != *key {
                return Err(mismatch(
                    format!("asset of {}", asset.get_nation()),
                    key,
                    asset.get_nation(),
                ));
            }

            for (id, workforce) in asset.get_workforces() {
                if workforce.get_id() != *id || workforce.get_nation() != *key {
                    return Err(mismatch(
                        format!("workforce {}", workforce.get_id()),
                        key,
                        workforce.get_nation(),
                    ));
                }
                let position = workforce.get_current_position();
                if !self.map.contains(position) {
                    return Err(ScenarioError::OutOfBounds(position));
                }
                if !workforce.is_consistent() {
                    return Err(ScenarioError::InconsistentWorkforce(*id));
                }
                if !workforce_tiles.insert(position) {
                    return Err(ScenarioError::DuplicateWorkforceTile(position));
                }
            }

            for (id, structure) in asset.get_structures() {
                if structure.get_id() != *id || structure.get_nation() != *key {
                    return Err(mismatch(
                        format!("structure {}", structure.get_id().0),
                        key,
                        structure.get_nation(),
                    ));
                }
                let position = structure.get_position();
                if !self.map.contains(position) {
                    return Err(ScenarioError::OutOfBounds(position));
                }
                if !structure_tiles.insert(position) {
                    return Err(ScenarioError::DuplicateStructureTile(position));
                }
                if !structure_ids.insert(*id) {
                    return Err(ScenarioError::DuplicateStructureId(*id));
                }
            }
        }

        if let Some(&used) = structure_ids.last() {
            if used.0 >= self.next_structure_id {
                return Err(ScenarioError::StructureCounterBehind {
                    next: self.next_structure_id,
                    used,
                });
            }
        }

        Ok(())
    }
}

fn mismatch(entity: String, key: &NationId, owner: NationId) -> ScenarioError {
    ScenarioError::OwnerMismatch {
        entity,
        key: key.to_string(),
        owner: owner.to_string(),
    }
}

/// Authoritative world state: the compiled ruleset plus the persisted base.
///
/// Every spatial question the engine or a presentation layer asks goes
/// through here. Only one owner mutates it at a time.
#[derive(Clone, Debug)]
pub struct ServerScenario {
    rules: Ruleset,
    base: ScenarioBase,
}

impl ServerScenario {
    /// An empty scenario whose every tile is water.
    pub fn new(rows: u32, columns: u32, rules: Ruleset) -> Result<Self, ScenarioError> {
        let water = rules.default_water().ok_or(ScenarioError::NoWaterTerrain)?;
        Ok(Self {
            base: ScenarioBase::new(GameMap::new(rows, columns, water)),
            rules,
        })
    }

    pub fn from_base(rules: Ruleset, base: ScenarioBase) -> Result<Self, ScenarioError> {
        base.validate(&rules)?;
        Ok(Self { rules, base })
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    pub fn base(&self) -> &ScenarioBase {
        &self.base
    }

    pub(crate) fn base_mut(&mut self) -> &mut ScenarioBase {
        &mut self.base
    }

    pub fn into_base(self) -> ScenarioBase {
        self.base
    }

    pub fn map(&self) -> &GameMap {
        &self.base.map
    }

    pub fn turn(&self) -> u32 {
        self.base.turn
    }

    pub fn nations(&self) -> &BTreeMap<NationId, Nation> {
        &self.base.nations
    }

    pub fn provinces(&self) -> &BTreeMap<ProvinceId, Province> {
        &self.base.provinces
    }

    pub fn roads(&self) -> &BTreeSet<RoadSegment> {
        &self.base.roads
    }

    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.base.properties.get(key)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.base.properties.insert(key.into(), value);
    }

    // -- editor ---------------------------------------------------------------

    /// Registers a nation together with its empty asset.
    pub fn add_nation(&mut self, id: NationId, name: impl Into<String>) -> Result<(), ScenarioError> {
        if self.base.nations.contains_key(&id) {
            return Err(ScenarioError::DuplicateNation(id));
        }
        self.base.nations.insert(
            id,
            Nation {
                id,
                name: name.into(),
                properties: BTreeMap::new(),
            },
        );
        self.base.assets.insert(id, NationAsset::new(id));
        Ok(())
    }

    pub fn add_province(
        &mut self,
        id: ProvinceId,
        name: impl Into<String>,
        nation: Option<NationId>,
    ) -> Result<(), ScenarioError> {
        if self.base.provinces.contains_key(&id) {
            return Err(ScenarioError::DuplicateProvince(id));
        }
        self.ensure_nation(nation)?;
        self.base.provinces.insert(
            id,
            Province {
                id,
                name: name.into(),
                nation,
            },
        );
        Ok(())
    }

    pub fn set_terrain(&mut self, position: TilePosition, terrain: TerrainId) -> Result<(), ScenarioError> {
        if self.rules.terrain(terrain).is_none() {
            return Err(ScenarioError::UnknownTerrain(terrain));
        }
        let tile = self
            .base
            .map
            .get_mut(position)
            .ok_or(ScenarioError::OutOfBounds(position))?;
        tile.terrain = terrain;
        Ok(())
    }

    pub fn set_province(
        &mut self,
        position: TilePosition,
        province: Option<ProvinceId>,
    ) -> Result<(), ScenarioError> {
        if let Some(id) = province {
            if !self.base.provinces.contains_key(&id) {
                return Err(ScenarioError::UnknownProvince(id));
            }
        }
        let tile = self
            .base
            .map
            .get_mut(position)
            .ok_or(ScenarioError::OutOfBounds(position))?;
        tile.province = province;
        Ok(())
    }

    /// Hands a whole province to another nation (or to nobody).
    pub fn set_province_nation(
        &mut self,
        province: ProvinceId,
        nation: Option<NationId>,
    ) -> Result<(), ScenarioError> {
        self.ensure_nation(nation)?;
        let entry = self
            .base
            .provinces
            .get_mut(&province)
            .ok_or(ScenarioError::UnknownProvince(province))?;
        entry.nation = nation;
        Ok(())
    }

    fn ensure_nation(&self, nation: Option<NationId>) -> Result<(), ScenarioError> {
        match nation {
            Some(id) if !self.base.nations.contains_key(&id) => {
                Err(ScenarioError::UnknownNation(id))
            }
            _ => Ok(()),
        }
    }

    // -- queries --------------------------------------------------------------

    /// The nation owning the tile through its province. Water, unclaimed and
    /// off-map tiles belong to nobody.
    pub fn nation_at(&self, row: i32, column: i32) -> Option<NationId> {
        self.base
            .nation_at(&self.rules, TilePosition::new(row, column))
    }

    /// Converts scene coordinates, already divided by the tile size, to the
    /// tile under them. Points beyond an edge snap to the edge tile.
    pub fn map_position(&self, scene_x: f64, scene_y: f64) -> TilePosition {
        self.base
            .map
            .clamp(scene_y.floor() as i64, scene_x.floor() as i64)
    }

    pub fn contains(&self, position: TilePosition) -> bool {
        self.base.map.contains(position)
    }

    /// Off-map positions count as water.
    pub fn is_water(&self, position: TilePosition) -> bool {
        self.base
            .map
            .get(position)
            .map_or(true, |tile| self.rules.is_water(tile.terrain))
    }

    pub fn get_nation_asset(&self, nation: NationId) -> Result<&NationAsset, ScenarioError> {
        self.base
            .assets
            .get(&nation)
            .ok_or(ScenarioError::UnknownNation(nation))
    }

    pub fn get_nation_asset_mut(
        &mut self,
        nation: NationId,
    ) -> Result<&mut NationAsset, ScenarioError> {
        self.base
            .assets
            .get_mut(&nation)
            .ok_or(ScenarioError::UnknownNation(nation))
    }

    pub fn get_workforce(&self, id: WorkforceId) -> Option<&Workforce> {
        self.base
            .assets
            .values()
            .find_map(|asset| asset.get_workforce(id))
    }

    pub fn workforce_at(&self, position: TilePosition) -> Option<&Workforce> {
        self.base.workforce_at(position)
    }

    pub fn structure_at(&self, position: TilePosition) -> Option<&Structure> {
        self.base.structure_at(position)
    }

    /// Which workforce stands where.
    pub fn occupancy(&self) -> BTreeMap<TilePosition, WorkforceId> {
        self.base
            .workforces()
            .map(|w| (w.get_current_position(), w.get_id()))
            .collect()
    }

    pub fn has_road(&self, road: RoadSegment) -> bool {
        self.base.roads.contains(&road)
    }

    /// Lays a road directly (editor). Returns whether it was new.
    pub fn add_road(&mut self, road: RoadSegment) -> Result<bool, ScenarioError> {
        if !self.contains(road.from())
            || !self.contains(road.to())
            || !road.from().is_adjacent(road.to())
        {
            return Err(ScenarioError::InvalidRoad(road));
        }
        Ok(self.base.roads.insert(road))
    }

    pub fn can_build_structure(
        &self,
        nation: NationId,
        kind: StructureType,
        position: TilePosition,
    ) -> bool {
        rules_for(kind).can_build(self, nation, position)
    }

    /// Places a level-1 structure directly (editor).
    pub fn place_structure(
        &mut self,
        nation: NationId,
        kind: StructureType,
        position: TilePosition,
    ) -> Result<StructureId, ScenarioError> {
        if !self.base.assets.contains_key(&nation) {
            return Err(ScenarioError::UnknownNation(nation));
        }
        if !self.can_build_structure(nation, kind, position) {
            return Err(ScenarioError::CannotBuild {
                nation,
                kind,
                position,
            });
        }
        let id = self.base.allocate_structure_id()?;
        self.get_nation_asset_mut(nation)?
            .add_or_update_structure(Structure::new(id, nation, kind, position))?;
        Ok(id)
    }

    /// Replaces the persisted state wholesale. An inconsistent base is
    /// rejected and the current state kept.
    pub fn update_scenario_base(&mut self, base: ScenarioBase) -> Result<(), ScenarioError> {
        base.validate(&self.rules)?;
        self.base = base;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_scenario, NATION_A, NATION_B};
    use imperialism_protocol::WorkforceType;

    #[test]
    fn new_scenarios_are_all_water() {
        let scenario = sample_scenario();
        let blank = ServerScenario::new(3, 4, scenario.rules().clone()).unwrap();
        assert_eq!(blank.map().len(), 12);
        assert!(blank
            .map()
            .iter()
            .all(|(p, _)| blank.is_water(p) && blank.nation_at(p.row, p.column).is_none()));
        assert!(blank.nations().is_empty());
    }

    #[test]
    fn nation_at_follows_tile_province_nation() {
        let scenario = sample_scenario();
        assert_eq!(scenario.nation_at(4, 13), Some(NATION_A));
        assert_eq!(scenario.nation_at(4, 2), Some(NATION_B));
        // sea, unclaimed, off-map
        assert_eq!(scenario.nation_at(0, 0), None);
        assert_eq!(scenario.nation_at(9, 12), None);
        assert_eq!(scenario.nation_at(-1, 3), None);
        assert_eq!(scenario.nation_at(4, 99), None);
    }

    #[test]
    fn handing_over_a_province_changes_tile_ownership() {
        let mut scenario = sample_scenario();
        let east = scenario.map().get(TilePosition::new(4, 13)).unwrap().province.unwrap();
        scenario.set_province_nation(east, Some(NATION_B)).unwrap();
        assert_eq!(scenario.nation_at(4, 13), Some(NATION_B));
        assert_eq!(
            scenario.set_province_nation(east, Some(NationId(77))),
            Err(ScenarioError::UnknownNation(NationId(77)))
        );
    }

    #[test]
    fn unknown_fields_ride_along_but_never_shadow_known_ones() {
        let scenario = sample_scenario();
        let mut base = scenario.base().clone();
        base.extra.insert("author".into(), serde_json::json!("cartographer"));
        base.extra.insert("turn".into(), serde_json::json!(99));

        let document = serde_json::to_value(&base).unwrap();
        assert_eq!(document["author"], serde_json::json!("cartographer"));
        assert_eq!(document["turn"], serde_json::json!(0));

        let back: ScenarioBase = serde_json::from_value(document).unwrap();
        assert_eq!(back.extra.len(), 1);
        assert_eq!(back.nations, base.nations);
        assert_eq!(back.assets, base.assets);
        assert!(serde_json::from_str::<ScenarioBase>("{\"turn\": 1}").is_err());
    }

    #[test]
    fn map_position_floors_and_clamps() {
        let scenario = sample_scenario();
        assert_eq!(scenario.map_position(13.7, 4.2), TilePosition::new(4, 13));
        assert_eq!(scenario.map_position(-3.0, -0.5), TilePosition::new(0, 0));
        assert_eq!(scenario.map_position(500.0, 500.0), TilePosition::new(9, 15));
    }

    #[test]
    fn unknown_nation_asset_is_an_error() {
        let scenario = sample_scenario();
        assert!(scenario.get_nation_asset(NATION_A).is_ok());
        assert_eq!(
            scenario.get_nation_asset(NationId(42)).unwrap_err(),
            ScenarioError::UnknownNation(NationId(42))
        );
    }

    #[test]
    fn duplicate_registrations_are_refused() {
        let mut scenario = sample_scenario();
        assert_eq!(
            scenario.add_nation(NATION_A, "again"),
            Err(ScenarioError::DuplicateNation(NATION_A))
        );
        assert_eq!(
            scenario.set_terrain(TilePosition::new(30, 0), TerrainId::new(1)),
            Err(ScenarioError::OutOfBounds(TilePosition::new(30, 0)))
        );
        assert_eq!(
            scenario.set_terrain(TilePosition::new(1, 1), TerrainId::new(99)),
            Err(ScenarioError::UnknownTerrain(TerrainId::new(99)))
        );
    }

    #[test]
    fn roads_must_join_adjacent_tiles() {
        let mut scenario = sample_scenario();
        let a = TilePosition::new(5, 13);
        assert_eq!(scenario.add_road(RoadSegment::new(a, TilePosition::new(6, 14))), Ok(true));
        assert_eq!(scenario.add_road(RoadSegment::new(TilePosition::new(6, 14), a)), Ok(false));
        let far = RoadSegment::new(a, TilePosition::new(5, 15));
        assert_eq!(scenario.add_road(far), Err(ScenarioError::InvalidRoad(far)));
    }

    #[test]
    fn placed_structures_take_sequential_ids() {
        let mut scenario = sample_scenario();
        let first = scenario
            .place_structure(NATION_A, StructureType::Farm, TilePosition::new(4, 13))
            .unwrap();
        let second = scenario
            .place_structure(NATION_A, StructureType::Mine, TilePosition::new(6, 12))
            .unwrap();
        assert_eq!((first, second), (StructureId(0), StructureId(1)));
        assert_eq!(
            scenario.structure_at(TilePosition::new(6, 12)).map(|s| s.get_type()),
            Some(StructureType::Mine)
        );
        assert!(matches!(
            scenario.place_structure(NATION_A, StructureType::Farm, TilePosition::new(4, 2)),
            Err(ScenarioError::CannotBuild { .. })
        ));
    }

    #[test]
    fn inconsistent_bases_are_rejected_unchanged() {
        let mut scenario = sample_scenario();
        let before = scenario.base().clone();

        let mut stacked = before.clone();
        let asset = stacked.assets.get_mut(&NATION_A).unwrap();
        for raw in [1u128, 2] {
            asset
                .add_or_update_workforce(Workforce::new(
                    WorkforceId::from_u128(raw),
                    4,
                    13,
                    NATION_A,
                    WorkforceType::Farmer,
                ))
                .unwrap();
        }
        assert_eq!(
            scenario.update_scenario_base(stacked),
            Err(ScenarioError::DuplicateWorkforceTile(TilePosition::new(4, 13)))
        );

        let mut orphan = before.clone();
        orphan.assets.insert(NationId(9), NationAsset::new(NationId(9)));
        assert_eq!(
            scenario.update_scenario_base(orphan),
            Err(ScenarioError::UnknownNation(NationId(9)))
        );

        let mut stray = before.clone();
        stray
            .assets
            .get_mut(&NATION_B)
            .unwrap()
            .add_or_update_workforce(Workforce::new(
                WorkforceId::from_u128(3),
                40,
                40,
                NATION_B,
                WorkforceType::Miner,
            ))
            .unwrap();
        assert_eq!(
            scenario.update_scenario_base(stray),
            Err(ScenarioError::OutOfBounds(TilePosition::new(40, 40)))
        );

        assert_eq!(scenario.base(), &before);
    }

    #[test]
    fn consistent_base_replaces_state() {
        let mut scenario = sample_scenario();
        let mut next = scenario.base().clone();
        next.turn = 5;
        next.properties
            .insert("title".into(), serde_json::json!("Europe 1814"));
        scenario.update_scenario_base(next).unwrap();
        assert_eq!(scenario.turn(), 5);
        assert_eq!(scenario.property("title"), Some(&serde_json::json!("Europe 1814")));
    }

    #[test]
    fn occupancy_maps_tiles_to_workforces() {
        let mut scenario = sample_scenario();
        let id = WorkforceId::from_u128(8);
        scenario
            .get_nation_asset_mut(NATION_A)
            .unwrap()
            .add_or_update_workforce(Workforce::new(id, 5, 14, NATION_A, WorkforceType::Engineer))
            .unwrap();
        assert_eq!(scenario.occupancy().get(&TilePosition::new(5, 14)), Some(&id));
        assert_eq!(scenario.workforce_at(TilePosition::new(5, 14)).map(|w| w.get_id()), Some(id));
        assert!(scenario.get_workforce(id).is_some());
    }
}
