//! Buildings and the rules that govern raising and upgrading them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use imperialism_protocol::{
    NationId, RoadSegment, StructureId, StructureSnapshot, StructureType, TilePosition,
};

use crate::scenario::ServerScenario;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("{kind} at {position} cannot be upgraded beyond level {level}")]
    NotUpgradable {
        kind: StructureType,
        position: TilePosition,
        level: u8,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    id: StructureId,
    nation: NationId,
    kind: StructureType,
    position: TilePosition,
    level: u8,
}

impl Structure {
    pub fn new(
        id: StructureId,
        nation: NationId,
        kind: StructureType,
        position: TilePosition,
    ) -> Self {
        Self {
            id,
            nation,
            kind,
            position,
            level: 1,
        }
    }

    pub fn get_id(&self) -> StructureId {
        self.id
    }

    pub fn get_nation(&self) -> NationId {
        self.nation
    }

    pub fn get_type(&self) -> StructureType {
        self.kind
    }

    pub fn get_position(&self) -> TilePosition {
        self.position
    }

    pub fn get_level(&self) -> u8 {
        self.level
    }

    pub fn snapshot(&self) -> StructureSnapshot {
        StructureSnapshot {
            id: self.id,
            nation: self.nation,
            kind: self.kind,
            position: self.position,
            level: self.level,
        }
    }
}

/// Technology prerequisites for building or upgrading.
// TODO: consult the nation's researched technologies once scenarios track research.
fn technology_permits(_nation: NationId, _kind: StructureType, _level: u8) -> bool {
    true
}

/// Rules shared by every structure kind.
#[derive(Clone, Copy, Debug)]
pub struct StructureCommon<'a> {
    scenario: &'a ServerScenario,
}

impl<'a> StructureCommon<'a> {
    pub fn new(scenario: &'a ServerScenario) -> Self {
        Self { scenario }
    }

    /// The tile is land inside the nation's own provinces and holds no structure,
    /// and the ruleset knows the structure kind.
    pub fn can_build(&self, nation: NationId, kind: StructureType, position: TilePosition) -> bool {
        let Some(tile) = self.scenario.map().get(position) else {
            return false;
        };
        !self.scenario.rules().is_water(tile.terrain)
            && self.scenario.nation_at(position.row, position.column) == Some(nation)
            && self.scenario.structure_at(position).is_none()
            && self.scenario.rules().structure(kind).is_some()
    }

    /// A successor tier exists.
    pub fn can_upgrade(&self, structure: &Structure) -> bool {
        self.scenario
            .rules()
            .structure(structure.kind)
            .is_some_and(|rule| structure.level < rule.max_level)
    }
}

/// Construction and upgrade rules for one structure kind.
pub trait StructureRules {
    fn kind(&self) -> StructureType;

    fn can_build(&self, scenario: &ServerScenario, nation: NationId, position: TilePosition)
        -> bool;

    fn can_upgrade(&self, scenario: &ServerScenario, structure: &Structure) -> bool {
        StructureCommon::new(scenario).can_upgrade(structure)
            && technology_permits(structure.nation, structure.kind, structure.level + 1)
    }

    /// Advances `structure` one tier. Leaves it untouched when no upgrade is possible.
    fn upgrade(
        &self,
        scenario: &ServerScenario,
        structure: &mut Structure,
    ) -> Result<u8, StructureError> {
        if !self.can_upgrade(scenario, structure) {
            return Err(StructureError::NotUpgradable {
                kind: structure.kind,
                position: structure.position,
                level: structure.level,
            });
        }
        structure.level += 1;
        Ok(structure.level)
    }
}

/// Structures whose only site requirement is terrain: farms, ranches, lumber
/// mills, mines and oil wells.
#[derive(Clone, Copy, Debug)]
pub struct TerrainStructure {
    kind: StructureType,
}

impl TerrainStructure {
    pub fn new(kind: StructureType) -> Self {
        Self { kind }
    }

    pub fn ranch() -> Self {
        Self::new(StructureType::Ranch)
    }
}

fn terrain_eligible(scenario: &ServerScenario, kind: StructureType, position: TilePosition) -> bool {
    let Some(tile) = scenario.map().get(position) else {
        return false;
    };
    scenario
        .rules()
        .structure(kind)
        .is_some_and(|rule| rule.terrains.contains(&tile.terrain))
}

impl StructureRules for TerrainStructure {
    fn kind(&self) -> StructureType {
        self.kind
    }

    fn can_build(
        &self,
        scenario: &ServerScenario,
        nation: NationId,
        position: TilePosition,
    ) -> bool {
        StructureCommon::new(scenario).can_build(nation, self.kind, position)
            && terrain_eligible(scenario, self.kind, position)
            && technology_permits(nation, self.kind, 1)
    }
}

/// Depots collect goods from the transport network, so one must sit on a road.
#[derive(Clone, Copy, Debug, Default)]
pub struct Depot;

impl StructureRules for Depot {
    fn kind(&self) -> StructureType {
        StructureType::Depot
    }

    fn can_build(
        &self,
        scenario: &ServerScenario,
        nation: NationId,
        position: TilePosition,
    ) -> bool {
        let on_road = position
            .neighbors()
            .any(|n| scenario.has_road(RoadSegment::new(position, n)));
        StructureCommon::new(scenario).can_build(nation, StructureType::Depot, position)
            && terrain_eligible(scenario, StructureType::Depot, position)
            && on_road
            && technology_permits(nation, StructureType::Depot, 1)
    }
}

pub fn rules_for(kind: StructureType) -> Box<dyn StructureRules> {
    match kind {
        StructureType::Depot => Box::new(Depot),
        other => Box::new(TerrainStructure::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_scenario, NATION_A, NATION_B};

    #[test]
    fn ranch_builds_on_own_eligible_land_only() {
        let scenario = sample_scenario();
        let ranch = TerrainStructure::ranch();
        // (4, 13) is plain owned by A
        assert!(ranch.can_build(&scenario, NATION_A, TilePosition::new(4, 13)));
        // owned by B
        assert!(!ranch.can_build(&scenario, NATION_A, TilePosition::new(4, 2)));
        assert!(ranch.can_build(&scenario, NATION_B, TilePosition::new(4, 2)));
        // sea
        assert!(!ranch.can_build(&scenario, NATION_A, TilePosition::new(0, 0)));
        // outside the map
        assert!(!ranch.can_build(&scenario, NATION_A, TilePosition::new(40, 0)));
    }

    #[test]
    fn mine_requires_hills_or_mountains() {
        let scenario = sample_scenario();
        let mine = rules_for(StructureType::Mine);
        // (6, 12) is hills owned by A
        assert!(mine.can_build(&scenario, NATION_A, TilePosition::new(6, 12)));
        assert!(!mine.can_build(&scenario, NATION_A, TilePosition::new(4, 13)));
    }

    #[test]
    fn ranch_upgrades_until_its_last_tier() {
        let scenario = sample_scenario();
        let ranch = TerrainStructure::ranch();
        let mut structure = Structure::new(
            StructureId(0),
            NATION_A,
            StructureType::Ranch,
            TilePosition::new(4, 13),
        );

        assert!(ranch.can_upgrade(&scenario, &structure));
        assert_eq!(ranch.upgrade(&scenario, &mut structure), Ok(2));
        assert_eq!(ranch.upgrade(&scenario, &mut structure), Ok(3));

        assert!(!ranch.can_upgrade(&scenario, &structure));
        let before = structure.clone();
        assert_eq!(
            ranch.upgrade(&scenario, &mut structure),
            Err(StructureError::NotUpgradable {
                kind: StructureType::Ranch,
                position: TilePosition::new(4, 13),
                level: 3,
            })
        );
        assert_eq!(structure, before);
    }

    #[test]
    fn depot_needs_a_road() {
        let mut scenario = sample_scenario();
        let site = TilePosition::new(5, 13);
        assert!(!Depot.can_build(&scenario, NATION_A, site));

        scenario
            .add_road(RoadSegment::new(site, TilePosition::new(5, 14)))
            .unwrap();
        assert!(Depot.can_build(&scenario, NATION_A, site));
    }

    #[test]
    fn occupied_site_blocks_construction() {
        let mut scenario = sample_scenario();
        let site = TilePosition::new(4, 13);
        scenario
            .place_structure(NATION_A, StructureType::Farm, site)
            .unwrap();
        assert!(!TerrainStructure::ranch().can_build(&scenario, NATION_A, site));
    }
}
