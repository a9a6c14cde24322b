use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of workforce a nation can field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkforceType {
    Engineer,
    Geologist,
    Prospector,
    Farmer,
    Forester,
    Miner,
    Rancher,
    Driller,
}

impl WorkforceType {
    pub const ALL: [WorkforceType; 8] = [
        WorkforceType::Engineer,
        WorkforceType::Geologist,
        WorkforceType::Prospector,
        WorkforceType::Farmer,
        WorkforceType::Forester,
        WorkforceType::Miner,
        WorkforceType::Rancher,
        WorkforceType::Driller,
    ];

    /// The structure this workforce raises or improves with [`WorkforceAction::Build`].
    pub fn structure(self) -> Option<StructureType> {
        match self {
            WorkforceType::Engineer => Some(StructureType::Depot),
            WorkforceType::Farmer => Some(StructureType::Farm),
            WorkforceType::Forester => Some(StructureType::LumberMill),
            WorkforceType::Miner => Some(StructureType::Mine),
            WorkforceType::Rancher => Some(StructureType::Ranch),
            WorkforceType::Driller => Some(StructureType::OilWell),
            WorkforceType::Geologist | WorkforceType::Prospector => None,
        }
    }

    pub fn can_perform(self, action: WorkforceAction) -> bool {
        match action {
            WorkforceAction::Stand | WorkforceAction::Editor | WorkforceAction::Move => true,
            WorkforceAction::BuildRoad => self == WorkforceType::Engineer,
            WorkforceAction::Prospect => {
                matches!(self, WorkforceType::Geologist | WorkforceType::Prospector)
            }
            WorkforceAction::Build => self.structure().is_some(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WorkforceType::Engineer => "engineer",
            WorkforceType::Geologist => "geologist",
            WorkforceType::Prospector => "prospector",
            WorkforceType::Farmer => "farmer",
            WorkforceType::Forester => "forester",
            WorkforceType::Miner => "miner",
            WorkforceType::Rancher => "rancher",
            WorkforceType::Driller => "driller",
        }
    }
}

impl fmt::Display for WorkforceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a workforce is doing (or will do once the turn resolves).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkforceAction {
    #[default]
    Stand,
    /// Placed by the scenario editor; behaves like `Stand` during resolution.
    Editor,
    Move,
    BuildRoad,
    Build,
    Prospect,
}

impl fmt::Display for WorkforceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkforceAction::Stand => "stand",
            WorkforceAction::Editor => "editor",
            WorkforceAction::Move => "move",
            WorkforceAction::BuildRoad => "build_road",
            WorkforceAction::Build => "build",
            WorkforceAction::Prospect => "prospect",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    Farm,
    Ranch,
    LumberMill,
    Mine,
    OilWell,
    Depot,
}

impl StructureType {
    pub const ALL: [StructureType; 6] = [
        StructureType::Farm,
        StructureType::Ranch,
        StructureType::LumberMill,
        StructureType::Mine,
        StructureType::OilWell,
        StructureType::Depot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StructureType::Farm => "farm",
            StructureType::Ranch => "ranch",
            StructureType::LumberMill => "lumber_mill",
            StructureType::Mine => "mine",
            StructureType::OilWell => "oil_well",
            StructureType::Depot => "depot",
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
