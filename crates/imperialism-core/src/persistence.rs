use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::{
    rules::Ruleset,
    scenario::{ScenarioBase, ScenarioError, ServerScenario},
};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("msgpack encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("msgpack decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("inconsistent scenario: {0}")]
    Scenario(#[from] ScenarioError),
}

/// On-disk encoding of a scenario document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioFormat {
    Json,
    MessagePack,
}

impl ScenarioFormat {
    /// `.msgpack` selects MessagePack; anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("msgpack") => ScenarioFormat::MessagePack,
            _ => ScenarioFormat::Json,
        }
    }

    pub fn encode(self, base: &ScenarioBase) -> Result<Vec<u8>, PersistenceError> {
        Ok(match self {
            ScenarioFormat::Json => serde_json::to_vec_pretty(base)?,
            ScenarioFormat::MessagePack => rmp_serde::encode::to_vec_named(base)?,
        })
    }

    pub fn decode(self, bytes: &[u8]) -> Result<ScenarioBase, PersistenceError> {
        Ok(match self {
            ScenarioFormat::Json => serde_json::from_slice(bytes)?,
            ScenarioFormat::MessagePack => rmp_serde::decode::from_slice(bytes)?,
        })
    }
}

pub fn save_scenario(scenario: &ServerScenario, path: &Path) -> Result<(), PersistenceError> {
    let format = ScenarioFormat::from_path(path);
    let bytes = format.encode(scenario.base())?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), ?format, bytes = bytes.len(), turn = scenario.turn(), "scenario saved");
    Ok(())
}

/// Reads a scenario document and checks it against `rules`.
pub fn load_scenario(path: &Path, rules: Ruleset) -> Result<ServerScenario, PersistenceError> {
    let format = ScenarioFormat::from_path(path);
    let bytes = std::fs::read(path)?;
    let base = format.decode(&bytes)?;
    let scenario = ServerScenario::from_base(rules, base)?;
    info!(
        path = %path.display(),
        nations = scenario.nations().len(),
        turn = scenario.turn(),
        "scenario loaded"
    );
    Ok(scenario)
}

/// Loads a document into an existing scenario, keeping its ruleset.
/// The current state survives a failed load.
pub fn reload_scenario(scenario: &mut ServerScenario, path: &Path) -> Result<(), PersistenceError> {
    let format = ScenarioFormat::from_path(path);
    let base = format.decode(&std::fs::read(path)?)?;
    scenario.update_scenario_base(base)?;
    info!(path = %path.display(), turn = scenario.turn(), "scenario reloaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_scenario, NATION_A};
    use imperialism_protocol::{NationId, StructureType, TilePosition, WorkforceId, WorkforceType};

    use crate::workforce::Workforce;

    fn populated() -> ServerScenario {
        let mut scenario = sample_scenario();
        scenario
            .get_nation_asset_mut(NATION_A)
            .unwrap()
            .add_or_update_workforce(Workforce::new(
                WorkforceId::from_u128(7),
                5,
                12,
                NATION_A,
                WorkforceType::Forester,
            ))
            .unwrap();
        scenario
            .place_structure(NATION_A, StructureType::Mine, TilePosition::new(6, 12))
            .unwrap();
        scenario.set_property("title", serde_json::json!("Test"));
        scenario
    }

    #[test]
    fn format_follows_the_extension() {
        assert_eq!(ScenarioFormat::from_path(Path::new("a.msgpack")), ScenarioFormat::MessagePack);
        assert_eq!(ScenarioFormat::from_path(Path::new("a.json")), ScenarioFormat::Json);
        assert_eq!(ScenarioFormat::from_path(Path::new("scenario")), ScenarioFormat::Json);
    }

    #[test]
    fn both_formats_round_trip() {
        let scenario = populated();
        let dir = tempfile::tempdir().unwrap();
        for name in ["world.json", "world.msgpack"] {
            let path = dir.path().join(name);
            save_scenario(&scenario, &path).unwrap();
            let loaded = load_scenario(&path, scenario.rules().clone()).unwrap();
            assert_eq!(loaded.base(), scenario.base(), "{name}");
        }
    }

    #[test]
    fn failed_reload_keeps_current_state() {
        let mut scenario = populated();
        let before = scenario.base().clone();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");

        let mut broken = before.clone();
        broken.provinces.values_mut().for_each(|p| p.nation = Some(NationId(99)));
        std::fs::write(&path, serde_json::to_vec(&broken).unwrap()).unwrap();

        assert!(matches!(
            reload_scenario(&mut scenario, &path),
            Err(PersistenceError::Scenario(ScenarioError::UnknownNation(NationId(99))))
        ));
        assert_eq!(scenario.base(), &before);
    }
}
