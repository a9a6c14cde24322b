use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use imperialism_protocol::TerrainId;
use thiserror::Error;

use crate::rules::{RawRuleset, Ruleset, StructureRule, TerrainType};

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("terrain key is not a number: {0}")]
    InvalidTerrainKey(String),
    #[error("missing referenced terrain: {0}")]
    MissingTerrain(String),
    #[error("ruleset defines no water terrain")]
    NoWaterTerrain,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub enum RulesSource<'a> {
    Embedded,
    /// A file on disk; `.json` is parsed as JSON, anything else as YAML.
    Path(PathBuf),
    Yaml(&'a str),
    Json(&'a str),
}

pub fn load_rules(source: RulesSource<'_>) -> Result<Ruleset, RulesError> {
    let raw: RawRuleset = match source {
        RulesSource::Embedded => {
            serde_yaml::from_str(include_str!("../../data/rules/default.yaml"))?
        }
        RulesSource::Path(path) => {
            let text = std::fs::read_to_string(&path)?;
            if path.extension().is_some_and(|ext| ext == "json") {
                serde_json::from_str(&text)?
            } else {
                serde_yaml::from_str(&text)?
            }
        }
        RulesSource::Yaml(text) => serde_yaml::from_str(text)?,
        RulesSource::Json(text) => serde_json::from_str(text)?,
    };

    compile_rules(raw)
}

fn compile_rules(raw: RawRuleset) -> Result<Ruleset, RulesError> {
    let water_names = raw.water.iter().cloned().collect::<BTreeSet<_>>();

    let mut terrains = BTreeMap::new();
    let mut terrain_ids = BTreeMap::new();
    for (key, name) in &raw.terrain_names {
        let raw_id = key
            .trim()
            .parse::<u16>()
            .map_err(|_| RulesError::InvalidTerrainKey(key.clone()))?;
        let id = TerrainId::new(raw_id);
        terrains.insert(
            id,
            TerrainType {
                name: name.clone(),
                water: water_names.contains(name),
            },
        );
        terrain_ids.insert(name.clone(), id);
    }

    if let Some(missing) = water_names.iter().find(|n| !terrain_ids.contains_key(*n)) {
        return Err(RulesError::MissingTerrain(missing.clone()));
    }
    if !terrains.values().any(|t| t.water) {
        return Err(RulesError::NoWaterTerrain);
    }

    let lookup = |name: &String| {
        terrain_ids
            .get(name)
            .copied()
            .ok_or_else(|| RulesError::MissingTerrain(name.clone()))
    };

    let structures = raw
        .structures
        .iter()
        .map(|(kind, rule)| {
            let allowed = rule
                .terrains
                .iter()
                .map(&lookup)
                .collect::<Result<BTreeSet<_>, _>>()?;
            Ok((
                *kind,
                StructureRule {
                    terrains: allowed,
                    max_level: rule.max_level.max(1),
                },
            ))
        })
        .collect::<Result<BTreeMap<_, _>, RulesError>>()?;

    let workforce_restrictions = raw
        .workforce_restrictions
        .iter()
        .fold(BTreeMap::new(), |mut acc, entry| {
            acc.entry(entry.nation)
                .or_insert_with(BTreeSet::new)
                .extend(entry.types.iter().copied());
            acc
        });

    Ok(Ruleset {
        terrains,
        terrain_ids,
        workforce_types: raw.workforce_types.iter().copied().collect(),
        workforce_restrictions,
        structures,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use imperialism_protocol::{NationId, StructureType, WorkforceType};

    #[test]
    fn embedded_rules_load() {
        let rules = load_rules(RulesSource::Embedded).expect("rules load");
        assert_eq!(rules.terrains.len(), 7);
        let sea = rules.terrain_id("Sea").unwrap();
        assert!(rules.is_water(sea));
        assert!(!rules.is_water(rules.terrain_id("Plain").unwrap()));
        assert_eq!(rules.default_water(), Some(sea));
        assert_eq!(rules.structure(StructureType::Ranch).unwrap().max_level, 3);
        assert_eq!(rules.workforce_settings().len(), WorkforceType::ALL.len());
    }

    #[test]
    fn json_rulesets_use_the_same_keys() {
        let json = r#"{
            "terrain.names": {"0": "Sea", "1": "Plain"},
            "terrain.water": ["Sea"],
            "structures": {"ranch": {"terrains": ["Plain"], "max_level": 2}},
            "scenario.author": "someone"
        }"#;
        let rules = load_rules(RulesSource::Json(json)).expect("rules load");
        assert_eq!(rules.terrain_name(TerrainId::new(1)), Some("Plain"));
        assert_eq!(
            rules.raw().extra.get("scenario.author"),
            Some(&serde_json::json!("someone"))
        );
        // workforce.types defaults to every type
        assert!(rules.workforce_permitted(NationId(1), WorkforceType::Driller));
    }

    #[test]
    fn unknown_structure_terrain_is_rejected() {
        let yaml = r#"
terrain.names:
  "0": Sea
terrain.water: [Sea]
structures:
  mine:
    terrains: [Mountains]
"#;
        let err = load_rules(RulesSource::Yaml(yaml)).unwrap_err();
        assert!(matches!(err, RulesError::MissingTerrain(name) if name == "Mountains"));
    }

    #[test]
    fn ruleset_without_water_is_rejected() {
        let yaml = "terrain.names:\n  \"1\": Plain\n";
        assert!(matches!(
            load_rules(RulesSource::Yaml(yaml)),
            Err(RulesError::NoWaterTerrain)
        ));
    }

    #[test]
    fn restrictions_limit_individual_nations() {
        let yaml = r#"
terrain.names:
  "0": Sea
terrain.water: [Sea]
workforce.restrictions:
  - nation: 2
    types: [engineer]
"#;
        let rules = load_rules(RulesSource::Yaml(yaml)).expect("rules load");
        assert!(rules.workforce_permitted(NationId(2), WorkforceType::Engineer));
        assert!(!rules.workforce_permitted(NationId(2), WorkforceType::Miner));
        assert!(rules.workforce_permitted(NationId(1), WorkforceType::Miner));
    }

    #[test]
    fn bad_terrain_key_is_reported() {
        let yaml = "terrain.names:\n  sea: Sea\nterrain.water: [Sea]\n";
        assert!(matches!(
            load_rules(RulesSource::Yaml(yaml)),
            Err(RulesError::InvalidTerrainKey(key)) if key == "sea"
        ));
    }
}
