//! Session host configuration

use std::path::{Path, PathBuf};

use imperialism_protocol::NationId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Host configuration, read from YAML. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Scenario document loaded at startup
    pub scenario: Option<PathBuf>,
    /// Ruleset document; the embedded default when absent
    pub rules: Option<PathBuf>,
    /// Nation whose plan receives map intents
    pub active_nation: NationId,
    /// Where `run` saves the scenario after its script, unless `--save` overrides it
    pub save_path: Option<PathBuf>,
    /// Presentation pixels per tile, for scene to tile conversion
    pub tile_size: f64,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            rules: None,
            active_nation: NationId(1),
            save_path: None,
            tile_size: 80.0,
            log_filter: "imperialism_server=info,imperialism_core=info".to_string(),
            json_logs: false,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Scene coordinates in pixels to tile units.
    pub fn to_tile_units(&self, x: f64, y: f64) -> (f64, f64) {
        let size = if self.tile_size > 0.0 { self.tile_size } else { 1.0 };
        (x / size, y / size)
    }
}
