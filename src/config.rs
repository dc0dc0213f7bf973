//! Optional TOML configuration with default file locations.
//!
//! CLI flags always win; the config file only supplies defaults for the
//! store and export paths. A missing config file is not an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "incidencias.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Hierarchical record store location.
    pub store_path: PathBuf,
    /// Secondary export collection location.
    pub export_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("incidencies.xml"),
            export_path: PathBuf::from("incidencias.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// With an explicit `path` the file must exist and parse. Without one,
    /// `incidencias.toml` is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
