//! User configuration and defaults

use crate::domain::SemanticOrder;
use crate::error::{DircatError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from `config.json`; every field is optional and command
/// line flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    /// Custom semantic ordering groups, highest priority first
    pub order: Option<SemanticOrder>,
    /// Label column names, shallowest first
    pub hierarchy: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub extensions_ignore: Option<Vec<String>>,
    pub include_meta: Option<bool>,
}

impl UserConfig {
    /// Get the default config file path (~/.config/dircat/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dircat").join("config.json"))
    }

    /// Load config from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(DircatError::ConfigError(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::load_from(path)
            }
            None => match Self::config_path() {
                Some(path) if path.is_file() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            DircatError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            DircatError::ConfigError(format!("Failed to parse config file: {}", e))
        })
    }
}
