//! Configuration file loading for self-play runs.

use std::path::{Path, PathBuf};

use bitchess_engine::DrawRules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings for a batch of self-play games.
///
/// Every field is optional in the file; `selfplay.toml` in the current
/// directory is read when no path is given.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub games: u32,
    /// Plies after which an unfinished game is abandoned.
    pub max_plies: usize,
    /// Seed for move selection. Unset means a fresh seed per run.
    pub seed: Option<u64>,
    /// Draw policy applied to every game.
    pub draw_rules: DrawRules,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            games: 10,
            max_plies: 500,
            seed: None,
            draw_rules: DrawRules::default(),
        }
    }
}

impl SelfPlayConfig {
    /// Loads the configuration from `path`, or from [`Self::config_path()`]
    /// when `path` is `None`.
    ///
    /// A missing default file yields the default configuration; an explicit
    /// path that does not exist is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = Self::config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let content = std::fs::read_to_string(&config_path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from("selfplay.toml")
    }
}
