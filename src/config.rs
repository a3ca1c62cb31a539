use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Front-end settings, read from an optional TOML file.
///
/// ```toml
/// pet_name = "Biscuit"
/// opponent_delay_ms = 400
/// seed = 7
/// log_level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub pet_name: String,
    /// Pause before the pet answers a move.
    pub opponent_delay_ms: u64,
    /// Fixes the pet's random choices when set.
    pub seed: Option<u64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pet_name: "Your pet".to_string(),
            opponent_delay_ms: 400,
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}
