//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use warga_core::{WargaError, WargaResult, DAY_MS};

/// Tunables for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lifetime of a temporary adjustment in milliseconds
    pub adjustment_ttl_ms: u64,

    /// Smallest temporary point grant
    pub min_temporary_points: i64,

    /// Largest temporary point grant
    pub max_temporary_points: i64,

    /// Whether promotion to moderator seeds points to the tier's minimum
    pub seed_points_on_promotion: bool,

    /// Attempts for an optimistic read-modify-write before giving up
    pub max_write_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            adjustment_ttl_ms: DAY_MS, // 24 hours
            min_temporary_points: 1,
            max_temporary_points: 500,
            seed_points_on_promotion: true,
            max_write_attempts: 8,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML configuration. Missing keys take defaults.
    pub fn from_toml_str(input: &str) -> WargaResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| WargaError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load_from_file(path: &Path) -> WargaResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WargaError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> WargaResult<()> {
        if self.adjustment_ttl_ms == 0 {
            return Err(WargaError::config("adjustment_ttl_ms must be positive"));
        }
        if self.min_temporary_points < 1 {
            return Err(WargaError::config("min_temporary_points must be at least 1"));
        }
        if self.min_temporary_points > self.max_temporary_points {
            return Err(WargaError::config(
                "min_temporary_points exceeds max_temporary_points",
            ));
        }
        if self.max_write_attempts == 0 {
            return Err(WargaError::config("max_write_attempts must be positive"));
        }
        Ok(())
    }
}
