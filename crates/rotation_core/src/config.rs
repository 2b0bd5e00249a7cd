//! # Rotation Configuration
//!
//! Match shape defaults and the switches for the fairness rules.
//!
//! ## Usage
//! ```rust
//! use rotation_core::config::RotationConfig;
//!
//! let config = RotationConfig::default();
//! assert_eq!(config.quarters_per_match, 4);
//! let relaxed = RotationConfig::relaxed();
//! assert!(!relaxed.rules.keeper_field_experience);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_QUARTER_MINUTES: f64 = 12.5;
pub const DEFAULT_QUARTERS_PER_MATCH: u8 = 4;
pub const MAX_QUARTERS_PER_MATCH: u8 = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Which advisory rules the validator evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSwitches {
    /// Rule A: keepers should play field next to their keeper quarter.
    pub keeper_field_experience: bool,
    /// Rule B: nobody sits out two quarters in a row.
    pub no_double_bench: bool,
    /// Rule C: a substitute should not go straight back to the bench.
    pub substitute_then_bench: bool,
}

impl Default for RuleSwitches {
    fn default() -> Self {
        Self { keeper_field_experience: true, no_double_bench: true, substitute_then_bench: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Length of a freshly created quarter.
    pub default_quarter_minutes: f64,
    pub quarters_per_match: u8,
    pub rules: RuleSwitches,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            default_quarter_minutes: DEFAULT_QUARTER_MINUTES,
            quarters_per_match: DEFAULT_QUARTERS_PER_MATCH,
            rules: RuleSwitches::default(),
        }
    }
}

impl RotationConfig {
    /// All rules on, 4 × 12.5 minutes.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Only the double-bench rule; for tournaments with odd rotations.
    pub fn relaxed() -> Self {
        Self {
            rules: RuleSwitches {
                keeper_field_experience: false,
                no_double_bench: true,
                substitute_then_bench: false,
            },
            ..Self::default()
        }
    }

    /// Round numbers for tests.
    pub fn for_tests() -> Self {
        Self { default_quarter_minutes: 10.0, ..Self::default() }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&raw)?;
        log::debug!("Loaded rotation config from {:?}", path.as_ref());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_quarter_minutes.is_finite() && self.default_quarter_minutes > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "default_quarter_minutes",
                reason: format!("must be positive, got {}", self.default_quarter_minutes),
            });
        }
        if self.quarters_per_match == 0 || self.quarters_per_match > MAX_QUARTERS_PER_MATCH {
            return Err(ConfigError::InvalidValue {
                field: "quarters_per_match",
                reason: format!(
                    "must be 1-{}, got {}",
                    MAX_QUARTERS_PER_MATCH, self.quarters_per_match
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_substitution_instant_is_half_quarter() {
        let config = RotationConfig::default();
        assert_eq!(config.default_quarter_minutes / 2.0, 6.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            RotationConfig::from_json_str(r#"{"rules": {"no_double_bench": false}}"#).unwrap();
        assert_eq!(config.quarters_per_match, 4);
        assert!(!config.rules.no_double_bench);
        assert!(config.rules.keeper_field_experience);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            RotationConfig::from_json_str(r#"{"default_quarter_minutes": 0}"#),
            Err(ConfigError::InvalidValue { field: "default_quarter_minutes", .. })
        ));
        assert!(matches!(
            RotationConfig::from_json_str(r#"{"quarters_per_match": 9}"#),
            Err(ConfigError::InvalidValue { field: "quarters_per_match", .. })
        ));
    }

    #[test]
    fn test_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotation.json");
        std::fs::write(&path, r#"{"default_quarter_minutes": 15.0}"#).unwrap();
        let config = RotationConfig::from_json_file(&path).unwrap();
        assert_eq!(config.default_quarter_minutes, 15.0);
    }
}
