//! Election configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use ballot_types::Roster;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for one election.
///
/// The roster is supplied here once at startup rather than compiled in, so
/// the same processor serves different elections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionConfig {
    /// How many times a vote that lost a write race is re-run from scratch
    /// before the conflict is returned to the caller.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// Capacity of the outbound notification queue. Slow listeners that fall
    /// further behind than this miss notifications.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,

    /// Contestants, in the order results are reported.
    #[serde(default)]
    pub roster: Roster,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_max_conflict_retries() -> u32 {
    8
}

fn default_notification_capacity() -> usize {
    1024
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ElectionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check settings that serde cannot express.
    ///
    /// The roster validates itself on construction (non-empty, unique ids).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notification_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
            notification_capacity: default_notification_capacity(),
            roster: Roster::default(),
        }
    }
}
