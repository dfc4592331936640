//! Settings management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tether_core::binding::{CollisionPolicy, ProxyMode};
use tracing::level_filters::LevelFilter;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown log level '{0}'")]
    InvalidLevel(String),
}

/// Session settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub binding: BindingSettings,
    pub logging: LoggingSettings,
    pub script: ScriptSettings,
}

/// Defaults applied when binding host classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingSettings {
    pub default_proxy_mode: ProxyMode,
    pub collision_policy: CollisionPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub level: String,
    /// Route promise rejections to the host logger.
    pub log_rejections: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    pub drain_jobs_after_eval: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_rejections: true,
        }
    }
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            drain_jobs_after_eval: true,
        }
    }
}

impl LoggingSettings {
    pub fn level_filter(&self) -> Result<LevelFilter, SettingsError> {
        self.level
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidLevel(self.level.clone()))
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.logging.level_filter()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
