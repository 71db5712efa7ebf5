//! `[logging]` section

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Validation {
                field: "logging.format".to_string(),
                message: format!("'{}' is not one of pretty, json", other),
            }),
        }
    }
}

/// Modules whose verbosity can be tuned on their own.
pub const COMPONENTS: [&str; 6] = ["cli", "config", "metrics", "pricing", "reconciler", "store"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level for everything not listed in `components`
    pub level: String,
    pub format: LogFormat,
    /// Per-component overrides, e.g. `pricing = "debug"`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            components: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Reject levels `EnvFilter` would silently misread.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_level("logging.level", &self.level)?;
        for (component, level) in &self.components {
            let field = format!("logging.components.{}", component);
            if !COMPONENTS.contains(&component.as_str()) {
                return Err(ConfigError::Validation {
                    field,
                    message: format!(
                        "unknown component, expected one of {}",
                        COMPONENTS.join(", ")
                    ),
                });
            }
            check_level(&field, level)?;
        }
        Ok(())
    }
}

fn check_level(field: &str, level: &str) -> Result<(), ConfigError> {
    if LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            field: field.to_string(),
            message: format!("'{}' is not one of {}", level, LEVELS.join(", ")),
        })
    }
}
