//! Logger configuration loaded from JSON
//!
//! ```json
//! {
//!   "name": "api",
//!   "level": "warn",
//!   "format": "[flag] [[datetime]] [message]",
//!   "async_buffer": 1024
//! }
//! ```
//!
//! `format` is either a template string, a template object with its own
//! clock format and flag table, or a full token list.

use super::error::{LoggerError, Result};
use super::format::Format;
use super::level::Level;
use super::timestamp::TimestampFormat;
use super::token::LevelFlags;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable description of one logger, minus its sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    pub name: String,

    /// Threshold, by name (case-insensitive)
    #[serde(with = "level_name")]
    pub level: Level,

    pub format: FormatConfig,

    /// Queue capacity for asynchronous delivery; absent means synchronous
    pub async_buffer: Option<usize>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: "echo".to_string(),
            level: Level::Trace,
            format: FormatConfig::default(),
            async_buffer: None,
        }
    }
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading configuration",
                format!("Failed to read {}", path.display()),
                e,
            )
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::config("LoggerConfig", "name must not be empty"));
        }
        if self.async_buffer == Some(0) {
            return Err(LoggerError::config(
                "LoggerConfig",
                "async_buffer must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Line format as written in a configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatConfig {
    /// Explicit token list
    Tokens(Format),

    /// Template with the default clock format and emoji flags
    Template(String),

    /// Template with its own clock format and flag table
    Custom {
        template: String,
        #[serde(default)]
        timestamp: TimestampFormat,
        #[serde(default = "LevelFlags::emoji")]
        flags: LevelFlags,
    },
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig::Tokens(Format::standard())
    }
}

impl FormatConfig {
    pub fn to_format(&self) -> Format {
        match self {
            FormatConfig::Tokens(format) => format.clone(),
            FormatConfig::Template(template) => {
                Format::from_template(template, TimestampFormat::default(), LevelFlags::emoji())
            }
            FormatConfig::Custom {
                template,
                timestamp,
                flags,
            } => Format::from_template(template, timestamp.clone(), flags.clone()),
        }
    }
}

mod level_name {
    use super::Level;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(level.to_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}
