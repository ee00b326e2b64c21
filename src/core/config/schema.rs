//! core::config::schema
//!
//! Configuration schema types.
//!
//! The global and project files share one schema. Every field is optional;
//! a project value overrides the global one field by field.
//!
//! # Validation
//!
//! Values are validated after parsing: framework patterns must compile as
//! regular expressions, sentinels must be non-empty and the log level must
//! be a known level name.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Contents of one config file.
///
/// # Example
///
/// ```toml
/// [location]
/// framework_patterns = ["/vendor/specmeta/"]
/// ephemeral_sentinels = ["-e", "(eval)"]
///
/// [deprecations]
/// mode = "silent"
///
/// [logging]
/// level = "debug"
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub location: Option<LocationConfig>,
    pub deprecations: Option<DeprecationConfig>,
    pub logging: Option<LoggingConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(location) = &self.location {
            location.validate()?;
        }
        if let Some(logging) = &self.logging {
            logging.validate()?;
        }
        Ok(())
    }
}

/// Location resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LocationConfig {
    /// Regular expressions matching framework stack frames.
    pub framework_patterns: Option<Vec<String>>,

    /// Paths that denote inline scripts with no usable file.
    pub ephemeral_sentinels: Option<Vec<String>>,
}

impl LocationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in self.framework_patterns.iter().flatten() {
            Regex::new(pattern).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid framework pattern '{pattern}': {e}"))
            })?;
        }
        if self
            .ephemeral_sentinels
            .iter()
            .flatten()
            .any(|s| s.is_empty())
        {
            return Err(ConfigError::InvalidValue(
                "ephemeral sentinel cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// How deprecation notices are reported.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeprecationMode {
    /// Emit each notice as a `tracing` warning.
    #[default]
    Warn,
    /// Drop notices.
    Silent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeprecationConfig {
    pub mode: Option<DeprecationMode>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: Option<String>,

    pub format: Option<LogFormat>,
}

impl LoggingConfig {
    pub const VALID_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.level {
            if !Self::VALID_LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid log level '{}', must be one of: {}",
                    level,
                    Self::VALID_LEVELS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
