//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::mapping;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Path to a document snapshot to serve (JSON parameter list).
    /// When absent, the server starts over an empty document.
    #[serde(default)]
    pub document_path: Option<PathBuf>,

    /// Mapping settings.
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !mapping::is_valid_namespace(&self.mapping.namespace) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid mapping namespace '{}'. Expected 'CA' followed by digits, e.g. 'CA0'",
                    self.mapping.namespace
                ),
            });
        }
        Ok(())
    }
}

/// Mapping grammar configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    /// Namespace written in new mapping comments. Default: "CA0".
    ///
    /// Decoding accepts any `CA<digits>` namespace regardless of this value.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

fn default_namespace() -> String {
    mapping::DEFAULT_NAMESPACE.to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
