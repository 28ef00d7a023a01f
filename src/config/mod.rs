//! Configuration file loading and parsing.
//!
//! # Configuration File Locations
//!
//! The configuration file is searched in the following order:
//!
//! 1. Path specified via the CLI argument
//! 2. Default location:
//!    - **Linux/macOS:** `~/.inventor-params-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.inventor-params-mcp\config.json`

mod settings;

pub use settings::{Config, LoggingConfig, MappingConfig};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.inventor-params-mcp/`
/// - **Windows:** `%USERPROFILE%\.inventor-params-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".inventor-params-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, uses the platform-specific default location when it
/// exists, and falls back to the built-in defaults otherwise.
///
/// # Errors
///
/// Returns an error if an explicitly-given file cannot be found, the file
/// cannot be read, the JSON is malformed, or validation fails.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let Some(default) = default_config_path() else {
                return Ok(Config::default());
            };
            // Missing default config is not an error; the defaults are usable.
            if !default.exists() {
                return Ok(Config::default());
            }
            default
        }
    };

    if !config_path.exists() {
        return Err(ConfigError::NotFound { path: config_path });
    }

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.clone(),
        source: e,
    })?;

    config.validate()?;

    Ok(config)
}
