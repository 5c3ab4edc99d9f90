//! Configuration management for cotkit.
//!
//! This module provides:
//! - Loading from YAML files
//! - Environment variable overrides (`COTKIT__PARSER__POOL_CAPACITY=32`)
//! - Validation of all settings

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::Level;

/// Upper bound for `parser.max_detail_depth`. Detail trees are dropped and
/// serialized recursively, so the limit also bounds stack use.
pub const MAX_DETAIL_DEPTH: usize = 1024;

/// Main application configuration.
///
/// # Examples
///
/// ```no_run
/// use cotkit_core::config::AppConfig;
///
/// let config = AppConfig::from_file("cotkit.yaml").unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Parser tuning
    #[serde(default)]
    pub parser: ParserConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&contents)
    }

    /// Loads configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Loads configuration using the `config` crate: the given file, then
    /// `COTKIT__SECTION__KEY` environment variables on top.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or merged.
    pub fn from_config_builder<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(
                config::Environment::with_prefix("COTKIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        config.try_deserialize().map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<()> {
        self.parser.validate()?;
        self.logging.parse_level()?;
        Ok(())
    }
}

/// Tuning for the CoT parser and its context pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Parse contexts kept for reuse; extra contexts are dropped on release
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,

    /// Deepest detail nesting accepted before a message is rejected
    #[serde(default = "default_max_detail_depth")]
    pub max_detail_depth: usize,

    /// Whether rejected messages are logged
    #[serde(default = "default_true")]
    pub log_rejected: bool,

    /// How much of a rejected message ends up in the log
    #[serde(default = "default_max_logged_bytes")]
    pub max_logged_bytes: usize,
}

fn default_pool_capacity() -> usize {
    16
}

fn default_max_detail_depth() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_max_logged_bytes() -> usize {
    1024
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            pool_capacity: default_pool_capacity(),
            max_detail_depth: default_max_detail_depth(),
            log_rejected: true,
            max_logged_bytes: default_max_logged_bytes(),
        }
    }
}

impl ParserConfig {
    /// Validates the parser configuration.
    ///
    /// A pool capacity of zero is allowed and disables context reuse.
    pub fn validate(&self) -> Result<()> {
        if self.max_detail_depth == 0 {
            return Err(ConfigError::invalid_value(
                "parser.max_detail_depth",
                "must be at least 1 so the <detail> root fits",
            )
            .into());
        }

        if self.max_detail_depth > MAX_DETAIL_DEPTH {
            return Err(ConfigError::invalid_value(
                "parser.max_detail_depth",
                format!("must be at most {}", MAX_DETAIL_DEPTH),
            )
            .into());
        }

        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "text" or "json"
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Parses the log level string to a tracing Level.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse().map_err(|_| {
            ConfigError::invalid_value("logging.level", format!("Invalid log level: {}", self.level))
                .into()
        })
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
}
