//! Error types for cotkit configuration and IO.
//!
//! Message-level parse failures are not represented here; they belong to the
//! parsing crate and never escape its total parse entry point.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias using CotkitError as the error type.
pub type Result<T> = std::result::Result<T, CotkitError>;

/// Top-level error type for cotkit operations.
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum CotkitError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {kind}: {message}")]
    Io { kind: String, message: String },
}

impl From<io::Error> for CotkitError {
    fn from(err: io::Error) -> Self {
        CotkitError::Io {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors related to configuration.
///
/// These errors occur when loading, parsing, or validating configuration files.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
