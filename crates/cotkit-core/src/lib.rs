//! # cotkit Core
//!
//! Configuration and error handling shared by the cotkit crates.
//!
//! - **Configuration**: [`AppConfig`] groups the parser tuning knobs
//!   ([`ParserConfig`]) and logging settings ([`LoggingConfig`]). It loads from
//!   YAML files, optionally merged with `COTKIT__*` environment overrides.
//! - **Errors**: [`CotkitError`] and [`ConfigError`] describe everything that
//!   can go wrong while loading or validating configuration.
//!
//! ## Example
//!
//! ```
//! use cotkit_core::config::AppConfig;
//!
//! let config = AppConfig::from_yaml("parser:\n  pool_capacity: 4\n").unwrap();
//! assert_eq!(config.parser.pool_capacity, 4);
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod error;

pub use config::{AppConfig, LogFormat, LoggingConfig, ParserConfig};
pub use error::{ConfigError, CotkitError, Result};
