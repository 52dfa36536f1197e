//! Configuration models and JSON5 config loading.
//!
//! This crate owns the mentions config schema and its validation.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Default on-disk location of the user config.
pub use loader::default_config_path;
/// Configuration schema models.
pub use model::*;
