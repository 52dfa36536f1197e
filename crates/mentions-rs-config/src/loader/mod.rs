//! Config loading with schema validation.
//!
//! Documents are parsed as JSON5, shape-checked, then decoded into a
//! `MentionsConfig` and range-checked.

mod schema;


use crate::{ConfigError, MentionsConfig};
use directories::UserDirs;
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename.
const DEFAULT_CONFIG_FILE: &str = "mentions.json5";
/// Default config directory under the home directory.
const DEFAULT_CONFIG_DIR: &str = ".mentions";

/// Default user config path under the home directory.
pub fn default_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}

impl MentionsConfig {
    /// Load a single config from a path.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value)
    }

    /// Load a single config from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value)
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.similarity.max_dimension == 0 {
            return Err(invalid("similarity.max_dimension", "must be at least 1"));
        }
        if !(self.similarity.eigen_epsilon.is_finite() && self.similarity.eigen_epsilon > 0.0) {
            return Err(invalid(
                "similarity.eigen_epsilon",
                "must be a positive finite number",
            ));
        }
        if self.ratios.default_result_size == 0 {
            return Err(invalid("ratios.default_result_size", "must be at least 1"));
        }
        if self
            .store
            .path
            .as_deref()
            .is_some_and(|path| path.trim().is_empty())
        {
            return Err(invalid("store.path", "must not be empty"));
        }
        Ok(())
    }

    /// Resolve the configured database path, expanding a leading `~/`.
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        let raw = self.store.path.as_deref()?;
        match (raw.strip_prefix("~/"), UserDirs::new()) {
            (Some(rest), Some(dirs)) => Some(dirs.home_dir().join(rest)),
            _ => Some(PathBuf::from(raw)),
        }
    }
}

fn config_from_value(value: Value) -> Result<MentionsConfig, ConfigError> {
    schema::validate_schema(&value)?;
    let config: MentionsConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
