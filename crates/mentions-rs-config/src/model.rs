//! Configuration schema for the mentions engine.

use serde::{Deserialize, Serialize};

/// Root config for the mentions engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MentionsConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub ratios: RatioConfig,
}

impl MentionsConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> MentionsConfigBuilder {
        MentionsConfigBuilder::new()
    }
}

/// Builder for assembling a `MentionsConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct MentionsConfigBuilder {
    config: MentionsConfig,
}

impl MentionsConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: MentionsConfig::default(),
        }
    }

    /// Replace the storage configuration.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the spectral similarity configuration.
    pub fn similarity(mut self, similarity: SimilarityConfig) -> Self {
        self.config.similarity = similarity;
        self
    }

    /// Replace the ratio ranking configuration.
    pub fn ratios(mut self, ratios: RatioConfig) -> Self {
        self.config.ratios = ratios;
        self
    }

    /// Finalize and return the built `MentionsConfig`.
    pub fn build(self) -> MentionsConfig {
        self.config
    }
}

/// SQLite storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Database file; `None` keeps everything in memory.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Default SQLite busy timeout in milliseconds.
fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Bounds and convergence controls for the spectral reordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityConfig {
    /// Largest matrix dimension accepted before failing fast.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: usize,
    #[serde(default = "default_eigen_epsilon")]
    pub eigen_epsilon: f64,
    /// Eigen-solver iteration cap; 0 means unbounded.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            eigen_epsilon: default_eigen_epsilon(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Default upper bound on the matrix dimension.
fn default_max_dimension() -> usize {
    2_000
}

/// Default convergence threshold for the eigen-solver.
fn default_eigen_epsilon() -> f64 {
    1e-12
}

/// Default iteration cap for the eigen-solver.
fn default_max_iterations() -> usize {
    10_000
}

/// Ranking defaults for activity ratios.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatioConfig {
    #[serde(default = "default_result_size")]
    pub default_result_size: usize,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            default_result_size: default_result_size(),
        }
    }
}

/// Default number of ranked groups returned by ratio queries.
fn default_result_size() -> usize {
    10
}
