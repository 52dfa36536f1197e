use log::info;
use mentions_rs_config::{ConfigError, MentionsConfig};
use mentions_rs_similarity::{RatioCalculator, SimilarityService, SpectralPartitioner};
use mentions_rs_store::{MentionStore, MentionValue, MessageVolumeSource, SqlitePool, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Errors raised while opening an engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// One connection pool shared by every component handed out.
///
/// Built once at startup; components for different value types read and
/// write disjoint categories of the same database.
#[derive(Debug, Clone)]
pub struct MentionsEngine {
    config: MentionsConfig,
    pool: SqlitePool,
}

impl MentionsEngine {
    /// Validate `config` and open its store (in memory when no path is set).
    pub fn open(config: &MentionsConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let pool = match config.resolved_store_path() {
            Some(path) => {
                info!("opening mention store (path={})", path.display());
                SqlitePool::open(
                    &path,
                    Duration::from_millis(config.store.busy_timeout_ms),
                )?
            }
            None => {
                info!("opening in-memory mention store");
                SqlitePool::open_in_memory()?
            }
        };
        Ok(Self {
            config: config.clone(),
            pool,
        })
    }

    /// Configuration the engine was opened with.
    pub fn config(&self) -> &MentionsConfig {
        &self.config
    }

    /// Connection pool shared by every store view.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store view for values of type `V`.
    pub fn store<V: MentionValue>(&self) -> MentionStore<V> {
        MentionStore::new(self.pool.clone())
    }

    /// Partitioner configured from the similarity settings.
    pub fn partitioner(&self) -> SpectralPartitioner {
        SpectralPartitioner::from_config(&self.config.similarity)
    }

    /// Similarity service over the store for `V`.
    pub fn similarity<V: MentionValue>(&self) -> SimilarityService<V> {
        SimilarityService::new(self.store(), self.partitioner())
    }

    /// Ratio calculator using `volume` for the message-volume denominator.
    pub fn ratios<V: MentionValue>(
        &self,
        volume: Arc<dyn MessageVolumeSource>,
    ) -> RatioCalculator<V> {
        RatioCalculator::new(self.store(), volume)
    }

    /// Result size used when a caller does not pick one.
    pub fn default_result_size(&self) -> usize {
        self.config.ratios.default_result_size
    }
}
