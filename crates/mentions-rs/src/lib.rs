//! Public SDK surface for mention statistics and similarity.
//!
//! This crate re-exports the building blocks and wires them over one shared
//! store through [`MentionsEngine`].

mod engine;

/// Re-export for convenience.
pub use mentions_rs_config as config;
/// Re-export for convenience.
pub use mentions_rs_similarity as similarity;
/// Re-export for convenience.
pub use mentions_rs_store as store;

pub use engine::{EngineError, MentionsEngine};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
