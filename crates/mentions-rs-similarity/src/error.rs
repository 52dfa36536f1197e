//! Error types for similarity and ratio computations.

use mentions_rs_store::StoreError;

/// Errors returned by matrix construction, reordering, and ratio queries.
#[derive(Debug, thiserror::Error)]
pub enum SimilarityError {
    /// Caller supplied a malformed matrix, permutation, or label list.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Matrix exceeds the configured dimension bound.
    #[error("matrix dimension {dimension} exceeds limit {limit}")]
    MatrixTooLarge { dimension: usize, limit: usize },
    /// Eigen-decomposition did not converge within its iteration budget.
    #[error("eigen-decomposition did not converge (dimension={dimension})")]
    EigenNotConverged { dimension: usize },
    /// Underlying store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
