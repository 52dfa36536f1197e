//! Error types for mention storage.

/// Errors returned by the mention store and its helpers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// No pooled connection could be checked out.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    /// IO error while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Caller supplied an argument outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Grouping column name is not one of `room` or `user`.
    #[error("unsupported column: {0}")]
    UnsupportedColumn(String),
    /// A stored value could not be decoded into its category's type.
    #[error("failed to decode stored {category} value: {value}")]
    Decode {
        category: &'static str,
        value: String,
    },
}
