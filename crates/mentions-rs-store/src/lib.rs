//! Mention persistence and windowed occurrence queries.

pub mod error;
pub mod model;
pub mod pool;
pub mod query;
pub mod store;
pub mod value;
pub mod volume;

/// Store error type.
pub use error::StoreError;
/// Mention records, windows, and ranked results.
pub use model::{ColumnCount, MentionColumn, MentionRecord, TimeInterval, ValueCount};
/// Shared SQLite connection handle.
pub use pool::SqlitePool;
/// Composable mention filter.
pub use query::MentionQuery;
/// Typed store over one mention category.
pub use store::MentionStore;
/// Mentionable value types.
pub use value::{Emoji, Entity, MentionValue, MessageType};
/// Boundary to the message-volume collaborator.
pub use volume::MessageVolumeSource;
