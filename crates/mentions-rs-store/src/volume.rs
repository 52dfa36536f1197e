//! Boundary to the message-volume collaborator.

use crate::error::StoreError;
use crate::model::TimeInterval;

/// Source of total chat volume (mentions plus plain messages) for a window.
///
/// Implemented outside this workspace by whatever counts message summaries;
/// consumed by the message-volume activity ratio.
pub trait MessageVolumeSource: Send + Sync {
    /// Total number of messages in the window, optionally limited to rooms/users.
    fn total_message_volume(
        &self,
        interval: &TimeInterval,
        room_names: &[String],
        user_names: &[String],
        include_bots: bool,
    ) -> Result<u64, StoreError>;
}
