//! Mention records, query windows, and ranked results.

use crate::error::StoreError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single observed occurrence of a value by a user in a room.
///
/// The identity key is `(value, username, room_name, mention_time)`; persisting
/// a record whose key already exists adds its `occurrences` to the stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRecord<V> {
    /// The mentioned value.
    pub value: V,
    /// Author of the mention; may be empty.
    pub username: String,
    /// Room the mention was made in; may be empty.
    pub room_name: String,
    /// When the mention happened, in UTC.
    pub mention_time: DateTime<Utc>,
    /// Number of occurrences represented by this record (at least 1).
    pub occurrences: u64,
    /// Whether the author is a bot account.
    pub is_bot: bool,
}

impl<V> MentionRecord<V> {
    /// Create a single-occurrence, human-authored record.
    pub fn new(
        value: V,
        username: impl Into<String>,
        room_name: impl Into<String>,
        mention_time: DateTime<Utc>,
    ) -> Self {
        Self {
            value,
            username: username.into(),
            room_name: room_name.into(),
            mention_time,
            occurrences: 1,
            is_bot: false,
        }
    }

    /// Set the occurrence count.
    pub fn with_occurrences(mut self, occurrences: u64) -> Self {
        self.occurrences = occurrences;
        self
    }

    /// Mark the record as bot-authored.
    pub fn from_bot(mut self, is_bot: bool) -> Self {
        self.is_bot = is_bot;
        self
    }
}

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Create a window, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, StoreError> {
        if start > end {
            return Err(StoreError::InvalidArgument(format!(
                "interval start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window covering the `duration` leading up to `now`.
    pub fn last(duration: Duration, now: DateTime<Utc>) -> Result<Self, StoreError> {
        Self::new(now - duration, now)
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `time` falls inside the window.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time < self.end
    }
}

/// Categorical dimension used to group or cluster mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionColumn {
    /// Group by room name.
    Room,
    /// Group by user name.
    User,
}

impl MentionColumn {
    /// Backing SQL column.
    pub(crate) fn sql_column(self) -> &'static str {
        match self {
            MentionColumn::Room => "room_name",
            MentionColumn::User => "username",
        }
    }

    /// Read this column from a record.
    pub fn extract<V>(self, record: &MentionRecord<V>) -> &str {
        match self {
            MentionColumn::Room => &record.room_name,
            MentionColumn::User => &record.username,
        }
    }
}

impl fmt::Display for MentionColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MentionColumn::Room => f.write_str("room"),
            MentionColumn::User => f.write_str("user"),
        }
    }
}

impl FromStr for MentionColumn {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "room" => Ok(MentionColumn::Room),
            "user" => Ok(MentionColumn::User),
            _ => Err(StoreError::UnsupportedColumn(raw.to_string())),
        }
    }
}

/// A value with its summed occurrences, as returned by top-N queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount<V> {
    pub value: V,
    pub occurrences: u64,
}

/// A room or user name with its summed occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCount {
    pub label: String,
    pub occurrences: u64,
}
