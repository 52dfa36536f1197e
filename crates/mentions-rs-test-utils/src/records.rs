use chrono::{DateTime, Duration, TimeZone, Utc};
use mentions_rs_store::{MentionRecord, MentionStore, MentionValue, SqlitePool, TimeInterval};

/// Fixed instant on the test day, `hour` hours after midnight UTC.
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
        .single()
        .expect("valid fixture date")
        + Duration::hours(i64::from(hour))
}

/// Window covering the whole test day.
pub fn day_window() -> TimeInterval {
    TimeInterval::new(at(0), at(24)).expect("fixture window")
}

/// Fresh in-memory store for `V`.
pub fn memory_store<V: MentionValue>() -> MentionStore<V> {
    MentionStore::new(SqlitePool::open_in_memory().expect("in-memory pool"))
}

/// Fluent builder for mention fixtures.
#[derive(Clone)]
pub struct RecordBuilder<V> {
    record: MentionRecord<V>,
}

impl<V> RecordBuilder<V> {
    pub fn new(value: impl Into<V>) -> Self {
        Self {
            record: MentionRecord::new(value.into(), "", "", at(1)),
        }
    }

    pub fn user(mut self, username: &str) -> Self {
        self.record.username = username.to_string();
        self
    }

    pub fn room(mut self, room_name: &str) -> Self {
        self.record.room_name = room_name.to_string();
        self
    }

    pub fn hour(mut self, hour: u32) -> Self {
        self.record.mention_time = at(hour);
        self
    }

    pub fn occurrences(mut self, occurrences: u64) -> Self {
        self.record.occurrences = occurrences;
        self
    }

    pub fn bot(mut self) -> Self {
        self.record.is_bot = true;
        self
    }

    pub fn build(self) -> MentionRecord<V> {
        self.record
    }
}
