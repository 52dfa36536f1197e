//! Typed mention store over one category of values.

use crate::error::StoreError;
use crate::model::{ColumnCount, MentionColumn, MentionRecord, TimeInterval, ValueCount};
use crate::pool::SqlitePool;
use crate::query::MentionQuery;
use crate::value::MentionValue;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rusqlite::{
    Connection, OptionalExtension, Row, TransactionBehavior, params, params_from_iter,
};
use std::marker::PhantomData;

const RECORD_COLUMNS: &str = "value, username, room_name, mention_time, occurrences, is_bot";

/// Persistence and windowed queries for mentions of type `V`.
///
/// Every instance shares the pool it was built from; stores for different
/// value types over the same pool see disjoint rows.
#[derive(Debug)]
pub struct MentionStore<V> {
    pool: SqlitePool,
    _value: PhantomData<fn() -> V>,
}

impl<V> Clone for MentionStore<V> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _value: PhantomData,
        }
    }
}

impl<V: MentionValue> MentionStore<V> {
    /// Bind a store view for `V` to a shared pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _value: PhantomData,
        }
    }

    /// Category this store reads and writes.
    pub fn category(&self) -> &'static str {
        V::CATEGORY
    }

    /// Insert a record, or add its occurrences to the row with the same key.
    ///
    /// On merge the stored non-key fields (`is_bot`) are kept; only
    /// `occurrences` grows. The upsert is one statement inside one transaction,
    /// so concurrent merges into the same key cannot lose updates. A merge
    /// whose sum would leave the signed 64-bit range is rejected and the
    /// stored row is left unchanged.
    pub fn persist(&self, record: &MentionRecord<V>) -> Result<(), StoreError> {
        if record.occurrences == 0 {
            return Err(StoreError::InvalidArgument(
                "occurrences must be at least 1".to_string(),
            ));
        }
        let occurrences = to_sql_count(record.occurrences)?;
        let value = record.value.as_stored();
        let result = self.pool.get().and_then(|mut conn| {
            upsert_mention(&mut conn, V::CATEGORY, &value, record, occurrences)
        });
        if let Err(err) = &result {
            warn!(
                "failed to persist mention (category={}, value={}): {err}",
                V::CATEGORY,
                value
            );
        }
        result?;
        debug!(
            "persisted mention (category={}, room={}, user={}, occurrences={})",
            V::CATEGORY,
            record.room_name,
            record.username,
            record.occurrences
        );
        Ok(())
    }

    /// Exact lookup by identity key; only the key fields of `template` are used.
    pub fn get_value(
        &self,
        template: &MentionRecord<V>,
    ) -> Result<Option<MentionRecord<V>>, StoreError> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM mentions
                     WHERE category = ?1 AND value = ?2 AND username = ?3
                       AND room_name = ?4 AND mention_time = ?5"
                ),
                params![
                    V::CATEGORY,
                    template.value.as_stored(),
                    template.username,
                    template.room_name,
                    template.mention_time.timestamp_millis(),
                ],
                RawRecord::from_row,
            )
            .optional()?;
        row.map(RawRecord::decode::<V>).transpose()
    }

    /// Every record of `value` in the window, optionally limited to rooms/users.
    pub fn get_all_mentions_for_value(
        &self,
        value: &V,
        interval: &TimeInterval,
        room_names: &[String],
        user_names: &[String],
    ) -> Result<Vec<MentionRecord<V>>, StoreError> {
        let query = MentionQuery::new()
            .for_value(value)
            .within(*interval)
            .rooms(room_names.iter().cloned())
            .users(user_names.iter().cloned());
        self.get_mentions(&query)
    }

    /// Every record in the window, optionally limited to rooms/users.
    pub fn get_all_mentions(
        &self,
        interval: &TimeInterval,
        room_names: &[String],
        user_names: &[String],
    ) -> Result<Vec<MentionRecord<V>>, StoreError> {
        let query = MentionQuery::new()
            .within(*interval)
            .rooms(room_names.iter().cloned())
            .users(user_names.iter().cloned());
        self.get_mentions(&query)
    }

    /// Summed occurrences of `value` in the window; 0 when nothing matches.
    pub fn get_total_mentions_for_type(
        &self,
        value: &V,
        interval: &TimeInterval,
        room_names: &[String],
        user_names: &[String],
        include_bots: bool,
    ) -> Result<u64, StoreError> {
        let query = MentionQuery::new()
            .for_value(value)
            .within(*interval)
            .rooms(room_names.iter().cloned())
            .users(user_names.iter().cloned())
            .include_bots(include_bots);
        self.total_occurrences(&query)
    }

    /// Summed occurrences of all values in the window; 0 when nothing matches.
    pub fn get_total_mentions_of_type(
        &self,
        interval: &TimeInterval,
        room_names: &[String],
        user_names: &[String],
        include_bots: bool,
    ) -> Result<u64, StoreError> {
        let query = MentionQuery::new()
            .within(*interval)
            .rooms(room_names.iter().cloned())
            .users(user_names.iter().cloned())
            .include_bots(include_bots);
        self.total_occurrences(&query)
    }

    /// The `result_size` values with the highest summed occurrences.
    ///
    /// Results are ordered by descending sum; equal sums are ordered by the
    /// ascending stored value.
    pub fn get_top_values_of_type(
        &self,
        interval: &TimeInterval,
        room_names: &[String],
        user_names: &[String],
        result_size: usize,
        include_bots: bool,
    ) -> Result<Vec<ValueCount<V>>, StoreError> {
        let query = MentionQuery::new()
            .within(*interval)
            .rooms(room_names.iter().cloned())
            .users(user_names.iter().cloned())
            .include_bots(include_bots);
        let totals = self.grouped_totals("value", &query, Some(result_size))?;
        totals
            .into_iter()
            .map(|(raw, occurrences)| {
                Ok(ValueCount {
                    value: V::from_stored(&raw)?,
                    occurrences,
                })
            })
            .collect()
    }

    /// Records matching `query`, ordered by mention time then insertion order.
    pub fn get_mentions(&self, query: &MentionQuery) -> Result<Vec<MentionRecord<V>>, StoreError> {
        let predicate = query.to_sql(V::CATEGORY);
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM mentions WHERE {} ORDER BY mention_time, id",
            predicate.clause()
        );
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(predicate.params.iter()), RawRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);
        debug!(
            "loaded mentions (category={}, rows={})",
            V::CATEGORY,
            rows.len()
        );
        rows.into_iter().map(RawRecord::decode::<V>).collect()
    }

    /// Summed occurrences of records matching `query`.
    pub fn total_occurrences(&self, query: &MentionQuery) -> Result<u64, StoreError> {
        let predicate = query.to_sql(V::CATEGORY);
        let sql = format!(
            "SELECT COALESCE(SUM(occurrences), 0) FROM mentions WHERE {}",
            predicate.clause()
        );
        let conn = self.pool.get()?;
        let total: i64 =
            conn.query_row(&sql, params_from_iter(predicate.params.iter()), |row| {
                row.get(0)
            })?;
        from_sql_count(total)
    }

    /// Occurrence sums grouped by room or user name.
    ///
    /// Ordered by descending sum, then ascending label. Empty names form their
    /// own group.
    pub fn get_column_totals(
        &self,
        column: MentionColumn,
        query: &MentionQuery,
    ) -> Result<Vec<ColumnCount>, StoreError> {
        let totals = self.grouped_totals(column.sql_column(), query, None)?;
        Ok(totals
            .into_iter()
            .map(|(label, occurrences)| ColumnCount { label, occurrences })
            .collect())
    }

    /// Number of stored rows in this category.
    pub fn count_records(&self) -> Result<u64, StoreError> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM mentions WHERE category = ?1",
            params![V::CATEGORY],
            |row| row.get(0),
        )?;
        from_sql_count(count)
    }

    fn grouped_totals(
        &self,
        group_column: &'static str,
        query: &MentionQuery,
        limit: Option<usize>,
    ) -> Result<Vec<(String, u64)>, StoreError> {
        let mut predicate = query.to_sql(V::CATEGORY);
        let mut sql = format!(
            "SELECT {group_column}, SUM(occurrences) AS total FROM mentions
             WHERE {}
             GROUP BY {group_column}
             ORDER BY total DESC, {group_column} ASC",
            predicate.clause()
        );
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            predicate
                .params
                .push(rusqlite::types::Value::Integer(
                    i64::try_from(limit).unwrap_or(i64::MAX),
                ));
        }
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(predicate.params.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "grouped mention totals (category={}, column={group_column}, groups={})",
            V::CATEGORY,
            rows.len()
        );
        rows.into_iter()
            .map(|(label, total)| Ok((label, from_sql_count(total)?)))
            .collect()
    }
}

fn upsert_mention<V>(
    conn: &mut Connection,
    category: &str,
    value: &str,
    record: &MentionRecord<V>,
    occurrences: i64,
) -> Result<(), StoreError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let changed = tx.execute(
        "INSERT INTO mentions
             (category, value, username, room_name, mention_time, occurrences, is_bot)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (category, value, username, room_name, mention_time)
         DO UPDATE SET occurrences = occurrences + excluded.occurrences
         WHERE occurrences <= ?8 - excluded.occurrences",
        params![
            category,
            value,
            record.username,
            record.room_name,
            record.mention_time.timestamp_millis(),
            occurrences,
            record.is_bot,
            i64::MAX,
        ],
    )?;
    // The conflict guard skipped the update: the merged sum would overflow.
    if changed == 0 {
        return Err(StoreError::InvalidArgument(
            "merged occurrences exceed the storable range".to_string(),
        ));
    }
    tx.commit()?;
    Ok(())
}

/// Row as read from SQLite, before the value is decoded.
struct RawRecord {
    value: String,
    username: String,
    room_name: String,
    mention_time: i64,
    occurrences: i64,
    is_bot: bool,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            value: row.get(0)?,
            username: row.get(1)?,
            room_name: row.get(2)?,
            mention_time: row.get(3)?,
            occurrences: row.get(4)?,
            is_bot: row.get(5)?,
        })
    }

    fn decode<V: MentionValue>(self) -> Result<MentionRecord<V>, StoreError> {
        let mention_time = DateTime::<Utc>::from_timestamp_millis(self.mention_time).ok_or(
            StoreError::Decode {
                category: V::CATEGORY,
                value: format!("mention_time={}", self.mention_time),
            },
        )?;
        Ok(MentionRecord {
            value: V::from_stored(&self.value)?,
            username: self.username,
            room_name: self.room_name,
            mention_time,
            occurrences: from_sql_count(self.occurrences)?,
            is_bot: self.is_bot,
        })
    }
}

fn to_sql_count(count: u64) -> Result<i64, StoreError> {
    i64::try_from(count)
        .map_err(|_| StoreError::InvalidArgument(format!("count {count} exceeds storage range")))
}

fn from_sql_count(count: i64) -> Result<u64, StoreError> {
    u64::try_from(count)
        .map_err(|_| StoreError::InvalidArgument(format!("stored count {count} is negative")))
}
