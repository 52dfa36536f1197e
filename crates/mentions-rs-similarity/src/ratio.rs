//! Activity ratios per room or user.

use crate::error::SimilarityError;
use log::debug;
use mentions_rs_store::{
    ColumnCount, MentionColumn, MentionQuery, MentionStore, MentionValue, MessageVolumeSource,
    TimeInterval,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A room or user name with its share of activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRatio {
    pub label: String,
    pub ratio: f64,
}

/// Computes ToTV and ToMV rankings over one value category.
///
/// ToTV divides each group's occurrences by all mention occurrences in the
/// window; ToMV divides them by total chat volume from a
/// [`MessageVolumeSource`].
pub struct RatioCalculator<V> {
    store: MentionStore<V>,
    volume: Arc<dyn MessageVolumeSource>,
}

impl<V> Clone for RatioCalculator<V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            volume: Arc::clone(&self.volume),
        }
    }
}

impl<V: MentionValue> fmt::Debug for RatioCalculator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RatioCalculator")
            .field("category", &V::CATEGORY)
            .finish_non_exhaustive()
    }
}

impl<V: MentionValue> RatioCalculator<V> {
    /// Calculator over `store`, dividing by message counts from `volume`.
    pub fn new(store: MentionStore<V>, volume: Arc<dyn MessageVolumeSource>) -> Self {
        Self { store, volume }
    }

    /// Top `result_size` groups by share of all mention activity in the window.
    pub fn get_active_columns_by_totv(
        &self,
        column: MentionColumn,
        interval: &TimeInterval,
        result_size: usize,
        include_bots: bool,
    ) -> Result<Vec<ColumnRatio>, SimilarityError> {
        let totals = self.column_totals(column, interval, include_bots)?;
        let grand_total: u64 = totals.iter().map(|entry| entry.occurrences).sum();
        debug!(
            "computing totv (category={}, column={column}, groups={}, total={grand_total})",
            V::CATEGORY,
            totals.len()
        );
        Ok(rank(totals, grand_total, result_size))
    }

    /// Top `result_size` groups by share of total message volume in the window.
    ///
    /// A window with no messages yields an empty ranking.
    pub fn get_active_columns_by_tomv(
        &self,
        column: MentionColumn,
        interval: &TimeInterval,
        result_size: usize,
        include_bots: bool,
    ) -> Result<Vec<ColumnRatio>, SimilarityError> {
        let message_volume = self
            .volume
            .total_message_volume(interval, &[], &[], include_bots)?;
        if message_volume == 0 {
            debug!(
                "no message volume in window (category={}, column={column})",
                V::CATEGORY
            );
            return Ok(Vec::new());
        }
        let totals = self.column_totals(column, interval, include_bots)?;
        debug!(
            "computing tomv (category={}, column={column}, groups={}, volume={message_volume})",
            V::CATEGORY,
            totals.len()
        );
        Ok(rank(totals, message_volume, result_size))
    }

    fn column_totals(
        &self,
        column: MentionColumn,
        interval: &TimeInterval,
        include_bots: bool,
    ) -> Result<Vec<ColumnCount>, SimilarityError> {
        let query = MentionQuery::new()
            .within(*interval)
            .include_bots(include_bots);
        Ok(self.store.get_column_totals(column, &query)?)
    }
}

/// Divide by `denominator` and keep the first `result_size` entries.
///
/// `totals` is already ordered by descending sum then ascending label, and a
/// shared positive denominator preserves that order.
fn rank(totals: Vec<ColumnCount>, denominator: u64, result_size: usize) -> Vec<ColumnRatio> {
    if denominator == 0 {
        return Vec::new();
    }
    totals
        .into_iter()
        .take(result_size)
        .map(|entry| ColumnRatio {
            ratio: entry.occurrences as f64 / denominator as f64,
            label: entry.label,
        })
        .collect()
}
