//! Co-occurrence matrix construction from mention records.

use crate::matrix::{IncidenceMatrix, LabeledMatrix};
use log::debug;
use mentions_rs_store::MentionRecord;
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::hash::Hash;

/// Count occurrences per `(row, column)` category pair.
///
/// Both axes are labelled in order of first appearance in `records`.
pub fn build_incidence_matrix<V, R, C>(
    records: &[MentionRecord<V>],
    extract_row: impl Fn(&MentionRecord<V>) -> R,
    extract_col: impl Fn(&MentionRecord<V>) -> C,
) -> IncidenceMatrix<R, C>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
{
    let mut rows = FirstSeen::default();
    let mut cols = FirstSeen::default();
    let cells: Vec<(usize, usize, f64)> = records
        .iter()
        .map(|record| {
            let row = rows.index_of(extract_row(record));
            let col = cols.index_of(extract_col(record));
            (row, col, record.occurrences as f64)
        })
        .collect();

    let mut matrix = DMatrix::zeros(rows.labels.len(), cols.labels.len());
    for (row, col, weight) in cells {
        matrix[(row, col)] += weight;
    }
    debug!(
        "built incidence matrix (records={}, rows={}, cols={})",
        records.len(),
        rows.labels.len(),
        cols.labels.len()
    );
    IncidenceMatrix {
        matrix,
        row_labels: rows.labels,
        col_labels: cols.labels,
    }
}

/// Square column-by-column co-occurrence matrix `Mᵗ·M`.
///
/// Entry `[i][j]` weighs how often column categories `i` and `j` share the
/// same row category; labels are the column categories in first-appearance
/// order.
pub fn build_co_occurrence_matrix<V, R, C>(
    records: &[MentionRecord<V>],
    extract_row: impl Fn(&MentionRecord<V>) -> R,
    extract_col: impl Fn(&MentionRecord<V>) -> C,
) -> LabeledMatrix<C>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
{
    if records.is_empty() {
        return LabeledMatrix::empty();
    }
    build_incidence_matrix(records, extract_row, extract_col).co_occurrence()
}

/// Distinct labels in first-appearance order with O(1) index lookup.
struct FirstSeen<T> {
    labels: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T> Default for FirstSeen<T> {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> FirstSeen<T> {
    fn index_of(&mut self, label: T) -> usize {
        if let Some(index) = self.index.get(&label) {
            return *index;
        }
        let index = self.labels.len();
        self.labels.push(label.clone());
        self.index.insert(label, index);
        index
    }
}
