//! Room and user similarity queries over a mention store.

use crate::builder::build_co_occurrence_matrix;
use crate::error::SimilarityError;
use crate::matrix::LabeledMatrix;
use crate::partition::SpectralPartitioner;
use log::info;
use mentions_rs_store::{
    MentionColumn, MentionQuery, MentionRecord, MentionStore, MentionValue, TimeInterval,
};
use std::collections::HashSet;
use std::fmt;

/// Builds co-occurrence matrices from stored mentions and reorders them.
pub struct SimilarityService<V> {
    store: MentionStore<V>,
    partitioner: SpectralPartitioner,
}

impl<V> Clone for SimilarityService<V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            partitioner: self.partitioner.clone(),
        }
    }
}

impl<V: MentionValue> fmt::Debug for SimilarityService<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimilarityService")
            .field("category", &V::CATEGORY)
            .field("partitioner", &self.partitioner)
            .finish()
    }
}

impl<V: MentionValue> SimilarityService<V> {
    /// Service reading `store` and reordering with `partitioner`.
    pub fn new(store: MentionStore<V>, partitioner: SpectralPartitioner) -> Self {
        Self { store, partitioner }
    }

    /// Room-by-room matrix, reordered so rooms mentioning the same values sit together.
    pub fn get_room_similarities(
        &self,
        interval: &TimeInterval,
        include_bots: bool,
    ) -> Result<LabeledMatrix<String>, SimilarityError> {
        self.get_similarities(MentionColumn::Room, interval, include_bots)
    }

    /// User-by-user matrix, reordered the same way.
    pub fn get_user_similarities(
        &self,
        interval: &TimeInterval,
        include_bots: bool,
    ) -> Result<LabeledMatrix<String>, SimilarityError> {
        self.get_similarities(MentionColumn::User, interval, include_bots)
    }

    /// Similarity matrix over `column`; records with an empty name in that
    /// column are left out.
    ///
    /// The number of distinct names is checked against the partitioner's
    /// bound before the matrix is built.
    pub fn get_similarities(
        &self,
        column: MentionColumn,
        interval: &TimeInterval,
        include_bots: bool,
    ) -> Result<LabeledMatrix<String>, SimilarityError> {
        let query = MentionQuery::new()
            .within(*interval)
            .include_bots(include_bots);
        let records: Vec<MentionRecord<V>> = self
            .store
            .get_mentions(&query)?
            .into_iter()
            .filter(|record| !column.extract(record).is_empty())
            .collect();
        // The matrix is labels x labels; reject before allocating it.
        let labels: HashSet<&str> = records.iter().map(|record| column.extract(record)).collect();
        self.partitioner.check_dimension(labels.len())?;
        let matrix = build_co_occurrence_matrix(
            &records,
            |record| record.value.as_stored(),
            |record| column.extract(record).to_string(),
        );
        info!(
            "computing {column} similarities (category={}, records={}, dimension={})",
            V::CATEGORY,
            records.len(),
            matrix.dimension()
        );
        self.partitioner.reorder_by_similarity(&matrix)
    }
}
