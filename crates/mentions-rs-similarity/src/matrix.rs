//! Dense matrices paired with axis labels.

use crate::error::SimilarityError;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Square matrix whose rows and columns share one ordered label list.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix<L> {
    matrix: DMatrix<f64>,
    labels: Vec<L>,
}

impl<L> LabeledMatrix<L> {
    /// Pair a square matrix with one label per row/column.
    pub fn new(matrix: DMatrix<f64>, labels: Vec<L>) -> Result<Self, SimilarityError> {
        if !matrix.is_square() {
            return Err(SimilarityError::InvalidArgument(format!(
                "matrix must be square, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if matrix.nrows() != labels.len() {
            return Err(SimilarityError::InvalidArgument(format!(
                "matrix dimension {} does not match {} labels",
                matrix.nrows(),
                labels.len()
            )));
        }
        Ok(Self { matrix, labels })
    }

    /// The canonical "no data" matrix: 0x0 with no labels.
    pub fn empty() -> Self {
        Self {
            matrix: DMatrix::zeros(0, 0),
            labels: Vec::new(),
        }
    }

    /// True for the 0x0 matrix.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of rows (equal to columns and labels).
    pub fn dimension(&self) -> usize {
        self.labels.len()
    }

    /// Underlying dense matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Labels in row/column order.
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Entry at `(row, col)`, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.matrix.get((row, col)).copied()
    }

    /// Sum of every entry.
    pub fn total_weight(&self) -> f64 {
        self.matrix.sum()
    }

    /// Split into the raw matrix and its labels.
    pub fn into_parts(self) -> (DMatrix<f64>, Vec<L>) {
        (self.matrix, self.labels)
    }
}

impl<L: Clone> LabeledMatrix<L> {
    /// Row-major, serialisable snapshot for query consumers.
    pub fn to_view(&self) -> MatrixView<L> {
        let rows = self
            .matrix
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        MatrixView {
            labels: self.labels.clone(),
            rows,
        }
    }
}

/// Plain-data form of a [`LabeledMatrix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixView<L> {
    pub labels: Vec<L>,
    pub rows: Vec<Vec<f64>>,
}

/// Rectangular count matrix with separate row and column labels.
///
/// Intermediate form of the co-occurrence computation; its labels cover both
/// axes, so `row_labels.len() + col_labels.len()` equals the label count.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidenceMatrix<R, C> {
    pub(crate) matrix: DMatrix<f64>,
    pub(crate) row_labels: Vec<R>,
    pub(crate) col_labels: Vec<C>,
}

impl<R, C> IncidenceMatrix<R, C> {
    /// Underlying dense matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Value labels, one per row.
    pub fn row_labels(&self) -> &[R] {
        &self.row_labels
    }

    /// Column labels, one per column of the incidence matrix.
    pub fn col_labels(&self) -> &[C] {
        &self.col_labels
    }

    /// Total number of labels across both axes.
    pub fn label_count(&self) -> usize {
        self.row_labels.len() + self.col_labels.len()
    }

    /// Collapse to the square column-by-column matrix `Mᵗ·M`.
    pub fn co_occurrence(self) -> LabeledMatrix<C> {
        if self.col_labels.is_empty() {
            return LabeledMatrix::empty();
        }
        let square = self.matrix.tr_mul(&self.matrix);
        LabeledMatrix {
            matrix: square,
            labels: self.col_labels,
        }
    }
}
