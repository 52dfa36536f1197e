//! Spectral reordering of labeled similarity matrices.
//!
//! The reordering sorts rows and columns by the Fiedler vector of the
//! combinatorial Laplacian `L = D - A`, so tightly connected labels end up
//! adjacent and clusters show as dense blocks along the diagonal.

use crate::eigen::{EigenSolver, NalgebraEigenSolver};
use crate::error::SimilarityError;
use crate::matrix::LabeledMatrix;
use log::{debug, info};
use mentions_rs_config::SimilarityConfig;
use nalgebra::{DMatrix, DVector};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Components smaller than this are treated as zero when fixing the sign.
const SIGN_TOLERANCE: f64 = 1e-12;
/// Relative tolerance for the symmetry check.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Reorders square matrices by their Laplacian's Fiedler vector.
#[derive(Clone)]
pub struct SpectralPartitioner {
    solver: Arc<dyn EigenSolver>,
    max_dimension: usize,
}

impl fmt::Debug for SpectralPartitioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralPartitioner")
            .field("max_dimension", &self.max_dimension)
            .finish_non_exhaustive()
    }
}

impl SpectralPartitioner {
    /// Partitioner backed by nalgebra, bounded by `config.max_dimension`.
    pub fn from_config(config: &SimilarityConfig) -> Self {
        Self::with_solver(
            Arc::new(NalgebraEigenSolver::from_config(config)),
            config.max_dimension,
        )
    }

    /// Use a custom eigen-solver; matrices above `max_dimension` are rejected.
    pub fn with_solver(solver: Arc<dyn EigenSolver>, max_dimension: usize) -> Self {
        Self {
            solver,
            max_dimension,
        }
    }

    /// Largest dimension accepted before any matrix work starts.
    pub fn max_dimension(&self) -> usize {
        self.max_dimension
    }

    /// Fail with `MatrixTooLarge` when `dimension` exceeds the bound.
    pub fn check_dimension(&self, dimension: usize) -> Result<(), SimilarityError> {
        if dimension > self.max_dimension {
            return Err(SimilarityError::MatrixTooLarge {
                dimension,
                limit: self.max_dimension,
            });
        }
        Ok(())
    }

    /// Permute `matrix` so structurally similar labels become neighbours.
    ///
    /// An empty input returns the empty matrix and a 1x1 input is returned
    /// unchanged; neither reaches the eigen-solver.
    pub fn reorder_by_similarity<L>(
        &self,
        matrix: &LabeledMatrix<L>,
    ) -> Result<LabeledMatrix<L>, SimilarityError>
    where
        L: Clone + Ord,
    {
        if matrix.is_empty() {
            return Ok(LabeledMatrix::empty());
        }
        if matrix.dimension() == 1 {
            return Ok(matrix.clone());
        }
        let permutation = self.fiedler_permutation(matrix)?;
        let reordered = permute_matrix(matrix.matrix(), &permutation)?;
        let labels = permute_labels(matrix.labels(), &permutation)?;
        info!(
            "reordered similarity matrix (dimension={})",
            matrix.dimension()
        );
        LabeledMatrix::new(reordered, labels)
    }

    /// Indices ordered by ascending Fiedler component, ties by ascending label.
    pub fn fiedler_permutation<L>(
        &self,
        matrix: &LabeledMatrix<L>,
    ) -> Result<Vec<usize>, SimilarityError>
    where
        L: Ord,
    {
        let dimension = matrix.dimension();
        self.check_dimension(dimension)?;
        if dimension < 2 {
            return Ok((0..dimension).collect());
        }
        validate_adjacency(matrix.matrix())?;

        let decomposition = self.solver.symmetric_eigen(laplacian(matrix.matrix()))?;
        let mut fiedler = decomposition.eigenvector(1).ok_or_else(|| {
            SimilarityError::InvalidArgument(format!(
                "eigen-solver returned {} eigenvectors for dimension {dimension}",
                decomposition.eigenvectors.ncols()
            ))
        })?;
        if fiedler.len() != dimension {
            return Err(SimilarityError::InvalidArgument(format!(
                "eigenvector length {} does not match dimension {dimension}",
                fiedler.len()
            )));
        }
        normalize_sign(&mut fiedler);
        debug!(
            "fiedler vector computed (dimension={dimension}, algebraic_connectivity={})",
            decomposition.eigenvalues[1]
        );

        let labels = matrix.labels();
        let mut permutation: Vec<usize> = (0..dimension).collect();
        permutation.sort_by(|&a, &b| match fiedler[a].total_cmp(&fiedler[b]) {
            Ordering::Equal => labels[a].cmp(&labels[b]),
            other => other,
        });
        Ok(permutation)
    }
}

/// Combinatorial Laplacian `D - A` where `D` holds the row sums.
pub fn laplacian(adjacency: &DMatrix<f64>) -> DMatrix<f64> {
    let degrees: DVector<f64> = adjacency.column_sum();
    DMatrix::from_diagonal(&degrees) - adjacency
}

/// Apply a permutation to rows and columns: `R[i][j] = A[p[i]][p[j]]`.
pub fn permute_matrix(
    matrix: &DMatrix<f64>,
    permutation: &[usize],
) -> Result<DMatrix<f64>, SimilarityError> {
    if !matrix.is_square() {
        return Err(SimilarityError::InvalidArgument(format!(
            "matrix must be square, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    validate_permutation(permutation, matrix.nrows())?;
    let n = matrix.nrows();
    Ok(DMatrix::from_fn(n, n, |row, col| {
        matrix[(permutation[row], permutation[col])]
    }))
}

/// Apply a permutation to a label list: `out[i] = labels[p[i]]`.
pub fn permute_labels<L: Clone>(
    labels: &[L],
    permutation: &[usize],
) -> Result<Vec<L>, SimilarityError> {
    validate_permutation(permutation, labels.len())?;
    Ok(permutation
        .iter()
        .map(|&index| labels[index].clone())
        .collect())
}

fn validate_permutation(permutation: &[usize], len: usize) -> Result<(), SimilarityError> {
    if permutation.len() != len {
        return Err(SimilarityError::InvalidArgument(format!(
            "permutation length {} does not match length {len}",
            permutation.len()
        )));
    }
    let mut seen = vec![false; len];
    for &index in permutation {
        let Some(slot) = seen.get_mut(index) else {
            return Err(SimilarityError::InvalidArgument(format!(
                "permutation index {index} out of range for length {len}"
            )));
        };
        if *slot {
            return Err(SimilarityError::InvalidArgument(format!(
                "permutation repeats index {index}"
            )));
        }
        *slot = true;
    }
    Ok(())
}

fn validate_adjacency(matrix: &DMatrix<f64>) -> Result<(), SimilarityError> {
    if matrix.iter().any(|entry| !entry.is_finite()) {
        return Err(SimilarityError::InvalidArgument(
            "matrix contains non-finite entries".to_string(),
        ));
    }
    let scale = matrix.amax().max(1.0);
    let n = matrix.nrows();
    for row in 0..n {
        for col in (row + 1)..n {
            if (matrix[(row, col)] - matrix[(col, row)]).abs() > SYMMETRY_TOLERANCE * scale {
                return Err(SimilarityError::InvalidArgument(format!(
                    "matrix is not symmetric at ({row}, {col})"
                )));
            }
        }
    }
    Ok(())
}

/// Eigenvectors are only defined up to sign; pin the first non-zero
/// component to be negative so the ordering is deterministic.
fn normalize_sign(vector: &mut DVector<f64>) {
    let first = vector.iter().copied().find(|value| value.abs() > SIGN_TOLERANCE);
    if first.is_some_and(|value| value > 0.0) {
        vector.neg_mut();
    }
}
