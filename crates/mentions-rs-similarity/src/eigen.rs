//! Dense symmetric eigen-decomposition.

use crate::error::SimilarityError;
use log::debug;
use mentions_rs_config::SimilarityConfig;
use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Eigenvalues in ascending order with their eigenvectors stored as columns.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition {
    pub eigenvalues: DVector<f64>,
    pub eigenvectors: DMatrix<f64>,
}

impl EigenDecomposition {
    /// Eigenvector paired with the `index`-th smallest eigenvalue.
    pub fn eigenvector(&self, index: usize) -> Option<DVector<f64>> {
        if index >= self.eigenvectors.ncols() {
            return None;
        }
        Some(self.eigenvectors.column(index).into_owned())
    }
}

/// Linear-algebra capability used by the spectral partitioner.
pub trait EigenSolver: Send + Sync {
    /// Decompose a symmetric matrix, returning eigenvalues sorted ascending.
    fn symmetric_eigen(&self, matrix: DMatrix<f64>) -> Result<EigenDecomposition, SimilarityError>;
}

/// [`EigenSolver`] backed by nalgebra's symmetric QR algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NalgebraEigenSolver {
    epsilon: f64,
    max_iterations: usize,
}

impl NalgebraEigenSolver {
    /// `max_iterations == 0` lets the algorithm run until convergence.
    pub fn new(epsilon: f64, max_iterations: usize) -> Self {
        Self {
            epsilon,
            max_iterations,
        }
    }

    /// Solver using the tolerance and iteration cap from `config`.
    pub fn from_config(config: &SimilarityConfig) -> Self {
        Self::new(config.eigen_epsilon, config.max_iterations)
    }
}

impl Default for NalgebraEigenSolver {
    fn default() -> Self {
        Self::from_config(&SimilarityConfig::default())
    }
}

impl EigenSolver for NalgebraEigenSolver {
    fn symmetric_eigen(&self, matrix: DMatrix<f64>) -> Result<EigenDecomposition, SimilarityError> {
        let dimension = matrix.nrows();
        let eigen = SymmetricEigen::try_new(matrix, self.epsilon, self.max_iterations)
            .ok_or(SimilarityError::EigenNotConverged { dimension })?;

        let mut order: Vec<usize> = (0..dimension).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

        let eigenvalues = DVector::from_iterator(
            dimension,
            order.iter().map(|&index| eigen.eigenvalues[index]),
        );
        let columns: Vec<DVector<f64>> = order
            .iter()
            .map(|&index| eigen.eigenvectors.column(index).into_owned())
            .collect();
        let eigenvectors = if columns.is_empty() {
            DMatrix::zeros(0, 0)
        } else {
            DMatrix::from_columns(&columns)
        };
        debug!("symmetric eigen-decomposition finished (dimension={dimension})");
        Ok(EigenDecomposition {
            eigenvalues,
            eigenvectors,
        })
    }
}
