//! Co-occurrence matrices, spectral reordering, and activity ratios.

pub mod builder;
pub mod eigen;
pub mod error;
pub mod matrix;
pub mod partition;
pub mod ratio;
pub mod service;

/// Co-occurrence matrix construction.
pub use builder::{build_co_occurrence_matrix, build_incidence_matrix};
/// Symmetric eigen-decomposition seam.
pub use eigen::{EigenDecomposition, EigenSolver, NalgebraEigenSolver};
/// Similarity error type.
pub use error::SimilarityError;
/// Labeled matrices.
pub use matrix::{IncidenceMatrix, LabeledMatrix, MatrixView};
/// Spectral reordering and permutation primitives.
pub use partition::{SpectralPartitioner, laplacian, permute_labels, permute_matrix};
/// Activity ratios.
pub use ratio::{ColumnRatio, RatioCalculator};
/// Room/user similarity queries.
pub use service::SimilarityService;
