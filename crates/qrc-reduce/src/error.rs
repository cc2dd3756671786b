//! Error types for the reduce crate.

use thiserror::Error;

/// Errors produced while fitting or applying a principal-component projection.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DimensionError {
    /// A projection onto zero components carries no information.
    #[error("target dimension must be at least 1, got 0")]
    ZeroTarget,

    /// More components were requested than the input has columns.
    #[error("target dimension {target} exceeds input dimension {input}")]
    TargetExceedsInput {
        /// Requested number of components.
        target: usize,
        /// Width of the input vectors.
        input: usize,
    },

    /// Fitting needs strictly more samples than retained components.
    #[error("fitting {target} components requires more than {target} samples, got {samples}")]
    TooFewSamples {
        /// Number of rows in the fitting matrix.
        samples: usize,
        /// Requested number of components.
        target: usize,
    },

    /// A transformed vector does not have the width the projection was fitted on.
    #[error("input width {actual} does not match fitted width {expected}")]
    InputWidth {
        /// Width seen at fit time.
        expected: usize,
        /// Width of the offending input.
        actual: usize,
    },

    /// `transform` asked for more components than were fitted.
    #[error("target dimension {target} exceeds the {fitted} fitted components")]
    TargetExceedsFitted {
        /// Requested number of components.
        target: usize,
        /// Components stored in the projection.
        fitted: usize,
    },

    /// The rescale bound must be positive and finite.
    #[error("max_scale must be positive and finite, got {0}")]
    InvalidScale(f64),

    /// NaN or infinity in the input data.
    #[error("non-finite value at row {row}, column {column}")]
    NonFinite {
        /// Row index (0 for single vectors).
        row: usize,
        /// Column index.
        column: usize,
    },

    /// Every retained component is constant across the fitting corpus.
    #[error("fitting corpus is constant; principal-component scores have zero range")]
    DegenerateCorpus,

    /// The eigendecomposition did not converge.
    #[error("eigendecomposition failed: {0}")]
    Decomposition(String),

    /// Stored projection parameters disagree with each other.
    #[error("inconsistent projection: {0}")]
    Inconsistent(String),
}

/// Result type for reduction operations.
pub type ReduceResult<T> = Result<T, DimensionError>;
