//! Error types for the reservoir pipeline.
//!
//! Every stage has its own error type; [`QrcError`] gathers them and
//! [`QrcError::stage`] names the stage that failed.

use std::fmt;

use qrc_reduce::DimensionError;
use qrc_sim::{DynamicsError, EncodingError, LayoutError, SimError};
use thiserror::Error;

/// Result type for pipeline operations.
pub type QrcResult<T> = Result<T, QrcError>;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Principal-component reduction.
    Reduce,
    /// Site layout generation.
    Layout,
    /// Detuning / Hamiltonian encoding.
    Encode,
    /// Time evolution.
    Dynamics,
    /// Feature assembly.
    Assemble,
    /// Readout training or inference.
    Readout,
    /// Configuration loading or validation.
    Config,
    /// Model persistence.
    Persist,
}

impl Stage {
    /// Lowercase stage name.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Reduce => "reduce",
            Stage::Layout => "layout",
            Stage::Encode => "encode",
            Stage::Dynamics => "dynamics",
            Stage::Assemble => "assemble",
            Stage::Readout => "readout",
            Stage::Config => "config",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A feature vector or trace does not have the geometry the active
/// configuration declares.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShapeError {
    /// Observable trace shape differs from `(T_recorded, N)`.
    #[error("trace has shape {actual:?}, expected {expected:?}")]
    TraceShape {
        /// Declared `(steps, sites)`.
        expected: (usize, usize),
        /// Shape of the offending trace.
        actual: (usize, usize),
    },

    /// Feature vector length differs from the fitted one.
    #[error("feature vector has length {actual}, expected {expected}")]
    FeatureLength {
        /// Declared length.
        expected: usize,
        /// Offending length.
        actual: usize,
    },

    /// Number of labels differs from the number of feature rows.
    #[error("{samples} feature rows but {labels} labels")]
    LabelCount {
        /// Feature rows.
        samples: usize,
        /// Labels.
        labels: usize,
    },

    /// A row of an input matrix has a different width from the first row.
    #[error("row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        /// Row index.
        row: usize,
        /// Width of row 0.
        expected: usize,
        /// Width of this row.
        actual: usize,
    },

    /// An input matrix has no rows.
    #[error("input matrix is empty")]
    Empty,
}

/// The readout was asked to predict before it was fitted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
#[error("readout has not been fitted; call fit before predict")]
pub struct NotFittedError;

/// Readout training failed.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ReadoutError {
    /// No training rows.
    #[error("training set is empty")]
    EmptyTrainingSet,

    /// All labels are the same class.
    #[error("training labels contain a single class ({0}); at least two are required")]
    SingleClass(usize),

    /// A feature is NaN or infinite.
    #[error("feature ({row}, {column}) is not finite")]
    NonFinite {
        /// Row index.
        row: usize,
        /// Column index.
        column: usize,
    },

    /// The regularised normal equations are not positive definite.
    #[error("normal equations are not positive definite ({0}); increase ridge_lambda")]
    IllConditioned(String),

    /// Stored readout parameters disagree with each other.
    #[error("inconsistent readout: {0}")]
    Inconsistent(String),

    /// Ridge penalty must be non-negative and finite.
    #[error("ridge_lambda must be non-negative and finite, got {0}")]
    InvalidRegularization(f64),
}

/// Any pipeline failure, tagged with its stage in the `Display` output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QrcError {
    /// Reduction failed.
    #[error("reduce: {0}")]
    Reduce(#[from] DimensionError),

    /// Layout generation failed.
    #[error("layout: {0}")]
    Layout(#[from] LayoutError),

    /// Encoding failed.
    #[error("encode: {0}")]
    Encoding(#[from] EncodingError),

    /// Evolution failed.
    #[error("dynamics: {0}")]
    Dynamics(#[from] DynamicsError),

    /// Shape mismatch between stages.
    #[error("{}: {}", shape_stage(.0), .0)]
    Shape(#[from] ShapeError),

    /// Readout used before training.
    #[error("readout: {0}")]
    NotFitted(#[from] NotFittedError),

    /// Readout training failed.
    #[error("readout: {0}")]
    Readout(#[from] ReadoutError),

    /// Invalid configuration.
    #[error("config: {0}")]
    Config(String),

    /// File system failure.
    #[error("persist: I/O error: {0}")]
    Io(String),

    /// Artifact (de)serialization failure.
    #[error("persist: {0}")]
    Serialization(String),
}

fn shape_stage(e: &ShapeError) -> Stage {
    match e {
        ShapeError::TraceShape { .. } => Stage::Assemble,
        _ => Stage::Readout,
    }
}

impl QrcError {
    /// Stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            QrcError::Reduce(_) => Stage::Reduce,
            QrcError::Layout(_) => Stage::Layout,
            QrcError::Encoding(_) => Stage::Encode,
            QrcError::Dynamics(_) => Stage::Dynamics,
            QrcError::Shape(e) => shape_stage(e),
            QrcError::NotFitted(_) | QrcError::Readout(_) => Stage::Readout,
            QrcError::Config(_) => Stage::Config,
            QrcError::Io(_) | QrcError::Serialization(_) => Stage::Persist,
        }
    }
}

impl From<SimError> for QrcError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Layout(e) => QrcError::Layout(e),
            SimError::Encoding(e) => QrcError::Encoding(e),
            SimError::Dynamics(e) => QrcError::Dynamics(e),
        }
    }
}

impl From<std::io::Error> for QrcError {
    fn from(e: std::io::Error) -> Self {
        QrcError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for QrcError {
    fn from(e: serde_json::Error) -> Self {
        QrcError::Serialization(e.to_string())
    }
}

impl From<serde_yaml_ng::Error> for QrcError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        QrcError::Config(e.to_string())
    }
}
