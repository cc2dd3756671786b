//! Flattening observable traces into feature vectors.
//!
//! Layout is time-major, then site:
//!
//! ```text
//!   trace (T × N)            feature vector (T·N)
//!   t0: [a0 a1 a2 a3]   →    [a0 a1 a2 a3 b0 b1 b2 b3 c0 c1 c2 c3]
//!   t1: [b0 b1 b2 b3]
//!   t2: [c0 c1 c2 c3]
//! ```
//!
//! so feature `t * N + i` is site `i` at recorded step `t`.

use ndarray::{Array1, Array2, ArrayView1};
use qrc_sim::ObservableTrace;
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// Shape-checked flattening for one reservoir configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureAssembler {
    steps: usize,
    n_sites: usize,
}

impl FeatureAssembler {
    /// Assembler for traces of shape `(steps, n_sites)`.
    pub fn new(steps: usize, n_sites: usize) -> Self {
        Self { steps, n_sites }
    }

    /// Declared `(steps, n_sites)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.steps, self.n_sites)
    }

    /// Length of every feature vector, `steps × n_sites`.
    pub fn feature_len(&self) -> usize {
        self.steps * self.n_sites
    }

    /// Flatten `trace`.
    pub fn assemble(&self, trace: &ObservableTrace) -> Result<Array1<f64>, ShapeError> {
        if trace.shape() != self.shape() {
            return Err(ShapeError::TraceShape {
                expected: self.shape(),
                actual: trace.shape(),
            });
        }
        Ok(Array1::from_vec(trace.values().to_vec()))
    }

    /// Reshape a feature vector back to `(steps, n_sites)`.
    pub fn disassemble(&self, features: ArrayView1<'_, f64>) -> Result<Array2<f64>, ShapeError> {
        if features.len() != self.feature_len() {
            return Err(ShapeError::FeatureLength {
                expected: self.feature_len(),
                actual: features.len(),
            });
        }
        Array2::from_shape_vec(self.shape(), features.to_vec()).map_err(|_| {
            ShapeError::FeatureLength {
                expected: self.feature_len(),
                actual: features.len(),
            }
        })
    }
}
