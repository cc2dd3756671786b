//! Trainable readout over reservoir features.
//!
//! [`RidgeClassifier`] is a one-vs-rest linear classifier fitted in closed
//! form.  For feature matrix X (n × d, optionally standardised) and one-hot
//! targets Y (n × c), both centred:
//!
//!   W = (XᵀX + λI)⁻¹ XᵀY        b = ȳ − W·x̄
//!
//! The d × d system is symmetric positive definite for λ > 0 and is solved
//! by Cholesky factorisation.  Prediction is the argmax of `xW + b`; ties go
//! to the smallest class label.

use std::collections::BTreeSet;

use faer::linalg::solvers::Solve;
use faer::{Mat, Side};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{NotFittedError, QrcResult, ReadoutError, ShapeError};

/// Floor applied to per-feature standard deviations.
const MIN_SCALE: f64 = 1e-10;

/// A classifier consuming fixed-length feature vectors.
pub trait Readout: Send + Sync {
    /// Get the name of this readout.
    fn name(&self) -> &str;

    /// Train on `(n, d)` features and `n` labels, replacing any previous fit.
    fn fit(&mut self, features: ArrayView2<'_, f64>, labels: &[usize]) -> QrcResult<()>;

    /// True once `fit` has succeeded.
    fn is_fitted(&self) -> bool;

    /// Predict the label of one feature vector.
    fn predict(&self, features: ArrayView1<'_, f64>) -> QrcResult<usize>;

    /// Predict every row.
    fn predict_batch(&self, features: ArrayView2<'_, f64>) -> QrcResult<Vec<usize>> {
        features.rows().into_iter().map(|row| self.predict(row)).collect()
    }

    /// Fraction of rows whose prediction equals the label.
    fn score(&self, features: ArrayView2<'_, f64>, labels: &[usize]) -> QrcResult<f64> {
        if features.nrows() != labels.len() {
            return Err(ShapeError::LabelCount {
                samples: features.nrows(),
                labels: labels.len(),
            }
            .into());
        }
        if labels.is_empty() {
            return Err(ShapeError::Empty.into());
        }
        let predictions = self.predict_batch(features)?;
        let correct = predictions
            .iter()
            .zip(labels)
            .filter(|(p, l)| p == l)
            .count();
        Ok(correct as f64 / labels.len() as f64)
    }
}

/// Ridge classifier hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeParams {
    /// L2 penalty λ.
    pub ridge_lambda: f64,
    /// Scale features to unit variance before fitting.
    pub standardize: bool,
}

impl Default for RidgeParams {
    fn default() -> Self {
        Self {
            ridge_lambda: 1e-3,
            standardize: true,
        }
    }
}

impl RidgeParams {
    /// Check λ is usable.
    pub fn validate(&self) -> Result<(), ReadoutError> {
        if !(self.ridge_lambda.is_finite() && self.ridge_lambda >= 0.0) {
            return Err(ReadoutError::InvalidRegularization(self.ridge_lambda));
        }
        Ok(())
    }
}

/// Fitted parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RidgeModel {
    classes: Vec<usize>,
    mean: Array1<f64>,
    scale: Array1<f64>,
    /// d × c
    weights: Array2<f64>,
    bias: Array1<f64>,
    /// Accuracy on the training set, recorded by `fit`.
    #[serde(default)]
    training_accuracy: f64,
}

/// One-vs-rest ridge-regression classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RidgeClassifier {
    params: RidgeParams,
    model: Option<RidgeModel>,
}

impl RidgeClassifier {
    /// Unfitted classifier.
    pub fn new(params: RidgeParams) -> Self {
        Self {
            params,
            model: None,
        }
    }

    /// Hyper-parameters.
    pub fn params(&self) -> &RidgeParams {
        &self.params
    }

    /// Sorted class labels seen during `fit`.
    pub fn classes(&self) -> Option<&[usize]> {
        self.model.as_ref().map(|m| m.classes.as_slice())
    }

    /// Feature length the classifier was fitted on.
    pub fn feature_len(&self) -> Option<usize> {
        self.model.as_ref().map(|m| m.mean.len())
    }

    /// Accuracy on the training set, if fitted.
    pub fn training_accuracy(&self) -> Option<f64> {
        self.model.as_ref().map(|m| m.training_accuracy)
    }

    /// Check that the fitted parameters agree with each other.
    ///
    /// An unfitted classifier is consistent.
    pub fn validate(&self) -> Result<(), ReadoutError> {
        self.params.validate()?;
        let Some(model) = &self.model else {
            return Ok(());
        };
        let inconsistent = |what: String| Err(ReadoutError::Inconsistent(what));

        let (d, c) = model.weights.dim();
        if model.classes.len() < 2 || model.classes.len() != c {
            return inconsistent(format!(
                "{} classes for a weight matrix with {c} columns",
                model.classes.len()
            ));
        }
        if model.classes.windows(2).any(|w| w[0] >= w[1]) {
            return inconsistent("class labels are not strictly increasing".into());
        }
        if model.bias.len() != c {
            return inconsistent(format!(
                "bias has length {} but there are {c} classes",
                model.bias.len()
            ));
        }
        if model.mean.len() != d || model.scale.len() != d {
            return inconsistent(format!(
                "mean/scale have lengths {}/{} but weights have {d} rows",
                model.mean.len(),
                model.scale.len()
            ));
        }
        if model.scale.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return inconsistent("feature scale must be positive and finite".into());
        }
        let finite = model
            .mean
            .iter()
            .chain(model.weights.iter())
            .chain(model.bias.iter())
            .all(|v| v.is_finite());
        if !finite {
            return inconsistent("non-finite parameter".into());
        }
        Ok(())
    }

    fn fitted(&self) -> Result<&RidgeModel, NotFittedError> {
        self.model.as_ref().ok_or(NotFittedError)
    }

    /// Per-class scores `xW + b`, in [`classes`](Self::classes) order.
    pub fn decision_function(&self, features: ArrayView1<'_, f64>) -> QrcResult<Array1<f64>> {
        let model = self.fitted()?;
        if features.len() != model.mean.len() {
            return Err(ShapeError::FeatureLength {
                expected: model.mean.len(),
                actual: features.len(),
            }
            .into());
        }
        let z = (&features - &model.mean) / &model.scale;
        Ok(z.dot(&model.weights) + &model.bias)
    }
}

impl Readout for RidgeClassifier {
    fn name(&self) -> &str {
        "ridge"
    }

    fn fit(&mut self, features: ArrayView2<'_, f64>, labels: &[usize]) -> QrcResult<()> {
        self.params.validate()?;
        let (n, d) = features.dim();
        if n == 0 {
            return Err(ReadoutError::EmptyTrainingSet.into());
        }
        if labels.len() != n {
            return Err(ShapeError::LabelCount {
                samples: n,
                labels: labels.len(),
            }
            .into());
        }
        if let Some(((row, column), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ReadoutError::NonFinite { row, column }.into());
        }

        let classes: Vec<usize> = labels
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if classes.len() < 2 {
            return Err(ReadoutError::SingleClass(classes[0]).into());
        }
        let c = classes.len();

        // Column statistics.
        let mean = features.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d));
        let scale = if self.params.standardize {
            features
                .std_axis(Axis(0), 0.0)
                .mapv(|s| s.max(MIN_SCALE))
        } else {
            Array1::ones(d)
        };
        let z = (&features - &mean) / &scale;

        // One-hot targets, centred.
        let mut y = Array2::<f64>::zeros((n, c));
        for (i, label) in labels.iter().enumerate() {
            if let Ok(k) = classes.binary_search(label) {
                y[[i, k]] = 1.0;
            }
        }
        let y_mean = y.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(c));
        let y_centred = &y - &y_mean;

        let mut xtx = z.t().dot(&z);
        for i in 0..d {
            xtx[[i, i]] += self.params.ridge_lambda;
        }
        let xty = z.t().dot(&y_centred);
        let weights = cholesky_solve(&xtx, &xty)?;

        // z is centred, so the intercept is the target mean.
        let bias = y_mean;

        let model = RidgeModel {
            classes,
            mean,
            scale,
            weights,
            bias,
            training_accuracy: 0.0,
        };
        self.model = Some(model);

        let accuracy = self.score(features, labels)?;
        if let Some(model) = self.model.as_mut() {
            model.training_accuracy = accuracy;
        }
        info!(
            samples = n,
            features = d,
            classes = c,
            lambda = self.params.ridge_lambda,
            accuracy,
            "ridge readout fitted"
        );
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> QrcResult<usize> {
        let scores = self.decision_function(features)?;
        let model = self.fitted()?;
        let mut best = 0;
        for (k, &s) in scores.iter().enumerate() {
            if s > scores[best] {
                best = k;
            }
        }
        Ok(model.classes[best])
    }
}

/// Solve `A X = B` for symmetric positive-definite `A` by Cholesky.
fn cholesky_solve(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>, ReadoutError> {
    let (d, k) = (a.nrows(), b.ncols());
    let a = Mat::<f64>::from_fn(d, d, |i, j| a[[i, j]]);
    let b = Mat::<f64>::from_fn(d, k, |i, j| b[[i, j]]);
    let llt = a
        .llt(Side::Lower)
        .map_err(|e| ReadoutError::IllConditioned(format!("{e:?}")))?;
    let x = llt.solve(b.as_ref());
    Ok(Array2::from_shape_fn((d, k), |(i, j)| x[(i, j)]))
}
