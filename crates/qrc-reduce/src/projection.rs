//! Fitted principal-component projection.
//!
//! A [`Projection`] is fitted once on a training corpus and then applied,
//! unchanged, to every later sample:
//!
//! ```text
//!   fit:        X (n × d) ──► mean μ, components W (k × d), score range [lo_j, hi_j]
//!   transform:  x (d)     ──► s = W·(x − μ) ──► rescale_j(s_j) ∈ [−Δmax, Δmax]
//! ```
//!
//! Rescaling is per coordinate: `s_j` is divided by `max(|lo_j|, |hi_j|)`
//! measured on the fitting corpus and multiplied by `Δmax`.  Held-out samples
//! whose score falls outside the fitted range are clipped to `±Δmax`, and the
//! clip is logged.

use faer::{Mat, Side};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DimensionError, ReduceResult};

/// Threshold below which a dual-form component is treated as degenerate.
const NORM_EPSILON: f64 = 1e-12;

/// A principal-component projection fitted on a reference corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Per-column mean of the fitting corpus.
    mean: Array1<f64>,
    /// Components as rows, ordered by descending explained variance.
    components: Array2<f64>,
    /// Variance of the corpus along each component.
    explained_variance: Array1<f64>,
    /// Total variance of the corpus (trace of the covariance).
    total_variance: f64,
    /// Minimum score per component over the fitting corpus.
    score_min: Array1<f64>,
    /// Maximum score per component over the fitting corpus.
    score_max: Array1<f64>,
    /// Number of samples the projection was fitted on.
    n_samples: usize,
}

impl Projection {
    /// Fit the top `target_dim` principal components of `data`.
    ///
    /// `data` has shape `(n_samples, input_dim)`.  Requires
    /// `1 ≤ target_dim ≤ input_dim` and `n_samples > target_dim`.
    ///
    /// When `input_dim ≤ n_samples` the `d × d` covariance is decomposed;
    /// otherwise the `n × n` Gram matrix is decomposed and the components are
    /// recovered as `Xᵀu / ‖Xᵀu‖`.  Both routes give the same subspace.
    pub fn fit(data: ArrayView2<'_, f64>, target_dim: usize) -> ReduceResult<Self> {
        let (n_samples, input_dim) = data.dim();

        if target_dim == 0 {
            return Err(DimensionError::ZeroTarget);
        }
        if target_dim > input_dim {
            return Err(DimensionError::TargetExceedsInput {
                target: target_dim,
                input: input_dim,
            });
        }
        if n_samples <= target_dim {
            return Err(DimensionError::TooFewSamples {
                samples: n_samples,
                target: target_dim,
            });
        }
        check_finite(data)?;

        let mean = data
            .mean_axis(Axis(0))
            .ok_or(DimensionError::TooFewSamples {
                samples: n_samples,
                target: target_dim,
            })?;
        let centered = &data - &mean;
        let denom = (n_samples - 1) as f64;

        let (components, explained_variance) = if input_dim <= n_samples {
            let covariance = centered.t().dot(&centered) / denom;
            let (values, vectors) = symmetric_eigen(&covariance)?;
            let components = vectors.slice(s![.., ..target_dim]).t().to_owned();
            let variance = values
                .slice(s![..target_dim])
                .mapv(|v| v.max(0.0));
            (components, variance)
        } else {
            let gram = centered.dot(&centered.t()) / denom;
            let (values, vectors) = symmetric_eigen(&gram)?;
            let mut components = Array2::<f64>::zeros((target_dim, input_dim));
            for j in 0..target_dim {
                let mut v = centered.t().dot(&vectors.column(j));
                let norm = v.dot(&v).sqrt();
                if norm > NORM_EPSILON {
                    v /= norm;
                    normalise_sign(&mut v);
                    components.row_mut(j).assign(&v);
                }
            }
            let variance = values
                .slice(s![..target_dim])
                .mapv(|v| v.max(0.0));
            (components, variance)
        };

        let total_variance = centered.iter().map(|x| x * x).sum::<f64>() / denom;

        let scores = centered.dot(&components.t());
        let mut score_min = Array1::from_elem(target_dim, f64::INFINITY);
        let mut score_max = Array1::from_elem(target_dim, f64::NEG_INFINITY);
        for row in scores.rows() {
            for (j, &v) in row.iter().enumerate() {
                score_min[j] = score_min[j].min(v);
                score_max[j] = score_max[j].max(v);
            }
        }

        let degenerate = score_min
            .iter()
            .zip(score_max.iter())
            .all(|(lo, hi)| lo.abs().max(hi.abs()) == 0.0);
        if degenerate {
            return Err(DimensionError::DegenerateCorpus);
        }

        info!(
            n_samples,
            input_dim,
            target_dim,
            dual = input_dim > n_samples,
            "fitted principal-component projection"
        );

        Ok(Self {
            mean,
            components,
            explained_variance,
            total_variance,
            score_min,
            score_max,
            n_samples,
        })
    }

    /// Reduce one vector to `target_dim` coordinates in `[-max_scale, max_scale]`.
    ///
    /// Pure function of the projection and its arguments.
    pub fn transform(
        &self,
        x: ArrayView1<'_, f64>,
        target_dim: usize,
        max_scale: f64,
    ) -> ReduceResult<Array1<f64>> {
        self.check_transform_args(target_dim, max_scale)?;
        self.check_width(x.len())?;
        if let Some(column) = x.iter().position(|v| !v.is_finite()) {
            return Err(DimensionError::NonFinite { row: 0, column });
        }

        let (reduced, clipped) = self.rescale(x, target_dim, max_scale);
        if clipped > 0 {
            warn!(
                clipped,
                max_scale,
                "clipped coordinates outside the fitted score range"
            );
        }
        Ok(reduced)
    }

    /// Reduce every row of `data`; output shape is `(n, target_dim)`.
    pub fn transform_batch(
        &self,
        data: ArrayView2<'_, f64>,
        target_dim: usize,
        max_scale: f64,
    ) -> ReduceResult<Array2<f64>> {
        self.check_transform_args(target_dim, max_scale)?;
        self.check_width(data.ncols())?;
        check_finite(data)?;

        let mut out = Array2::<f64>::zeros((data.nrows(), target_dim));
        let mut total_clipped = 0usize;
        let mut rows_clipped = 0usize;
        for (i, row) in data.rows().into_iter().enumerate() {
            let (reduced, clipped) = self.rescale(row, target_dim, max_scale);
            if clipped > 0 {
                rows_clipped += 1;
                total_clipped += clipped;
            }
            out.row_mut(i).assign(&reduced);
        }

        if total_clipped > 0 {
            warn!(
                rows_clipped,
                total_clipped,
                max_scale,
                "clipped coordinates outside the fitted score range"
            );
        }
        Ok(out)
    }

    /// Raw (unscaled) component scores `W·(x − μ)` for all fitted components.
    pub fn project(&self, x: ArrayView1<'_, f64>) -> ReduceResult<Array1<f64>> {
        self.check_width(x.len())?;
        Ok(self.components.dot(&(&x - &self.mean)))
    }

    fn rescale(
        &self,
        x: ArrayView1<'_, f64>,
        target_dim: usize,
        max_scale: f64,
    ) -> (Array1<f64>, usize) {
        let centered = &x - &self.mean;
        let mut clipped = 0usize;
        let reduced = Array1::from_iter((0..target_dim).map(|j| {
            let score = self.components.row(j).dot(&centered);
            let bound = self.score_min[j].abs().max(self.score_max[j].abs());
            if bound == 0.0 {
                // Component constant over the corpus: no signal to encode.
                return 0.0;
            }
            let scaled = score / bound * max_scale;
            if scaled.abs() > max_scale {
                clipped += 1;
            }
            scaled.clamp(-max_scale, max_scale)
        }));
        (reduced, clipped)
    }

    fn check_transform_args(&self, target_dim: usize, max_scale: f64) -> ReduceResult<()> {
        if target_dim == 0 {
            return Err(DimensionError::ZeroTarget);
        }
        if target_dim > self.n_components() {
            return Err(DimensionError::TargetExceedsFitted {
                target: target_dim,
                fitted: self.n_components(),
            });
        }
        if !(max_scale.is_finite() && max_scale > 0.0) {
            return Err(DimensionError::InvalidScale(max_scale));
        }
        Ok(())
    }

    fn check_width(&self, width: usize) -> ReduceResult<()> {
        if width != self.input_dim() {
            return Err(DimensionError::InputWidth {
                expected: self.input_dim(),
                actual: width,
            });
        }
        Ok(())
    }

    /// Width of the vectors the projection accepts.
    pub fn input_dim(&self) -> usize {
        self.mean.len()
    }

    /// Number of fitted components.
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Per-column mean of the fitting corpus.
    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    /// Components as rows, `(n_components, input_dim)`.
    pub fn components(&self) -> ArrayView2<'_, f64> {
        self.components.view()
    }

    /// Variance along each component.
    pub fn explained_variance(&self) -> ArrayView1<'_, f64> {
        self.explained_variance.view()
    }

    /// Fraction of the corpus variance captured by each component.
    pub fn explained_variance_ratio(&self) -> Array1<f64> {
        if self.total_variance > 0.0 {
            &self.explained_variance / self.total_variance
        } else {
            Array1::zeros(self.n_components())
        }
    }

    /// Check that the stored parts agree with each other.
    ///
    /// A freshly fitted projection always passes; this guards projections
    /// read back from disk before they are used for `transform`.
    pub fn validate(&self) -> ReduceResult<()> {
        let (k, d) = self.components.dim();
        let inconsistent = |what: String| Err(DimensionError::Inconsistent(what));

        if k == 0 {
            return inconsistent("no fitted components".into());
        }
        if self.mean.len() != d {
            return inconsistent(format!(
                "mean has length {} but components have width {d}",
                self.mean.len()
            ));
        }
        for (name, len) in [
            ("explained_variance", self.explained_variance.len()),
            ("score_min", self.score_min.len()),
            ("score_max", self.score_max.len()),
        ] {
            if len != k {
                return inconsistent(format!(
                    "{name} has length {len} but there are {k} components"
                ));
            }
        }
        if self.n_samples <= k {
            return inconsistent(format!(
                "{k} components cannot be fitted on {} samples",
                self.n_samples
            ));
        }
        let finite = self
            .mean
            .iter()
            .chain(self.components.iter())
            .chain(self.score_min.iter())
            .chain(self.score_max.iter())
            .all(|v| v.is_finite());
        if !finite {
            return inconsistent("non-finite parameter".into());
        }
        Ok(())
    }
}

/// Eigenpairs of a symmetric matrix as `(values, vectors)`.
///
/// Values are descending; equal values keep the solver's column order.
/// Vectors are columns, each flipped so its largest-magnitude entry is
/// positive.
fn symmetric_eigen(matrix: &Array2<f64>) -> ReduceResult<(Array1<f64>, Array2<f64>)> {
    let n = matrix.nrows();
    let mat = Mat::<f64>::from_fn(n, n, |i, j| matrix[[i, j]]);
    let evd = mat
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| DimensionError::Decomposition(format!("{e:?}")))?;
    let u = evd.U();
    let lambda = evd.S().column_vector();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| lambda[j].total_cmp(&lambda[i]));

    let values = Array1::from_iter(order.iter().map(|&i| lambda[i]));
    let mut vectors = Array2::<f64>::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        let mut column = Array1::from_iter((0..n).map(|row| u[(row, src)]));
        normalise_sign(&mut column);
        vectors.column_mut(dst).assign(&column);
    }
    Ok((values, vectors))
}

/// Flip `v` so that its largest-magnitude entry is positive.
fn normalise_sign(v: &mut Array1<f64>) {
    let mut pivot = 0.0_f64;
    for &x in v.iter() {
        if x.abs() > pivot.abs() {
            pivot = x;
        }
    }
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}

fn check_finite(data: ArrayView2<'_, f64>) -> ReduceResult<()> {
    for ((row, column), v) in data.indexed_iter() {
        if !v.is_finite() {
            return Err(DimensionError::NonFinite { row, column });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn line_corpus() -> Array2<f64> {
        // Points spread along (1, 1) with a small orthogonal wobble.
        array![
            [-2.0, -2.1],
            [-1.0, -0.9],
            [0.0, 0.1],
            [1.0, 0.9],
            [2.0, 2.0],
        ]
    }

    #[test]
    fn test_first_component_follows_spread() {
        let p = Projection::fit(line_corpus().view(), 1).unwrap();
        let c = p.components().row(0).to_owned();
        let s = 1.0 / 2.0_f64.sqrt();
        assert!((c[0] - s).abs() < 1e-2);
        assert!((c[1] - s).abs() < 1e-2);
    }

    #[test]
    fn test_training_scores_within_bound() {
        let data = line_corpus();
        let p = Projection::fit(data.view(), 2).unwrap();
        let out = p.transform_batch(data.view(), 2, 6.0).unwrap();
        assert!(out.iter().all(|v| v.abs() <= 6.0));
        // The extreme sample of each coordinate lands exactly on the bound.
        for j in 0..2 {
            let peak = out.column(j).iter().fold(0.0_f64, |a, v| a.max(v.abs()));
            assert!((peak - 6.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_held_out_sample_is_clipped() {
        let p = Projection::fit(line_corpus().view(), 1).unwrap();
        let far = array![100.0, 100.0];
        let out = p.transform(far.view(), 1, 6.0).unwrap();
        assert_eq!(out[0], 6.0);
    }

    #[test]
    fn test_dual_route_matches_primal_subspace() {
        // 3 samples in 5 dimensions forces the Gram route.
        let data = array![
            [1.0, 0.0, 2.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 1.0, 0.0],
            [2.0, 1.0, 3.0, 0.5, 1.0],
        ];
        let p = Projection::fit(data.view(), 2).unwrap();
        let gram = p.components().dot(&p.components().t());
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((gram[[i, j]] - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_explained_variance_ratio_sums_to_one_at_full_rank() {
        let data = line_corpus();
        let p = Projection::fit(data.view(), 2).unwrap();
        let total: f64 = p.explained_variance_ratio().sum();
        assert!((total - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_eigen_diagonal_sorted_descending() {
        let m = array![[1.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 2.0]];
        let (values, vectors) = symmetric_eigen(&m).unwrap();
        for (v, expected) in values.iter().zip([3.0, 2.0, 1.0]) {
            assert!((v - expected).abs() < 1e-12);
        }
        assert!((vectors[[1, 0]] - 1.0).abs() < 1e-12);
        assert!((vectors[[2, 1]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_eigen_reconstruction_and_sign() {
        let m = array![
            [4.0, 1.0, -2.0, 0.5],
            [1.0, 3.0, 0.0, 1.5],
            [-2.0, 0.0, 5.0, -1.0],
            [0.5, 1.5, -1.0, 2.0]
        ];
        let (values, vectors) = symmetric_eigen(&m).unwrap();
        let rebuilt = vectors.dot(&Array2::from_diag(&values)).dot(&vectors.t());
        for (x, y) in rebuilt.iter().zip(m.iter()) {
            assert!((x - y).abs() < 1e-10);
        }
        assert!(values.to_vec().windows(2).all(|w| w[0] >= w[1]));
        for col in vectors.columns() {
            let pivot = col
                .iter()
                .copied()
                .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
            assert!(pivot > 0.0);
        }
    }

    #[test]
    fn test_fitted_projection_is_consistent() {
        let p = Projection::fit(line_corpus().view(), 2).unwrap();
        p.validate().unwrap();
    }

    #[test]
    fn test_constant_corpus_rejected() {
        let data = Array2::from_elem((4, 3), 1.5);
        assert_eq!(
            Projection::fit(data.view(), 2),
            Err(DimensionError::DegenerateCorpus)
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut data = line_corpus();
        data[[3, 1]] = f64::NAN;
        assert_eq!(
            Projection::fit(data.view(), 1),
            Err(DimensionError::NonFinite { row: 3, column: 1 })
        );
    }
}
