//! Observables read off the state and the per-sample trace that holds them.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::statevector::Statevector;

/// Per-site quantity recorded at every schedule point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observable {
    /// ⟨n_i⟩, the Rydberg excitation probability.
    #[default]
    RydbergDensity,
    /// ⟨Z_i⟩ = 1 − 2⟨n_i⟩.
    PauliZ,
    /// ⟨n_i⟩ estimated from `shots` bitstrings drawn with a fixed seed.
    SampledDensity {
        /// Bitstrings per recorded time point.
        shots: usize,
        /// RNG seed; each time point uses `seed + step`.
        seed: u64,
    },
}

impl Observable {
    /// Physical range `[low, high]` of the observable.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Observable::RydbergDensity | Observable::SampledDensity { .. } => (0.0, 1.0),
            Observable::PauliZ => (-1.0, 1.0),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Observable::RydbergDensity => "rydberg_density",
            Observable::PauliZ => "pauli_z",
            Observable::SampledDensity { .. } => "sampled_density",
        }
    }

    /// Evaluate on `state`.  `step` indexes the schedule point.
    pub fn measure(&self, state: &Statevector, step: usize) -> Vec<f64> {
        match *self {
            Observable::RydbergDensity => state.site_populations(),
            Observable::PauliZ => state
                .site_populations()
                .into_iter()
                .map(|p| 1.0 - 2.0 * p)
                .collect(),
            Observable::SampledDensity { shots, seed } => {
                let n = state.num_sites();
                let mut counts = vec![0usize; n];
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(step as u64));
                for _ in 0..shots {
                    let outcome = state.sample(&mut rng);
                    for (site, c) in counts.iter_mut().enumerate() {
                        if outcome & (1 << site) != 0 {
                            *c += 1;
                        }
                    }
                }
                counts
                    .into_iter()
                    .map(|c| c as f64 / shots.max(1) as f64)
                    .collect()
            }
        }
    }
}

/// Observable values of one sample, shape `(steps, n_sites)`, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableTrace {
    times: Vec<f64>,
    n_sites: usize,
    values: Vec<f64>,
}

impl ObservableTrace {
    /// Wrap row-major values.  Returns `None` unless
    /// `values.len() == times.len() * n_sites`.
    pub fn new(times: Vec<f64>, n_sites: usize, values: Vec<f64>) -> Option<Self> {
        if values.len() != times.len() * n_sites {
            return None;
        }
        Some(Self {
            times,
            n_sites,
            values,
        })
    }

    pub(crate) fn with_capacity(steps: usize, n_sites: usize) -> Self {
        Self {
            times: Vec::with_capacity(steps),
            n_sites,
            values: Vec::with_capacity(steps * n_sites),
        }
    }

    pub(crate) fn push_row(&mut self, time: f64, row: &[f64]) {
        debug_assert_eq!(row.len(), self.n_sites);
        self.times.push(time);
        self.values.extend_from_slice(row);
    }

    /// Number of recorded time points.
    pub fn steps(&self) -> usize {
        self.times.len()
    }

    /// Number of sites.
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// `(steps, n_sites)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.steps(), self.n_sites)
    }

    /// Recorded times.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Value at `(step, site)`.
    pub fn value(&self, step: usize, site: usize) -> Option<f64> {
        if step >= self.steps() || site >= self.n_sites {
            return None;
        }
        self.values.get(step * self.n_sites + site).copied()
    }

    /// All sites at one time point.
    pub fn row(&self, step: usize) -> Option<&[f64]> {
        let start = step.checked_mul(self.n_sites)?;
        self.values.get(start..start + self.n_sites)
    }

    /// Row-major values (time-major, then site).
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_trace_indexing() {
        let trace = ObservableTrace::new(vec![0.0, 1.0], 3, vec![1., 2., 3., 4., 5., 6.]).unwrap();
        assert_eq!(trace.shape(), (2, 3));
        assert_eq!(trace.value(1, 0), Some(4.0));
        assert_eq!(trace.row(0), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(trace.value(2, 0), None);
        assert_eq!(trace.value(0, 3), None);
        assert!(ObservableTrace::new(vec![0.0], 3, vec![1.0]).is_none());
    }

    #[test]
    fn test_pauli_z_from_density() {
        let mut sv = Statevector::ground(2);
        sv.apply_drive(0, PI, 0.0);
        let z = Observable::PauliZ.measure(&sv, 0);
        assert!((z[0] + 1.0).abs() < 1e-12);
        assert!((z[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sampled_density_is_seeded() {
        let mut sv = Statevector::ground(2);
        sv.apply_drive(0, PI / 2.0, 0.0);
        let obs = Observable::SampledDensity {
            shots: 500,
            seed: 11,
        };
        let a = obs.measure(&sv, 3);
        let b = obs.measure(&sv, 3);
        assert_eq!(a, b);
        assert!((a[0] - 0.5).abs() < 0.1);
        assert_eq!(a[1], 0.0);
    }

    #[test]
    fn test_observable_serde_names() {
        let json = serde_json::to_string(&Observable::PauliZ).unwrap();
        assert_eq!(json, "\"pauli_z\"");
        let sampled: Observable =
            serde_json::from_str(r#"{"sampled_density":{"shots":10,"seed":1}}"#).unwrap();
        assert_eq!(sampled, Observable::SampledDensity { shots: 10, seed: 1 });
    }
}
