//! Scalar control waveforms.
//!
//! A [`Waveform`] is a real function of time used for the global Rabi
//! amplitude and for each site's detuning.  Piecewise-linear waveforms are
//! zero outside their support, matching a pulse that is switched off before
//! its first and after its last breakpoint.

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// A real-valued function of time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// Constant value for all `t`.
    Constant(f64),
    /// Linear interpolation between `(times[i], values[i])` breakpoints.
    PiecewiseLinear {
        /// Strictly increasing breakpoint times.
        times: Vec<f64>,
        /// Values at each breakpoint.
        values: Vec<f64>,
    },
}

impl Waveform {
    /// Validated piecewise-linear waveform.
    pub fn piecewise_linear(times: Vec<f64>, values: Vec<f64>) -> Result<Self, EncodingError> {
        if times.is_empty() {
            return Err(EncodingError::InvalidWaveform(
                "piecewise-linear waveform needs at least one breakpoint".into(),
            ));
        }
        if times.len() != values.len() {
            return Err(EncodingError::InvalidWaveform(format!(
                "{} times but {} values",
                times.len(),
                values.len()
            )));
        }
        if let Some(bad) = times.iter().chain(values.iter()).find(|x| !x.is_finite()) {
            return Err(EncodingError::InvalidWaveform(format!(
                "non-finite breakpoint {bad}"
            )));
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(EncodingError::InvalidWaveform(
                "breakpoint times must be strictly increasing".into(),
            ));
        }
        Ok(Waveform::PiecewiseLinear { times, values })
    }

    /// Trapezoid: rises linearly from 0 to `peak` over `ramp`, holds, and
    /// falls back to 0 at `duration`.
    ///
    /// A zero ramp gives a flat `peak` on `[0, duration]`.  Ramps longer than
    /// half the duration are shortened to `duration / 2` (a triangle).
    pub fn trapezoid(peak: f64, ramp: f64, duration: f64) -> Result<Self, EncodingError> {
        if !(peak.is_finite() && ramp.is_finite() && ramp >= 0.0) {
            return Err(EncodingError::InvalidWaveform(format!(
                "trapezoid needs finite peak and non-negative ramp, got peak {peak}, ramp {ramp}"
            )));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(EncodingError::InvalidWaveform(format!(
                "trapezoid duration must be positive, got {duration}"
            )));
        }

        let ramp = ramp.min(duration / 2.0);
        if ramp == 0.0 {
            return Self::piecewise_linear(vec![0.0, duration], vec![peak, peak]);
        }
        if ramp * 2.0 >= duration {
            return Self::piecewise_linear(
                vec![0.0, duration / 2.0, duration],
                vec![0.0, peak, 0.0],
            );
        }
        Self::piecewise_linear(
            vec![0.0, ramp, duration - ramp, duration],
            vec![0.0, peak, peak, 0.0],
        )
    }

    /// Value at time `t`.
    pub fn sample(&self, t: f64) -> f64 {
        match self {
            Waveform::Constant(v) => *v,
            Waveform::PiecewiseLinear { times, values } => {
                let (Some(&first), Some(&last)) = (times.first(), times.last()) else {
                    return 0.0;
                };
                if t < first || t > last {
                    return 0.0;
                }
                // Index of the first breakpoint strictly after t.
                let hi = times.partition_point(|&x| x <= t);
                if hi == 0 {
                    return values[0];
                }
                if hi == times.len() {
                    return values[times.len() - 1];
                }
                let lo = hi - 1;
                let frac = (t - times[lo]) / (times[hi] - times[lo]);
                values[lo] + frac * (values[hi] - values[lo])
            }
        }
    }

    /// Largest absolute value the waveform attains.
    pub fn max_abs(&self) -> f64 {
        match self {
            Waveform::Constant(v) => v.abs(),
            Waveform::PiecewiseLinear { values, .. } => {
                values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
            }
        }
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Constant(0.0)
    }
}
