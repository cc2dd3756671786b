//! Time evolution of the atom array and observable recording.
//!
//! The [`DynamicsEngine`] trait is the seam between Hamiltonian construction
//! and whatever produces the observable trace.  [`StatevectorEngine`] is the
//! exact dense implementation.
//!
//! # Operator splitting
//!
//! Each interval between schedule points is cut into `ceil(Δt / max_step)`
//! equal sub-steps of length τ.  Within a sub-step the Hamiltonian is frozen
//! at the sub-step midpoint and split as H = D + X, where D is diagonal
//! (detuning and interaction) and X is the drive.  Both parts are applied
//! exactly:
//!
//!   first order   U(τ) ≈ X(τ) · D(τ)                 error O(τ)
//!   second order  U(τ) ≈ D(τ/2) · X(τ) · D(τ/2)      error O(τ²)
//!
//! The single-site drive rotations commute with each other, so X(τ) is a
//! product of N 2×2 rotations.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::DynamicsError;
use crate::hamiltonian::Hamiltonian;
use crate::observable::{Observable, ObservableTrace};
use crate::statevector::Statevector;

/// Hard ceiling on `max_sites`: a 30-site state is 16 GiB of amplitudes.
pub const SITE_LIMIT: usize = 30;

/// Ordered time points at which observables are recorded (µs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TimeSchedule {
    points: Vec<f64>,
}

impl TimeSchedule {
    /// Validate a schedule: non-empty, finite, non-negative, non-decreasing.
    pub fn new(points: Vec<f64>) -> Result<Self, DynamicsError> {
        if points.is_empty() {
            return Err(DynamicsError::InvalidSchedule(
                "schedule has no time points".into(),
            ));
        }
        if let Some((i, t)) = points
            .iter()
            .enumerate()
            .find(|(_, t)| !t.is_finite() || **t < 0.0)
        {
            return Err(DynamicsError::InvalidSchedule(format!(
                "time point {i} is {t}; points must be finite and non-negative"
            )));
        }
        if let Some(i) = points.windows(2).position(|w| w[1] < w[0]) {
            return Err(DynamicsError::InvalidSchedule(format!(
                "time point {} ({}) precedes point {} ({})",
                i + 1,
                points[i + 1],
                i,
                points[i]
            )));
        }
        Ok(Self { points })
    }

    /// Time points.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a validated schedule.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Final time point.
    pub fn duration(&self) -> f64 {
        self.points.last().copied().unwrap_or(0.0)
    }
}

impl TryFrom<Vec<f64>> for TimeSchedule {
    type Error = DynamicsError;

    fn try_from(points: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<TimeSchedule> for Vec<f64> {
    fn from(schedule: TimeSchedule) -> Self {
        schedule.points
    }
}

/// Operator-splitting order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplittingOrder {
    /// Lie splitting, one diagonal and one drive step per sub-step.
    First,
    /// Strang splitting, symmetric half diagonal steps.
    #[default]
    Second,
}

/// Numerical settings for [`StatevectorEngine`].
///
/// These must be held fixed across every sample of one experiment; traces
/// produced under different options are not comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Splitting order.
    pub order: SplittingOrder,
    /// Longest sub-step (µs).
    pub max_step: f64,
    /// Allowed |‖ψ‖² − 1| and observable range slack.
    pub norm_tolerance: f64,
    /// Refuse Hamiltonians with more sites than this.
    pub max_sites: usize,
    /// Observable recorded at every schedule point.
    pub observable: Observable,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            order: SplittingOrder::Second,
            max_step: 1e-3,
            norm_tolerance: 1e-6,
            max_sites: 20,
            observable: Observable::RydbergDensity,
        }
    }
}

impl EngineOptions {
    /// Check every field is in range.
    pub fn validate(&self) -> Result<(), DynamicsError> {
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(DynamicsError::InvalidOptions(format!(
                "max_step must be positive and finite, got {}",
                self.max_step
            )));
        }
        if !(self.norm_tolerance.is_finite() && self.norm_tolerance > 0.0) {
            return Err(DynamicsError::InvalidOptions(format!(
                "norm_tolerance must be positive and finite, got {}",
                self.norm_tolerance
            )));
        }
        if self.max_sites == 0 || self.max_sites > SITE_LIMIT {
            return Err(DynamicsError::InvalidOptions(format!(
                "max_sites must be in 1..={SITE_LIMIT}, got {}",
                self.max_sites
            )));
        }
        if let Observable::SampledDensity { shots: 0, .. } = self.observable {
            return Err(DynamicsError::InvalidOptions(
                "sampled observable needs at least one shot".into(),
            ));
        }
        Ok(())
    }
}

/// Something that turns a Hamiltonian and a schedule into an observable trace.
///
/// Implementations must be deterministic: the same inputs give the same
/// trace.  A failure anywhere aborts the whole evolution; no partial trace
/// is returned.
pub trait DynamicsEngine: Send + Sync {
    /// Get the name of this engine.
    fn name(&self) -> &str;

    /// Observable this engine records.
    fn observable(&self) -> Observable;

    /// Evolve from the all-ground state and record at every schedule point.
    fn evolve(
        &self,
        hamiltonian: &Hamiltonian,
        schedule: &TimeSchedule,
    ) -> Result<ObservableTrace, DynamicsError>;
}

/// Lifecycle of one evolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Evolving,
    Completed,
}

fn advance(phase: &mut Phase, next: Phase) {
    trace!(from = ?*phase, to = ?next, "evolution phase");
    *phase = next;
}

/// Exact dense statevector engine.
#[derive(Debug, Clone)]
pub struct StatevectorEngine {
    options: EngineOptions,
}

impl StatevectorEngine {
    /// Engine with validated options.
    pub fn new(options: EngineOptions) -> Result<Self, DynamicsError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Options in use.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Fill `out` with the diagonal energy of every basis state at fixed
    /// detunings: `interaction[b] − Σ_i Δ_i b_i`.
    fn diagonal_energies(interaction: &[f64], detunings: &[f64], out: &mut [f64]) {
        for (b, (e, &v)) in out.iter_mut().zip(interaction).enumerate() {
            let mut energy = v;
            for (site, &delta) in detunings.iter().enumerate() {
                if b & (1 << site) != 0 {
                    energy -= delta;
                }
            }
            *e = energy;
        }
    }

    fn check_state(
        &self,
        state: &Statevector,
        time: f64,
        values: &[f64],
    ) -> Result<(), DynamicsError> {
        let tolerance = self.options.norm_tolerance;
        let norm_sqr = state.norm_sqr();
        if !norm_sqr.is_finite() || (norm_sqr - 1.0).abs() > tolerance {
            return Err(DynamicsError::NormDrift {
                time,
                norm_sqr,
                tolerance,
            });
        }
        let (low, high) = self.options.observable.range();
        for (site, &value) in values.iter().enumerate() {
            if !value.is_finite() || value < low - tolerance || value > high + tolerance {
                return Err(DynamicsError::NonPhysicalObservable {
                    time,
                    site,
                    value,
                    low,
                    high,
                });
            }
        }
        Ok(())
    }
}

impl Default for StatevectorEngine {
    fn default() -> Self {
        Self {
            options: EngineOptions::default(),
        }
    }
}

impl DynamicsEngine for StatevectorEngine {
    fn name(&self) -> &str {
        "statevector"
    }

    fn observable(&self) -> Observable {
        self.options.observable
    }

    fn evolve(
        &self,
        hamiltonian: &Hamiltonian,
        schedule: &TimeSchedule,
    ) -> Result<ObservableTrace, DynamicsError> {
        let mut phase = Phase::Uninitialized;
        let n = hamiltonian.n_sites();
        if n > self.options.max_sites {
            return Err(DynamicsError::TooManySites {
                sites: n,
                max: self.options.max_sites,
            });
        }

        let interaction = hamiltonian.interaction_energies();
        let mut energies = vec![0.0; interaction.len()];
        let mut cached_detunings: Option<Vec<f64>> = None;

        let mut state = Statevector::ground(n);
        let mut trace = ObservableTrace::with_capacity(schedule.len(), n);
        let observable = self.options.observable;
        let mut t = 0.0;
        let mut total_substeps = 0usize;

        advance(&mut phase, Phase::Evolving);
        for (step, &target) in schedule.points().iter().enumerate() {
            let span = target - t;
            if span > 0.0 {
                let n_sub = ((span / self.options.max_step).ceil() as usize).max(1);
                let tau = span / n_sub as f64;

                for s in 0..n_sub {
                    let mid = t + (s as f64 + 0.5) * tau;
                    let detunings = hamiltonian.detunings_at(mid);
                    if cached_detunings.as_ref() != Some(&detunings) {
                        Self::diagonal_energies(&interaction, &detunings, &mut energies);
                        cached_detunings = Some(detunings);
                    }
                    let theta = hamiltonian.rabi_at(mid) * tau;

                    match self.options.order {
                        SplittingOrder::First => {
                            state.apply_diagonal(&energies, tau);
                            apply_drive_all(&mut state, theta, hamiltonian.phase());
                        }
                        SplittingOrder::Second => {
                            state.apply_diagonal(&energies, tau / 2.0);
                            apply_drive_all(&mut state, theta, hamiltonian.phase());
                            state.apply_diagonal(&energies, tau / 2.0);
                        }
                    }
                }
                total_substeps += n_sub;
                t = target;
            }

            let values = observable.measure(&state, step);
            self.check_state(&state, target, &values)?;
            trace.push_row(target, &values);
        }
        advance(&mut phase, Phase::Completed);

        debug!(
            engine = self.name(),
            n_sites = n,
            points = schedule.len(),
            substeps = total_substeps,
            observable = observable.name(),
            "evolution complete"
        );
        Ok(trace)
    }
}

fn apply_drive_all(state: &mut Statevector, theta: f64, phase: f64) {
    if theta == 0.0 {
        return;
    }
    for site in 0..state.num_sites() {
        state.apply_drive(site, theta, phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_validation() {
        assert!(TimeSchedule::new(vec![]).is_err());
        assert!(TimeSchedule::new(vec![0.0, -1.0]).is_err());
        assert!(TimeSchedule::new(vec![0.0, f64::NAN]).is_err());
        assert!(TimeSchedule::new(vec![0.5, 0.2]).is_err());
        let s = TimeSchedule::new(vec![0.0, 0.5, 0.5, 1.0]).unwrap();
        assert_eq!(s.len(), 4);
        assert_eq!(s.duration(), 1.0);
    }

    #[test]
    fn test_schedule_serde_validates() {
        let ok: TimeSchedule = serde_json::from_str("[0.0, 1.0]").unwrap();
        assert_eq!(ok.points(), &[0.0, 1.0]);
        assert!(serde_json::from_str::<TimeSchedule>("[1.0, 0.0]").is_err());
    }

    #[test]
    fn test_options_validation() {
        assert!(EngineOptions::default().validate().is_ok());
        let bad = EngineOptions {
            max_step: 0.0,
            ..EngineOptions::default()
        };
        assert!(matches!(
            StatevectorEngine::new(bad),
            Err(DynamicsError::InvalidOptions(_))
        ));
        let bad = EngineOptions {
            max_sites: SITE_LIMIT + 1,
            ..EngineOptions::default()
        };
        assert!(bad.validate().is_err());
        let bad = EngineOptions {
            observable: Observable::SampledDensity { shots: 0, seed: 0 },
            ..EngineOptions::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_diagonal_energies() {
        let interaction = [0.0, 0.0, 0.0, 10.0];
        let mut out = [0.0; 4];
        StatevectorEngine::diagonal_energies(&interaction, &[1.0, 2.0], &mut out);
        assert_eq!(out, [0.0, -1.0, -2.0, 7.0]);
    }
}
