//! Rydberg atom-array Hamiltonian.
//!
//! For N sites the Hamiltonian is
//!
//!   H(t) = Σ_i Ω(t)/2 · (cos φ X_i − sin φ Y_i)
//!        − Σ_i Δ_i(t) n_i
//!        + Σ_{i<j} C / r_ij^p · n_i n_j
//!
//! with n_i = |r⟩⟨r| the Rydberg-state projector on site i.  The drive
//! Ω(t), φ is global and sample-independent; the detunings Δ_i carry the
//! reduced input; the interaction couplings depend only on the layout.
//!
//! Units: time µs, distance µm, Ω, Δ and energies rad/µs.
//!
//! # Example
//!
//! ```rust
//! use qrc_sim::hamiltonian::{HamiltonianBuilder, HamiltonianParams};
//! use qrc_sim::layout::generate_sites;
//!
//! let layout = generate_sites(4, 6.0).unwrap();
//! let params = HamiltonianParams::new(6.0, 1.0);
//! let builder = HamiltonianBuilder::new(&layout, params).unwrap();
//!
//! let h = builder.build(&[1.5, -2.0]).unwrap();
//! assert_eq!(h.n_sites(), 4);
//! assert_eq!(h.detunings_at(0.5), vec![1.5, -2.0, 0.0, 0.0]);
//! assert_eq!(h.interactions().len(), 6);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EncodingError;
use crate::layout::SiteLayout;
use crate::waveform::Waveform;

/// Rb-87 |70S⟩ van der Waals coefficient C6 / ħ in rad·µm⁶/µs.
pub const C6_RB70S: f64 = 2.0 * PI * 862_690.0;

/// Detuning applied to sites that receive no reduced coordinate.
pub const BASELINE_DETUNING: f64 = 0.0;

/// Pairwise interaction `coefficient / r^power`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionParams {
    /// Interaction strength C (rad·µm^p/µs).
    pub coefficient: f64,
    /// Decay power p (6 for van der Waals).
    pub power: f64,
}

impl Default for InteractionParams {
    fn default() -> Self {
        Self {
            coefficient: C6_RB70S,
            power: 6.0,
        }
    }
}

/// Global Rabi drive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveParams {
    /// Peak Rabi frequency Ω (rad/µs).
    pub rabi_frequency: f64,
    /// Laser phase φ (rad).
    pub phase: f64,
    /// Rise and fall time of the trapezoid (µs).
    pub ramp_time: f64,
    /// Pulse duration (µs); the drive returns to zero here.
    pub duration: f64,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            rabi_frequency: 2.0 * PI,
            phase: 0.0,
            ramp_time: 0.05,
            duration: 1.0,
        }
    }
}

/// Everything except the sample needed to build a Hamiltonian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianParams {
    /// Global drive.
    pub drive: DriveParams,
    /// Δmax: every detuning must lie in `[-Δmax, Δmax]`.
    pub max_detuning: f64,
    /// Pairwise interaction.
    pub interaction: InteractionParams,
}

impl HamiltonianParams {
    /// Default drive and interaction with the given Δmax and pulse duration.
    pub fn new(max_detuning: f64, duration: f64) -> Self {
        Self {
            drive: DriveParams {
                duration,
                ..DriveParams::default()
            },
            max_detuning,
            interaction: InteractionParams::default(),
        }
    }
}

/// One `coeff · n_i n_j` coupling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionTerm {
    /// Lower site index.
    pub i: usize,
    /// Higher site index.
    pub j: usize,
    /// Coupling energy (rad/µs).
    pub coeff: f64,
}

/// Per-site detuning waveforms derived from one reduced sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetuningSchedule {
    waveforms: Vec<Waveform>,
    encoded: usize,
}

impl DetuningSchedule {
    /// Detuning of every site at time `t`.
    pub fn at(&self, t: f64) -> Vec<f64> {
        self.waveforms.iter().map(|w| w.sample(t)).collect()
    }

    /// Waveform driving `site`.
    pub fn waveform(&self, site: usize) -> Option<&Waveform> {
        self.waveforms.get(site)
    }

    /// Number of sites carrying a reduced coordinate.
    pub fn encoded_sites(&self) -> usize {
        self.encoded
    }

    /// Largest |Δ_i(t)| over all sites and times.
    pub fn max_abs(&self) -> f64 {
        self.waveforms
            .iter()
            .fold(0.0_f64, |acc, w| acc.max(w.max_abs()))
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.waveforms.len()
    }

    /// True when the schedule covers no sites.
    pub fn is_empty(&self) -> bool {
        self.waveforms.is_empty()
    }
}

/// A fully specified, time-dependent Rydberg Hamiltonian for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hamiltonian {
    n_sites: usize,
    rabi: Waveform,
    phase: f64,
    detuning: DetuningSchedule,
    interactions: Vec<InteractionTerm>,
}

impl Hamiltonian {
    /// Number of sites.
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Ω(t).
    pub fn rabi_at(&self, t: f64) -> f64 {
        self.rabi.sample(t)
    }

    /// Rabi amplitude waveform.
    pub fn rabi(&self) -> &Waveform {
        &self.rabi
    }

    /// Laser phase φ.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Δ_i(t) for every site.
    pub fn detunings_at(&self, t: f64) -> Vec<f64> {
        self.detuning.at(t)
    }

    /// Detuning schedule.
    pub fn detuning(&self) -> &DetuningSchedule {
        &self.detuning
    }

    /// Interaction terms, ordered by `(i, j)`.
    pub fn interactions(&self) -> &[InteractionTerm] {
        &self.interactions
    }

    /// Interaction energy Σ V_ij b_i b_j of every computational basis state.
    ///
    /// Bit `i` of the basis index is the occupation of site `i`.  The table
    /// has `2^N` entries; callers check the site limit first.
    pub fn interaction_energies(&self) -> Vec<f64> {
        let dim = 1usize << self.n_sites;
        let mut energies = vec![0.0; dim];
        for (b, e) in energies.iter_mut().enumerate() {
            for term in &self.interactions {
                if b & (1 << term.i) != 0 && b & (1 << term.j) != 0 {
                    *e += term.coeff;
                }
            }
        }
        energies
    }
}

/// Builds per-sample Hamiltonians over a fixed layout.
///
/// Interaction couplings and the drive waveform are computed once at
/// construction and shared by every [`build`](Self::build) call.
#[derive(Debug, Clone)]
pub struct HamiltonianBuilder {
    n_sites: usize,
    params: HamiltonianParams,
    rabi: Waveform,
    interactions: Vec<InteractionTerm>,
}

impl HamiltonianBuilder {
    /// Validate parameters and precompute interactions for `layout`.
    pub fn new(layout: &SiteLayout, params: HamiltonianParams) -> Result<Self, EncodingError> {
        let max = params.max_detuning;
        if !(max.is_finite() && max > 0.0) {
            return Err(EncodingError::InvalidMaxDetuning(max));
        }
        let InteractionParams { coefficient, power } = params.interaction;
        if !coefficient.is_finite() {
            return Err(EncodingError::InvalidInteraction(format!(
                "coefficient must be finite, got {coefficient}"
            )));
        }
        if !(power.is_finite() && power > 0.0) {
            return Err(EncodingError::InvalidInteraction(format!(
                "power must be positive and finite, got {power}"
            )));
        }
        if !params.drive.phase.is_finite() {
            return Err(EncodingError::InvalidWaveform(format!(
                "drive phase must be finite, got {}",
                params.drive.phase
            )));
        }

        let rabi = Waveform::trapezoid(
            params.drive.rabi_frequency,
            params.drive.ramp_time,
            params.drive.duration,
        )?;

        let interactions: Vec<InteractionTerm> = layout
            .pairs()
            .map(|(i, j, r)| InteractionTerm {
                i,
                j,
                coeff: coefficient / r.powf(power),
            })
            .collect();

        debug!(
            n_sites = layout.len(),
            n_interactions = interactions.len(),
            power,
            "precomputed interaction couplings"
        );

        Ok(Self {
            n_sites: layout.len(),
            params,
            rabi,
            interactions,
        })
    }

    /// Number of sites of the underlying layout.
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Parameters in use.
    pub fn params(&self) -> &HamiltonianParams {
        &self.params
    }

    /// Precomputed interaction terms.
    pub fn interactions(&self) -> &[InteractionTerm] {
        &self.interactions
    }

    /// Encode one reduced sample as site detunings.
    ///
    /// Coordinate `i` becomes the constant detuning of site `i`; sites at or
    /// beyond `reduced.len()` get [`BASELINE_DETUNING`].
    pub fn build(&self, reduced: &[f64]) -> Result<Hamiltonian, EncodingError> {
        if reduced.len() > self.n_sites {
            return Err(EncodingError::TooManyCoordinates {
                coordinates: reduced.len(),
                sites: self.n_sites,
            });
        }
        let max = self.params.max_detuning;
        for (site, &value) in reduced.iter().enumerate() {
            if !(value.is_finite() && value.abs() <= max) {
                return Err(EncodingError::DetuningOutOfRange { site, value, max });
            }
        }

        let waveforms = (0..self.n_sites)
            .map(|site| {
                let value = reduced.get(site).copied().unwrap_or(BASELINE_DETUNING);
                Waveform::Constant(value)
            })
            .collect();

        Ok(Hamiltonian {
            n_sites: self.n_sites,
            rabi: self.rabi.clone(),
            phase: self.params.drive.phase,
            detuning: DetuningSchedule {
                waveforms,
                encoded: reduced.len(),
            },
            interactions: self.interactions.clone(),
        })
    }
}

/// One-shot convenience over [`HamiltonianBuilder`].
pub fn build_hamiltonian(
    layout: &SiteLayout,
    reduced: &[f64],
    params: HamiltonianParams,
) -> Result<Hamiltonian, EncodingError> {
    HamiltonianBuilder::new(layout, params)?.build(reduced)
}
