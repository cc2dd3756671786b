//! Error types for the sim crate.

use thiserror::Error;

/// Invalid atom-array geometry.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LayoutError {
    /// A layout needs at least one site.
    #[error("site count must be at least 1, got {0}")]
    EmptyLayout(usize),

    /// Spacing must be positive and finite.
    #[error("lattice spacing must be positive and finite, got {0}")]
    InvalidSpacing(f64),

    /// Two generated sites are closer than the lattice spacing allows.
    #[error("sites {i} and {j} are {distance} apart, below the minimum spacing {spacing}")]
    CoincidentSites {
        /// First site index.
        i: usize,
        /// Second site index.
        j: usize,
        /// Their separation.
        distance: f64,
        /// Requested spacing.
        spacing: f64,
    },
}

/// A reduced sample that cannot be written into the detuning channel.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EncodingError {
    /// More reduced coordinates than sites to carry them.
    #[error("reduced sample has {coordinates} coordinates but the layout only has {sites} sites")]
    TooManyCoordinates {
        /// Length of the reduced sample.
        coordinates: usize,
        /// Number of sites in the layout.
        sites: usize,
    },

    /// A coordinate lies outside `[-Δmax, Δmax]` (or is not finite).
    #[error("detuning {value} on site {site} is outside [-{max}, {max}]")]
    DetuningOutOfRange {
        /// Site index.
        site: usize,
        /// Offending value.
        value: f64,
        /// Δmax.
        max: f64,
    },

    /// Δmax must be positive and finite.
    #[error("maximum detuning must be positive and finite, got {0}")]
    InvalidMaxDetuning(f64),

    /// A waveform definition is malformed.
    #[error("invalid waveform: {0}")]
    InvalidWaveform(String),

    /// Interaction coefficient or power is out of range.
    #[error("invalid interaction: {0}")]
    InvalidInteraction(String),
}

/// Failure while evolving a state or reading observables off it.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DynamicsError {
    /// The time schedule violates its ordering or range contract.
    #[error("invalid time schedule: {0}")]
    InvalidSchedule(String),

    /// Exact simulation of this many sites exceeds the configured limit.
    #[error("{sites} sites exceed the statevector limit of {max}")]
    TooManySites {
        /// Sites in the Hamiltonian.
        sites: usize,
        /// Configured limit.
        max: usize,
    },

    /// Engine parameters are out of range.
    #[error("invalid engine options: {0}")]
    InvalidOptions(String),

    /// Total probability drifted away from one.
    #[error("norm drifted to {norm_sqr} at t = {time} (tolerance {tolerance})")]
    NormDrift {
        /// Time at which the drift was detected.
        time: f64,
        /// ‖ψ‖².
        norm_sqr: f64,
        /// Allowed deviation.
        tolerance: f64,
    },

    /// An observable left its physical range or became non-finite.
    #[error("observable on site {site} is {value} at t = {time}, outside [{low}, {high}]")]
    NonPhysicalObservable {
        /// Time of the recording.
        time: f64,
        /// Site index.
        site: usize,
        /// Recorded value.
        value: f64,
        /// Lower physical bound.
        low: f64,
        /// Upper physical bound.
        high: f64,
    },
}

/// Any failure in the layout → Hamiltonian → dynamics chain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Geometry failure.
    #[error("layout: {0}")]
    Layout(#[from] LayoutError),

    /// Encoding failure.
    #[error("encoding: {0}")]
    Encoding(#[from] EncodingError),

    /// Dynamics failure.
    #[error("dynamics: {0}")]
    Dynamics(#[from] DynamicsError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
