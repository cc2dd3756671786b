//! Reservoir configuration.
//!
//! Loaded from YAML.  Six keys are required; every other section has a
//! documented default:
//!
//! ```yaml
//! target_dim: 2
//! max_scale: 6.0            # Δmax, rad/µs
//! site_count: 4
//! spacing: 6.0              # µm
//! time_schedule: [0.0, 0.5, 1.0]   # µs
//! interaction_power: 6.0
//!
//! lattice: chain            # chain | square | triangular
//! interaction_coefficient: 5420472.8   # C6 for Rb 70S, rad·µm⁶/µs
//! drive:
//!   rabi_frequency: 6.283185307179586
//!   phase: 0.0
//!   ramp_time: 0.05
//! engine:
//!   order: second           # first | second
//!   max_step: 0.001
//!   norm_tolerance: 1.0e-6
//!   max_sites: 20
//!   observable: rydberg_density
//!   workers: 8
//! readout:
//!   ridge_lambda: 0.001
//!   standardize: true
//! ```
//!
//! Precedence (highest first): `QRC_*` environment variables, the file,
//! defaults.

use std::f64::consts::PI;
use std::path::Path;

use qrc_sim::dynamics::{EngineOptions, SplittingOrder, TimeSchedule};
use qrc_sim::hamiltonian::{C6_RB70S, DriveParams, HamiltonianParams, InteractionParams};
use qrc_sim::layout::{Lattice, SiteLayout};
use qrc_sim::observable::Observable;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QrcError, QrcResult};
use crate::readout::RidgeParams;

/// Environment variable overriding `engine.workers`.
pub const ENV_WORKERS: &str = "QRC_WORKERS";

/// Environment variable overriding `engine.max_sites`.
pub const ENV_MAX_SITES: &str = "QRC_MAX_SITES";

/// Complete reservoir configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservoirConfig {
    /// Retained principal components `k`.
    pub target_dim: usize,

    /// Δmax: reduced coordinates are scaled into `[-max_scale, max_scale]`.
    pub max_scale: f64,

    /// Number of atoms N.
    pub site_count: usize,

    /// Nearest-neighbour spacing (µm).
    pub spacing: f64,

    /// Recorded time points (µs); the last one is the pulse duration.
    pub time_schedule: Vec<f64>,

    /// Interaction decay power p.
    pub interaction_power: f64,

    /// Lattice geometry.
    #[serde(default)]
    pub lattice: Lattice,

    /// Interaction strength C in `C / r^p`.
    #[serde(default = "default_interaction_coefficient")]
    pub interaction_coefficient: f64,

    /// Global drive.
    #[serde(default)]
    pub drive: DriveConfig,

    /// Numerical engine.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Readout hyper-parameters.
    #[serde(default)]
    pub readout: RidgeParams,
}

/// Global Rabi drive settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Peak Rabi frequency (rad/µs).
    #[serde(default = "default_rabi_frequency")]
    pub rabi_frequency: f64,

    /// Laser phase (rad).
    #[serde(default)]
    pub phase: f64,

    /// Rise and fall time (µs).
    #[serde(default = "default_ramp_time")]
    pub ramp_time: f64,
}

/// Dynamics engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Splitting order.
    #[serde(default)]
    pub order: SplittingOrder,

    /// Longest sub-step (µs).
    #[serde(default = "default_max_step")]
    pub max_step: f64,

    /// Norm and observable-range tolerance.
    #[serde(default = "default_norm_tolerance")]
    pub norm_tolerance: f64,

    /// Largest site count the exact engine accepts.
    #[serde(default = "default_max_sites")]
    pub max_sites: usize,

    /// Recorded observable.
    #[serde(default)]
    pub observable: Observable,

    /// Worker threads for batch evaluation; `None` uses the global pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

// Default value functions
fn default_interaction_coefficient() -> f64 {
    C6_RB70S
}

fn default_rabi_frequency() -> f64 {
    2.0 * PI
}

fn default_ramp_time() -> f64 {
    0.05
}

fn default_max_step() -> f64 {
    1e-3
}

fn default_norm_tolerance() -> f64 {
    1e-6
}

fn default_max_sites() -> usize {
    20
}

impl Default for DriveConfig {
    fn default() -> Self {
        DriveConfig {
            rabi_frequency: default_rabi_frequency(),
            phase: 0.0,
            ramp_time: default_ramp_time(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            order: SplittingOrder::default(),
            max_step: default_max_step(),
            norm_tolerance: default_norm_tolerance(),
            max_sites: default_max_sites(),
            observable: Observable::default(),
            workers: None,
        }
    }
}

impl EngineConfig {
    /// Engine options for the dynamics crate.
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            order: self.order,
            max_step: self.max_step,
            norm_tolerance: self.norm_tolerance,
            max_sites: self.max_sites,
            observable: self.observable,
        }
    }
}

impl ReservoirConfig {
    /// Configuration with the six required parameters and default sections.
    pub fn new(
        target_dim: usize,
        max_scale: f64,
        site_count: usize,
        spacing: f64,
        time_schedule: Vec<f64>,
        interaction_power: f64,
    ) -> Self {
        Self {
            target_dim,
            max_scale,
            site_count,
            spacing,
            time_schedule,
            interaction_power,
            lattice: Lattice::default(),
            interaction_coefficient: default_interaction_coefficient(),
            drive: DriveConfig::default(),
            engine: EngineConfig::default(),
            readout: RidgeParams::default(),
        }
    }

    /// Parse YAML without validating.
    pub fn from_yaml_str(contents: &str) -> QrcResult<Self> {
        Ok(serde_yaml_ng::from_str(contents)?)
    }

    /// Load and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> QrcResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            QrcError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_yaml_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file, apply `QRC_*` environment overrides, validate.
    pub fn load<P: AsRef<Path>>(path: P) -> QrcResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            QrcError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_yaml_str(&contents)?.merge_env();
        config.validate()?;
        debug!(path = %path.display(), "loaded reservoir configuration");
        Ok(config)
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> QrcResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Merge `QRC_*` variables from the process environment.
    pub fn merge_env(self) -> Self {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// Merge overrides from `lookup`.
    ///
    /// Only variables that are present override the current values.
    /// Unparseable values are logged and ignored.
    pub fn merge_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_WORKERS) {
            match v.trim().parse() {
                Ok(val) => self.engine.workers = Some(val),
                Err(_) => warn!(variable = ENV_WORKERS, value = %v, "ignoring unparseable override"),
            }
        }
        if let Some(v) = lookup(ENV_MAX_SITES) {
            match v.trim().parse() {
                Ok(val) => self.engine.max_sites = val,
                Err(_) => warn!(variable = ENV_MAX_SITES, value = %v, "ignoring unparseable override"),
            }
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> QrcResult<()> {
        if self.target_dim == 0 {
            return Err(QrcError::Config("target_dim must be at least 1".into()));
        }
        if self.site_count == 0 {
            return Err(QrcError::Config("site_count must be at least 1".into()));
        }
        if self.target_dim > self.site_count {
            return Err(QrcError::Config(format!(
                "target_dim ({}) exceeds site_count ({}); each component drives one site",
                self.target_dim, self.site_count
            )));
        }
        if !(self.max_scale.is_finite() && self.max_scale > 0.0) {
            return Err(QrcError::Config(format!(
                "max_scale must be positive and finite, got {}",
                self.max_scale
            )));
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(QrcError::Config(format!(
                "spacing must be positive and finite, got {}",
                self.spacing
            )));
        }
        let schedule = TimeSchedule::new(self.time_schedule.clone())
            .map_err(|e| QrcError::Config(e.to_string()))?;
        if schedule.duration() <= 0.0 {
            return Err(QrcError::Config(
                "time_schedule must end after t = 0".into(),
            ));
        }
        if !(self.interaction_power.is_finite() && self.interaction_power > 0.0) {
            return Err(QrcError::Config(format!(
                "interaction_power must be positive and finite, got {}",
                self.interaction_power
            )));
        }
        if !self.interaction_coefficient.is_finite() {
            return Err(QrcError::Config(format!(
                "interaction_coefficient must be finite, got {}",
                self.interaction_coefficient
            )));
        }
        if !(self.drive.rabi_frequency.is_finite() && self.drive.phase.is_finite()) {
            return Err(QrcError::Config(
                "drive rabi_frequency and phase must be finite".into(),
            ));
        }
        if !(self.drive.ramp_time.is_finite() && self.drive.ramp_time >= 0.0) {
            return Err(QrcError::Config(format!(
                "drive ramp_time must be non-negative, got {}",
                self.drive.ramp_time
            )));
        }
        self.engine
            .options()
            .validate()
            .map_err(|e| QrcError::Config(e.to_string()))?;
        if self.site_count > self.engine.max_sites {
            return Err(QrcError::Config(format!(
                "site_count ({}) exceeds engine.max_sites ({})",
                self.site_count, self.engine.max_sites
            )));
        }
        if self.engine.workers == Some(0) {
            return Err(QrcError::Config("engine.workers must be at least 1".into()));
        }
        self.readout
            .validate()
            .map_err(|e| QrcError::Config(e.to_string()))?;
        Ok(())
    }

    /// Validated time schedule.
    pub fn schedule(&self) -> QrcResult<TimeSchedule> {
        Ok(TimeSchedule::new(self.time_schedule.clone())?)
    }

    /// Site layout of this configuration.
    pub fn layout(&self) -> QrcResult<SiteLayout> {
        Ok(SiteLayout::generate(
            self.lattice,
            self.site_count,
            self.spacing,
        )?)
    }

    /// Hamiltonian parameters; the drive spans the whole schedule.
    pub fn hamiltonian_params(&self) -> HamiltonianParams {
        HamiltonianParams {
            drive: DriveParams {
                rabi_frequency: self.drive.rabi_frequency,
                phase: self.drive.phase,
                ramp_time: self.drive.ramp_time,
                duration: self.time_schedule.last().copied().unwrap_or(0.0),
            },
            max_detuning: self.max_scale,
            interaction: InteractionParams {
                coefficient: self.interaction_coefficient,
                power: self.interaction_power,
            },
        }
    }

    /// `(T_recorded, N)`.
    pub fn trace_shape(&self) -> (usize, usize) {
        (self.time_schedule.len(), self.site_count)
    }

    /// Length of every feature vector.
    pub fn feature_len(&self) -> usize {
        self.time_schedule.len() * self.site_count
    }
}
