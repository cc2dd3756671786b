//! `qrc` — quantum reservoir computing on simulated Rydberg atom arrays.
//!
//! The pipeline for every sample is strictly sequential:
//!
//! ```text
//!   raw sample ──► Projection ──► HamiltonianBuilder ──► DynamicsEngine ──► FeatureAssembler ──► Readout
//!   (input_dim)    (k coords in    (detuning on sites    (trace T × N)      (T·N features)       (label)
//!                   [-Δmax, Δmax])  0..k, drive, C/r^p)
//! ```
//!
//! The fitted [`Projection`](qrc_reduce::Projection) and the site layout are
//! immutable after construction and shared by all samples; samples are
//! independent and evaluated in parallel.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use ndarray::Array2;
//! use qrc::{QrcModel, ReservoirConfig};
//!
//! let config = ReservoirConfig::new(2, 6.0, 4, 6.0, vec![0.0, 0.5, 1.0], 6.0);
//! let samples = Array2::from_shape_fn((40, 8), |(i, j)| ((i * 7 + j * 3) % 11) as f64);
//! let labels: Vec<usize> = (0..40).map(|i| i % 2).collect();
//!
//! let model = QrcModel::train(config, samples.view(), &labels).unwrap();
//! let prediction = model.predict(samples.row(0)).unwrap();
//! assert!(prediction < 2);
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod persist;
pub mod readout;
pub mod reservoir;

pub use config::{DriveConfig, EngineConfig, ReservoirConfig};
pub use error::{NotFittedError, QrcError, QrcResult, ReadoutError, ShapeError, Stage};
pub use features::FeatureAssembler;
pub use model::QrcModel;
pub use persist::{ModelArtifact, SCHEMA_VERSION};
pub use readout::{Readout, RidgeClassifier, RidgeParams};
pub use reservoir::{BatchFeatures, QuantumReservoir};
