//! `qrc-reduce` — principal-component reduction for reservoir inputs.
//!
//! Raw samples (flattened images, sensor frames, ...) are far wider than the
//! number of sites a simulated atom array can drive.  This crate fits a
//! [`Projection`] onto the top-`k` principal components of a training corpus
//! and maps every sample to `k` coordinates in `[-Δmax, Δmax]`, the range of
//! physically valid local detunings.
//!
//! Fitting and transforming are separate operations: the projection fitted on
//! the training split is reused verbatim for held-out data so both live in the
//! same feature space.
//!
//! # Quick start
//!
//! ```rust
//! use ndarray::array;
//! use qrc_reduce::Projection;
//!
//! let train = array![[0.0, 1.0, 2.0], [1.0, 0.0, 1.0], [2.0, 2.0, 0.0], [3.0, 1.0, 1.0]];
//! let projection = Projection::fit(train.view(), 2).unwrap();
//!
//! let reduced = projection.transform(train.row(0), 2, 6.0).unwrap();
//! assert_eq!(reduced.len(), 2);
//! assert!(reduced.iter().all(|v| v.abs() <= 6.0));
//! ```

pub mod error;
pub mod projection;

pub use error::{DimensionError, ReduceResult};
pub use projection::Projection;
