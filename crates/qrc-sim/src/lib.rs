//! `qrc-sim` — Rydberg atom-array reservoir dynamics.
//!
//! Turns a reduced input vector into a per-site, per-time observable trace:
//!
//! - **Layout**: deterministic chain, square or triangular site geometry
//! - **Hamiltonian**: global Rabi drive, input-encoded local detunings and
//!   `C / r^p` pairwise interactions
//! - **Dynamics**: exact statevector evolution with first- or second-order
//!   operator splitting behind the [`DynamicsEngine`] trait
//!
//! # Quick start
//!
//! ```rust
//! use qrc_sim::dynamics::{DynamicsEngine, StatevectorEngine, TimeSchedule};
//! use qrc_sim::hamiltonian::{HamiltonianBuilder, HamiltonianParams};
//! use qrc_sim::layout::generate_sites;
//!
//! let layout = generate_sites(3, 6.0).unwrap();
//! let builder = HamiltonianBuilder::new(&layout, HamiltonianParams::new(6.0, 0.5)).unwrap();
//! let h = builder.build(&[2.0, -1.0]).unwrap();
//!
//! let schedule = TimeSchedule::new(vec![0.0, 0.25, 0.5]).unwrap();
//! let trace = StatevectorEngine::default().evolve(&h, &schedule).unwrap();
//! assert_eq!(trace.shape(), (3, 3));
//! ```

pub mod dynamics;
pub mod error;
pub mod hamiltonian;
pub mod layout;
pub mod observable;
pub mod statevector;
pub mod waveform;

pub use dynamics::{DynamicsEngine, EngineOptions, SplittingOrder, StatevectorEngine, TimeSchedule};
pub use error::{DynamicsError, EncodingError, LayoutError, SimError, SimResult};
pub use hamiltonian::{
    DriveParams, Hamiltonian, HamiltonianBuilder, HamiltonianParams, InteractionParams,
    build_hamiltonian,
};
pub use layout::{Lattice, SiteLayout, generate_sites};
pub use observable::{Observable, ObservableTrace};
pub use statevector::Statevector;
pub use waveform::Waveform;
