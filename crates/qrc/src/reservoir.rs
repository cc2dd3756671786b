//! The quantum reservoir: reduced sample → Hamiltonian → trace → features.
//!
//! A [`QuantumReservoir`] owns the immutable per-configuration state (site
//! layout, precomputed interactions, schedule, engine) and evaluates samples
//! through `&self`, so one reservoir can be shared across worker threads.

use std::fmt;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use qrc_sim::dynamics::{DynamicsEngine, StatevectorEngine, TimeSchedule};
use qrc_sim::hamiltonian::{Hamiltonian, HamiltonianBuilder};
use qrc_sim::layout::SiteLayout;
use qrc_sim::observable::ObservableTrace;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ReservoirConfig;
use crate::error::{QrcError, QrcResult, ShapeError};
use crate::features::FeatureAssembler;

/// Outcome of [`QuantumReservoir::features_batch_lenient`].
#[derive(Debug)]
pub struct BatchFeatures {
    /// Feature rows of the samples that succeeded, in input order.
    pub features: Array2<f64>,
    /// Input row index of each feature row.
    pub indices: Vec<usize>,
    /// Input row index and error of each sample that failed.
    pub failures: Vec<(usize, QrcError)>,
}

impl BatchFeatures {
    /// True when every sample succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fixed reservoir for one configuration.
pub struct QuantumReservoir {
    config: ReservoirConfig,
    layout: SiteLayout,
    builder: HamiltonianBuilder,
    schedule: TimeSchedule,
    engine: Box<dyn DynamicsEngine>,
    assembler: FeatureAssembler,
    /// Dedicated batch pool when `engine.workers` is set.
    pool: Option<rayon::ThreadPool>,
}

impl fmt::Debug for QuantumReservoir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantumReservoir")
            .field("config", &self.config)
            .field("layout", &self.layout)
            .field("engine", &self.engine.name())
            .field("assembler", &self.assembler)
            .field("workers", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .finish_non_exhaustive()
    }
}

impl QuantumReservoir {
    /// Reservoir with the exact statevector engine configured by `config.engine`.
    pub fn new(config: ReservoirConfig) -> QrcResult<Self> {
        config.validate()?;
        let engine = StatevectorEngine::new(config.engine.options())?;
        Self::with_engine(config, Box::new(engine))
    }

    /// Reservoir with a caller-supplied engine.
    pub fn with_engine(
        config: ReservoirConfig,
        engine: Box<dyn DynamicsEngine>,
    ) -> QrcResult<Self> {
        config.validate()?;
        let layout = config.layout()?;
        let builder = HamiltonianBuilder::new(&layout, config.hamiltonian_params())?;
        let schedule = config.schedule()?;
        let (steps, sites) = config.trace_shape();
        let assembler = FeatureAssembler::new(steps, sites);
        let pool = config
            .engine
            .workers
            .map(|threads| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| QrcError::Config(format!("cannot build worker pool: {e}")))
            })
            .transpose()?;

        info!(
            sites,
            lattice = %layout.lattice(),
            steps,
            engine = engine.name(),
            observable = engine.observable().name(),
            "reservoir constructed"
        );

        Ok(Self {
            config,
            layout,
            builder,
            schedule,
            engine,
            assembler,
            pool,
        })
    }

    /// Configuration.
    pub fn config(&self) -> &ReservoirConfig {
        &self.config
    }

    /// Site layout, shared by every sample.
    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// Recorded time points.
    pub fn schedule(&self) -> &TimeSchedule {
        &self.schedule
    }

    /// Feature assembler.
    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    /// Length of every feature vector.
    pub fn feature_len(&self) -> usize {
        self.assembler.feature_len()
    }

    /// Hamiltonian encoding `reduced`.
    pub fn hamiltonian(&self, reduced: ArrayView1<'_, f64>) -> QrcResult<Hamiltonian> {
        let coords = reduced.to_vec();
        Ok(self.builder.build(&coords)?)
    }

    /// Observable trace of one reduced sample.
    pub fn trace(&self, reduced: ArrayView1<'_, f64>) -> QrcResult<ObservableTrace> {
        let hamiltonian = self.hamiltonian(reduced)?;
        Ok(self.engine.evolve(&hamiltonian, &self.schedule)?)
    }

    /// Feature vector of one reduced sample.
    pub fn features(&self, reduced: ArrayView1<'_, f64>) -> QrcResult<Array1<f64>> {
        let trace = self.trace(reduced)?;
        let features = self.assembler.assemble(&trace)?;
        debug!(coords = reduced.len(), features = features.len(), "sample evaluated");
        Ok(features)
    }

    /// Feature matrix of every row, evaluated in parallel.
    ///
    /// The first failing sample aborts the batch.
    pub fn features_batch(&self, reduced: ArrayView2<'_, f64>) -> QrcResult<Array2<f64>> {
        let rows: Vec<Array1<f64>> = self.in_pool(|| {
            (0..reduced.nrows())
                .into_par_iter()
                .map(|i| self.features(reduced.row(i)))
                .collect::<QrcResult<Vec<_>>>()
        })?;
        stack_rows(&rows, self.feature_len())
    }

    /// Feature matrix of the rows that succeed; failed rows are reported
    /// and skipped.
    pub fn features_batch_lenient(&self, reduced: ArrayView2<'_, f64>) -> QrcResult<BatchFeatures> {
        let results: Vec<(usize, QrcResult<Array1<f64>>)> = self.in_pool(|| {
            (0..reduced.nrows())
                .into_par_iter()
                .map(|i| (i, self.features(reduced.row(i))))
                .collect()
        });

        let mut rows = Vec::with_capacity(results.len());
        let mut indices = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (i, result) in results {
            match result {
                Ok(row) => {
                    rows.push(row);
                    indices.push(i);
                }
                Err(e) => {
                    warn!(sample = i, stage = %e.stage(), error = %e, "skipping sample");
                    failures.push((i, e));
                }
            }
        }

        Ok(BatchFeatures {
            features: stack_rows(&rows, self.feature_len())?,
            indices,
            failures,
        })
    }

    /// Run `op` on the dedicated pool, or the global one when unset.
    fn in_pool<T, F>(&self, op: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// Stack equal-length rows into a matrix (`0 × width` when empty).
pub(crate) fn stack_rows(rows: &[Array1<f64>], width: usize) -> QrcResult<Array2<f64>> {
    let mut out = Array2::<f64>::zeros((rows.len(), width));
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ShapeError::RaggedRow {
                row: i,
                expected: width,
                actual: row.len(),
            }
            .into());
        }
        out.row_mut(i).assign(row);
    }
    Ok(out)
}
