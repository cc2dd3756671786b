//! End-to-end model: projection → reservoir → readout.

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use qrc_reduce::Projection;
use tracing::info;

use crate::config::ReservoirConfig;
use crate::error::{QrcError, QrcResult, ShapeError};
use crate::persist::ModelArtifact;
use crate::readout::{Readout, RidgeClassifier};
use crate::reservoir::QuantumReservoir;

/// A trained quantum reservoir classifier.
#[derive(Debug)]
pub struct QrcModel {
    projection: Projection,
    reservoir: QuantumReservoir,
    readout: RidgeClassifier,
}

impl QrcModel {
    /// Fit the projection on `samples`, evaluate the reservoir on every
    /// reduced sample and fit the readout on the resulting features.
    pub fn train(
        config: ReservoirConfig,
        samples: ArrayView2<'_, f64>,
        labels: &[usize],
    ) -> QrcResult<Self> {
        if samples.nrows() != labels.len() {
            return Err(ShapeError::LabelCount {
                samples: samples.nrows(),
                labels: labels.len(),
            }
            .into());
        }
        let reservoir = QuantumReservoir::new(config)?;
        let (target_dim, max_scale) = (reservoir.config().target_dim, reservoir.config().max_scale);

        let projection = Projection::fit(samples, target_dim)?;
        let reduced = projection.transform_batch(samples, target_dim, max_scale)?;
        let features = reservoir.features_batch(reduced.view())?;

        let mut readout = RidgeClassifier::new(reservoir.config().readout);
        readout.fit(features.view(), labels)?;

        info!(
            samples = samples.nrows(),
            input_dim = samples.ncols(),
            target_dim,
            feature_len = reservoir.feature_len(),
            "model trained"
        );

        Ok(Self {
            projection,
            reservoir,
            readout,
        })
    }

    /// Rebuild from a saved artifact.
    pub fn from_artifact(artifact: ModelArtifact) -> QrcResult<Self> {
        artifact.check_schema()?;
        artifact
            .projection
            .validate()
            .map_err(|e| QrcError::Serialization(e.to_string()))?;
        artifact
            .readout
            .validate()
            .map_err(|e| QrcError::Serialization(e.to_string()))?;
        let reservoir = QuantumReservoir::new(artifact.config)?;
        let config = reservoir.config();
        if artifact.projection.n_components() < config.target_dim {
            return Err(QrcError::Serialization(format!(
                "projection has {} components but target_dim is {}",
                artifact.projection.n_components(),
                config.target_dim
            )));
        }
        match artifact.readout.feature_len() {
            None => {
                return Err(QrcError::Serialization("readout is not fitted".into()));
            }
            Some(len) if len != reservoir.feature_len() => {
                return Err(ShapeError::FeatureLength {
                    expected: reservoir.feature_len(),
                    actual: len,
                }
                .into());
            }
            Some(_) => {}
        }
        Ok(Self {
            projection: artifact.projection,
            reservoir,
            readout: artifact.readout,
        })
    }

    /// Snapshot for persistence.
    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact::new(
            self.reservoir.config().clone(),
            self.projection.clone(),
            self.readout.clone(),
        )
    }

    /// Save as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> QrcResult<()> {
        self.to_artifact().save(path)
    }

    /// Load from JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> QrcResult<Self> {
        Self::from_artifact(ModelArtifact::load(path)?)
    }

    /// Configuration.
    pub fn config(&self) -> &ReservoirConfig {
        self.reservoir.config()
    }

    /// Fitted projection.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Reservoir.
    pub fn reservoir(&self) -> &QuantumReservoir {
        &self.reservoir
    }

    /// Fitted readout.
    pub fn readout(&self) -> &RidgeClassifier {
        &self.readout
    }

    /// Readout accuracy on the training set.
    pub fn training_accuracy(&self) -> Option<f64> {
        self.readout.training_accuracy()
    }

    /// Reduce one raw sample with the fitted projection.
    pub fn reduce(&self, sample: ArrayView1<'_, f64>) -> QrcResult<Array1<f64>> {
        let config = self.config();
        Ok(self
            .projection
            .transform(sample, config.target_dim, config.max_scale)?)
    }

    /// Reservoir features of one raw sample.
    pub fn features(&self, sample: ArrayView1<'_, f64>) -> QrcResult<Array1<f64>> {
        let reduced = self.reduce(sample)?;
        self.reservoir.features(reduced.view())
    }

    /// Reservoir features of every raw sample.
    pub fn features_batch(&self, samples: ArrayView2<'_, f64>) -> QrcResult<Array2<f64>> {
        let config = self.config();
        let reduced = self
            .projection
            .transform_batch(samples, config.target_dim, config.max_scale)?;
        self.reservoir.features_batch(reduced.view())
    }

    /// Predicted label of one raw sample.
    pub fn predict(&self, sample: ArrayView1<'_, f64>) -> QrcResult<usize> {
        let features = self.features(sample)?;
        self.readout.predict(features.view())
    }

    /// Predicted labels of every raw sample.
    pub fn predict_batch(&self, samples: ArrayView2<'_, f64>) -> QrcResult<Vec<usize>> {
        let features = self.features_batch(samples)?;
        self.readout.predict_batch(features.view())
    }

    /// Accuracy on labelled raw samples.
    pub fn score(&self, samples: ArrayView2<'_, f64>, labels: &[usize]) -> QrcResult<f64> {
        let features = self.features_batch(samples)?;
        self.readout.score(features.view(), labels)
    }
}
