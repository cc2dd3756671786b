//! Saved models.
//!
//! A [`ModelArtifact`] is everything inference needs: the reservoir
//! configuration, the fitted projection (mean, components, per-component
//! score range) and the fitted readout.  It is stored as a single JSON file.

use std::path::Path;

use chrono::{DateTime, Utc};
use qrc_reduce::Projection;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ReservoirConfig;
use crate::error::{QrcError, QrcResult};
use crate::readout::RidgeClassifier;

/// Artifact format version.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Serialized trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Schema version for forward compatibility.
    pub schema_version: String,
    /// When the model was trained.
    pub created_at: DateTime<Utc>,
    /// Crate version that wrote the artifact.
    pub qrc_version: String,
    /// Reservoir configuration.
    pub config: ReservoirConfig,
    /// Fitted projection.
    pub projection: Projection,
    /// Fitted readout.
    pub readout: RidgeClassifier,
}

impl ModelArtifact {
    /// Stamp a new artifact with the current time and crate version.
    pub fn new(config: ReservoirConfig, projection: Projection, readout: RidgeClassifier) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.into(),
            created_at: Utc::now(),
            qrc_version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            projection,
            readout,
        }
    }

    /// Write as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> QrcResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| QrcError::Io(format!("cannot write {}: {e}", path.display())))?;
        info!(path = %path.display(), "model saved");
        Ok(())
    }

    /// Read and check the schema version.
    pub fn load<P: AsRef<Path>>(path: P) -> QrcResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| QrcError::Io(format!("cannot read {}: {e}", path.display())))?;
        let artifact: ModelArtifact = serde_json::from_str(&contents)?;
        artifact.check_schema()?;
        Ok(artifact)
    }

    /// Reject artifacts from an incompatible major schema version.
    pub fn check_schema(&self) -> QrcResult<()> {
        let major = |v: &str| v.split('.').next().map(str::to_owned);
        if major(&self.schema_version) != major(SCHEMA_VERSION) {
            return Err(QrcError::Serialization(format!(
                "unsupported schema version {} (expected {SCHEMA_VERSION})",
                self.schema_version
            )));
        }
        Ok(())
    }
}
