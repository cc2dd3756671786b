//! Features command implementation.

use std::fs;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use qrc::{QuantumReservoir, ReservoirConfig};
use qrc_reduce::Projection;

use super::common::load_dataset;

#[derive(Serialize)]
struct FeatureDump {
    steps: usize,
    sites: usize,
    features: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<Vec<usize>>,
}

/// Execute the features command.
pub fn execute(config: &str, data: &str, output: Option<&str>) -> Result<()> {
    let config = ReservoirConfig::load(config)
        .with_context(|| format!("Failed to load configuration: {config}"))?;
    let dataset = load_dataset(data)?;
    let samples = dataset.matrix()?;

    let projection = Projection::fit(samples.view(), config.target_dim)
        .context("Failed to fit projection")?;
    let reduced = projection.transform_batch(samples.view(), config.target_dim, config.max_scale)?;
    let reservoir = QuantumReservoir::new(config)?;
    let matrix = reservoir.features_batch(reduced.view())?;

    let (steps, sites) = reservoir.assembler().shape();
    let dump = FeatureDump {
        steps,
        sites,
        features: matrix.rows().into_iter().map(|r| r.to_vec()).collect(),
        labels: dataset.labels,
    };
    let json = serde_json::to_string_pretty(&dump)?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
            eprintln!(
                "{} Wrote {} feature vectors of length {} to {}",
                style("✓").green().bold(),
                matrix.nrows(),
                matrix.ncols(),
                style(path).green()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
