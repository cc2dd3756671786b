//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Dataset file: one row per sample, labels optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub samples: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<usize>>,
}

impl Dataset {
    /// Samples as an `(n, input_dim)` matrix.
    pub fn matrix(&self) -> Result<Array2<f64>> {
        let width = self.samples.first().map_or(0, Vec::len);
        if let Some((row, r)) = self
            .samples
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != width)
        {
            anyhow::bail!(
                "Ragged dataset: sample {row} has {} values, expected {width}",
                r.len()
            );
        }
        let flat: Vec<f64> = self.samples.iter().flatten().copied().collect();
        Array2::from_shape_vec((self.samples.len(), width), flat)
            .context("Failed to build sample matrix")
    }

    /// Labels, failing when absent.
    pub fn require_labels(&self) -> Result<&[usize]> {
        self.labels
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Dataset has no \"labels\" field"))
    }
}

/// Load a dataset from a JSON file.
pub fn load_dataset(path: &str) -> Result<Dataset> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    let dataset: Dataset =
        serde_json::from_str(&source).with_context(|| format!("Invalid dataset JSON: {path}"))?;
    if dataset.samples.is_empty() {
        anyhow::bail!("Dataset has no samples: {path}");
    }
    debug!(
        path,
        samples = dataset.samples.len(),
        labelled = dataset.labels.is_some(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Print a label histogram with bars (shared by train, predict, demo).
pub fn print_label_counts(labels: &[usize]) {
    let mut counts: Vec<(usize, usize)> = Vec::new();
    for &label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, c)) => *c += 1,
            None => counts.push((label, 1)),
        }
    }
    counts.sort_unstable();

    let total = labels.len().max(1) as f64;
    for (label, count) in counts {
        let pct = count as f64 / total * 100.0;
        let bar: String = "█".repeat((pct / 2.0).round() as usize);
        println!(
            "  {}: {:>6} ({:>5.1}%) {}",
            style(label).cyan(),
            count,
            pct,
            style(bar).green()
        );
    }
}

/// Print an accuracy line.
pub fn print_accuracy(label: &str, accuracy: f64) {
    println!(
        "  {label} accuracy: {}",
        style(format!("{:.2}%", accuracy * 100.0)).yellow().bold()
    );
}
