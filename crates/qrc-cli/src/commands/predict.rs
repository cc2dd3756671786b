//! Predict command implementation.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use qrc::{QrcModel, Readout};

use super::common::{load_dataset, print_accuracy, print_label_counts};

#[derive(Serialize)]
struct PredictionReport<'a> {
    predictions: &'a [usize],
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
}

/// Execute the predict command.
pub fn execute(model: &str, data: &str, format: &str) -> Result<()> {
    let qrc_model =
        QrcModel::load(model).with_context(|| format!("Failed to load model: {model}"))?;
    let dataset = load_dataset(data)?;
    let samples = dataset.matrix()?;

    let features = qrc_model
        .features_batch(samples.view())
        .context("Feature extraction failed")?;
    let readout = qrc_model.readout();
    let predictions = readout
        .predict_batch(features.view())
        .context("Prediction failed")?;
    let accuracy = match &dataset.labels {
        Some(labels) => Some(readout.score(features.view(), labels)?),
        None => None,
    };

    match format.to_lowercase().as_str() {
        "json" => {
            let report = PredictionReport {
                predictions: &predictions,
                accuracy,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "table" => {
            println!(
                "{} Predicted {} samples with {}",
                style("✓").green().bold(),
                predictions.len(),
                style(model).green()
            );
            for (i, label) in predictions.iter().take(20).enumerate() {
                println!("  {:>5}  {}", i, style(label).cyan());
            }
            if predictions.len() > 20 {
                println!("  ... and {} more", predictions.len() - 20);
            }
            println!();
            print_label_counts(&predictions);
            if let Some(accuracy) = accuracy {
                print_accuracy("Test", accuracy);
            }
        }
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    }

    Ok(())
}
