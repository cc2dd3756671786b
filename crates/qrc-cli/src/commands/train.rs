//! Train command implementation.

use anyhow::{Context, Result};
use console::style;

use qrc::{QrcModel, ReservoirConfig};

use super::common::{load_dataset, print_accuracy, print_label_counts};

/// Execute the train command.
pub fn execute(data: &str, config: &str, output: &str) -> Result<()> {
    println!(
        "{} Training on {} with {}",
        style("→").cyan().bold(),
        style(data).green(),
        style(config).yellow()
    );

    let config = ReservoirConfig::load(config)
        .with_context(|| format!("Failed to load configuration: {config}"))?;
    let dataset = load_dataset(data)?;
    let samples = dataset.matrix()?;
    let labels = dataset.require_labels()?;

    println!(
        "  Loaded: {} samples × {} features",
        samples.nrows(),
        samples.ncols()
    );
    println!(
        "  Reservoir: {} {} sites, k = {}, {} time points",
        config.site_count,
        config.lattice,
        config.target_dim,
        config.time_schedule.len()
    );
    print_label_counts(labels);

    let model = QrcModel::train(config, samples.view(), labels).context("Training failed")?;
    let accuracy = model
        .training_accuracy()
        .context("Trained model has no training accuracy")?;

    println!("{} Training complete", style("✓").green().bold());
    print_accuracy("Train", accuracy);

    model
        .save(output)
        .with_context(|| format!("Failed to save model: {output}"))?;
    println!("  Output: {}", style(output).green());

    Ok(())
}
