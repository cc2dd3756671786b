//! Demo command implementation.

use anyhow::{Context, Result};
use console::style;
use ndarray::{Array2, s};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qrc::{QrcModel, ReservoirConfig};

use super::common::{print_accuracy, print_label_counts};

const INPUT_DIM: usize = 8;

/// Two noisy classes in `INPUT_DIM` dimensions separated along a fixed direction.
fn synthetic(samples: usize, seed: u64) -> (Array2<f64>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let labels: Vec<usize> = (0..samples).map(|i| i % 2).collect();
    let mut x = Array2::<f64>::zeros((samples, INPUT_DIM));
    for (i, mut row) in x.rows_mut().into_iter().enumerate() {
        let sign = if labels[i] == 0 { -1.0 } else { 1.0 };
        for (j, v) in row.iter_mut().enumerate() {
            let direction = if j % 2 == 0 { 1.0 } else { 0.5 };
            *v = sign * direction + 0.4 * (rng.r#gen::<f64>() - 0.5);
        }
    }
    (x, labels)
}

/// Execute the demo command.
pub fn execute(samples: usize, seed: u64) -> Result<()> {
    if samples < 6 {
        anyhow::bail!("Demo needs at least 6 samples, got {samples}");
    }

    let config = ReservoirConfig::new(2, 6.0, 4, 6.0, vec![0.0, 0.25, 0.5, 0.75, 1.0], 6.0);
    let (x, y) = synthetic(samples, seed);
    let split = samples * 2 / 3;

    println!(
        "{} Demo: {} samples ({} train, {} test), {} → {} dimensions, {} atoms",
        style("→").cyan().bold(),
        samples,
        split,
        samples - split,
        INPUT_DIM,
        config.target_dim,
        config.site_count
    );
    print_label_counts(&y);

    let train_x = x.slice(s![..split, ..]);
    let test_x = x.slice(s![split.., ..]);
    let model = QrcModel::train(config, train_x, &y[..split]).context("Training failed")?;

    let explained: f64 = model
        .projection()
        .explained_variance_ratio()
        .iter()
        .take(model.config().target_dim)
        .sum();
    println!(
        "  Explained variance (k = {}): {}",
        model.config().target_dim,
        style(format!("{:.1}%", explained * 100.0)).yellow()
    );

    println!("{} Training complete", style("✓").green().bold());
    let train_accuracy = model
        .training_accuracy()
        .context("Trained model has no training accuracy")?;
    print_accuracy("Train", train_accuracy);
    print_accuracy("Test", model.score(test_x, &y[split..])?);

    Ok(())
}
