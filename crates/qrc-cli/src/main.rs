//! QRC Command-Line Interface
//!
//! Train, evaluate and inspect quantum reservoir classifiers.
//!
//! ```text
//!   qrc train    --data train.json --config reservoir.yaml --output model.json
//!   qrc predict  --model model.json --data test.json
//!   qrc features --config reservoir.yaml --data train.json
//!   qrc layout   --sites 9 --spacing 6 --lattice square
//!   qrc demo
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use qrc_sim::Lattice;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{demo, features, layout, predict, train, version};

/// QRC - quantum reservoir computing on simulated Rydberg arrays
#[derive(Parser)]
#[command(name = "qrc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit projection, reservoir features and readout on a labelled dataset
    Train {
        /// Dataset JSON ({"samples": [[...]], "labels": [...]})
        #[arg(short, long)]
        data: String,

        /// Reservoir configuration (YAML)
        #[arg(short, long)]
        config: String,

        /// Output model file
        #[arg(short, long, default_value = "model.json")]
        output: String,
    },

    /// Predict labels with a trained model
    Predict {
        /// Trained model file
        #[arg(short, long)]
        model: String,

        /// Dataset JSON (labels optional)
        #[arg(short, long)]
        data: String,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Dump reservoir feature vectors
    Features {
        /// Reservoir configuration (YAML)
        #[arg(short, long)]
        config: String,

        /// Dataset JSON
        #[arg(short, long)]
        data: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print atom positions of a lattice
    Layout {
        /// Number of sites
        #[arg(short = 'n', long)]
        sites: usize,

        /// Nearest-neighbour spacing (µm)
        #[arg(short, long, default_value = "6.0")]
        spacing: f64,

        /// Lattice geometry (chain, square, triangular)
        #[arg(short, long, default_value = "chain")]
        lattice: Lattice,
    },

    /// Synthetic two-class end-to-end run
    Demo {
        /// Number of samples
        #[arg(short = 'n', long, default_value = "60")]
        samples: usize,

        /// RNG seed for the synthetic data
        #[arg(short, long, default_value = "7")]
        seed: u64,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Train {
            data,
            config,
            output,
        } => train::execute(&data, &config, &output),

        Commands::Predict {
            model,
            data,
            format,
        } => predict::execute(&model, &data, &format),

        Commands::Features {
            config,
            data,
            output,
        } => features::execute(&config, &data, output.as_deref()),

        Commands::Layout {
            sites,
            spacing,
            lattice,
        } => layout::execute(sites, spacing, lattice),

        Commands::Demo { samples, seed } => demo::execute(samples, seed),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
