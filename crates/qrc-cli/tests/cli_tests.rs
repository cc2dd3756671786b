//! CLI command parsing and end-to-end tests.
//!
//! Argument parsing is tested through clap `try_parse_from` on a mirror of
//! the binary's structs; the commands themselves run the built `qrc` binary.

// ============================================================================
// Clap argument parsing (test via try_parse_from on equivalent structs)
// ============================================================================

mod clap_parsing {
    use clap::{Parser, Subcommand};
    use qrc_sim::Lattice;

    // Mirror the CLI struct for testing (since main.rs is a binary)
    #[derive(Parser)]
    #[command(name = "qrc")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Train {
            #[arg(short, long)]
            data: String,
            #[arg(short, long)]
            config: String,
            #[arg(short, long, default_value = "model.json")]
            output: String,
        },
        Predict {
            #[arg(short, long)]
            model: String,
            #[arg(short, long)]
            data: String,
            #[arg(short, long, default_value = "table")]
            format: String,
        },
        Layout {
            #[arg(short = 'n', long)]
            sites: usize,
            #[arg(short, long, default_value = "6.0")]
            spacing: f64,
            #[arg(short, long, default_value = "chain")]
            lattice: Lattice,
        },
        Demo {
            #[arg(short = 'n', long, default_value = "60")]
            samples: usize,
            #[arg(short, long, default_value = "7")]
            seed: u64,
        },
        Version,
    }

    #[test]
    fn test_train_defaults() {
        let cli =
            TestCli::try_parse_from(["qrc", "train", "-d", "data.json", "-c", "qrc.yaml"]).unwrap();
        match cli.command {
            TestCommands::Train {
                data,
                config,
                output,
            } => {
                assert_eq!(data, "data.json");
                assert_eq!(config, "qrc.yaml");
                assert_eq!(output, "model.json");
            }
            _ => panic!("expected Train"),
        }
    }

    #[test]
    fn test_train_requires_config() {
        assert!(TestCli::try_parse_from(["qrc", "train", "-d", "data.json"]).is_err());
    }

    #[test]
    fn test_predict_format() {
        let cli = TestCli::try_parse_from([
            "qrc", "predict", "-m", "model.json", "-d", "test.json", "-f", "json",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Predict { model, format, .. } => {
                assert_eq!(model, "model.json");
                assert_eq!(format, "json");
            }
            _ => panic!("expected Predict"),
        }
    }

    #[test]
    fn test_layout_lattice_parsing() {
        let cli =
            TestCli::try_parse_from(["qrc", "layout", "-n", "9", "--lattice", "square"]).unwrap();
        match cli.command {
            TestCommands::Layout {
                sites,
                spacing,
                lattice,
            } => {
                assert_eq!(sites, 9);
                assert_eq!(spacing, 6.0);
                assert_eq!(lattice, Lattice::Square);
            }
            _ => panic!("expected Layout"),
        }
    }

    #[test]
    fn test_layout_unknown_lattice() {
        assert!(TestCli::try_parse_from(["qrc", "layout", "-n", "4", "-l", "hexagonal"]).is_err());
    }

    #[test]
    fn test_demo_defaults() {
        let cli = TestCli::try_parse_from(["qrc", "demo"]).unwrap();
        match cli.command {
            TestCommands::Demo { samples, seed } => {
                assert_eq!(samples, 60);
                assert_eq!(seed, 7);
            }
            _ => panic!("expected Demo"),
        }
    }

    #[test]
    fn test_verbosity() {
        let cli = TestCli::try_parse_from(["qrc", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, TestCommands::Version));
    }

    #[test]
    fn test_no_subcommand() {
        assert!(TestCli::try_parse_from(["qrc"]).is_err());
    }
}

// ============================================================================
// Binary end-to-end
// ============================================================================

mod binary {
    use std::fs;
    use std::path::Path;
    use std::process::{Command, Output};

    const CONFIG: &str = "
target_dim: 2
max_scale: 6.0
site_count: 3
spacing: 6.0
time_schedule: [0.0, 0.4, 0.8]
interaction_power: 6.0
";

    fn qrc(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_qrc"))
            .args(args)
            .env_remove("QRC_WORKERS")
            .env_remove("QRC_MAX_SITES")
            .output()
            .unwrap()
    }

    fn write_dataset(path: &Path, with_labels: bool) {
        let samples: Vec<Vec<f64>> = (0..12)
            .map(|i| {
                let base = if i % 2 == 0 { -1.0 } else { 1.0 };
                (0..4).map(|j| base + ((i * 3 + j) % 5) as f64 * 0.1).collect()
            })
            .collect();
        let mut dataset = serde_json::json!({ "samples": samples });
        if with_labels {
            let labels: Vec<usize> = (0..12).map(|i| i % 2).collect();
            dataset["labels"] = serde_json::json!(labels);
        }
        fs::write(path, dataset.to_string()).unwrap();
    }

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn test_version() {
        let out = qrc(&["version"]);
        assert!(out.status.success());
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_layout_prints_every_site() {
        let out = qrc(&["layout", "-n", "4", "-s", "5.0", "-l", "triangular"]);
        assert!(out.status.success());
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert_eq!(stdout.matches('(').count(), 4);
        assert!(stdout.contains("5.000"));
    }

    #[test]
    fn test_layout_rejects_zero_sites() {
        let out = qrc(&["layout", "-n", "0"]);
        assert!(!out.status.success());
        assert!(String::from_utf8_lossy(&out.stderr).contains("Error"));
    }

    #[test]
    fn test_train_then_predict() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("qrc.yaml");
        let train = dir.path().join("train.json");
        let test = dir.path().join("test.json");
        let model = dir.path().join("model.json");
        fs::write(&config, CONFIG).unwrap();
        write_dataset(&train, true);
        write_dataset(&test, false);

        let out = qrc(&[
            "train",
            "-d",
            path_str(&train),
            "-c",
            path_str(&config),
            "-o",
            path_str(&model),
        ]);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        assert!(model.exists());

        let out = qrc(&[
            "predict",
            "-m",
            path_str(&model),
            "-d",
            path_str(&test),
            "-f",
            "json",
        ]);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        let predictions = report["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 12);
        assert!(predictions.iter().all(|p| p.as_u64().unwrap() < 2));
        assert!(report.get("accuracy").is_none());
    }

    #[test]
    fn test_features_dump() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("qrc.yaml");
        let data = dir.path().join("data.json");
        let output = dir.path().join("features.json");
        fs::write(&config, CONFIG).unwrap();
        write_dataset(&data, true);

        let out = qrc(&[
            "features",
            "-c",
            path_str(&config),
            "-d",
            path_str(&data),
            "-o",
            path_str(&output),
        ]);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

        let dump: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(dump["steps"], 3);
        assert_eq!(dump["sites"], 3);
        let rows = dump["features"].as_array().unwrap();
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|r| r.as_array().unwrap().len() == 9));
    }

    #[test]
    fn test_train_without_labels_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("qrc.yaml");
        let data = dir.path().join("data.json");
        fs::write(&config, CONFIG).unwrap();
        write_dataset(&data, false);

        let out = qrc(&["train", "-d", path_str(&data), "-c", path_str(&config)]);
        assert!(!out.status.success());
        assert!(String::from_utf8_lossy(&out.stderr).contains("labels"));
    }

    #[test]
    fn test_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("qrc.yaml");
        fs::write(&config, CONFIG).unwrap();
        let absent = dir.path().join("absent.json");

        let out = qrc(&["train", "-d", path_str(&absent), "-c", path_str(&config)]);
        assert!(!out.status.success());
        assert!(String::from_utf8_lossy(&out.stderr).contains("File not found"));
    }
}
