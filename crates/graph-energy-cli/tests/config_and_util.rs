//! Integration tests for run config parsing, util helpers and `run_fit`.

use std::fs;

use graph_energy::Similarity;
use graph_energy_cli::run::{load_run_config, run_fit, run_propagation, RunConfig};
use graph_energy_cli::util::validate_tsv_or_csv_file;
use tempfile::TempDir;

#[test]
fn run_config_reads_partial_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{"standardize": true, "reader": {"label_column": "class"}, "energy": {"magnitude_penalty": 0.25}}"#,
    )
    .unwrap();

    let config = load_run_config(&path).unwrap();
    assert!(config.standardize);
    assert_eq!(config.reader.label_column, "class");
    assert_eq!(config.reader.group_column, None);
    assert_eq!(config.energy.magnitude_penalty, 0.25);
    assert_eq!(config.energy.smoothness_penalty, 1.0);
    assert!(matches!(config.energy.similarity, Similarity::Rbf { .. }));
    assert_eq!(config.descent.max_iterations, 30);
}

#[test]
fn malformed_config_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let err = load_run_config(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn file_validation_checks_extension_and_existence() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("data.TSV");
    fs::write(&good, "x\tlabel\n").unwrap();
    assert!(validate_tsv_or_csv_file(&good).is_ok());

    let wrong_ext = dir.path().join("data.txt");
    fs::write(&wrong_ext, "x,label\n").unwrap();
    assert!(validate_tsv_or_csv_file(&wrong_ext).is_err());

    assert!(validate_tsv_or_csv_file(dir.path().join("absent.csv")).is_err());
}

#[test]
fn run_fit_keeps_file_row_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(&path, "x,label\n0.05,0\n0.0,-1\n5.05,0\n5.0,1\n").unwrap();

    let result = run_fit(&path, &RunConfig::default()).unwrap();
    assert_eq!(result.scores.len(), 4);
    assert!(result.scores[0] < 0.0);
    assert!(result.scores[1] < 0.0);
    assert!(result.scores[2] > 0.0);
    assert!(result.scores[3] > 0.0);
}

#[test]
fn run_propagation_reads_pressure_settings() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, "x,label\n0.1,0\n0.0,-1\n5.0,1\n5.1,0\n9.0,0\n").unwrap();
    let config_path = dir.path().join("run.json");
    fs::write(&config_path, r#"{"pressure": {"rounds": 1, "scale": 0.02}}"#).unwrap();

    let config = load_run_config(&config_path).unwrap();
    assert_eq!(config.pressure.reach, 0.4);
    let result = run_propagation(&data, &config).unwrap();
    assert!((result.scores[0] + 0.02 / 0.1).abs() < 1e-9);
    assert_eq!(result.scores[1], -1.0);
    assert_eq!(result.scores[2], 1.0);
    assert!((result.scores[3] - 0.02 / 0.1).abs() < 1e-9);
    // nothing within reach
    assert_eq!(result.scores[4], 0.0);
}
