//! CLI binary smoke tests using assert_cmd.
//!
//! These run the compiled `graph-energy` binary end to end on generated
//! and hand-written datasets.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn graph_energy() -> Command {
    let mut cmd = Command::cargo_bin("graph-energy").expect("binary built");
    cmd.env("GRAPH_ENERGY_LOG", "error");
    cmd
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    graph_energy()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    graph_energy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fit"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("propagate"))
        .stdout(predicate::str::contains("moons"));
}

#[test]
fn version_flag() {
    graph_energy()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn generate_moons(dir: &TempDir, groups: &str) -> std::path::PathBuf {
    let path = dir.path().join("moons.csv");
    graph_energy()
        .args(["moons", "-n", "60", "--labeled", "0.3", "--groups", groups, "-o"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 60 samples"));
    path
}

#[test]
fn moons_then_fit_writes_one_score_per_row() {
    let dir = TempDir::new().unwrap();
    let data = generate_moons(&dir, "0");
    let header = fs::read_to_string(&data).unwrap();
    assert!(header.starts_with("x,y,label\n"));

    let scores = dir.path().join("scores.tsv");
    graph_energy()
        .arg("fit")
        .arg(&data)
        .arg("-o")
        .arg(&scores)
        .arg("--standardize")
        .assert()
        .success()
        .stderr(predicate::str::contains("using defaults"));

    let text = fs::read_to_string(&scores).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("index\tscore\tprediction\tlabel"));
    assert_eq!(lines.count(), 60);
}

#[test]
fn fit_prints_scores_to_stdout() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("tiny.csv");
    fs::write(&data, "x,label\n0.0,-1\n0.05,\n5.0,1\n5.05,N/A\n").unwrap();

    graph_energy()
        .arg("fit")
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("1\t").and(predicate::str::contains("\t-1\t0")));
}

#[test]
fn validate_writes_json_report() {
    let dir = TempDir::new().unwrap();
    let data = generate_moons(&dir, "3");
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{"energy": {"similarity": {"rbf": {"bandwidth": 0.1}}}, "descent": {"max_iterations": 10}}"#,
    )
    .unwrap();
    let report = dir.path().join("report.json");

    graph_energy()
        .arg("validate")
        .arg(&data)
        .arg(&config)
        .args(["--group-column", "group", "-o"])
        .arg(&report)
        .assert()
        .success()
        .stderr(predicate::str::contains("held-out samples misclassified"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["evaluated"], 18);
    assert!(json["groups"].as_array().unwrap().len() <= 3);
}

#[test]
fn propagate_spreads_labels_to_close_neighbours() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("line.csv");
    fs::write(&data, "x,label\n0.0,1\n0.1,N/A\n2.0,-1\n2.1,N/A\n").unwrap();
    let scores = dir.path().join("pressure.tsv");

    graph_energy()
        .arg("propagate")
        .arg(&data)
        .args(["--rounds", "3", "-o"])
        .arg(&scores)
        .assert()
        .success()
        .stderr(predicate::str::contains("Scored 4 samples (2 labeled)"));

    let text = fs::read_to_string(&scores).unwrap();
    let predictions: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|l| l.split('\t').nth(2).unwrap())
        .collect();
    assert_eq!(predictions, vec!["1", "1", "-1", "-1"]);
}

#[test]
fn missing_input_fails_with_message() {
    graph_energy()
        .args(["fit", "does-not-exist.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist"));
}

#[test]
fn validate_without_groups_fails() {
    let dir = TempDir::new().unwrap();
    let data = generate_moons(&dir, "0");
    graph_energy()
        .arg("validate")
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("group column"));
}
