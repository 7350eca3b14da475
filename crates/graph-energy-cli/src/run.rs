//! Subcommand drivers: load data and configuration, run the classifier and
//! write results.
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use graph_energy::datasets::{two_moons, MoonsConfig};
use graph_energy::io::{read_labeled_csv, write_scores, CsvReaderConfig};
use graph_energy::preprocessing::fit_transform;
use graph_energy::{
    leave_one_group_out, DescentConfig, EnergyConfig, GraphEnergyClassifier, LabeledDataset,
    PressureConfig, PressurePropagation, ValidationReport,
};

use crate::util::{output_writer, validate_tsv_or_csv_file};

/// Everything a `fit` or `validate` run needs besides the data path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub energy: EnergyConfig,
    pub descent: DescentConfig,
    pub reader: CsvReaderConfig,
    /// Used by `propagate` only.
    pub pressure: PressureConfig,
    /// Standardize feature columns before building the graph.
    pub standardize: bool,
}

/// Load a run configuration from a JSON file.
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: RunConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

/// Scores for one fitted dataset, in file row order.
#[derive(Debug)]
pub struct FitResult {
    pub dataset: LabeledDataset,
    pub scores: Array1<f64>,
}

fn load_dataset<P: AsRef<Path>>(data_path: P, config: &RunConfig) -> Result<LabeledDataset> {
    validate_tsv_or_csv_file(&data_path)?;
    let mut dataset = read_labeled_csv(&data_path, &config.reader)?;
    dataset.log_input_data_summary();
    if config.standardize {
        log::debug!("Standardizing {} feature columns", dataset.x.ncols());
        dataset.x = fit_transform(dataset.x.view());
    }
    Ok(dataset)
}

/// Fit the classifier on every row of `data_path`.
pub fn run_fit<P: AsRef<Path>>(data_path: P, config: &RunConfig) -> Result<FitResult> {
    let dataset = load_dataset(data_path, config)?;
    if dataset.n_labeled() == 0 {
        log::warn!("No labeled samples; scores are driven by the penalties alone");
    }

    let mut classifier = GraphEnergyClassifier::new(config.energy.clone())?;
    classifier.configure(dataset.x.view(), dataset.y.view())?;
    let outcome = classifier.descend(&config.descent, None)?;
    log::info!(
        "Descent stopped after {} iterations ({:?}, gradient norm {:.3e})",
        outcome.iterations,
        outcome.termination,
        outcome.gradient_norm
    );

    Ok(FitResult {
        dataset,
        scores: outcome.solution,
    })
}

/// Score every row of `data_path` with pressure propagation.
pub fn run_propagation<P: AsRef<Path>>(data_path: P, config: &RunConfig) -> Result<FitResult> {
    let dataset = load_dataset(data_path, config)?;
    let propagation = PressurePropagation::new(config.pressure.clone())?;
    let scores = propagation.run(dataset.x.view(), dataset.y.view(), config.pressure.rounds)?;
    log::info!(
        "Propagated pressure for {} rounds over {} samples",
        config.pressure.rounds,
        dataset.n_samples()
    );
    Ok(FitResult { dataset, scores })
}

/// Write fit scores as TSV to `output` or stdout.
pub fn write_fit_output(result: &FitResult, output: Option<&Path>) -> Result<()> {
    let writer = output_writer(output).context("Failed to open score output")?;
    write_scores(writer, result.scores.view(), result.dataset.y.view())
}

/// Leave-one-group-out validation over the groups of `data_path`.
pub fn run_validation<P: AsRef<Path>>(data_path: P, config: &RunConfig) -> Result<ValidationReport> {
    if config.reader.group_column.is_none() {
        bail!("Validation needs a group column (set reader.group_column or pass --group-column)");
    }
    let dataset = load_dataset(data_path, config)?;
    let groups = match &dataset.groups {
        Some(groups) => groups,
        None => bail!("Dataset has no group assignments"),
    };

    let mut classifier = GraphEnergyClassifier::new(config.energy.clone())?;
    let report = leave_one_group_out(
        &mut classifier,
        dataset.x.view(),
        dataset.y.view(),
        groups,
        &config.descent,
        None,
    )?;
    Ok(report)
}

/// Write a validation report as pretty JSON to `output` or stdout.
pub fn write_report(report: &ValidationReport, output: Option<&Path>) -> Result<()> {
    let mut writer = output_writer(output).context("Failed to open report output")?;
    serde_json::to_writer_pretty(&mut writer, report).context("Failed to write report")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Generate a two-moons dataset and write it as CSV with `label` and,
/// when grouped, `group` columns.
pub fn write_moons(config: &MoonsConfig, output: Option<&Path>) -> Result<usize> {
    let dataset = two_moons(config)?;
    let writer = output_writer(output).context("Failed to open dataset output")?;
    let mut writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = dataset.feature_names.iter().map(String::as_str).collect();
    header.push("label");
    if dataset.groups.is_some() {
        header.push("group");
    }
    writer.write_record(&header)?;

    for (i, row) in dataset.x.outer_iter().enumerate() {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(dataset.y[i].to_string());
        if let Some(groups) = &dataset.groups {
            record.push(groups[i].clone());
        }
        writer.write_record(&record)?;
    }
    writer.flush().context("Failed to flush dataset output")?;
    Ok(dataset.n_samples())
}
