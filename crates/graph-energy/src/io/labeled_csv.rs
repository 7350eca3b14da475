//! CSV/TSV reader for partially labeled datasets and a TSV score writer.
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::StringRecord;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::classifier::score_to_label;
use crate::data_handling::LabeledDataset;

/// Label cells read as "unlabeled".
const MISSING_LABELS: [&str; 4] = ["", "N/A", "NA", "nan"];

/// Configuration for reading labeled CSV/TSV files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvReaderConfig {
    /// Column holding -1 / 1 labels, with 0 or a missing marker for unlabeled rows.
    pub label_column: String,
    /// Optional column assigning each row to a validation group.
    pub group_column: Option<String>,
    /// Feature columns to load, in order. When `None`, every column other
    /// than the label and group columns is a feature.
    pub feature_columns: Option<Vec<String>>,
}

impl Default for CsvReaderConfig {
    fn default() -> Self {
        Self {
            label_column: "label".to_string(),
            group_column: None,
            feature_columns: None,
        }
    }
}

/// Read a delimited file into a [`LabeledDataset`].
///
/// Files ending in `.tsv` are tab-separated, everything else is read as CSV.
/// A header row is required.
pub fn read_labeled_csv<P: AsRef<Path>>(path: P, config: &CsvReaderConfig) -> Result<LabeledDataset> {
    let path = path.as_ref();
    let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open data file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .clone();

    let label_idx = find_column(&headers, &config.label_column)
        .ok_or_else(|| anyhow!("Missing label column '{}'", config.label_column))?;
    let group_idx = match &config.group_column {
        Some(name) => Some(
            find_column(&headers, name).ok_or_else(|| anyhow!("Missing group column '{}'", name))?,
        ),
        None => None,
    };

    let feature_indices = resolve_feature_indices(&headers, config, label_idx, group_idx)?;
    if feature_indices.is_empty() {
        bail!("No feature columns detected in {}", path.display());
    }

    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut groups = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        // header is line 1
        let line = row_idx + 2;
        let record = result.with_context(|| format!("Failed to read line {}", line))?;

        let raw_label = record
            .get(label_idx)
            .ok_or_else(|| anyhow!("Missing label value at line {}", line))?;
        labels.push(parse_label(raw_label).with_context(|| format!("Invalid label at line {}", line))?);

        if let Some(idx) = group_idx {
            let group = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing group value at line {}", line))?;
            groups.push(group.to_string());
        }

        for &idx in &feature_indices {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing feature value at line {}", line))?;
            let parsed = value.parse::<f64>().with_context(|| {
                format!(
                    "Invalid feature '{}' at line {}",
                    headers.get(idx).unwrap_or(""),
                    line
                )
            })?;
            features.push(parsed);
        }
    }

    let n_samples = labels.len();
    let x = Array2::from_shape_vec((n_samples, feature_indices.len()), features)
        .context("Failed to build feature matrix")?;
    let feature_names = feature_indices
        .iter()
        .map(|&idx| headers.get(idx).unwrap_or("").to_string())
        .collect();

    let mut dataset = LabeledDataset::new(x, Array1::from_vec(labels))?.with_feature_names(feature_names);
    if group_idx.is_some() {
        dataset = dataset.with_groups(groups)?;
    }
    log::debug!("Read {} rows from {}", n_samples, path.display());
    Ok(dataset)
}

/// Write one row per sample: `index`, `score`, `prediction`, `label`.
pub fn write_scores<W: Write>(writer: W, scores: ArrayView1<f64>, labels: ArrayView1<i8>) -> Result<()> {
    if scores.len() != labels.len() {
        bail!(
            "Got {} scores for {} labels",
            scores.len(),
            labels.len()
        );
    }
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    writer.write_record(["index", "score", "prediction", "label"])?;
    for (index, (&score, &label)) in scores.iter().zip(labels.iter()).enumerate() {
        writer.write_record(&[
            index.to_string(),
            score.to_string(),
            score_to_label(score).to_string(),
            label.to_string(),
        ])?;
    }
    writer.flush().context("Failed to flush score output")?;
    Ok(())
}

fn parse_label(raw: &str) -> Result<i8> {
    if MISSING_LABELS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return Ok(0);
    }
    let value: f64 = raw
        .parse()
        .with_context(|| format!("'{}' is not a number", raw))?;
    if value == -1.0 {
        Ok(-1)
    } else if value == 0.0 {
        Ok(0)
    } else if value == 1.0 {
        Ok(1)
    } else {
        bail!("label must be -1, 0 or 1, got {}", raw)
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

fn resolve_feature_indices(
    headers: &StringRecord,
    config: &CsvReaderConfig,
    label_idx: usize,
    group_idx: Option<usize>,
) -> Result<Vec<usize>> {
    if let Some(names) = &config.feature_columns {
        return names
            .iter()
            .map(|name| {
                find_column(headers, name).ok_or_else(|| anyhow!("Missing feature column '{}'", name))
            })
            .collect();
    }

    Ok((0..headers.len())
        .filter(|&idx| idx != label_idx && Some(idx) != group_idx)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_missing_markers_as_unlabeled() {
        for raw in ["", "N/A", "NA", "nan", "NaN", "0", "0.0"] {
            assert_eq!(parse_label(raw).unwrap(), 0, "{}", raw);
        }
        assert_eq!(parse_label("1").unwrap(), 1);
        assert_eq!(parse_label("-1.0").unwrap(), -1);
    }

    #[test]
    fn rejects_out_of_range_labels() {
        assert!(parse_label("2").is_err());
        assert!(parse_label("0.5").is_err());
        assert!(parse_label("yes").is_err());
    }

    #[test]
    fn writes_tab_separated_scores() {
        let mut out = Vec::new();
        let scores = ndarray::array![0.25, -0.5];
        let labels = ndarray::array![1i8, 0];
        write_scores(&mut out, scores.view(), labels.view()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index\tscore\tprediction\tlabel");
        assert_eq!(lines[1], "0\t0.25\t1\t1");
        assert_eq!(lines[2], "1\t-0.5\t-1\t0");
    }

    #[test]
    fn score_count_must_match_labels() {
        let scores = ndarray::array![0.25];
        let labels = ndarray::array![1i8, 0];
        assert!(write_scores(Vec::new(), scores.view(), labels.view()).is_err());
    }
}
