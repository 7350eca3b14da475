//! Labeled dataset holder and label-vector checks.
//!
//! Labels use -1 / +1 for the two classes and 0 for unlabeled samples. The
//! energy model requires labeled rows to precede unlabeled rows; the helpers
//! here check that ordering or compute the permutation that establishes it.
use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{GraphEnergyError, Result};

/// Check every label is one of -1, 0, 1 and return how many are non-zero.
pub fn validate_labels(y: ArrayView1<i8>) -> Result<usize> {
    let mut n_labeled = 0;
    for (index, &value) in y.iter().enumerate() {
        match value {
            -1 | 1 => n_labeled += 1,
            0 => {}
            _ => return Err(GraphEnergyError::InvalidLabel { index, value }),
        }
    }
    Ok(n_labeled)
}

/// Fail with `LabelOrdering` at the first labeled row that follows an
/// unlabeled one.
pub fn ensure_labeled_first(y: ArrayView1<i8>) -> Result<()> {
    let mut seen_unlabeled = false;
    for (index, &value) in y.iter().enumerate() {
        if value == 0 {
            seen_unlabeled = true;
        } else if seen_unlabeled {
            return Err(GraphEnergyError::LabelOrdering { index });
        }
    }
    Ok(())
}

/// Stable permutation placing labeled rows before unlabeled rows.
///
/// `order[k]` is the original index of the row that lands at position `k`.
pub fn labeled_first_order(y: ArrayView1<i8>) -> Vec<usize> {
    let labeled = (0..y.len()).filter(|&i| y[i] != 0);
    let unlabeled = (0..y.len()).filter(|&i| y[i] == 0);
    labeled.chain(unlabeled).collect()
}

/// Features, partial labels and optional group assignments for one dataset.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    pub x: Array2<f64>,
    pub y: Array1<i8>,
    pub groups: Option<Vec<String>>,
    pub feature_names: Vec<String>,
}

impl LabeledDataset {
    pub fn new(x: Array2<f64>, y: Array1<i8>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(GraphEnergyError::ShapeMismatch {
                features: x.nrows(),
                labels: y.len(),
            });
        }
        validate_labels(y.view())?;
        let feature_names = (0..x.ncols()).map(|c| format!("x{}", c)).collect();
        Ok(LabeledDataset {
            x,
            y,
            groups: None,
            feature_names,
        })
    }

    pub fn with_groups(mut self, groups: Vec<String>) -> Result<Self> {
        if groups.len() != self.y.len() {
            return Err(GraphEnergyError::DimensionMismatch {
                expected: self.y.len(),
                found: groups.len(),
            });
        }
        self.groups = Some(groups);
        Ok(self)
    }

    pub fn with_feature_names(mut self, feature_names: Vec<String>) -> Self {
        self.feature_names = feature_names;
        self
    }

    pub fn n_samples(&self) -> usize {
        self.y.len()
    }

    pub fn n_labeled(&self) -> usize {
        self.y.iter().filter(|&&v| v != 0).count()
    }

    pub fn log_input_data_summary(&self) {
        log::info!(
            "{} samples: {} positive, {} negative, {} unlabeled; {} features",
            self.n_samples(),
            self.y.iter().filter(|&&v| v == 1).count(),
            self.y.iter().filter(|&&v| v == -1).count(),
            self.y.iter().filter(|&&v| v == 0).count(),
            self.x.ncols()
        );
        if let Some(groups) = &self.groups {
            let mut distinct: Vec<&String> = groups.iter().collect();
            distinct.sort();
            distinct.dedup();
            log::info!("{} distinct groups", distinct.len());
        }
    }
}
