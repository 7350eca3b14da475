//! Leave-one-group-out cross-validation over a [`GraphEnergyClassifier`].
//!
//! For every group, the labels of that group's labeled samples are hidden,
//! the classifier is refit on the remaining labels, and the hidden samples
//! are predicted from the sign of their scores.
use std::collections::BTreeSet;
use std::fmt::Display;

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::classifier::{score_to_label, GraphEnergyClassifier};
use crate::config::DescentConfig;
use crate::error::{GraphEnergyError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOutcome {
    pub group: String,
    /// Labeled samples held out.
    pub size: usize,
    pub errors: usize,
    pub truth: Vec<i8>,
    pub scores: Vec<f64>,
    /// Misclassification rate over the samples that stayed labeled.
    pub training_error: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub groups: Vec<GroupOutcome>,
    pub errors: usize,
    pub evaluated: usize,
}

impl ValidationReport {
    /// Pooled error over all held-out samples, `None` when nothing was held out.
    pub fn error_rate(&self) -> Option<f64> {
        (self.evaluated > 0).then(|| self.errors as f64 / self.evaluated as f64)
    }
}

/// Run leave-one-group-out validation.
///
/// `groups` assigns each sample to a group. Groups without labeled samples
/// are skipped. `starting_point` is in the caller's row order and is reused
/// for every group.
pub fn leave_one_group_out<G>(
    classifier: &mut GraphEnergyClassifier,
    x: ArrayView2<f64>,
    y: ArrayView1<i8>,
    groups: &[G],
    descent: &DescentConfig,
    starting_point: Option<ArrayView1<f64>>,
) -> Result<ValidationReport>
where
    G: Ord + Display,
{
    if x.nrows() != y.len() {
        return Err(GraphEnergyError::ShapeMismatch {
            features: x.nrows(),
            labels: y.len(),
        });
    }
    if groups.len() != y.len() {
        return Err(GraphEnergyError::DimensionMismatch {
            expected: y.len(),
            found: groups.len(),
        });
    }

    let distinct: BTreeSet<&G> = groups.iter().collect();
    let mut report = ValidationReport::default();

    for group in distinct {
        let held_out: Vec<usize> = (0..y.len())
            .filter(|&i| groups[i] == *group && y[i] != 0)
            .collect();
        if held_out.is_empty() {
            log::warn!("Group {} has no labeled samples; skipping", group);
            continue;
        }

        let mut masked = y.to_owned();
        for &i in &held_out {
            masked[i] = 0;
        }

        log::info!("Beginning group {} of size {}", group, held_out.len());

        classifier.configure(x, masked.view())?;
        let scores = classifier.fit(descent, starting_point)?;

        let truth: Vec<i8> = held_out.iter().map(|&i| y[i]).collect();
        let held_scores: Vec<f64> = held_out.iter().map(|&i| scores[i]).collect();
        let errors = truth
            .iter()
            .zip(&held_scores)
            .filter(|&(&t, &s)| t != score_to_label(s))
            .count();

        let still_labeled: Vec<usize> = (0..y.len()).filter(|&i| masked[i] != 0).collect();
        let training_error = (!still_labeled.is_empty()).then(|| {
            let wrong = still_labeled
                .iter()
                .filter(|&&i| masked[i] != score_to_label(scores[i]))
                .count();
            wrong as f64 / still_labeled.len() as f64
        });

        log::info!("{} error(s) at this step", errors);
        log::info!("Truth: {:?}", truth);
        log::info!("Prediction on left out group: {:?}", held_scores);
        if let Some(rate) = training_error {
            log::info!("Error on training set: {:.4}", rate);
        }

        report.errors += errors;
        report.evaluated += held_out.len();
        report.groups.push(GroupOutcome {
            group: group.to_string(),
            size: held_out.len(),
            errors,
            truth,
            scores: held_scores,
            training_error,
        });
    }

    match report.error_rate() {
        Some(rate) => log::info!("Global error: {:.4}", rate),
        None => log::warn!("No labeled samples were held out"),
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnergyConfig;
    use ndarray::array;

    #[test]
    fn empty_report_has_no_error_rate() {
        assert_eq!(ValidationReport::default().error_rate(), None);
    }

    #[test]
    fn groups_must_cover_every_sample() {
        let mut clf = GraphEnergyClassifier::new(EnergyConfig::default()).unwrap();
        let x = array![[0.0], [1.0]];
        let y = array![1i8, -1];
        let err = leave_one_group_out(
            &mut clf,
            x.view(),
            y.view(),
            &["a"],
            &DescentConfig::default(),
            None,
        )
        .unwrap_err();
        assert_eq!(err, GraphEnergyError::DimensionMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn unlabeled_groups_are_skipped() {
        let mut clf = GraphEnergyClassifier::new(EnergyConfig::default()).unwrap();
        let x = array![[0.0], [0.05], [5.0]];
        let y = array![-1i8, 0, 1];
        let groups = ["a", "b", "c"];
        let report = leave_one_group_out(
            &mut clf,
            x.view(),
            y.view(),
            &groups,
            &DescentConfig::default(),
            None,
        )
        .unwrap();
        let names: Vec<&str> = report.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(report.evaluated, 2);
    }

    #[test]
    fn owned_string_groups_are_matched_by_value() {
        let mut clf = GraphEnergyClassifier::new(EnergyConfig::default()).unwrap();
        let x = array![[0.0], [0.05], [5.0], [5.05]];
        let y = array![-1i8, -1, 1, 1];
        let groups: Vec<String> = ["left", "right", "left", "right"]
            .iter()
            .map(|g| g.to_string())
            .collect();
        let report = leave_one_group_out(
            &mut clf,
            x.view(),
            y.view(),
            &groups,
            &DescentConfig::default(),
            None,
        )
        .unwrap();
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].group, "left");
        assert_eq!(report.groups[0].truth, vec![-1, 1]);
        assert_eq!(report.groups[1].truth, vec![-1, 1]);
        assert_eq!(report.evaluated, 4);
    }
}
