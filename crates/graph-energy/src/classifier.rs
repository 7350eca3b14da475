use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use crate::config::{DescentConfig, EnergyConfig};
use crate::data_handling::{labeled_first_order, validate_labels};
use crate::energy::EnergyModel;
use crate::error::{GraphEnergyError, Result};
use crate::optimizer::{DescentOutcome, NesterovDescent};

/// Hard class from a score: `+1` when `score >= 0`, else `-1`.
pub fn score_to_label(score: f64) -> i8 {
    if score >= 0.0 {
        1
    } else {
        -1
    }
}

/// Threshold a scoring vector at zero, mapping to {-1, +1}.
pub fn scores_to_labels(scores: ArrayView1<f64>) -> Array1<i8> {
    scores.mapv(score_to_label)
}

/// Semi-supervised classifier over an [`EnergyModel`].
///
/// Unlike the energy model, `configure` accepts rows in any order: they are
/// stably partitioned labeled-first before binding, and every vector handed
/// back by `fit` / `descend` is in the caller's original row order.
#[derive(Debug)]
pub struct GraphEnergyClassifier {
    model: EnergyModel,
    /// `order[k]` is the caller row bound at model position `k`.
    order: Vec<usize>,
}

impl GraphEnergyClassifier {
    pub fn new(config: EnergyConfig) -> Result<Self> {
        Ok(Self {
            model: EnergyModel::new(config)?,
            order: Vec::new(),
        })
    }

    pub fn model(&self) -> &EnergyModel {
        &self.model
    }

    pub fn configure(&mut self, x: ArrayView2<f64>, y: ArrayView1<i8>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(GraphEnergyError::ShapeMismatch {
                features: x.nrows(),
                labels: y.len(),
            });
        }
        validate_labels(y)?;

        let order = labeled_first_order(y);
        let moved = order.iter().enumerate().filter(|&(k, &i)| k != i).count();
        if moved > 0 {
            log::trace!("Reordered {} rows to place labeled samples first", moved);
        }

        let x_sorted = x.select(Axis(0), &order);
        let y_sorted = y.select(Axis(0), &order);
        self.model.configure(x_sorted.view(), y_sorted.view())?;
        self.order = order;
        Ok(())
    }

    pub fn n_labeled(&self) -> Result<usize> {
        self.model.n_labeled()
    }

    pub fn n_unlabeled(&self) -> Result<usize> {
        self.model.n_unlabeled()
    }

    /// Minimize the energy and return one score per sample, in caller order.
    ///
    /// `starting_point` is in caller order and defaults to the label vector.
    pub fn fit(
        &mut self,
        descent: &DescentConfig,
        starting_point: Option<ArrayView1<f64>>,
    ) -> Result<Array1<f64>> {
        Ok(self.descend(descent, starting_point)?.solution)
    }

    /// Like [`fit`](Self::fit) but returns the full descent outcome.
    pub fn descend(
        &mut self,
        descent: &DescentConfig,
        starting_point: Option<ArrayView1<f64>>,
    ) -> Result<DescentOutcome> {
        let optimizer = NesterovDescent::new(descent.clone())?;
        let n = self.model.len()?;

        let start = match starting_point {
            Some(start) if start.len() != n => {
                return Err(GraphEnergyError::DimensionMismatch {
                    expected: n,
                    found: start.len(),
                })
            }
            Some(start) => start.select(Axis(0), &self.order),
            None => self.model.labels_as_scores()?,
        };

        let mut outcome = optimizer.minimize(&mut self.model, start)?;
        outcome.solution = self.restore_order(outcome.solution.view());
        Ok(outcome)
    }

    /// Map a vector in model order back to caller order.
    fn restore_order(&self, sorted: ArrayView1<f64>) -> Array1<f64> {
        let mut restored = Array1::zeros(sorted.len());
        for (k, &i) in self.order.iter().enumerate() {
            restored[i] = sorted[k];
        }
        restored
    }
}
