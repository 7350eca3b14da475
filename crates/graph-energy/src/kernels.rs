//! Similarity and loss strategies used by the energy model.
//!
//! Both are closed enums: the built-in variants serialize with the rest of
//! the configuration, while the `Custom` variants carry a callable and are
//! skipped by serde.
use std::fmt;
use std::sync::Arc;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{GraphEnergyError, Result};

/// Pairwise similarity `X × X -> R≥0`.
pub type SimilarityFn = Arc<dyn Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64 + Send + Sync>;

/// Scalar function of `(predicted, truth)`.
pub type LossFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    /// Gaussian kernel `exp(-||a - b||² / bandwidth)`.
    Rbf { bandwidth: f64 },
    #[serde(skip)]
    Custom(SimilarityFn),
}

impl Similarity {
    pub const DEFAULT_BANDWIDTH: f64 = 0.01;

    pub fn rbf(bandwidth: f64) -> Self {
        Similarity::Rbf { bandwidth }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64 + Send + Sync + 'static,
    {
        Similarity::Custom(Arc::new(f))
    }

    pub fn compute(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self {
            Similarity::Rbf { bandwidth } => {
                let sq_dist: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
                (-sq_dist / bandwidth).exp()
            }
            Similarity::Custom(f) => f(a, b),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Similarity::Rbf { bandwidth } = self {
            if !(bandwidth.is_finite() && *bandwidth > 0.0) {
                return Err(GraphEnergyError::InvalidParameter {
                    name: "bandwidth",
                    reason: format!("must be a positive finite number, got {}", bandwidth),
                });
            }
        }
        Ok(())
    }
}

impl Default for Similarity {
    fn default() -> Self {
        Similarity::rbf(Self::DEFAULT_BANDWIDTH)
    }
}

impl fmt::Debug for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Similarity::Rbf { bandwidth } => f.debug_struct("Rbf").field("bandwidth", bandwidth).finish(),
            Similarity::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Convex penalty for relabeling a labeled point.
///
/// A custom loss must provide its derivative with respect to the prediction
/// so the gradient stays analytic.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    #[default]
    Squared,
    #[serde(skip)]
    Custom { value: LossFn, derivative: LossFn },
}

impl Loss {
    pub fn custom<V, D>(value: V, derivative: D) -> Self
    where
        V: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        D: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Loss::Custom {
            value: Arc::new(value),
            derivative: Arc::new(derivative),
        }
    }

    pub fn value(&self, predicted: f64, truth: f64) -> f64 {
        match self {
            Loss::Squared => (predicted - truth) * (predicted - truth),
            Loss::Custom { value, .. } => value(predicted, truth),
        }
    }

    /// d loss / d predicted
    pub fn derivative(&self, predicted: f64, truth: f64) -> f64 {
        match self {
            Loss::Squared => 2.0 * (predicted - truth),
            Loss::Custom { derivative, .. } => derivative(predicted, truth),
        }
    }
}

impl fmt::Debug for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loss::Squared => f.write_str("Squared"),
            Loss::Custom { .. } => f.write_str("Custom { .. }"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rbf_is_one_on_identical_points() {
        let a = array![0.3, -1.2];
        assert!((Similarity::default().compute(a.view(), a.view()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rbf_matches_closed_form() {
        let a = array![0.0];
        let b = array![0.05];
        let w = Similarity::rbf(0.01).compute(a.view(), b.view());
        assert!((w - (-0.25f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn rbf_rejects_non_positive_bandwidth() {
        assert!(Similarity::rbf(0.0).validate().is_err());
        assert!(Similarity::rbf(-1.0).validate().is_err());
        assert!(Similarity::rbf(f64::NAN).validate().is_err());
    }

    #[test]
    fn custom_similarity_is_called() {
        let sim = Similarity::custom(|a, b| 1.0 / (1.0 + (a[0] - b[0]).abs()));
        let w = sim.compute(array![1.0].view(), array![2.0].view());
        assert!((w - 0.5).abs() < 1e-12);
    }

    #[test]
    fn squared_loss_and_derivative() {
        let loss = Loss::Squared;
        assert!((loss.value(0.5, -1.0) - 2.25).abs() < 1e-12);
        assert!((loss.derivative(0.5, -1.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn similarity_serializes_snake_case() {
        let json = serde_json::to_string(&Similarity::rbf(0.5)).unwrap();
        assert_eq!(json, r#"{"rbf":{"bandwidth":0.5}}"#);
        let loss = serde_json::to_string(&Loss::Squared).unwrap();
        assert_eq!(loss, r#""squared""#);
    }
}
