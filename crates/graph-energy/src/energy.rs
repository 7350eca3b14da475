//! Graph energy over a partially labeled sample set.
//!
//! For a candidate scoring vector `f` of length `N = l + u`:
//!
//! ```text
//! E(f) = (1/l) · Σ_{i<l} loss(f[i], y[i])
//!      + λ1 · ||f||²
//!      + λ2 · Σ_{i,j in [0,N)} (f[i] − f[j])² · w(i, j)
//! ```
//!
//! The smoothness sum runs over all ordered pairs, so each undirected edge
//! contributes twice. Pairs are visited once (`i < j`) and the contribution
//! is doubled or applied to both endpoints.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::cache::WeightCache;
use crate::config::EnergyConfig;
use crate::data_handling::{ensure_labeled_first, validate_labels};
use crate::error::{GraphEnergyError, Result};
use crate::kernels::Similarity;

/// The three energy terms of one scoring vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyTerms {
    pub fidelity: f64,
    pub magnitude: f64,
    pub smoothness: f64,
}

impl EnergyTerms {
    pub fn total(&self) -> f64 {
        self.fidelity + self.magnitude + self.smoothness
    }
}

/// Data bound by `configure`; replaced wholesale on the next call.
#[derive(Debug)]
struct Graph {
    features: Array2<f64>,
    labels: Array1<i8>,
    n_labeled: usize,
    weights: WeightCache,
}

impl Graph {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn weight(&mut self, similarity: &Similarity, i: usize, j: usize) -> f64 {
        let features = &self.features;
        self.weights
            .get_or_insert_with(i, j, || similarity.compute(features.row(i), features.row(j)))
    }

    fn check_len(&self, f: ArrayView1<f64>) -> Result<()> {
        if f.len() != self.len() {
            return Err(GraphEnergyError::DimensionMismatch {
                expected: self.len(),
                found: f.len(),
            });
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(GraphEnergyError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }
}

/// Energy and analytic gradient of a scoring vector over a similarity graph.
///
/// Not thread-safe: weight lookups populate the cache through `&mut self`.
#[derive(Debug)]
pub struct EnergyModel {
    config: EnergyConfig,
    graph: Option<Graph>,
}

impl EnergyModel {
    pub fn new(config: EnergyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            graph: None,
        })
    }

    pub fn config(&self) -> &EnergyConfig {
        &self.config
    }

    /// Bind a feature matrix and label vector.
    ///
    /// Precondition: every labeled row (label -1 or +1) precedes every
    /// unlabeled row (label 0). Violations are rejected with
    /// `LabelOrdering`; use `GraphEnergyClassifier` to accept arbitrary
    /// order. Inputs are copied and the weight cache starts empty. On error
    /// the previously bound data is kept.
    pub fn configure(&mut self, x: ArrayView2<f64>, y: ArrayView1<i8>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(GraphEnergyError::ShapeMismatch {
                features: x.nrows(),
                labels: y.len(),
            });
        }
        let n_labeled = validate_labels(y)?;
        ensure_labeled_first(y)?;

        log::debug!(
            "Configured energy model with {} labeled and {} unlabeled samples ({} features)",
            n_labeled,
            y.len() - n_labeled,
            x.ncols()
        );

        self.graph = Some(Graph {
            features: x.to_owned(),
            labels: y.to_owned(),
            n_labeled,
            weights: WeightCache::new(),
        });
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.graph.is_some()
    }

    fn graph(&self) -> Result<&Graph> {
        self.graph.as_ref().ok_or(GraphEnergyError::NotFitted)
    }

    /// Number of samples N.
    pub fn len(&self) -> Result<usize> {
        Ok(self.graph()?.len())
    }

    pub fn n_labeled(&self) -> Result<usize> {
        Ok(self.graph()?.n_labeled)
    }

    pub fn n_unlabeled(&self) -> Result<usize> {
        let graph = self.graph()?;
        Ok(graph.len() - graph.n_labeled)
    }

    pub fn label(&self, index: usize) -> Result<i8> {
        let graph = self.graph()?;
        graph.check_index(index)?;
        Ok(graph.labels[index])
    }

    /// Label vector as floats, the default descent starting point.
    pub fn labels_as_scores(&self) -> Result<Array1<f64>> {
        Ok(self.graph()?.labels.mapv(f64::from))
    }

    /// Similarity between samples `i` and `j`, computed on first use.
    pub fn weight(&mut self, i: usize, j: usize) -> Result<f64> {
        let similarity = &self.config.similarity;
        let graph = self.graph.as_mut().ok_or(GraphEnergyError::NotFitted)?;
        graph.check_index(i)?;
        graph.check_index(j)?;
        Ok(graph.weight(similarity, i, j))
    }

    /// Number of weights currently memoized.
    pub fn cached_weights(&self) -> usize {
        self.graph.as_ref().map_or(0, |g| g.weights.len())
    }

    /// Return (hits, misses) of the weight cache for the bound data.
    pub fn cache_counters(&self) -> (u64, u64) {
        self.graph.as_ref().map_or((0, 0), |g| g.weights.counters())
    }

    pub fn energy(&mut self, f: ArrayView1<f64>) -> Result<f64> {
        Ok(self.energy_terms(f)?.total())
    }

    pub fn energy_terms(&mut self, f: ArrayView1<f64>) -> Result<EnergyTerms> {
        let config = &self.config;
        let graph = self.graph.as_mut().ok_or(GraphEnergyError::NotFitted)?;
        graph.check_len(f)?;

        let n = graph.len();
        let l = graph.n_labeled;

        let fidelity = if l == 0 {
            0.0
        } else {
            (0..l)
                .map(|i| config.loss.value(f[i], f64::from(graph.labels[i])))
                .sum::<f64>()
                / l as f64
        };

        let magnitude = config.magnitude_penalty * f.dot(&f);

        let mut pairwise = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let diff = f[i] - f[j];
                pairwise += diff * diff * graph.weight(&config.similarity, i, j);
            }
        }
        // (i, j) and (j, i) both appear in the full sum
        let smoothness = config.smoothness_penalty * 2.0 * pairwise;

        Ok(EnergyTerms {
            fidelity,
            magnitude,
            smoothness,
        })
    }

    /// Partial derivatives of the energy at `f`:
    ///
    /// ```text
    /// ∂E/∂f[i] = (1/l)·loss'(f[i], y[i])·1{i<l} + 2·λ1·f[i]
    ///          + 4·λ2·Σ_j (f[i] − f[j])·w(i, j)
    /// ```
    ///
    /// For squared loss this is `2·[(1/l)(f[i]−y[i])·1{i<l} + λ1·f[i] + 2·λ2·Σ_j ...]`.
    pub fn gradient(&mut self, f: ArrayView1<f64>) -> Result<Array1<f64>> {
        let config = &self.config;
        let graph = self.graph.as_mut().ok_or(GraphEnergyError::NotFitted)?;
        graph.check_len(f)?;

        let n = graph.len();
        let l = graph.n_labeled;

        let mut laplacian = Array1::<f64>::zeros(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let flow = (f[i] - f[j]) * graph.weight(&config.similarity, i, j);
                laplacian[i] += flow;
                laplacian[j] -= flow;
            }
        }

        let mut grad = Array1::<f64>::zeros(n);
        for i in 0..n {
            let fidelity = if i < l {
                config.loss.derivative(f[i], f64::from(graph.labels[i])) / l as f64
            } else {
                0.0
            };
            grad[i] = fidelity
                + 2.0 * config.magnitude_penalty * f[i]
                + 4.0 * config.smoothness_penalty * laplacian[i];
        }

        Ok(grad)
    }
}
