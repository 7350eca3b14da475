//! Nesterov-accelerated gradient descent.
//!
//! The descent runs against any [`Objective`]; [`EnergyModel`] is the one
//! used by the classifier. It stops when the gradient norm drops below the
//! objective's tolerance or after `max_iterations` steps, whichever comes
//! first. Running out of iterations is not an error and there is no
//! divergence detection.
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::config::DescentConfig;
use crate::energy::EnergyModel;
use crate::error::{GraphEnergyError, Result};

/// A differentiable scalar function minimized by [`NesterovDescent`].
pub trait Objective {
    /// Length of the vectors accepted by `value` and `gradient`.
    fn dimension(&self) -> Result<usize>;

    /// Gradient norm treated as converged.
    fn tolerance(&self) -> f64;

    fn value(&mut self, point: ArrayView1<f64>) -> Result<f64>;

    fn gradient(&mut self, point: ArrayView1<f64>) -> Result<Array1<f64>>;
}

impl Objective for EnergyModel {
    fn dimension(&self) -> Result<usize> {
        self.len()
    }

    fn tolerance(&self) -> f64 {
        self.config().tolerance
    }

    fn value(&mut self, point: ArrayView1<f64>) -> Result<f64> {
        self.energy(point)
    }

    fn gradient(&mut self, point: ArrayView1<f64>) -> Result<Array1<f64>> {
        EnergyModel::gradient(self, point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Converged,
    MaxIterationsReached,
}

/// Diagnostics for one completed descent step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    /// Norm of the gradient that produced this step.
    pub gradient_norm: f64,
    /// Energy at the new point; only evaluated in verbose mode.
    pub energy: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DescentOutcome {
    pub solution: Array1<f64>,
    pub termination: Termination,
    /// Gradient steps taken.
    pub iterations: usize,
    /// Norm of the last gradient evaluated.
    pub gradient_norm: f64,
    pub history: Vec<IterationRecord>,
}

impl DescentOutcome {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Momentum sequence `λ_{k+1} = (1 + sqrt(1 + 4·λ_k²)) / 2` with blend
/// coefficient `γ = (1 − λ_k) / λ_{k+1}`. The first step uses `γ = 1`.
#[derive(Debug, Clone, Copy)]
struct MomentumSchedule {
    lambda_prev: f64,
    lambda_curr: f64,
    gamma: f64,
}

impl MomentumSchedule {
    fn new() -> Self {
        Self {
            lambda_prev: 0.0,
            lambda_curr: 1.0,
            gamma: 1.0,
        }
    }

    fn advance(&mut self) {
        let lambda_next = (1.0 + (1.0 + 4.0 * self.lambda_curr * self.lambda_curr).sqrt()) / 2.0;
        self.lambda_prev = self.lambda_curr;
        self.lambda_curr = lambda_next;
        self.gamma = (1.0 - self.lambda_prev) / self.lambda_curr;
    }
}

#[derive(Debug, Clone)]
pub struct NesterovDescent {
    config: DescentConfig,
}

impl NesterovDescent {
    pub fn new(config: DescentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DescentConfig {
        &self.config
    }

    /// Minimize `objective` starting from `start`.
    pub fn minimize<O>(&self, objective: &mut O, start: Array1<f64>) -> Result<DescentOutcome>
    where
        O: Objective + ?Sized,
    {
        let dimension = objective.dimension()?;
        if start.len() != dimension {
            return Err(GraphEnergyError::DimensionMismatch {
                expected: dimension,
                found: start.len(),
            });
        }

        let tolerance = objective.tolerance();
        let learning_rate = self.config.learning_rate;

        let mut point = start.clone();
        let mut y_prev = start;
        let mut momentum = MomentumSchedule::new();
        let mut history = Vec::new();
        let mut gradient_norm = f64::INFINITY;

        for iteration in 0..self.config.max_iterations {
            let gradient = objective.gradient(point.view())?;
            gradient_norm = gradient.dot(&gradient).sqrt();

            if gradient_norm < tolerance {
                log::debug!(
                    "Converged after {} iterations (gradient norm {:.3e})",
                    iteration,
                    gradient_norm
                );
                return Ok(DescentOutcome {
                    solution: point,
                    termination: Termination::Converged,
                    iterations: iteration,
                    gradient_norm,
                    history,
                });
            }

            let y_step = &point - &(gradient * learning_rate);
            point = &y_step * (1.0 - momentum.gamma);
            point.scaled_add(momentum.gamma, &y_prev);
            y_prev = y_step;
            momentum.advance();

            let energy = if self.config.verbose {
                let energy = objective.value(point.view())?;
                log::info!(
                    "Round: {} Magnitude: {:.6} Energy: {:.6}",
                    iteration,
                    gradient_norm,
                    energy
                );
                Some(energy)
            } else {
                None
            };
            history.push(IterationRecord {
                iteration,
                gradient_norm,
                energy,
            });
        }

        log::debug!(
            "Stopped at the iteration cap ({}) with gradient norm {:.3e}",
            self.config.max_iterations,
            gradient_norm
        );
        Ok(DescentOutcome {
            solution: point,
            termination: Termination::MaxIterationsReached,
            iterations: self.config.max_iterations,
            gradient_norm,
            history,
        })
    }
}
