use serde::{Deserialize, Serialize};

use crate::error::{GraphEnergyError, Result};
use crate::kernels::{Loss, Similarity};

/// Energy model configuration: similarity, loss, convergence tolerance and
/// the two regularization coefficients.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct EnergyConfig {
    pub similarity: Similarity,
    pub loss: Loss,
    /// Gradient norm below which descent stops (ε).
    pub tolerance: f64,
    /// λ1, penalizes large |f|.
    pub magnitude_penalty: f64,
    /// λ2, penalizes score differences between similar points.
    pub smoothness_penalty: f64,
}

impl EnergyConfig {
    pub fn new(similarity: Similarity, magnitude_penalty: f64, smoothness_penalty: f64) -> Self {
        Self {
            similarity,
            magnitude_penalty,
            smoothness_penalty,
            ..Self::default()
        }
    }

    pub fn with_loss(mut self, loss: Loss) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(GraphEnergyError::InvalidParameter {
                name: "tolerance",
                reason: format!("must be a positive finite number, got {}", self.tolerance),
            });
        }
        check_penalty("magnitude_penalty", self.magnitude_penalty)?;
        check_penalty("smoothness_penalty", self.smoothness_penalty)?;
        self.similarity.validate()
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            similarity: Similarity::default(),
            loss: Loss::Squared,
            tolerance: 1e-3,
            magnitude_penalty: 1.0,
            smoothness_penalty: 1.0,
        }
    }
}

fn check_penalty(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GraphEnergyError::InvalidParameter {
            name,
            reason: format!("must be a non-negative finite number, got {}", value),
        })
    }
}

/// Parameters of one accelerated gradient descent run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DescentConfig {
    pub learning_rate: f64,
    pub max_iterations: usize,
    /// Log gradient norm and energy at every iteration.
    pub verbose: bool,
}

impl DescentConfig {
    pub fn new(learning_rate: f64, max_iterations: usize) -> Self {
        Self {
            learning_rate,
            max_iterations,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(GraphEnergyError::InvalidParameter {
                name: "learning_rate",
                reason: format!("must be a positive finite number, got {}", self.learning_rate),
            });
        }
        if self.max_iterations == 0 {
            return Err(GraphEnergyError::InvalidParameter {
                name: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            max_iterations: 30,
            verbose: false,
        }
    }
}
