//! Synchronous pressure propagation.
//!
//! A lighter alternative to energy minimization. Every sample carries a
//! pressure, initialised to its label. In each round every sample pushes on
//! each neighbour within `reach` (L1 distance) with
//! `scale · pressure / distance`, using the pressure it held at the end of
//! the previous round. Pressures are clamped to `±cap` after every push. The
//! sign of the final pressure is the predicted class.
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::data_handling::validate_labels;
use crate::error::{GraphEnergyError, Result};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PressureConfig {
    /// Neighbours farther than this (L1) exert no pressure.
    pub reach: f64,
    /// Multiplier on `pressure / distance`.
    pub scale: f64,
    /// Absolute bound on any pressure.
    pub cap: f64,
    /// Rounds run by the CLI.
    pub rounds: usize,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            reach: 0.4,
            scale: 1e-2,
            cap: 1e4,
            rounds: 10,
        }
    }
}

impl PressureConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.reach.is_finite() && self.reach > 0.0) {
            return Err(GraphEnergyError::InvalidParameter {
                name: "reach",
                reason: format!("must be a positive finite number, got {}", self.reach),
            });
        }
        if !self.scale.is_finite() {
            return Err(GraphEnergyError::InvalidParameter {
                name: "scale",
                reason: format!("must be finite, got {}", self.scale),
            });
        }
        if !(self.cap.is_finite() && self.cap > 0.0) {
            return Err(GraphEnergyError::InvalidParameter {
                name: "cap",
                reason: format!("must be a positive finite number, got {}", self.cap),
            });
        }
        Ok(())
    }
}

fn l1_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

#[derive(Debug, Clone)]
pub struct PressurePropagation {
    config: PressureConfig,
}

impl PressurePropagation {
    pub fn new(config: PressureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PressureConfig {
        &self.config
    }

    /// Pressure exerted by a sample holding `pressure` on a sample at
    /// `distance`. Zero beyond reach and for duplicates.
    pub fn push(&self, distance: f64, pressure: f64) -> f64 {
        if distance > self.config.reach || distance == 0.0 {
            0.0
        } else {
            self.config.scale * pressure / distance
        }
    }

    /// Run `rounds` synchronous rounds and return the final pressures.
    ///
    /// Rows may be in any order. Zero rounds returns the labels as floats.
    pub fn run(&self, x: ArrayView2<f64>, y: ArrayView1<i8>, rounds: usize) -> Result<Array1<f64>> {
        if x.nrows() != y.len() {
            return Err(GraphEnergyError::ShapeMismatch {
                features: x.nrows(),
                labels: y.len(),
            });
        }
        let n_labeled = validate_labels(y)?;
        let n = y.len();
        let cap = self.config.cap;

        // Distances never change between rounds.
        let mut neighbours: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for (i, list) in neighbours.iter_mut().enumerate() {
            for j in 0..n {
                let d = l1_distance(x.row(j), x.row(i));
                if d > 0.0 && d <= self.config.reach {
                    list.push((j, d));
                }
            }
        }
        log::debug!(
            "Pressure propagation over {} samples ({} labeled), {} rounds",
            n,
            n_labeled,
            rounds
        );

        let mut previous = y.mapv(f64::from);
        let mut current = previous.clone();
        for round in 0..rounds {
            for (i, list) in neighbours.iter().enumerate() {
                for &(j, d) in list {
                    current[i] = (current[i] + self.push(d, previous[j])).clamp(-cap, cap);
                }
                // isolated samples are still held to the cap
                current[i] = current[i].clamp(-cap, cap);
            }
            let flips = current
                .iter()
                .zip(previous.iter())
                .filter(|&(&c, &p)| (c < 0.0) != (p < 0.0))
                .count();
            log::trace!("Round {}: {} sign change(s)", round, flips);
            previous.assign(&current);
        }
        Ok(current)
    }
}
