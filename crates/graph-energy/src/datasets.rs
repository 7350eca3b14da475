//! Synthetic datasets for demos and tests.
use std::f64::consts::PI;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::data_handling::LabeledDataset;
use crate::error::{GraphEnergyError, Result};

/// Parameters for [`two_moons`].
#[derive(Debug, Clone)]
pub struct MoonsConfig {
    pub n_samples: usize,
    /// Half-width of the uniform jitter added to each coordinate.
    pub noise: f64,
    /// Fraction of samples that keep their label.
    pub labeled_fraction: f64,
    /// Number of round-robin groups; 0 leaves the dataset ungrouped.
    pub n_groups: usize,
    pub seed: u64,
}

impl Default for MoonsConfig {
    fn default() -> Self {
        Self {
            n_samples: 200,
            noise: 0.05,
            labeled_fraction: 0.1,
            n_groups: 0,
            seed: 42,
        }
    }
}

/// Two interleaving half circles: the upper moon is class -1, the lower
/// moon class +1.
///
/// All labels except a `labeled_fraction` of them are hidden (set to 0); at
/// least one sample of each class stays labeled. Rows come back in
/// generation order, so labeled and unlabeled rows are interleaved.
pub fn two_moons(config: &MoonsConfig) -> Result<LabeledDataset> {
    if config.n_samples < 2 {
        return Err(GraphEnergyError::InvalidParameter {
            name: "n_samples",
            reason: format!("need at least 2 samples, got {}", config.n_samples),
        });
    }
    if !(0.0..=1.0).contains(&config.labeled_fraction) {
        return Err(GraphEnergyError::InvalidParameter {
            name: "labeled_fraction",
            reason: format!("must be within [0, 1], got {}", config.labeled_fraction),
        });
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(GraphEnergyError::InvalidParameter {
            name: "noise",
            reason: format!("must be a non-negative finite number, got {}", config.noise),
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let n_upper = config.n_samples / 2;
    let n_lower = config.n_samples - n_upper;

    let mut points = Vec::with_capacity(config.n_samples);
    let mut classes = Vec::with_capacity(config.n_samples);
    for (count, class) in [(n_upper, -1i8), (n_lower, 1i8)] {
        for k in 0..count {
            let t = if count > 1 {
                PI * k as f64 / (count - 1) as f64
            } else {
                0.0
            };
            let (px, py) = if class < 0 {
                (t.cos(), t.sin())
            } else {
                (1.0 - t.cos(), 0.5 - t.sin())
            };
            let jx = jitter(&mut rng, config.noise);
            let jy = jitter(&mut rng, config.noise);
            points.push([px + jx, py + jy]);
            classes.push(class);
        }
    }

    // Keep labels for a random subset, guaranteeing one of each class.
    let mut indices: Vec<usize> = (0..config.n_samples).collect();
    indices.shuffle(&mut rng);
    let n_keep = ((config.n_samples as f64 * config.labeled_fraction).round() as usize).max(2);
    let mut keep = vec![false; config.n_samples];
    let mut kept = 0;
    for &class in &[-1i8, 1i8] {
        if let Some(&i) = indices.iter().find(|&&i| classes[i] == class) {
            keep[i] = true;
            kept += 1;
        }
    }
    for &i in &indices {
        if kept >= n_keep {
            break;
        }
        if !keep[i] {
            keep[i] = true;
            kept += 1;
        }
    }

    let labels: Array1<i8> = classes
        .iter()
        .zip(&keep)
        .map(|(&c, &k)| if k { c } else { 0 })
        .collect();
    let x = Array2::from_shape_fn((config.n_samples, 2), |(i, c)| points[i][c]);

    let mut dataset = LabeledDataset::new(x, labels)?
        .with_feature_names(vec!["x".to_string(), "y".to_string()]);
    if config.n_groups > 0 {
        let groups = (0..config.n_samples)
            .map(|i| format!("g{}", i % config.n_groups))
            .collect();
        dataset = dataset.with_groups(groups)?;
    }
    log::debug!(
        "Generated two moons: {} samples, {} labeled",
        dataset.n_samples(),
        dataset.n_labeled()
    );
    Ok(dataset)
}

fn jitter(rng: &mut StdRng, noise: f64) -> f64 {
    if noise == 0.0 {
        0.0
    } else {
        rng.gen_range(-noise..=noise)
    }
}
