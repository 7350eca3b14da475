//! graph-energy: semi-supervised binary classification by energy
//! minimization over a similarity graph.
//!
//! Samples are nodes of a complete graph weighted by a pairwise similarity
//! (RBF by default). Each sample receives a real score; scores minimize a
//! weighted sum of a fidelity term on the labeled samples, a magnitude
//! penalty and a graph smoothness penalty. The minimization runs Nesterov
//! accelerated gradient descent, and the sign of a score is its predicted
//! class.
//!
//! [`pressure::PressurePropagation`] is a simpler round-based alternative
//! that spreads label pressure between nearby samples.
//!
//! [`EnergyModel`] is the low-level objective, which requires labeled rows
//! first. [`GraphEnergyClassifier`] accepts rows in any order and is what
//! [`validation::leave_one_group_out`] drives.
pub mod cache;
pub mod classifier;
pub mod config;
pub mod data_handling;
pub mod datasets;
pub mod energy;
pub mod error;
pub mod io;
pub mod kernels;
pub mod optimizer;
pub mod preprocessing;
pub mod pressure;
pub mod validation;

pub use classifier::{score_to_label, scores_to_labels, GraphEnergyClassifier};
pub use config::{DescentConfig, EnergyConfig};
pub use data_handling::LabeledDataset;
pub use energy::{EnergyModel, EnergyTerms};
pub use error::{GraphEnergyError, Result};
pub use kernels::{Loss, Similarity};
pub use pressure::{PressureConfig, PressurePropagation};
pub use optimizer::{DescentOutcome, NesterovDescent, Objective, Termination};
pub use validation::{leave_one_group_out, ValidationReport};
