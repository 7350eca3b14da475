use thiserror::Error;

/// Precondition failures surfaced by the energy model, the optimizer and the
/// classifier front-end. None of these are transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphEnergyError {
    #[error("model must be configured with data before use")]
    NotFitted,
    #[error("feature matrix has {features} rows but label vector has {labels} entries")]
    ShapeMismatch { features: usize, labels: usize },
    #[error("expected a vector of length {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("index {index} out of range for {len} samples")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("label {value} at index {index} is not one of -1, 0, 1")]
    InvalidLabel { index: usize, value: i8 },
    #[error("labeled sample at index {index} follows an unlabeled sample; labeled rows must come first")]
    LabelOrdering { index: usize },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, GraphEnergyError>;
