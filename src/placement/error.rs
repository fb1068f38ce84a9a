use thiserror::Error;

/// Failures raised before any placement work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("invalid placement configuration: {0}")]
    InvalidConfiguration(String),

    #[error("label count {labels} does not match point count {points}")]
    ArityMismatch { points: usize, labels: usize },
}
