use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GBoostError>;

/// Errors surfaced by model fitting, prediction, and persistence.
///
/// Every variant is a deterministic function of the input shape or the
/// configuration, so callers gain nothing from retrying a failed call.
#[derive(Debug, Error)]
pub enum GBoostError {
    /// The feature matrix and target vector disagree in shape, or one of
    /// them is empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A loss selector that no `Loss` variant recognizes.
    #[error("unsupported loss function: {0:?}")]
    UnsupportedLoss(String),
    /// `predict` or `save_model` was called before a successful `fit`.
    #[error("model has not been fitted")]
    NotFitted,
    /// Reading or writing a saved model failed.
    #[error("model file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding or decoding a saved model failed.
    #[error("model serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
