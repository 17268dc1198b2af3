//! Error types for Mindspan

use thiserror::Error;

/// Errors that can occur while administering or scoring an assessment
#[derive(Debug, Error)]
pub enum AssessError {
    #[error("Invalid participant profile: {0}")]
    InvalidProfile(String),

    #[error("Symbol palette too small: {got} symbols, need at least {need}")]
    PaletteTooSmall { got: usize, need: usize },

    #[error("Response received outside its presentation window: {0}")]
    ResponseOutsideWindow(String),

    #[error("Operation not valid in current session state: {0}")]
    SessionState(String),

    #[error("Insufficient data to classify: {0}")]
    InsufficientData(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
