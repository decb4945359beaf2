//! Engine error type.

use tourist_safety_geo_models::InvalidCoordinateError;
use tourist_safety_store::StoreError;

/// Errors surfaced by [`crate::SafetyEngine`] operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The request itself is malformed. Not retryable.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },

    /// A coordinate is out of range.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] InvalidCoordinateError),

    /// The storage collaborator failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
