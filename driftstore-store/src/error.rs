//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Serialization/deserialization of a stored record failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record is structurally invalid.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}
