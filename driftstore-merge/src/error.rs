//! Error types for the merge layer.

use thiserror::Error;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors that can occur when resolving merge strategies.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A named strategy does not exist in the strategy registry.
    #[error("invalid merge strategy: {0:?}")]
    InvalidStrategyType(String),
}
