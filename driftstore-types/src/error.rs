//! Error types for the core type layer.

use thiserror::Error;

/// Result type for core type operations.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors that can occur while constructing or decoding core types.
#[derive(Debug, Error)]
pub enum TypesError {
    /// A serialized version record is missing required fields or violates
    /// a structural invariant (e.g. `created > committed`).
    #[error("malformed version: {0}")]
    MalformedVersion(String),

    /// An attribute was looked up that the version does not carry.
    #[error("no attribute {name} in this version")]
    NoSuchAttribute { name: String },

    /// An attribute exists but does not carry the requested metadata.
    #[error("no metadata {meta} on attribute {name} in this version")]
    NoSuchMetadata { name: String, meta: String },

    /// A key string could not be normalized into a valid key.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// A hash string is not 40 hexadecimal characters.
    #[error("invalid version hash: {0}")]
    InvalidHash(String),

    /// Serialization of a version record failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
