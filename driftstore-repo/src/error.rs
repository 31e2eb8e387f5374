//! Error types for the repository layer.

use thiserror::Error;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// An entity with uncommitted changes was handed to `put` or `merge`.
    #[error("cannot store an entity with uncommitted changes")]
    DirtyPut,

    /// The backing store supports neither native queries nor scans.
    #[error("the backing datastore does not support queries")]
    UnsupportedQuery,

    /// A schema/entity-level failure.
    #[error(transparent)]
    Model(#[from] driftstore_model::ModelError),

    /// A storage collaborator failure.
    #[error(transparent)]
    Store(#[from] driftstore_store::StoreError),

    /// A version decoding/encoding failure.
    #[error(transparent)]
    Types(#[from] driftstore_types::TypesError),
}
