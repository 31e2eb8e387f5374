//! Error types for the model layer.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// An attribute value failed validation against its descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required attribute was set to an empty value.
    #[error("attribute {attr} is required")]
    Required { attr: String },

    /// The value cannot be coerced to the attribute's data type.
    #[error("value for attribute {attr} is not compatible with {expected}")]
    IncompatibleType { attr: String, expected: String },

    /// A single-line string attribute received an embedded newline.
    #[error("attribute {attr} is not multi-line")]
    Multiline { attr: String },

    /// An integer value does not fit in a signed 64-bit range.
    #[error("attribute {attr} must fit in 64 bits")]
    OutOfRange { attr: String },
}

/// Errors that can occur in schema and entity operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// An attribute value failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A merge was attempted on an entity with uncommitted changes.
    #[error("cannot merge a dirty entity")]
    DirtyMerge,

    /// A merge was attempted on an entity that was never committed.
    #[error("cannot merge an uncommitted (blank) entity")]
    UncommittedMerge,

    /// The named attribute is not defined on the entity's schema.
    #[error("no attribute {name} on model {type_name}")]
    NoSuchAttribute { name: String, type_name: String },

    /// A schema defined the same attribute name twice.
    #[error("duplicate attribute: {name}")]
    DuplicateAttribute { name: String },

    /// A different schema was already registered under this type name.
    #[error("duplicate model registered: {type_name}")]
    DuplicateModel { type_name: String },

    /// No schema is registered under this type name.
    #[error("no model registered for type: {type_name}")]
    UnregisteredModel { type_name: String },

    /// A version's type tag does not match the schema it was decoded with.
    #[error("version type {actual:?} does not match model {expected:?}")]
    TypeMismatch { expected: String, actual: String },

    /// An entity key name contained a path separator.
    #[error("key name {0:?} must not include slashes")]
    InvalidKeyName(String),

    /// A merge strategy could not be resolved.
    #[error(transparent)]
    Strategy(#[from] driftstore_merge::MergeError),

    /// A version-level failure (malformed record, missing attribute, ...).
    #[error(transparent)]
    Version(#[from] driftstore_types::TypesError),
}
