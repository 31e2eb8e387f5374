//! Entity model for driftstore.
//!
//! Defines the schema and entity layer of the versioning engine:
//! - [`DataType`] / [`AttributeDescriptor`] — typed field definitions with a
//!   bound merge strategy
//! - [`ModelSchema`] / [`ModelRegistry`] — a model type's flat attribute
//!   map, computed once at definition time, plus the process-wide type
//!   registry
//! - [`Entity`] — the mutable, in-memory projection of a [`Version`]:
//!   validates assignments, tracks dirty state, computes content-hashed
//!   versions on commit, and orchestrates attribute-by-attribute merges
//!
//! [`Version`]: driftstore_types::Version

mod attribute;
mod entity;
mod error;
mod schema;

pub use attribute::{AttributeDescriptor, DataType};
pub use entity::Entity;
pub use error::{ModelError, ModelResult, ValidationError};
pub use schema::{global_registry, ModelRegistry, ModelSchema, ModelSchemaBuilder};
