//! Core type definitions for driftstore.
//!
//! This crate defines the fundamental, schema-agnostic types used throughout
//! the versioning engine:
//! - [`Key`] — hierarchical, normalized object identifiers
//! - [`NanoTime`] — nanosecond UNIX timestamps used for ordering decisions
//! - [`VersionHash`] — 160-bit content hash of a version snapshot
//! - [`RawState`] / [`Version`] — the stored attribute state and the
//!   immutable, hash-linked snapshot record
//!
//! Schema definitions, entities, and merge strategies build on these types
//! but live in their own crates.

mod error;
mod hash;
mod key;
mod time;
pub mod value;
mod version;

pub use error::{TypesError, TypesResult};
pub use hash::VersionHash;
pub use key::Key;
pub use time::NanoTime;
pub use version::{RawState, Version};
