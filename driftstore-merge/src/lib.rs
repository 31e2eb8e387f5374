//! Attribute merge strategies for driftstore.
//!
//! A merge strategy is the rule that decides, for one attribute, which of
//! two divergent states survives when replicas reconcile. Strategies are
//! bound per attribute, so independent fields edited on different replicas
//! combine without one replica's edit clobbering another's.
//!
//! Every strategy must be **commutative and idempotent**: repeatedly merging
//! the same pair of versions, in either direction, converges both replicas
//! to the same final attribute state. That property is what makes
//! opportunistic, unordered synchronization safe.
//!
//! Built-in strategies:
//! - [`LatestObject`] — most recently committed *object* wins (default)
//! - [`LatestAttribute`] — most recently written *attribute* wins; persists
//!   an `updated` stamp per attribute
//! - [`Max`] — the greater value wins; for monotonically-increasing counters

mod error;
mod registry;
mod strategies;

pub use error::{MergeError, MergeResult};
pub use registry::{register_strategy, strategy_named};
pub use strategies::{LatestAttribute, LatestObject, Max, MergeStrategy};
