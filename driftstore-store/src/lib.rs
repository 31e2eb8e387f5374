//! Storage collaborator contract for driftstore.
//!
//! The versioning core delegates all I/O to an external key/value store
//! behind the [`Datastore`] trait. Values are opaque serialized version
//! records; the core defines the logical schema, the store only needs to
//! round-trip bytes faithfully.
//!
//! Two optional capabilities extend the four-method contract:
//! - [`Datastore::query`] — native filtering/sorting for stores that have it
//! - [`Datastore::scan`] — full enumeration, which lets the repository run
//!   queries in memory against stores without native query support
//!
//! [`MemoryDatastore`] is the reference in-process backend. Filesystem,
//! version-controlled, document-database, and remote-document backends all
//! implement this same contract externally.

mod error;
mod memory;
mod query;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryDatastore;
pub use query::{Filter, Op, Order, Query, DEFAULT_LIMIT};

use driftstore_types::Key;

/// A lazily consumed sequence of raw stored records.
///
/// Restartable only if the underlying storage iterator is restartable;
/// callers that need to re-iterate must re-issue the query.
pub type RawRecords<'a> = Box<dyn Iterator<Item = StoreResult<Vec<u8>>> + Send + 'a>;

/// The uniform key/value contract the versioning core requires from any
/// backing store.
///
/// All calls are synchronous; concurrency, timeouts, and retries are the
/// store's own concern.
pub trait Datastore: Send + Sync {
    /// Returns the record stored under `key`, if any.
    fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous record.
    fn put(&self, key: &Key, value: Vec<u8>) -> StoreResult<()>;

    /// Removes the record stored under `key`, if any.
    fn delete(&self, key: &Key) -> StoreResult<()>;

    /// Returns whether a record is stored under `key`.
    fn contains(&self, key: &Key) -> StoreResult<bool>;

    /// Natively evaluates a query, if this store supports it.
    ///
    /// Returns `Ok(None)` (the default) when the store has no native query
    /// support; the repository then falls back to [`Datastore::scan`] plus
    /// in-memory predicate evaluation. The `keys_only` projection is applied
    /// by the caller, not the store.
    fn query(&self, query: &Query) -> StoreResult<Option<RawRecords<'_>>> {
        let _ = query;
        Ok(None)
    }

    /// Enumerates every stored record, if this store supports enumeration.
    fn scan(&self) -> StoreResult<Option<RawRecords<'_>>> {
        Ok(None)
    }
}
