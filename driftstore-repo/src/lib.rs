//! Repository layer for driftstore.
//!
//! A [`Repository`] is the logical unit of storage: an identifier plus a
//! backing [`Datastore`]. It delegates bytes to the store and versioning
//! and merging to the model layer, enforcing merge-before-store semantics:
//! an incoming version is always merged **into** the stored incumbent, so
//! merge strategies consistently treat "local" as the already-committed
//! replica state.

mod error;

pub use error::{RepoError, RepoResult};

use std::sync::Arc;

use tracing::debug;

use driftstore_model::{global_registry, Entity, ModelRegistry};
use driftstore_store::{Datastore, Query};
use driftstore_types::{Key, TypesError, Version};

/// The storage-facing API of one replica.
///
/// Operations are synchronous and individually atomic at the store level
/// only: `merge` performs get → merge → put as separate calls, so a
/// concurrent writer to the same key between those steps can be lost. A
/// backing store offering compare-and-swap is the extension point for
/// callers needing stronger guarantees.
pub struct Repository {
    id: Key,
    store: Box<dyn Datastore>,
    registry: Arc<ModelRegistry>,
}

impl Repository {
    /// Creates a repository over a backing store, resolving model types
    /// through the process-wide registry.
    #[must_use]
    pub fn new(id: impl Into<Key>, store: Box<dyn Datastore>) -> Self {
        Self::with_registry(id, store, global_registry())
    }

    /// Creates a repository resolving model types through a private
    /// registry.
    #[must_use]
    pub fn with_registry(
        id: impl Into<Key>,
        store: Box<dyn Datastore>,
        registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            id: id.into(),
            store,
            registry,
        }
    }

    /// This repository's identifier.
    #[must_use]
    pub fn id(&self) -> &Key {
        &self.id
    }

    /// Retrieves the current entity addressed by `key`.
    pub fn get(&self, key: &Key) -> RepoResult<Option<Entity>> {
        let Some(bytes) = self.store.get(key)? else {
            debug!(repo = %self.id, %key, "get: not found");
            return Ok(None);
        };
        let version = Version::decode(&bytes)?;
        let entity = Entity::from_version_in(&self.registry, version)?;
        debug!(repo = %self.id, %key, hash = %entity.version().short_hash(), "get");
        Ok(Some(entity))
    }

    /// Stores the entity's current version.
    ///
    /// Fails with [`RepoError::DirtyPut`] if the entity has uncommitted
    /// changes; commit first.
    pub fn put(&self, entity: &Entity) -> RepoResult<()> {
        if entity.is_dirty() {
            return Err(RepoError::DirtyPut);
        }
        self.put_version(entity.version())
    }

    /// Stores a version directly.
    pub fn put_version(&self, version: &Version) -> RepoResult<()> {
        let bytes = version.encode()?;
        self.store.put(version.key(), bytes)?;
        debug!(repo = %self.id, key = %version.key(), hash = %version.short_hash(), "put");
        Ok(())
    }

    /// Merges an incoming entity's version with the stored one.
    ///
    /// Fails with [`RepoError::DirtyPut`] if the incoming entity has
    /// uncommitted changes.
    pub fn merge(&self, incoming: &Entity) -> RepoResult<Entity> {
        if incoming.is_dirty() {
            return Err(RepoError::DirtyPut);
        }
        self.merge_version(incoming.version())
    }

    /// Merges an incoming version with the current one in the store and
    /// returns the resulting entity.
    ///
    /// With no incumbent at the key this is a plain put (the first-writer
    /// case). Otherwise the incumbent is loaded and the incoming version is
    /// merged into it — never the other way around — so strategies see the
    /// already-committed replica state as "local". The incoming version is
    /// never mutated.
    pub fn merge_version(&self, incoming: &Version) -> RepoResult<Entity> {
        let key = incoming.key();
        let Some(mut current) = self.get(key)? else {
            self.put_version(incoming)?;
            debug!(repo = %self.id, %key, "merge: first writer");
            return Ok(Entity::from_version_in(&self.registry, incoming.clone())?);
        };

        current.merge(incoming)?;
        self.put(&current)?;
        debug!(
            repo = %self.id,
            %key,
            incoming = %incoming.short_hash(),
            merged = %current.version().short_hash(),
            "merge",
        );
        Ok(current)
    }

    /// Returns whether the store holds an entity at `key`.
    pub fn contains(&self, key: &Key) -> RepoResult<bool> {
        Ok(self.store.contains(key)?)
    }

    /// Deletes the entity addressed by `key` from the store.
    pub fn delete(&self, key: &Key) -> RepoResult<()> {
        self.store.delete(key)?;
        debug!(repo = %self.id, %key, "delete");
        Ok(())
    }

    /// Queries the store for entities matching `query`.
    ///
    /// Uses the store's native query support when present; otherwise scans
    /// and evaluates the predicate in memory. Results decode lazily
    /// (version → entity) as the iterator is consumed, and the sequence is
    /// restartable only if the underlying storage iterator is.
    pub fn query(
        &self,
        query: Query,
    ) -> RepoResult<Box<dyn Iterator<Item = RepoResult<Entity>> + '_>> {
        let registry = self.registry.clone();
        if let Some(records) = self.store.query(&query)? {
            let entities = records.map(move |bytes| {
                let version = Version::decode(&bytes?)?;
                Ok(Entity::from_version_in(&registry, version)?)
            });
            return Ok(Box::new(entities));
        }

        let versions = self.scan_matching(&query)?;
        let entities = versions
            .into_iter()
            .map(move |version| Ok(Entity::from_version_in(&registry, version)?));
        Ok(Box::new(entities))
    }

    /// Queries the store and returns matching keys only.
    pub fn query_keys(&self, query: Query) -> RepoResult<Vec<Key>> {
        if let Some(records) = self.store.query(&query)? {
            let mut keys = Vec::new();
            for bytes in records {
                keys.push(Version::decode(&bytes?)?.key().clone());
            }
            return Ok(keys);
        }
        let versions = self.scan_matching(&query)?;
        Ok(versions.into_iter().map(|v| v.key().clone()).collect())
    }

    /// Scan fallback: decode everything, filter, sort, page.
    fn scan_matching(&self, query: &Query) -> RepoResult<Vec<Version>> {
        let Some(records) = self.store.scan()? else {
            return Err(RepoError::UnsupportedQuery);
        };

        let mut matched: Vec<(serde_json::Value, Version)> = Vec::new();
        for bytes in records {
            let version = Version::decode(&bytes?)?;
            let record = serde_json::to_value(&version).map_err(TypesError::from)?;
            if query.matches(&record) {
                matched.push((record, version));
            }
        }
        if !query.orders.is_empty() {
            matched.sort_by(|(a, _), (b, _)| query.compare(a, b));
        }
        Ok(matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|(_, version)| version)
            .collect())
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").field("id", &self.id).finish()
    }
}
