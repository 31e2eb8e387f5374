//! In-process map-backed datastore.

use std::collections::BTreeMap;
use std::sync::RwLock;

use driftstore_types::Key;

use crate::error::StoreResult;
use crate::query::Query;
use crate::{Datastore, RawRecords};

/// A simple in-memory datastore: an ordered map of keys to raw records.
///
/// The reference backend for tests and for replicas that keep their working
/// set in process. Supports both optional capabilities (native queries and
/// full scans).
#[derive(Debug, Default)]
pub struct MemoryDatastore {
    entries: RwLock<BTreeMap<Key, Vec<u8>>>,
}

impl MemoryDatastore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<Key, Vec<u8>>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<Key, Vec<u8>>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Datastore for MemoryDatastore {
    fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read().get(key).cloned())
    }

    fn put(&self, key: &Key, value: Vec<u8>) -> StoreResult<()> {
        self.write().insert(key.clone(), value);
        Ok(())
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        self.write().remove(key);
        Ok(())
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        Ok(self.read().contains_key(key))
    }

    fn query(&self, query: &Query) -> StoreResult<Option<RawRecords<'_>>> {
        // Pair each decoded record with its original bytes so the result
        // stream hands back the stored encoding untouched.
        let mut matched: Vec<(serde_json::Value, Vec<u8>)> = Vec::new();
        for bytes in self.read().values() {
            let record: serde_json::Value = serde_json::from_slice(bytes)?;
            if query.matches(&record) {
                matched.push((record, bytes.clone()));
            }
        }
        if !query.orders.is_empty() {
            matched.sort_by(|(a, _), (b, _)| query.compare(a, b));
        }
        let results = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|(_, bytes)| Ok(bytes));
        Ok(Some(Box::new(results)))
    }

    fn scan(&self) -> StoreResult<Option<RawRecords<'_>>> {
        let all: Vec<Vec<u8>> = self.read().values().cloned().collect();
        Ok(Some(Box::new(all.into_iter().map(Ok))))
    }
}
