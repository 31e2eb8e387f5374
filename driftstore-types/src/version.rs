//! Immutable version snapshots.
//!
//! A version is one snapshot of a particular object's attribute values. Its
//! hash determines the identity of the snapshot; versions form a
//! single-parent chain via the `parent` hash. The engine never materializes
//! more than the current head — history beyond the immediate parent is a
//! concern of the backing store, if it keeps one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::error::{TypesError, TypesResult};
use crate::hash::VersionHash;
use crate::key::Key;
use crate::time::NanoTime;

/// The stored state of one attribute: its raw value plus whatever metadata
/// the attribute's merge strategy persists.
///
/// Raw states are only ever replaced wholesale, never field-patched. That
/// keeps attribute writes idempotent: re-setting an equal value replaces
/// nothing and advances no metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawState {
    /// The attribute value, in its stored (encoded) form.
    pub value: serde_json::Value,
    /// Per-attribute update stamp, persisted by timestamp-keeping merge
    /// strategies. Absent for stateless strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<NanoTime>,
}

impl RawState {
    /// Creates a raw state with no strategy metadata.
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self {
            value,
            updated: None,
        }
    }
}

/// An immutable snapshot of one entity.
///
/// Versions are content-addressed: `hash` is the SHA-1 of the canonical
/// serialization of `(key, type, sorted attribute name=value pairs)`.
/// Equality is hash+key equality — under a correct hash function, equal
/// hashes imply equal attribute payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    key: Key,
    hash: VersionHash,
    parent: VersionHash,
    #[serde(rename = "type")]
    type_name: String,
    created: NanoTime,
    committed: NanoTime,
    attributes: BTreeMap<String, RawState>,
}

impl Version {
    /// Creates a blank (never committed) version for the given key.
    ///
    /// Blank versions carry the blank hash for both `hash` and `parent`,
    /// zero timestamps, an empty type tag, and no attributes.
    #[must_use]
    pub fn blank(key: Key) -> Self {
        Self {
            key,
            hash: VersionHash::BLANK,
            parent: VersionHash::BLANK,
            type_name: String::new(),
            created: NanoTime::ZERO,
            committed: NanoTime::ZERO,
            attributes: BTreeMap::new(),
        }
    }

    /// Assembles a version from its parts, validating the time invariant.
    pub fn new(
        key: Key,
        type_name: impl Into<String>,
        hash: VersionHash,
        parent: VersionHash,
        created: NanoTime,
        committed: NanoTime,
        attributes: BTreeMap<String, RawState>,
    ) -> TypesResult<Self> {
        let version = Self {
            key,
            hash,
            parent,
            type_name: type_name.into(),
            created,
            committed,
            attributes,
        };
        version.validate()?;
        Ok(version)
    }

    /// Decodes a version from its wire record (JSON bytes).
    ///
    /// Fails with [`TypesError::MalformedVersion`] when required fields are
    /// missing or `created ≤ committed` does not hold.
    pub fn decode(bytes: &[u8]) -> TypesResult<Self> {
        let version: Version = serde_json::from_slice(bytes)
            .map_err(|e| TypesError::MalformedVersion(e.to_string()))?;
        version.validate()?;
        Ok(version)
    }

    /// Encodes the version into its wire record (JSON bytes).
    pub fn encode(&self) -> TypesResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn validate(&self) -> TypesResult<()> {
        if self.created.nanos() < 0 || self.committed.nanos() < 0 {
            return Err(TypesError::MalformedVersion(
                "negative timestamp".to_string(),
            ));
        }
        if self.created > self.committed {
            return Err(TypesError::MalformedVersion(format!(
                "created {} is after committed {}",
                self.created, self.committed
            )));
        }
        Ok(())
    }

    /// The key of the object this version snapshots.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The content hash of this snapshot.
    #[must_use]
    pub fn hash(&self) -> VersionHash {
        self.hash
    }

    /// The content hash of the parent snapshot.
    #[must_use]
    pub fn parent(&self) -> VersionHash {
        self.parent
    }

    /// The entity type tag.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// When the object was first committed.
    #[must_use]
    pub fn created(&self) -> NanoTime {
        self.created
    }

    /// When this snapshot was committed.
    #[must_use]
    pub fn committed(&self) -> NanoTime {
        self.committed
    }

    /// All stored attribute states, keyed by attribute name.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, RawState> {
        &self.attributes
    }

    /// Returns `true` if this version was never committed.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.hash.is_blank()
    }

    /// The first 8 hex characters of the hash.
    #[must_use]
    pub fn short_hash(&self) -> String {
        self.hash.short_hex()
    }

    /// The raw state of the named attribute.
    pub fn attribute(&self, name: &str) -> TypesResult<&RawState> {
        self.attributes
            .get(name)
            .ok_or_else(|| TypesError::NoSuchAttribute {
                name: name.to_string(),
            })
    }

    /// The stored value of the named attribute.
    pub fn attribute_value(&self, name: &str) -> TypesResult<&serde_json::Value> {
        Ok(&self.attribute(name)?.value)
    }

    /// The `updated` stamp of the named attribute.
    ///
    /// Fails with [`TypesError::NoSuchMetadata`] when the attribute exists
    /// but its strategy persists no stamp.
    pub fn attribute_updated(&self, name: &str) -> TypesResult<NanoTime> {
        self.attribute(name)?
            .updated
            .ok_or_else(|| TypesError::NoSuchMetadata {
                name: name.to_string(),
                meta: "updated".to_string(),
            })
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.key == other.key
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}
