//! Hierarchical object keys.
//!
//! A key is the unique identifier of a stored object. Keys are
//! slash-separated paths, normalized so that duplicate and empty segments
//! collapse (`//a///b` and `/a/b` are the same key). Keys are hierarchical:
//! objects can be the children of other objects, and the object's type name
//! conventionally forms the leading segment:
//!
//! ```text
//! /ComedyGroup/MontyPython
//! /ComedyGroup/MontyPython/Comedian/JohnCleese
//! ```

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;

use crate::error::{TypesError, TypesResult};

/// A normalized, hierarchical object identifier.
///
/// Equality and ordering are lexicographic on the normalized string, so keys
/// compare identically on every replica.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Creates a key from a path string, normalizing slashes.
    ///
    /// An input with no non-empty segments yields the root key `/`.
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut s = String::with_capacity(path.as_ref().len() + 1);
        for segment in path.as_ref().split('/').filter(|p| !p.is_empty()) {
            s.push('/');
            s.push_str(segment);
        }
        if s.is_empty() {
            s.push('/');
        }
        Self(s)
    }

    /// Creates a key from a path string, rejecting paths with no segments.
    pub fn parse(path: &str) -> TypesResult<Self> {
        let key = Self::new(path);
        if key.is_root() {
            return Err(TypesError::InvalidKey(path.to_string()));
        }
        Ok(key)
    }

    /// Creates a key with a random (uuid4 hex) top-level name.
    #[must_use]
    pub fn random() -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string())
    }

    /// The normalized path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key's segments, in order.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.split('/').filter(|p| !p.is_empty())
    }

    /// The last segment of the key (the object's own name).
    #[must_use]
    pub fn name(&self) -> &str {
        self.segments().next_back().unwrap_or("")
    }

    /// The first segment of the key. By convention this is the type name of
    /// the top-level object in the path.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.segments().next().unwrap_or("")
    }

    /// The parent key, or `None` for root and top-level keys.
    #[must_use]
    pub fn parent(&self) -> Option<Key> {
        let idx = self.0.rfind('/')?;
        if idx == 0 {
            return None;
        }
        Some(Key(self.0[..idx].to_string()))
    }

    /// A child key with the given path appended.
    #[must_use]
    pub fn child(&self, other: impl AsRef<str>) -> Key {
        Key::new(format!("{}/{}", self.0, other.as_ref()))
    }

    /// Returns `true` if this key is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Key) -> bool {
        if other.0.len() <= self.0.len() {
            return false;
        }
        if self.is_root() {
            return true;
        }
        other.0.starts_with(&self.0) && other.0.as_bytes()[self.0.len()] == b'/'
    }

    /// Returns `true` if this key is a strict descendant of `other`.
    #[must_use]
    pub fn is_descendant_of(&self, other: &Key) -> bool {
        other.is_ancestor_of(self)
    }

    /// Returns `true` if this key has exactly one segment.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.0.rfind('/') == Some(0) && !self.is_root()
    }

    /// Returns `true` for the root key `/`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// A process-stable 64-bit hash of the key, suitable for sharding.
    ///
    /// Derived from the SHA-1 of the normalized string, so it is identical
    /// across processes and platforms (unlike `std::hash::Hash`).
    #[must_use]
    pub fn stable_hash(&self) -> u64 {
        let digest = Sha1::digest(self.0.as_bytes());
        u64::from_be_bytes(digest[..8].try_into().expect("sha1 digest is 20 bytes"))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

impl From<String> for Key {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&str> for Key {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> String {
        key.0
    }
}

impl FromStr for Key {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::parse(s)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
