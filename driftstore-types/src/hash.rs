//! Content hashes for version snapshots.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};
use std::fmt;

use crate::error::TypesError;

/// Content-addressed identifier of a version snapshot.
///
/// A `VersionHash` is the 160-bit SHA-1 digest of a version's canonical
/// serialization. Identical content always produces the same hash, which is
/// what makes version identity comparable across replicas. On the wire a
/// hash travels as 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionHash([u8; 20]);

impl VersionHash {
    /// Compute the hash of raw bytes.
    #[must_use]
    pub fn digest(data: &[u8]) -> Self {
        Self(Sha1::digest(data).into())
    }

    /// The blank hash (all zeros). Marks a never-committed version.
    pub const BLANK: VersionHash = VersionHash([0u8; 20]);

    /// Returns `true` if this is the blank hash.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// The raw 20-byte digest.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Hex-encoded string representation (40 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    #[must_use]
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let bytes = hex::decode(s).map_err(|_| TypesError::InvalidHash(s.to_string()))?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| TypesError::InvalidHash(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for VersionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionHash({})", self.short_hex())
    }
}

impl fmt::Display for VersionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 20]> for VersionHash {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for VersionHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for VersionHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = VersionHash;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 40-character hex string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<VersionHash, E> {
                VersionHash::from_hex(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}
