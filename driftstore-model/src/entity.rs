//! Mutable entities and merge orchestration.
//!
//! An entity is the in-memory projection of a [`Version`], bound to a model
//! schema. It validates attribute assignments, tracks dirty state, and
//! produces new content-hashed versions on commit. Merging runs every
//! attribute's strategy against an incoming version and re-commits the
//! combined state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use driftstore_types::{value, Key, NanoTime, RawState, Version, VersionHash};

use crate::attribute::AttributeDescriptor;
use crate::error::{ModelError, ModelResult};
use crate::schema::{ModelRegistry, ModelSchema};

/// A mutable, schema-bound object that produces [`Version`]s on commit.
///
/// Lifecycle: a fresh entity starts blank (all attributes at their
/// defaults, dirty, unpersisted); `commit` snapshots it into an immutable
/// version; assignments dirty it again; `merge` reconciles it with a
/// version from another replica and re-commits. A failed operation never
/// disturbs the last committed version.
#[derive(Debug, Clone)]
pub struct Entity {
    schema: Arc<ModelSchema>,
    key: Key,
    attributes: BTreeMap<String, RawState>,
    version: Version,
    dirty: bool,
    persisted: bool,
}

impl Entity {
    /// Creates a blank entity keyed `/<type>/<name>`.
    ///
    /// The name must not contain slashes. All attributes are initialized to
    /// their defaults (strategies see `default_init`, so default state never
    /// outranks a real edit). The entity starts dirty and unpersisted.
    pub fn new(schema: Arc<ModelSchema>, name: &str) -> ModelResult<Self> {
        let key = Key::new(format!("/{}/{}", schema.type_name(), name));
        Self::blank(schema, key, name)
    }

    /// Creates a blank entity as a child of `parent`, keyed
    /// `<parent>/<type>/<name>`.
    pub fn with_parent(schema: Arc<ModelSchema>, parent: &Key, name: &str) -> ModelResult<Self> {
        let key = parent.child(format!("{}/{}", schema.type_name(), name));
        Self::blank(schema, key, name)
    }

    fn blank(schema: Arc<ModelSchema>, key: Key, name: &str) -> ModelResult<Self> {
        if name.contains('/') {
            return Err(ModelError::InvalidKeyName(name.to_string()));
        }
        let mut entity = Self {
            version: Version::blank(key.clone()),
            schema,
            key,
            attributes: BTreeMap::new(),
            dirty: true,
            persisted: false,
        };
        for descriptor in entity.schema.clone().attributes().values() {
            entity.assign(descriptor, descriptor.default_value(), true);
        }
        Ok(entity)
    }

    /// Reconstitutes an entity from a stored version.
    ///
    /// The version's type tag must match the schema. Attributes the version
    /// does not carry (a schema that gained fields) fall back to their
    /// defaults. The entity starts clean and persisted.
    pub fn from_version(schema: Arc<ModelSchema>, version: Version) -> ModelResult<Self> {
        if version.type_name() != schema.type_name() {
            return Err(ModelError::TypeMismatch {
                expected: schema.type_name().to_string(),
                actual: version.type_name().to_string(),
            });
        }
        let mut entity = Self {
            key: version.key().clone(),
            schema,
            attributes: BTreeMap::new(),
            version,
            dirty: false,
            persisted: true,
        };
        for (name, descriptor) in entity.schema.clone().attributes() {
            match entity.version.attribute(name) {
                Ok(raw) => {
                    entity.attributes.insert(name.clone(), raw.clone());
                }
                Err(_) => {
                    entity.assign(descriptor, descriptor.default_value(), true);
                }
            }
        }
        entity.dirty = false;
        Ok(entity)
    }

    /// Reconstitutes an entity from a version, resolving the schema through
    /// a registry. Fails with `UnregisteredModel` for unknown type tags.
    pub fn from_version_in(registry: &ModelRegistry, version: Version) -> ModelResult<Self> {
        let schema = registry.lookup(version.type_name())?;
        Self::from_version(schema, version)
    }

    /// The entity's key.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The entity's schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// The model type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    /// The last committed version.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Whether there are uncommitted attribute changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the entity has ever produced a persistable version.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Whether the entity has ever been committed.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        !self.version.is_blank()
    }

    /// The decoded value of the named attribute.
    pub fn get(&self, name: &str) -> ModelResult<Value> {
        let descriptor = self.schema.attribute(name)?;
        let raw = self
            .attributes
            .get(name)
            .map(|raw| raw.value.clone())
            .unwrap_or(Value::Null);
        Ok(descriptor.loads(raw))
    }

    /// The named attribute as a string, if it holds one.
    pub fn get_str(&self, name: &str) -> ModelResult<Option<String>> {
        Ok(self.get(name)?.as_str().map(str::to_string))
    }

    /// The named attribute as an integer, if it holds one.
    pub fn get_i64(&self, name: &str) -> ModelResult<Option<i64>> {
        Ok(self.get(name)?.as_i64())
    }

    /// The named attribute as a float, if it holds one.
    pub fn get_f64(&self, name: &str) -> ModelResult<Option<f64>> {
        Ok(self.get(name)?.as_f64())
    }

    /// The named attribute as a boolean, if it holds one.
    pub fn get_bool(&self, name: &str) -> ModelResult<Option<bool>> {
        Ok(self.get(name)?.as_bool())
    }

    /// Validates and assigns an attribute value.
    ///
    /// Assignments are idempotent: setting a value equal to the currently
    /// stored value changes nothing — no dirty flag, no strategy hook, no
    /// metadata advance. Otherwise the raw state is replaced wholesale and
    /// the attribute's strategy hook runs.
    pub fn set(&mut self, name: &str, new_value: impl Into<Value>) -> ModelResult<()> {
        let descriptor = self.schema.attribute(name)?.clone();
        let validated = descriptor.validate(new_value.into())?;
        self.assign(&descriptor, validated, false);
        Ok(())
    }

    fn assign(&mut self, descriptor: &AttributeDescriptor, stored: Value, default_init: bool) {
        if let Some(existing) = self.attributes.get(descriptor.name()) {
            if existing.value == stored {
                return;
            }
        }
        let mut raw = RawState::new(stored);
        descriptor.strategy().on_set(&mut raw, default_init);
        self.attributes.insert(descriptor.name().to_string(), raw);
        self.dirty = true;
    }

    /// The canonical content hash over the current attribute state.
    ///
    /// Covers `(key, type, attribute name=value pairs sorted by name)` —
    /// values only, not strategy metadata, so replicas that agree on values
    /// agree on hashes regardless of when each one wrote them.
    #[must_use]
    pub fn computed_hash(&self) -> VersionHash {
        let mut buf = format!("{},{},", self.key, self.schema.type_name());
        for (name, raw) in &self.attributes {
            buf.push_str(name);
            buf.push('=');
            buf.push_str(&value::canonical(&raw.value));
            buf.push(',');
        }
        VersionHash::digest(buf.as_bytes())
    }

    /// Commits the current changes as a new version snapshot.
    ///
    /// A clean entity, or one whose recomputed hash matches the current
    /// version (a false alarm), commits nothing. Otherwise the new version
    /// links to the current one via its parent hash and becomes current.
    pub fn commit(&mut self) -> ModelResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let hash = self.computed_hash();
        if hash == self.version.hash() {
            // False alarm, nothing to commit.
            self.dirty = false;
            return Ok(());
        }

        let now = NanoTime::now();
        let created = if self.version.is_blank() {
            now
        } else {
            self.version.created()
        };
        let committed = now.max(created);

        self.version = Version::new(
            self.key.clone(),
            self.schema.type_name(),
            hash,
            self.version.hash(),
            created,
            committed,
            self.attributes.clone(),
        )?;
        self.persisted = true;
        self.dirty = false;
        Ok(())
    }

    /// Merges an incoming version into this entity, attribute by attribute.
    ///
    /// Preconditions: the entity must be committed and clean — merging
    /// requires both sides to be in a hash-stable state. Each attribute's
    /// strategy decides whether the remote state survives; surviving states
    /// are applied wholesale (the incoming data was validated when its
    /// replica committed it; no re-validation happens here) and the result
    /// is committed. An empty change-set leaves the entity, and its hash,
    /// untouched.
    pub fn merge(&mut self, incoming: &Version) -> ModelResult<()> {
        if self.dirty {
            return Err(ModelError::DirtyMerge);
        }
        if self.version.is_blank() {
            return Err(ModelError::UncommittedMerge);
        }
        if incoming.type_name() != self.schema.type_name() {
            return Err(ModelError::TypeMismatch {
                expected: self.schema.type_name().to_string(),
                actual: incoming.type_name().to_string(),
            });
        }

        let mut change_set: BTreeMap<String, RawState> = BTreeMap::new();
        for (name, descriptor) in self.schema.attributes() {
            if let Some(raw) = descriptor.strategy().merge(name, &self.version, incoming) {
                change_set.insert(name.clone(), raw);
            }
        }

        if change_set.is_empty() {
            return Ok(());
        }

        for (name, raw) in change_set {
            self.attributes.insert(name, raw);
        }
        self.dirty = true;
        self.commit()
    }

    /// Merges another entity's current version into this one.
    ///
    /// Fails with [`ModelError::DirtyMerge`] if the other entity has
    /// uncommitted changes.
    pub fn merge_entity(&mut self, other: &Entity) -> ModelResult<()> {
        if other.is_dirty() {
            return Err(ModelError::DirtyMerge);
        }
        self.merge(other.version())
    }
}

impl PartialEq for Entity {
    /// Entities of the same type compare by version identity; when either
    /// side is dirty there is no stable hash, so comparison falls back to
    /// the current attribute values.
    fn eq(&self, other: &Self) -> bool {
        if self.schema.type_name() != other.schema.type_name() || self.key != other.key {
            return false;
        }
        if self.dirty || other.dirty {
            let values = |e: &Entity| {
                e.attributes
                    .iter()
                    .map(|(name, raw)| (name.clone(), raw.value.clone()))
                    .collect::<BTreeMap<_, _>>()
            };
            return values(self) == values(other);
        }
        self.version == other.version
    }
}
