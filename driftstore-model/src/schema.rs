//! Model schemas and the process-wide model registry.
//!
//! A model type's attribute set is computed once, at definition time, as a
//! flat name → descriptor map; duplicate names are rejected eagerly at that
//! point. The registry maps type names to schemas so that versions decoded
//! from storage can be projected back into entities.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock, RwLock};

use crate::attribute::AttributeDescriptor;
use crate::error::{ModelError, ModelResult};

/// An immutable model type definition: a type name plus its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    type_name: String,
    attributes: BTreeMap<String, AttributeDescriptor>,
}

impl ModelSchema {
    /// Starts building a schema for the given type name.
    #[must_use]
    pub fn builder(type_name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder {
            type_name: type_name.into(),
            attributes: Vec::new(),
        }
    }

    /// The model type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// All attribute descriptors, keyed by name.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, AttributeDescriptor> {
        &self.attributes
    }

    /// The descriptor for the named attribute.
    pub fn attribute(&self, name: &str) -> ModelResult<&AttributeDescriptor> {
        self.attributes
            .get(name)
            .ok_or_else(|| ModelError::NoSuchAttribute {
                name: name.to_string(),
                type_name: self.type_name.clone(),
            })
    }
}

/// Builder for [`ModelSchema`]. Collects descriptors, then binds and
/// collision-checks them in [`ModelSchemaBuilder::build`].
pub struct ModelSchemaBuilder {
    type_name: String,
    attributes: Vec<(String, AttributeDescriptor)>,
}

impl ModelSchemaBuilder {
    /// Adds an attribute under the given name.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, descriptor: AttributeDescriptor) -> Self {
        self.attributes.push((name.into(), descriptor));
        self
    }

    /// Finalizes the schema.
    ///
    /// Fails with [`ModelError::DuplicateAttribute`] if the same attribute
    /// name was added twice.
    pub fn build(self) -> ModelResult<Arc<ModelSchema>> {
        let mut attributes = BTreeMap::new();
        for (name, mut descriptor) in self.attributes {
            descriptor.configure(&self.type_name, &name);
            if attributes.insert(name.clone(), descriptor).is_some() {
                return Err(ModelError::DuplicateAttribute { name });
            }
        }
        Ok(Arc::new(ModelSchema {
            type_name: self.type_name,
            attributes,
        }))
    }
}

/// A registry mapping type names to model schemas.
///
/// Registration happens once per type during the startup configuration
/// phase; the registry is read-only afterward. Registering the same type
/// name again with an identical schema is a no-op; registering a different
/// schema under an existing name is a fatal configuration error.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<ModelSchema>>>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its type name.
    ///
    /// Fails with [`ModelError::DuplicateModel`] if a different schema is
    /// already registered under the same name.
    pub fn register(&self, schema: Arc<ModelSchema>) -> ModelResult<()> {
        let mut models = self
            .models
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match models.get(schema.type_name()) {
            Some(existing) if **existing == *schema => Ok(()),
            Some(_) => Err(ModelError::DuplicateModel {
                type_name: schema.type_name().to_string(),
            }),
            None => {
                models.insert(schema.type_name().to_string(), schema);
                Ok(())
            }
        }
    }

    /// Looks up the schema registered under a type name.
    pub fn lookup(&self, type_name: &str) -> ModelResult<Arc<ModelSchema>> {
        let models = self
            .models
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        models
            .get(type_name)
            .cloned()
            .ok_or_else(|| ModelError::UnregisteredModel {
                type_name: type_name.to_string(),
            })
    }

    /// Returns `true` if a schema is registered under the type name.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        let models = self
            .models
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        models.contains_key(type_name)
    }
}

static GLOBAL: LazyLock<Arc<ModelRegistry>> = LazyLock::new(|| Arc::new(ModelRegistry::new()));

/// The process-wide model registry.
#[must_use]
pub fn global_registry() -> Arc<ModelRegistry> {
    GLOBAL.clone()
}
