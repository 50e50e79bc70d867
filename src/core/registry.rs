//! Request-scoped registries for resources and resource types

use crate::core::resource::{Resource, ResourceType, SYSTEM_RESOURCE_TYPES};
use crate::error::ConstructionError;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// Name-keyed store of the resources of one pipeline
///
/// The first registration under a name wins. In strict mode a later
/// registration with a different declaration is rejected instead of ignored.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<String, Resource>,
    strict: bool,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that fails on conflicting re-registration
    pub fn strict() -> Self {
        Self {
            resources: BTreeMap::new(),
            strict: true,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Register a resource, returning the canonical entry for its name
    pub fn register(&mut self, resource: Resource) -> Result<&Resource, ConstructionError> {
        match self.resources.entry(resource.name.clone()) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                if self.strict && !existing.same_declaration(&resource) {
                    return Err(ConstructionError::ConflictingResource(resource.name));
                }
                debug!("Resource '{}' already registered, keeping first", resource.name);
                // Producers are not part of the declaration; keep any new ones
                for producer in resource.producers {
                    existing.add_producer(producer);
                }
                Ok(&*existing)
            }
            Entry::Vacant(entry) => {
                debug!("Registered resource '{}'", resource.name);
                Ok(&*entry.insert(resource))
            }
        }
    }

    /// Look up a resource by name
    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Look up a resource that must have been registered
    pub fn require(&self, name: &str) -> Result<&Resource, ConstructionError> {
        self.resources
            .get(name)
            .ok_or_else(|| ConstructionError::UnregisteredResource(name.to_string()))
    }

    /// Declare `job` as a producer of an already registered resource
    pub fn add_producer(&mut self, resource: &str, job: &str) -> Result<(), ConstructionError> {
        let entry = self
            .resources
            .get_mut(resource)
            .ok_or_else(|| ConstructionError::UnregisteredResource(resource.to_string()))?;
        entry.add_producer(job);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterate resources in name order
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }
}

/// Store of resource types known to one pipeline
#[derive(Debug, Clone, Default)]
pub struct ResourceTypeRegistry {
    types: BTreeMap<String, ResourceType>,
}

impl ResourceTypeRegistry {
    /// An empty registry that knows no types at all
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the engine's built-in types
    pub fn with_system_types() -> Self {
        let mut registry = Self::new();
        for name in SYSTEM_RESOURCE_TYPES {
            registry.register(ResourceType::system(*name));
        }
        registry
    }

    /// Register a type; the first registration under a name wins
    pub fn register(&mut self, resource_type: ResourceType) -> &ResourceType {
        self.types
            .entry(resource_type.name.clone())
            .or_insert(resource_type)
    }

    pub fn get(&self, name: &str) -> Option<&ResourceType> {
        self.types.get(name)
    }
}
