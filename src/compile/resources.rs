//! Resource deduplication across the closed job set

use crate::compile::closure::Closure;
use crate::core::{Resource, ResourceRegistry, ResourceTypeRegistry, ScopeInfo};
use crate::error::ConstructionError;
use crate::model;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Every resource referenced by the closure, exactly once
#[derive(Debug, Clone)]
pub struct ResourceSet<'a> {
    resources: BTreeMap<&'a str, &'a Resource>,
}

impl<'a> ResourceSet<'a> {
    /// Collect inputs and outputs of every job, first reference wins
    pub fn collect(
        closure: &Closure<'a>,
        registry: &'a ResourceRegistry,
    ) -> Result<Self, ConstructionError> {
        let mut resources = BTreeMap::new();
        for job in closure.jobs() {
            for reference in job.input_resources().chain(job.output_resources()) {
                if resources.contains_key(reference.name.as_str()) {
                    continue;
                }
                let resource = registry.require(&reference.name)?;
                resources.insert(resource.name.as_str(), resource);
            }
        }
        debug!("Collected {} resources", resources.len());
        Ok(Self { resources })
    }

    /// Resources in name order
    pub fn iter(&self) -> impl Iterator<Item = &'a Resource> + '_ {
        self.resources.values().copied()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn to_models(&self, scope: &ScopeInfo) -> Vec<model::Resource> {
        self.iter().map(|resource| resource.to_model(scope)).collect()
    }

    /// One entry per custom type used by the resources, sorted by name
    ///
    /// Built-in types are never emitted. Types missing from the registry are
    /// skipped with a warning and left for the engine to resolve.
    pub fn resource_types(
        &self,
        types: &ResourceTypeRegistry,
        scope: &ScopeInfo,
    ) -> Vec<model::ResourceType> {
        let used: BTreeSet<&str> = self
            .iter()
            .map(|resource| resource.resource_type.as_str())
            .collect();

        used.into_iter()
            .filter_map(|name| match types.get(name) {
                Some(resource_type) if resource_type.system => None,
                Some(resource_type) => Some(resource_type.to_model(scope)),
                None => {
                    warn!("Resource type '{}' is not registered", name);
                    None
                }
            })
            .collect()
    }
}
