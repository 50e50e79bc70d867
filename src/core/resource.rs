//! Resource and resource type domain models

use crate::core::scope::ScopeInfo;
use crate::model;
use serde_yaml::{Mapping, Value};

/// Resource types built into every Concourse installation
pub const SYSTEM_RESOURCE_TYPES: &[&str] = &[
    "docker-image",
    "git",
    "pool",
    "registry-image",
    "s3",
    "semver",
    "time",
];

/// An external resource declared by the pipeline author
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Unique name within a registry
    pub name: String,

    /// Resource type tag, e.g. `git`
    pub resource_type: String,

    /// Type-specific source configuration
    pub source: Mapping,

    /// Optional check interval, e.g. `24h`
    pub check_every: Option<String>,

    /// Jobs that produce new versions of this resource
    pub producers: Vec<String>,
}

impl Resource {
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            source: Mapping::new(),
            check_every: None,
            producers: Vec::new(),
        }
    }

    /// Set a single source key
    pub fn with_source(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.source.insert(Value::from(key), value.into());
        self
    }

    /// Replace the whole source configuration
    pub fn with_source_mapping(mut self, source: Mapping) -> Self {
        self.source = source;
        self
    }

    pub fn with_check_every(mut self, interval: impl Into<String>) -> Self {
        self.check_every = Some(interval.into());
        self
    }

    /// Declare a job that produces this resource
    pub fn produced_by(mut self, job: impl Into<String>) -> Self {
        self.add_producer(job);
        self
    }

    pub(crate) fn add_producer(&mut self, job: impl Into<String>) {
        let job = job.into();
        if !self.producers.contains(&job) {
            self.producers.push(job);
        }
    }

    /// Whether two declarations describe the same resource, ignoring producers
    pub fn same_declaration(&self, other: &Resource) -> bool {
        self.name == other.name
            && self.resource_type == other.resource_type
            && self.source == other.source
            && self.check_every == other.check_every
    }

    pub fn to_model(&self, scope: &ScopeInfo) -> model::Resource {
        model::Resource {
            name: self.name.clone(),
            type_name: self.resource_type.clone(),
            source: scope.render_mapping(&self.source),
            check_every: self.check_every.clone(),
        }
    }
}

/// A resource type, either built in or provided as a container image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    pub name: String,

    /// Image repository implementing the type (custom types only)
    pub repository: Option<String>,

    pub tag: Option<String>,

    /// Built into the engine; never emitted in `resource_types`
    pub system: bool,
}

impl ResourceType {
    pub fn system(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository: None,
            tag: None,
            system: true,
        }
    }

    pub fn custom(name: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository: Some(repository.into()),
            tag: None,
            system: false,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn to_model(&self, scope: &ScopeInfo) -> model::ResourceType {
        let mut source = Mapping::new();
        if let Some(repository) = &self.repository {
            source.insert(Value::from("repository"), Value::from(scope.render(repository)));
        }
        if let Some(tag) = &self.tag {
            source.insert(Value::from("tag"), Value::from(scope.render(tag)));
        }

        model::ResourceType {
            name: self.name.clone(),
            type_name: "docker-image".to_string(),
            source,
        }
    }
}
