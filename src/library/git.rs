//! Git repository resources

use crate::core::Resource;
use serde::{Deserialize, Serialize};

/// Name of the resource holding the builder's own scripts and Dockerfiles
pub const CONCOURSE_BUILDER_GIT: &str = "concourse-builder-git";

const GIT_RESOURCE_TYPE: &str = "git";

/// Source configuration of a git resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    pub uri: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default)]
    pub private_key: Option<String>,
}

fn default_branch() -> String {
    "master".to_string()
}

impl GitSource {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            branch: default_branch(),
            private_key: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    pub fn to_resource(&self, name: impl Into<String>) -> Resource {
        let resource = Resource::new(name, GIT_RESOURCE_TYPE)
            .with_source("uri", self.uri.as_str())
            .with_source("branch", self.branch.as_str());
        match &self.private_key {
            Some(key) => resource.with_source("private_key", key.as_str()),
            None => resource,
        }
    }
}
