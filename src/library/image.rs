//! Docker image resources and the registries they live in

use crate::core::{names::image_tag, Resource};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Resource type of every image resource
pub const IMAGE_RESOURCE_TYPE: &str = "docker-image";

/// Where image repositories are hosted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRegistry {
    /// The public Docker Hub; repositories are used as given
    DockerHub,
    /// A private registry accessed with AWS credentials
    Private {
        domain: String,
        aws_access_key_id: String,
        aws_secret_access_key: String,
    },
}

impl ImageRegistry {
    pub fn private(
        domain: impl Into<String>,
        aws_access_key_id: impl Into<String>,
        aws_secret_access_key: impl Into<String>,
    ) -> Self {
        ImageRegistry::Private {
            domain: domain.into(),
            aws_access_key_id: aws_access_key_id.into(),
            aws_secret_access_key: aws_secret_access_key.into(),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, ImageRegistry::DockerHub)
    }

    /// Fully qualified repository name
    pub fn repository(&self, repository: &str) -> String {
        match self {
            ImageRegistry::DockerHub => repository.to_string(),
            ImageRegistry::Private { domain, .. } => format!("{}/{}", domain, repository),
        }
    }
}

/// Source configuration of an image resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub registry: ImageRegistry,
    pub repository: String,
    pub tag: Option<String>,
}

impl ImageSource {
    pub fn new(registry: ImageRegistry, repository: impl Into<String>) -> Self {
        Self {
            registry,
            repository: repository.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Tag derived from a branch name
    pub fn with_branch_tag(self, branch: &str) -> Self {
        self.with_tag(image_tag(branch))
    }

    /// Reference usable in a `FROM` clause, e.g. `ubuntu:16.04`
    pub fn reference(&self) -> String {
        format!(
            "{}:{}",
            self.registry.repository(&self.repository),
            self.tag.as_deref().unwrap_or("latest")
        )
    }

    pub fn to_mapping(&self) -> Mapping {
        let mut source = Mapping::new();
        source.insert(
            Value::from("repository"),
            Value::from(self.registry.repository(&self.repository)),
        );
        if let Some(tag) = &self.tag {
            source.insert(Value::from("tag"), Value::from(tag.as_str()));
        }
        if let ImageRegistry::Private {
            aws_access_key_id,
            aws_secret_access_key,
            ..
        } = &self.registry
        {
            source.insert(
                Value::from("aws_access_key_id"),
                Value::from(aws_access_key_id.as_str()),
            );
            source.insert(
                Value::from("aws_secret_access_key"),
                Value::from(aws_secret_access_key.as_str()),
            );
        }
        source
    }
}

/// A named image resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub name: String,
    pub source: ImageSource,
    pub check_every: Option<String>,
}

impl Image {
    pub fn new(name: impl Into<String>, source: ImageSource) -> Self {
        Self {
            name: name.into(),
            source,
            check_every: None,
        }
    }

    pub fn with_check_every(mut self, interval: impl Into<String>) -> Self {
        self.check_every = Some(interval.into());
        self
    }

    pub fn is_public(&self) -> bool {
        self.source.registry.is_public()
    }

    pub fn to_resource(&self) -> Resource {
        let resource = Resource::new(&self.name, IMAGE_RESOURCE_TYPE)
            .with_source_mapping(self.source.to_mapping());
        match &self.check_every {
            Some(interval) => resource.with_check_every(interval),
            None => resource,
        }
    }
}

/// Stock Ubuntu image from Docker Hub
pub fn ubuntu() -> Image {
    Image::new(
        "ubuntu-image",
        ImageSource::new(ImageRegistry::DockerHub, "ubuntu").with_tag("16.04"),
    )
    .with_check_every("24h")
}

/// Stock Go image from Docker Hub
pub fn golang() -> Image {
    Image::new(
        "go-image",
        ImageSource::new(ImageRegistry::DockerHub, "golang").with_tag("1.8"),
    )
    .with_check_every("24h")
}

/// Stock Couchbase server image from Docker Hub
pub fn couchbase() -> Image {
    Image::new(
        "couchbase-server-image",
        ImageSource::new(ImageRegistry::DockerHub, "couchbase"),
    )
    .with_check_every("24h")
}

/// Stock Riak KV image from Docker Hub
pub fn riak_kv() -> Image {
    Image::new(
        "riak-kv-base-image",
        ImageSource::new(ImageRegistry::DockerHub, "basho/riak-kv"),
    )
    .with_check_every("24h")
}
