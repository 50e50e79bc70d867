//! Images with the command line tools the builder's own jobs run in

use crate::core::{JobResource, Location, Pipeline};
use crate::error::ConstructionError;
use crate::library::build_image::BuildImage;
use crate::library::git::{GitSource, CONCOURSE_BUILDER_GIT};
use crate::library::image::{ubuntu, Image, ImageRegistry, ImageSource};
use crate::library::SYS_GROUP;
use serde::{Deserialize, Serialize};

/// Connection details of the Concourse installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concourse {
    pub url: String,
    pub user: String,
    pub password: String,
    /// Skip TLS verification when talking to the API
    #[serde(default)]
    pub insecure: bool,
}

/// Where the builder's tool images are built from and pushed to
#[derive(Debug, Clone)]
pub struct ToolImages {
    pub registry: ImageRegistry,
    pub tag: String,
    pub builder_git: GitSource,
}

impl ToolImages {
    pub fn new(registry: ImageRegistry, tag: impl Into<String>, builder_git: GitSource) -> Self {
        Self {
            registry,
            tag: tag.into(),
            builder_git,
        }
    }

    fn image(&self, name: &str) -> Image {
        Image::new(
            format!("{}-image", name),
            ImageSource::new(self.registry.clone(), format!("concourse-builder/{}-image", name))
                .with_tag(&self.tag),
        )
    }

    /// Dockerfile directory for a tool inside the builder repository
    fn dockerfile_dir(&self, name: &str) -> Location {
        Location::resource(
            JobResource::triggered(CONCOURSE_BUILDER_GIT),
            format!("docker/{}", name),
        )
    }

    fn register_builder_git(&self, pipeline: &mut Pipeline) -> Result<(), ConstructionError> {
        pipeline
            .resources
            .register(self.builder_git.to_resource(CONCOURSE_BUILDER_GIT))?;
        Ok(())
    }

    /// Ubuntu with curl installed
    pub fn curl_image(&self, pipeline: &mut Pipeline) -> Result<Image, ConstructionError> {
        let image = self.image("curl");
        self.register_builder_git(pipeline)?;
        BuildImage::new("curl", image.clone(), ubuntu())
            .with_dockerfile_dir(self.dockerfile_dir("curl"))
            .in_group(SYS_GROUP)
            .add_to(pipeline)?;
        Ok(image)
    }

    /// Ubuntu with Gradle installed
    pub fn gradle_image(&self, pipeline: &mut Pipeline) -> Result<Image, ConstructionError> {
        let image = self.image("gradle");
        self.register_builder_git(pipeline)?;
        BuildImage::new("gradle", image.clone(), ubuntu())
            .with_dockerfile_dir(self.dockerfile_dir("gradle"))
            .in_group(SYS_GROUP)
            .add_to(pipeline)?;
        Ok(image)
    }

    /// Image with the `fly` CLI matching the installation's version
    pub fn fly_image(
        &self,
        pipeline: &mut Pipeline,
        concourse: &Concourse,
    ) -> Result<Image, ConstructionError> {
        let curl = self.curl_image(pipeline)?;
        let image = self.image("fly");

        let insecure = if concourse.insecure { " -k" } else { "" };
        let fly_version = format!(
            "echo ENV FLY_VERSION=`curl {}/api/v1/info{} \
             | awk -F ',' ' {{ print $1 }} ' | awk -F ':' ' {{ print $2 }} '`",
            concourse.url, insecure
        );

        BuildImage::new("fly", image.clone(), curl)
            .with_dockerfile_dir(self.dockerfile_dir("fly"))
            .with_eval(fly_version)
            .in_group(SYS_GROUP)
            .add_to(pipeline)?;
        Ok(image)
    }
}
