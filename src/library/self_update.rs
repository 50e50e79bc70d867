//! Job that regenerates the pipelines and pushes them to Concourse

use crate::core::{Job, JobResource, Location, ParamValue, Pipeline, TaskStep};
use crate::error::ConstructionError;
use crate::library::git::CONCOURSE_BUILDER_GIT;
use crate::library::image::golang;
use crate::library::tools::{Concourse, ToolImages};
use std::collections::BTreeMap;

pub const SELF_UPDATE_JOB: &str = "self-update";

const PIPELINES_DIR: &str = "pipelines";

/// Arguments of the self-update job
#[derive(Debug, Clone)]
pub struct SelfUpdate {
    pub concourse: Concourse,
    pub tools: ToolImages,
    /// Script inside the builder repository that writes the pipelines
    pub generator: String,
    /// Extra params for the generator
    pub environment: BTreeMap<String, ParamValue>,
}

impl SelfUpdate {
    pub fn new(concourse: Concourse, tools: ToolImages, generator: impl Into<String>) -> Self {
        Self {
            concourse,
            tools,
            generator: generator.into(),
            environment: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Add the job and everything it needs; returns the job name
    pub fn add_to(&self, pipeline: &mut Pipeline) -> Result<String, ConstructionError> {
        let fly = self.tools.fly_image(pipeline, &self.concourse)?;
        let go = golang();
        pipeline.resources.register(go.to_resource())?;

        let fly_image = JobResource::triggered(&fly.name);

        let check = TaskStep::new("check", Location::root("/bin", "check_version.sh"))
            .with_image(fly_image.clone())
            .with_param("CONCOURSE_URL", self.concourse.url.as_str());

        let mut prepare = TaskStep::new(
            "prepare pipelines",
            Location::resource(JobResource::triggered(CONCOURSE_BUILDER_GIT), &self.generator),
        )
        .with_image(JobResource::triggered(&go.name))
        .with_output(PIPELINES_DIR);
        for (key, value) in &self.environment {
            prepare = prepare.with_param(key, value.clone());
        }
        prepare = prepare.with_param("PIPELINES", PIPELINES_DIR);

        let update = TaskStep::new("update pipelines", Location::root("/bin", "set_pipelines.sh"))
            .with_image(fly_image)
            .with_param("PIPELINES", Location::output(PIPELINES_DIR, ""))
            .with_param("CONCOURSE_URL", self.concourse.url.as_str())
            .with_param("CONCOURSE_USER", self.concourse.user.as_str())
            .with_param("CONCOURSE_PASSWORD", self.concourse.password.as_str());

        pipeline.add_root(
            Job::new(SELF_UPDATE_JOB)
                .with_step(check)
                .with_step(prepare)
                .with_step(update),
        );
        Ok(SELF_UPDATE_JOB.to_string())
    }
}
