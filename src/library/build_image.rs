//! Job template that builds a Docker image on top of another image
//!
//! The job fetches the base image, assembles a build context with a
//! generated `Dockerfile` in a `prepare` task, then pushes the result. The
//! target image resource is registered as produced by the job, so anything
//! consuming the image pulls the build job into the pipeline.

use crate::core::{
    Job, JobGroup, JobResource, Location, ParamValue, Pipeline, PutStep, Step, TaskStep,
};
use crate::error::ConstructionError;
use crate::library::image::Image;
use crate::library::{IMAGES_GROUP, RESOURCE_TYPE_GROUP};
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

/// Output directory holding the build context
pub const PREPARED_DIR: &str = "prepared";

/// Width of the lines `DOCKERFILE_STEPS` is wrapped at
const ENCODED_LINE_WIDTH: usize = 76;

/// Writes `prepared/Dockerfile` from FROM_IMAGE, TARGET_NAME, DOCKERFILE_DIR,
/// SOURCE_DIRS, DOCKERFILE_STEPS and EVAL
pub const PREPARE_SCRIPT: &str = r#"ROOT=`pwd`

set -ex

CHECK_ARGS=true
TARGET_NAME_STR=""

if [ -z "$DOCKERFILE_DIR" -a -z "$DOCKERFILE_STEPS" ]
then
    echo "Please specify DOCKERFILE_DIR or DOCKERFILE_STEPS"
    echo "DOCKERFILE_STEPS holds the Dockerfile steps, gzipped and base64 encoded"
    CHECK_ARGS=false
fi

if [ -z "$FROM_IMAGE" ]
then
    echo "Please specify FROM_IMAGE"
    CHECK_ARGS=false
fi

if [ "$CHECK_ARGS" == "false" ]
then
    exit 1
fi

mkdir -p prepared
if [ ! -z "$DOCKERFILE_DIR" ]
then
    cp -R $DOCKERFILE_DIR/. prepared
fi

for SOURCE_DIR in $SOURCE_DIRS
do
    mkdir -p prepared/$SOURCE_DIR
    cp -R $SOURCE_DIR/. prepared/$SOURCE_DIR
done

if [ ! -z "$TARGET_NAME" ]
then
    TARGET_NAME_STR=" as $TARGET_NAME"
fi

cd prepared

REPOSITORY=$(cat $ROOT/$FROM_IMAGE/repository)
TAG=$(cat $ROOT/$FROM_IMAGE/tag)
echo FROM $REPOSITORY:$TAG$TARGET_NAME_STR > Dockerfile
echo >> Dockerfile

if [ ! -z "$EVAL" ]
then
    eval "$EVAL" >> Dockerfile
fi

echo >> Dockerfile
if [ ! -z "$DOCKERFILE_DIR" -a -e $ROOT/$DOCKERFILE_DIR/steps ]
then
    cat $ROOT/$DOCKERFILE_DIR/steps >> Dockerfile
fi

if [ ! -z "$DOCKERFILE_STEPS" ]
then
    echo "$DOCKERFILE_STEPS" | tr -d '\n' | base64 --decode | gzip -cfd >> Dockerfile
fi
"#;

/// Gzip `text`, base64 encode it and wrap the result into lines
///
/// The prepare script strips the newlines before decoding, so long step
/// lists stay readable in the emitted YAML.
pub fn gzip_base64_lines(text: &str) -> std::io::Result<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(compressed);

    let mut lines = String::with_capacity(encoded.len() + encoded.len() / ENCODED_LINE_WIDTH);
    for (index, c) in encoded.chars().enumerate() {
        if index > 0 && index % ENCODED_LINE_WIDTH == 0 {
            lines.push('\n');
        }
        lines.push(c);
    }
    Ok(lines)
}

/// Arguments of an image build job
#[derive(Debug, Clone)]
pub struct BuildImage {
    /// Short name; the job is called `<name>-image`
    pub name: String,
    /// Image produced by the job
    pub image: Image,
    /// Base image used in the `FROM` clause
    pub from: Image,
    /// Image the prepare task runs in
    pub prepare_image: Image,
    /// Build stage name appended to the `FROM` clause
    pub target_name: Option<String>,
    /// Directory with Dockerfile fragments and build files
    pub dockerfile_dir: Option<Location>,
    /// Literal Dockerfile steps appended after the `FROM` clause
    pub dockerfile_steps: Option<String>,
    /// Directories copied into the build context under their own paths
    pub source_dirs: Vec<Location>,
    /// Shell snippet whose output is appended to the Dockerfile
    pub eval: Option<String>,
    pub build_args: BTreeMap<String, String>,
    /// Extra params for the prepare task
    pub environment: BTreeMap<String, ParamValue>,
    /// Prepare script to run instead of the embedded one
    pub prepare_script: Option<Location>,
    /// Steps run before the prepare task, e.g. to produce source dirs
    pub preprepare_steps: Vec<Step>,
    /// Groups besides `images`
    pub groups: Vec<String>,
}

impl BuildImage {
    pub fn new(name: impl Into<String>, image: Image, from: Image) -> Self {
        Self {
            name: name.into(),
            image,
            prepare_image: from.clone(),
            from,
            target_name: None,
            dockerfile_dir: None,
            dockerfile_steps: None,
            source_dirs: Vec::new(),
            eval: None,
            build_args: BTreeMap::new(),
            environment: BTreeMap::new(),
            prepare_script: None,
            preprepare_steps: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_prepare_image(mut self, image: Image) -> Self {
        self.prepare_image = image;
        self
    }

    pub fn with_target_name(mut self, target: impl Into<String>) -> Self {
        self.target_name = Some(target.into());
        self
    }

    pub fn with_dockerfile_dir(mut self, location: Location) -> Self {
        self.dockerfile_dir = Some(location);
        self
    }

    pub fn with_dockerfile_steps(mut self, steps: impl Into<String>) -> Self {
        self.dockerfile_steps = Some(steps.into());
        self
    }

    pub fn with_source_dir(mut self, location: Location) -> Self {
        self.source_dirs.push(location);
        self
    }

    pub fn with_eval(mut self, eval: impl Into<String>) -> Self {
        self.eval = Some(eval.into());
        self
    }

    pub fn with_build_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.build_args.insert(key.into(), value.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_prepare_script(mut self, script: Location) -> Self {
        self.prepare_script = Some(script);
        self
    }

    pub fn with_preprepare_step(mut self, step: impl Into<Step>) -> Self {
        self.preprepare_steps.push(step.into());
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn job_name(&self) -> String {
        format!("{}-image", self.name)
    }

    /// Base image reference; private images are saved so the build can load them
    fn from_resource(&self) -> JobResource {
        let from = JobResource::triggered(&self.from.name);
        if self.from.is_public() {
            from
        } else {
            let mut params = Mapping::new();
            params.insert(Value::from("save"), Value::from(true));
            from.with_params(params)
        }
    }

    fn prepare_task(&self) -> Result<TaskStep, ConstructionError> {
        let run = self
            .prepare_script
            .clone()
            .unwrap_or_else(|| Location::absolute("/bin/bash"));

        let mut task = TaskStep::new("prepare", run)
            .with_image(JobResource::triggered(&self.prepare_image.name))
            .with_param("FROM_IMAGE", Location::resource(self.from_resource(), ""))
            .with_output(PREPARED_DIR);

        if self.prepare_script.is_none() {
            task = task.with_args(["-c", PREPARE_SCRIPT]);
        }
        for (key, value) in &self.environment {
            task = task.with_param(key, value.clone());
        }
        if let Some(target) = &self.target_name {
            task = task.with_param("TARGET_NAME", target.as_str());
        }
        if let Some(dir) = &self.dockerfile_dir {
            task = task.with_param("DOCKERFILE_DIR", dir.clone());
        }
        if let Some(steps) = &self.dockerfile_steps {
            let encoded = gzip_base64_lines(steps).map_err(|error| {
                ConstructionError::Encoding(self.image.name.clone(), error.to_string())
            })?;
            task = task.with_param("DOCKERFILE_STEPS", encoded);
        }
        if !self.source_dirs.is_empty() {
            task = task.with_param("SOURCE_DIRS", self.source_dirs.clone());
        }
        if let Some(eval) = &self.eval {
            task = task.with_param("EVAL", eval.as_str());
        }
        Ok(task)
    }

    fn put_image(&self) -> PutStep {
        let mut put = PutStep::new(&self.image.name)
            .with_param("build", Location::output(PREPARED_DIR, ""))
            .with_get_params(skip_download());

        if !self.from.is_public() {
            put = put.with_param("load_base", Location::resource(self.from_resource(), ""));
        }
        if !self.build_args.is_empty() {
            let args: Mapping = self
                .build_args
                .iter()
                .map(|(key, value)| (Value::from(key.as_str()), Value::from(value.as_str())))
                .collect();
            put = put.with_param("build_args", Value::Mapping(args));
        }
        put
    }

    /// The build job on its own
    pub fn job(&self) -> Result<Job, ConstructionError> {
        let mut job = Job::new(self.job_name())
            .in_group(IMAGES_GROUP)
            .with_step(Step::get(self.from_resource()));
        for step in &self.preprepare_steps {
            job = job.with_step(step.clone());
        }
        job = job
            .with_step(self.prepare_task()?)
            .with_step(self.put_image());
        for group in &self.groups {
            job.add_to_group(group);
        }
        Ok(job)
    }

    /// Register the images and add the build job; repeated calls are no-ops
    ///
    /// Returns the name of the build job.
    pub fn add_to(&self, pipeline: &mut Pipeline) -> Result<String, ConstructionError> {
        let job_name = self.job_name();
        if pipeline.resources.get(&self.image.name).is_some() && pipeline.job(&job_name).is_some() {
            debug!("Image job '{}' already added", job_name);
            return Ok(job_name);
        }

        let job = self.job()?;
        pipeline.resources.register(self.from.to_resource())?;
        pipeline.resources.register(self.prepare_image.to_resource())?;
        pipeline
            .resources
            .register(self.image.to_resource().produced_by(&job_name))?;
        pipeline.declare_group(JobGroup::new(IMAGES_GROUP).before(RESOURCE_TYPE_GROUP));
        pipeline.add_job(job);

        Ok(job_name)
    }
}

fn skip_download() -> Value {
    let mut params = Mapping::new();
    params.insert(Value::from("skip_download"), Value::from(true));
    Value::Mapping(params)
}
