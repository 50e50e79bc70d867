//! Pipeline configuration from YAML

use crate::core::{
    AllJobsGroup, Job, JobGroup, JobResource, Location, ParamValue, Pipeline, PutStep,
    Resource, ResourceRegistry, ResourceType, Step, TaskStep, LINUX_PLATFORM,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Placement of the synthetic group listing every job
    #[serde(default)]
    pub all_jobs_group: AllJobsGroup,

    /// Reject resources re-declared with a different definition
    #[serde(default)]
    pub strict_resources: bool,

    /// Jobs to compile; every declared job when empty
    #[serde(default)]
    pub roots: Vec<String>,

    /// Custom resource types
    #[serde(default)]
    pub resource_types: Vec<ResourceTypeConfig>,

    #[serde(default)]
    pub resources: Vec<ResourceConfig>,

    /// Group ordering
    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    pub jobs: Vec<JobConfig>,
}

/// Resource type implemented by a container image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTypeConfig {
    pub name: String,
    pub repository: String,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default)]
    pub source: Mapping,

    #[serde(default)]
    pub check_every: Option<String>,

    /// Jobs that push new versions of this resource
    #[serde(default)]
    pub produced_by: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,

    /// Groups listed after this one
    #[serde(default)]
    pub before: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,

    #[serde(default)]
    pub groups: Vec<String>,

    /// Jobs that must run first, regardless of resources
    #[serde(default)]
    pub run_after: Vec<String>,

    #[serde(default)]
    pub plan: Vec<StepConfig>,
}

/// A plan step, told apart by its `get`, `put` or `task` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepConfig {
    Get(GetConfig),
    Put(PutConfig),
    Task(TaskConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetConfig {
    pub get: String,

    #[serde(default)]
    pub trigger: bool,

    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PutConfig {
    pub put: String,

    #[serde(default)]
    pub params: BTreeMap<String, ParamConfig>,

    #[serde(default)]
    pub get_params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    pub task: String,

    #[serde(default)]
    pub platform: Option<String>,

    /// Resource providing the container image
    #[serde(default)]
    pub image: Option<String>,

    pub run: RunConfig,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub params: BTreeMap<String, ParamConfig>,

    #[serde(default)]
    pub outputs: Vec<String>,
}

/// A path inside a fetched resource or a task output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationConfig {
    Resource(ResourceLocation),
    Output(OutputLocation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceLocation {
    pub resource: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputLocation {
    pub output: String,
    #[serde(default)]
    pub path: String,
}

/// Script to run: a location, or a plain path inside the image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunConfig {
    Location(LocationConfig),
    Path(String),
}

/// A task or put param: a location, or any literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamConfig {
    Location(LocationConfig),
    Literal(Value),
}

impl LocationConfig {
    fn resource_name(&self) -> Option<&str> {
        match self {
            LocationConfig::Resource(location) => Some(&location.resource),
            LocationConfig::Output(_) => None,
        }
    }

    fn to_location(&self) -> Location {
        match self {
            // Anything a task reads from a resource should rerun it
            LocationConfig::Resource(location) => {
                Location::resource(JobResource::triggered(&location.resource), &location.path)
            }
            LocationConfig::Output(location) => Location::output(&location.output, &location.path),
        }
    }
}

impl RunConfig {
    fn to_location(&self) -> Location {
        match self {
            RunConfig::Location(location) => location.to_location(),
            RunConfig::Path(path) => Location::absolute(path),
        }
    }
}

impl ParamConfig {
    fn to_param(&self) -> ParamValue {
        match self {
            ParamConfig::Location(location) => ParamValue::Location(location.to_location()),
            ParamConfig::Literal(value) => ParamValue::Literal(value.clone()),
        }
    }
}

impl StepConfig {
    /// Names of every resource this step mentions
    fn resource_names(&self) -> Vec<&str> {
        fn locations<'a>(
            params: &'a BTreeMap<String, ParamConfig>,
        ) -> impl Iterator<Item = &'a str> {
            params.values().filter_map(|param| match param {
                ParamConfig::Location(location) => location.resource_name(),
                ParamConfig::Literal(_) => None,
            })
        }

        match self {
            StepConfig::Get(get) => vec![get.get.as_str()],
            StepConfig::Put(put) => std::iter::once(put.put.as_str())
                .chain(locations(&put.params))
                .collect(),
            StepConfig::Task(task) => {
                let run = match &task.run {
                    RunConfig::Location(location) => location.resource_name(),
                    RunConfig::Path(_) => None,
                };
                task.image
                    .as_deref()
                    .into_iter()
                    .chain(run)
                    .chain(locations(&task.params))
                    .collect()
            }
        }
    }

    fn to_step(&self) -> Step {
        match self {
            StepConfig::Get(get) => {
                let mut resource = JobResource::new(&get.get);
                resource.trigger = get.trigger;
                resource.params = get.params.clone();
                Step::get(resource)
            }
            StepConfig::Put(put) => {
                let mut step = PutStep::new(&put.put);
                for (key, param) in &put.params {
                    step = step.with_param(key, param.to_param());
                }
                if let Some(get_params) = &put.get_params {
                    step = step.with_get_params(get_params.clone());
                }
                step.into()
            }
            StepConfig::Task(task) => {
                let mut step = TaskStep::new(&task.task, task.run.to_location())
                    .with_args(task.args.iter().cloned());
                step.platform = task
                    .platform
                    .clone()
                    .unwrap_or_else(|| LINUX_PLATFORM.to_string());
                if let Some(image) = &task.image {
                    step = step.with_image(JobResource::triggered(image));
                }
                for (key, param) in &task.params {
                    step = step.with_param(key, param.to_param());
                }
                for output in &task.outputs {
                    step = step.with_output(output);
                }
                step.into()
            }
        }
    }
}

impl JobConfig {
    fn to_job(&self) -> Job {
        let mut job = Job::new(&self.name);
        for group in &self.groups {
            job.add_to_group(group);
        }
        for predecessor in &self.run_after {
            job.add_run_after(predecessor);
        }
        for step in &self.plan {
            job.add_step(step.to_step());
        }
        job
    }
}

impl ResourceConfig {
    fn to_resource(&self) -> Resource {
        let mut resource = Resource::new(&self.name, &self.resource_type)
            .with_source_mapping(self.source.clone());
        if let Some(interval) = &self.check_every {
            resource = resource.with_check_every(interval);
        }
        for job in &self.produced_by {
            resource = resource.produced_by(job);
        }
        resource
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid pipeline file {}", path.display()))
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        // Check that all job names are unique
        let mut job_names = HashSet::new();
        for job in &self.jobs {
            if !job_names.insert(job.name.as_str()) {
                anyhow::bail!("Duplicate job name: {}", job.name);
            }
        }

        // First declaration wins; strict mode rejects a differing repeat
        let mut resources: HashMap<&str, &ResourceConfig> = HashMap::new();
        for resource in &self.resources {
            let existing = *resources.entry(resource.name.as_str()).or_insert(resource);
            let same = existing.resource_type == resource.resource_type
                && existing.source == resource.source
                && existing.check_every == resource.check_every;
            if self.strict_resources && !same {
                anyhow::bail!(
                    "Resource '{}' is declared twice with different definitions",
                    resource.name
                );
            }
        }

        for resource in &self.resources {
            for job in &resource.produced_by {
                if !job_names.contains(job.as_str()) {
                    anyhow::bail!(
                        "Resource '{}' is produced by non-existent job '{}'",
                        resource.name,
                        job
                    );
                }
            }
        }

        for root in &self.roots {
            if !job_names.contains(root.as_str()) {
                anyhow::bail!("Root '{}' is not a declared job", root);
            }
        }

        for job in &self.jobs {
            for predecessor in &job.run_after {
                if !job_names.contains(predecessor.as_str()) {
                    anyhow::bail!(
                        "Job '{}' runs after non-existent job '{}'",
                        job.name,
                        predecessor
                    );
                }
            }

            for step in &job.plan {
                for resource in step.resource_names() {
                    if !resources.contains_key(resource) {
                        anyhow::bail!(
                            "Job '{}' references undeclared resource '{}'",
                            job.name,
                            resource
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Convert config to a Pipeline domain model
    pub fn to_pipeline(&self) -> Result<Pipeline> {
        let registry = if self.strict_resources {
            ResourceRegistry::strict()
        } else {
            ResourceRegistry::new()
        };
        let mut pipeline =
            Pipeline::with_registry(&self.name, registry).with_all_jobs_group(self.all_jobs_group);

        for resource_type in &self.resource_types {
            let mut custom = ResourceType::custom(&resource_type.name, &resource_type.repository);
            if let Some(tag) = &resource_type.tag {
                custom = custom.with_tag(tag);
            }
            pipeline.resource_types.register(custom);
        }

        for resource in &self.resources {
            pipeline
                .resources
                .register(resource.to_resource())
                .with_context(|| format!("Failed to register resource '{}'", resource.name))?;
        }

        for group in &self.groups {
            let mut declared = JobGroup::new(&group.name);
            for later in &group.before {
                declared = declared.before(later);
            }
            pipeline.declare_group(declared);
        }

        for job in &self.jobs {
            pipeline.add_job(job.to_job());
        }

        if self.roots.is_empty() {
            for job in &self.jobs {
                pipeline.mark_root(&job.name);
            }
        } else {
            for root in &self.roots {
                pipeline.mark_root(root);
            }
        }

        Ok(pipeline)
    }
}
