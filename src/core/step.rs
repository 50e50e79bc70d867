//! Step domain model

use crate::model;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Default task platform
pub const LINUX_PLATFORM: &str = "linux";

/// A step's reference to a registered resource
#[derive(Debug, Clone, PartialEq)]
pub struct JobResource {
    /// Resource name in the registry
    pub name: String,

    /// Whether a new version triggers the job
    pub trigger: bool,

    /// Params for the `get` of this resource
    pub params: Option<Value>,
}

impl JobResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger: false,
            params: None,
        }
    }

    /// A reference whose new versions trigger the job
    pub fn triggered(name: impl Into<String>) -> Self {
        Self {
            trigger: true,
            ..Self::new(name)
        }
    }

    pub fn with_params(mut self, params: impl Into<Value>) -> Self {
        self.params = Some(params.into());
        self
    }
}

/// The directory a [`Location`] lives in
#[derive(Debug, Clone, PartialEq)]
pub enum Volume {
    /// A fetched resource, mounted under its name
    Resource(JobResource),
    /// The output directory of an earlier task in the same job
    Output(String),
    /// A directory already present in the container image
    Root(String),
}

/// A file or directory inside a volume
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub volume: Volume,
    pub path: String,
}

impl Location {
    pub fn resource(resource: JobResource, path: impl Into<String>) -> Self {
        Self {
            volume: Volume::Resource(resource),
            path: path.into(),
        }
    }

    pub fn output(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            volume: Volume::Output(name.into()),
            path: path.into(),
        }
    }

    /// A path inside the container image, e.g. `/bin/check.sh`
    pub fn absolute(path: impl Into<String>) -> Self {
        Self {
            volume: Volume::Root(String::new()),
            path: path.into(),
        }
    }

    pub fn root(directory: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            volume: Volume::Root(directory.into()),
            path: path.into(),
        }
    }

    /// The path as seen from the task's working directory
    pub fn render(&self) -> String {
        let directory = match &self.volume {
            Volume::Resource(resource) => resource.name.as_str(),
            Volume::Output(name) => name.as_str(),
            Volume::Root(directory) => directory.as_str(),
        };

        match (directory.trim_end_matches('/'), self.path.as_str()) {
            ("", path) => path.to_string(),
            (directory, "") => directory.to_string(),
            (directory, path) => format!("{}/{}", directory, path.trim_start_matches('/')),
        }
    }

    /// The resource this location reads from, if any
    pub fn input_resource(&self) -> Option<&JobResource> {
        match &self.volume {
            Volume::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    /// The task input directory this location needs mounted, if any
    pub fn input_name(&self) -> Option<&str> {
        match &self.volume {
            Volume::Resource(resource) => Some(&resource.name),
            Volume::Output(name) => Some(name),
            Volume::Root(_) => None,
        }
    }
}

/// A task or put parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Literal(Value),
    Location(Location),
    /// Several locations passed as one space separated list
    Locations(Vec<Location>),
}

impl ParamValue {
    pub fn to_value(&self) -> Value {
        match self {
            ParamValue::Literal(value) => value.clone(),
            ParamValue::Location(location) => Value::String(location.render()),
            ParamValue::Locations(locations) => Value::String(
                locations
                    .iter()
                    .map(Location::render)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }

    pub fn locations(&self) -> &[Location] {
        match self {
            ParamValue::Location(location) => std::slice::from_ref(location),
            ParamValue::Locations(locations) => locations,
            ParamValue::Literal(_) => &[],
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Literal(Value::from(value))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Literal(Value::from(value))
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Literal(value)
    }
}

impl From<Location> for ParamValue {
    fn from(location: Location) -> Self {
        ParamValue::Location(location)
    }
}

impl From<Vec<Location>> for ParamValue {
    fn from(locations: Vec<Location>) -> Self {
        ParamValue::Locations(locations)
    }
}

fn render_params(params: &BTreeMap<String, ParamValue>) -> BTreeMap<String, Value> {
    params
        .iter()
        .map(|(key, value)| (key.clone(), value.to_value()))
        .collect()
}

/// Fetch a resource version
#[derive(Debug, Clone, PartialEq)]
pub struct GetStep {
    pub resource: JobResource,
}

/// Push a new resource version
#[derive(Debug, Clone, PartialEq)]
pub struct PutStep {
    pub resource: JobResource,
    pub params: BTreeMap<String, ParamValue>,
    /// Params for the implicit get that follows the put
    pub get_params: Option<Value>,
}

impl PutStep {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: JobResource::new(resource),
            params: BTreeMap::new(),
            get_params: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_get_params(mut self, params: impl Into<Value>) -> Self {
        self.get_params = Some(params.into());
        self
    }
}

/// Run a script in a container
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStep {
    pub name: String,
    pub platform: String,
    /// Resource providing the container image
    pub image: Option<JobResource>,
    pub run: Location,
    pub args: Vec<String>,
    pub params: BTreeMap<String, ParamValue>,
    pub outputs: Vec<String>,
}

impl TaskStep {
    pub fn new(name: impl Into<String>, run: Location) -> Self {
        Self {
            name: name.into(),
            platform: LINUX_PLATFORM.to_string(),
            image: None,
            run,
            args: Vec::new(),
            params: BTreeMap::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: JobResource) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.outputs.push(output.into());
        self
    }

    fn locations(&self) -> impl Iterator<Item = &Location> {
        std::iter::once(&self.run).chain(self.params.values().flat_map(ParamValue::locations))
    }

    /// Directories the task needs mounted, sorted
    pub fn inputs(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.locations().filter_map(Location::input_name).collect();
        names.into_iter().map(String::from).collect()
    }

    fn to_model(&self) -> model::Task {
        model::Task {
            task: self.name.clone(),
            image: self.image.as_ref().map(|image| image.name.clone()),
            config: model::TaskConfig {
                platform: self.platform.clone(),
                inputs: self
                    .inputs()
                    .into_iter()
                    .map(|name| model::TaskIo { name, path: None })
                    .collect(),
                params: render_params(&self.params),
                run: model::TaskRun {
                    path: self.run.render(),
                    args: self.args.clone(),
                },
                outputs: self
                    .outputs
                    .iter()
                    .map(|name| model::TaskIo {
                        name: name.clone(),
                        path: Some(name.clone()),
                    })
                    .collect(),
            },
        }
    }
}

/// A single step of a job plan
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Get(GetStep),
    Put(PutStep),
    Task(TaskStep),
}

impl Step {
    pub fn get(resource: JobResource) -> Self {
        Step::Get(GetStep { resource })
    }

    /// Resources this step reads
    pub fn input_resources(&self) -> Vec<&JobResource> {
        match self {
            Step::Get(get) => vec![&get.resource],
            Step::Put(put) => put
                .params
                .values()
                .flat_map(ParamValue::locations)
                .filter_map(Location::input_resource)
                .collect(),
            Step::Task(task) => task
                .image
                .iter()
                .chain(task.locations().filter_map(Location::input_resource))
                .collect(),
        }
    }

    /// The resource this step produces, if any
    pub fn output_resource(&self) -> Option<&JobResource> {
        match self {
            Step::Put(put) => Some(&put.resource),
            Step::Get(_) | Step::Task(_) => None,
        }
    }

    /// Wire representation of this step
    ///
    /// Gets are emitted in the job's fetch block together with every other
    /// input, so they have no inline representation.
    pub fn to_model(&self) -> Option<model::PlanStep> {
        match self {
            Step::Get(_) => None,
            Step::Put(put) => Some(model::PlanStep::Put(model::Put {
                put: put.resource.name.clone(),
                params: render_params(&put.params),
                get_params: put.get_params.clone(),
            })),
            Step::Task(task) => Some(model::PlanStep::Task(task.to_model())),
        }
    }
}

impl From<GetStep> for Step {
    fn from(step: GetStep) -> Self {
        Step::Get(step)
    }
}

impl From<PutStep> for Step {
    fn from(step: PutStep) -> Self {
        Step::Put(step)
    }
}

impl From<TaskStep> for Step {
    fn from(step: TaskStep) -> Self {
        Step::Task(step)
    }
}
