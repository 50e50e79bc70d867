//! Concourse pipeline document schema
//!
//! These types mirror the YAML shape consumed by `fly set-pipeline`. Field
//! order here is emission order, so changing it changes the output bytes.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

fn is_false(value: &bool) -> bool {
    !*value
}

/// A complete pipeline document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_types: Vec<ResourceType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,

    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl Pipeline {
    /// Encode the document as YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Find a job by name
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.name == name)
    }
}

/// A named tab of jobs in the web UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub jobs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceType {
    pub name: String,

    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub source: Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,

    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub source: Mapping,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_every: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub plan: Vec<PlanStep>,
}

impl Job {
    /// All `get` steps of the plan, including those inside aggregates
    pub fn gets(&self) -> Vec<&Get> {
        let mut gets = Vec::new();
        for step in &self.plan {
            match step {
                PlanStep::Aggregate(aggregate) => gets.extend(aggregate.aggregate.iter()),
                PlanStep::Get(get) => gets.push(get),
                _ => {}
            }
        }
        gets
    }

    /// The `get` step for a resource, if the plan fetches it
    pub fn get(&self, resource: &str) -> Option<&Get> {
        self.gets().into_iter().find(|get| get.get == resource)
    }
}

/// One entry of a job plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanStep {
    Aggregate(Aggregate),
    Get(Get),
    Put(Put),
    Task(Task),
}

/// Steps fetched in parallel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub aggregate: Vec<Get>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Get {
    pub get: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub trigger: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passed: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Put {
    pub put: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub config: TaskConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub platform: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<TaskIo>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,

    pub run: TaskRun,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<TaskIo>,
}

/// A task input or output directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskIo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
    pub path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}
