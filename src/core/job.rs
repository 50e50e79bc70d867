//! Job and job group domain models

use crate::core::step::{JobResource, Step};
use std::collections::{BTreeMap, BTreeSet};

/// A job in the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Unique job name
    pub name: String,

    /// Ordered plan steps
    pub steps: Vec<Step>,

    /// Names of the groups this job is shown in
    pub groups: Vec<String>,

    /// Jobs that must run before this one, independent of resources
    pub run_after: BTreeSet<String>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            groups: Vec::new(),
            run_after: BTreeSet::new(),
        }
    }

    pub fn with_step(mut self, step: impl Into<Step>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn add_step(&mut self, step: impl Into<Step>) {
        self.steps.push(step.into());
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.add_to_group(group);
        self
    }

    pub fn add_to_group(&mut self, group: impl Into<String>) {
        let group = group.into();
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    pub fn after(mut self, job: impl Into<String>) -> Self {
        self.run_after.insert(job.into());
        self
    }

    pub fn add_run_after(&mut self, job: impl Into<String>) {
        self.run_after.insert(job.into());
    }

    /// Every resource read by the job's steps, in step order
    pub fn input_resources(&self) -> impl Iterator<Item = &JobResource> {
        self.steps.iter().flat_map(Step::input_resources)
    }

    /// Every resource written by the job's steps, in step order
    pub fn output_resources(&self) -> impl Iterator<Item = &JobResource> {
        self.steps.iter().filter_map(Step::output_resource)
    }

    /// Whether any step reads or writes the resource
    pub fn references(&self, resource: &str) -> bool {
        self.input_resources()
            .chain(self.output_resources())
            .any(|reference| reference.name == resource)
    }

    /// Inputs deduplicated by name, first reference wins, sorted by name
    pub fn fetched_resources(&self) -> Vec<&JobResource> {
        let mut fetched: BTreeMap<&str, &JobResource> = BTreeMap::new();
        for reference in self.input_resources() {
            fetched.entry(reference.name.as_str()).or_insert(reference);
        }
        fetched.into_values().collect()
    }
}

/// A named set of jobs ordered relative to other groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobGroup {
    pub name: String,

    /// Groups this group is listed before
    pub before: BTreeSet<String>,
}

impl JobGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            before: BTreeSet::new(),
        }
    }

    pub fn before(mut self, group: impl Into<String>) -> Self {
        self.before.insert(group.into());
        self
    }
}
