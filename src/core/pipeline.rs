//! Pipeline domain model

use crate::compile::{self, Closure, Columns};
use crate::core::{
    job::{Job, JobGroup},
    registry::{ResourceRegistry, ResourceTypeRegistry},
    scope::ScopeInfo,
};
use crate::error::Result;
use crate::model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, info};

/// Where to place the synthetic group listing every job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllJobsGroup {
    /// Never add it
    #[default]
    None,
    /// Add it as the first group
    First,
    /// Add it as the last group
    Last,
}

/// A pipeline definition
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Placement of the synthetic `all` group
    pub all_jobs_group: AllJobsGroup,

    /// Resources known to this pipeline
    pub resources: ResourceRegistry,

    /// Resource types known to this pipeline
    pub resource_types: ResourceTypeRegistry,

    /// Every job that may take part, keyed by name
    jobs: BTreeMap<String, Job>,

    /// Declared group ordering
    groups: BTreeMap<String, JobGroup>,

    /// Jobs the author asked for, in declaration order
    roots: Vec<String>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, ResourceRegistry::new())
    }

    /// A pipeline over a specific resource registry (e.g. a strict one)
    pub fn with_registry(name: impl Into<String>, resources: ResourceRegistry) -> Self {
        Self {
            name: name.into(),
            all_jobs_group: AllJobsGroup::None,
            resources,
            resource_types: ResourceTypeRegistry::with_system_types(),
            jobs: BTreeMap::new(),
            groups: BTreeMap::new(),
            roots: Vec::new(),
        }
    }

    pub fn with_all_jobs_group(mut self, placement: AllJobsGroup) -> Self {
        self.all_jobs_group = placement;
        self
    }

    /// Make a job available to the closure without requesting it
    ///
    /// The first job added under a name wins, so idempotent builders may add
    /// the same job repeatedly.
    pub fn add_job(&mut self, job: Job) -> &Job {
        let name = job.name.clone();
        if self.jobs.contains_key(&name) {
            debug!("Job '{}' already added, keeping first", name);
        }
        self.jobs.entry(name).or_insert(job)
    }

    /// Add a job and request it as a root
    pub fn add_root(&mut self, job: Job) {
        let name = job.name.clone();
        self.add_job(job);
        self.mark_root(name);
    }

    /// Request an already added job as a root
    pub fn mark_root(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.roots.contains(&name) {
            self.roots.push(name);
        }
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    pub fn job_mut(&mut self, name: &str) -> Option<&mut Job> {
        self.jobs.get_mut(name)
    }

    /// Every added job, in name order
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    /// Declare a group and its ordering; the first declaration wins
    pub fn declare_group(&mut self, group: JobGroup) {
        self.groups.entry(group.name.clone()).or_insert(group);
    }

    pub fn group(&self, name: &str) -> Option<&JobGroup> {
        self.groups.get(name)
    }

    /// Every declared group, in name order
    pub fn groups(&self) -> impl Iterator<Item = &JobGroup> {
        self.groups.values()
    }

    /// Resolve the full set of jobs needed by the roots
    pub fn closure(&self) -> Result<Closure<'_>> {
        Ok(Closure::resolve(self)?)
    }

    /// Resolve the closure and layer it into columns
    pub fn columns(&self) -> Result<Columns<'_>> {
        let closure = self.closure()?;
        Ok(Columns::layer(&closure)?)
    }

    /// Build the pipeline document
    pub fn compile(&self, scope: &ScopeInfo) -> Result<model::Pipeline> {
        compile::assemble(self, scope)
    }

    /// Compile the pipeline and write it as YAML
    ///
    /// Nothing is written unless the whole document was built and encoded.
    pub fn save<W: Write>(&self, team: &str, installation: &str, writer: &mut W) -> Result<()> {
        let scope = ScopeInfo::new(self.name.clone(), team, installation);
        let document = self.compile(&scope)?;
        let yaml = document.to_yaml()?;

        writer.write_all(yaml.as_bytes())?;
        info!(
            "Wrote pipeline '{}' ({} jobs, {} resources)",
            self.name,
            document.jobs.len(),
            document.resources.len()
        );
        Ok(())
    }
}
