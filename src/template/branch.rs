//! Per-branch pipeline: a self-updating job followed by the project's
//! modify and verify jobs
//!
//! The bootstrap variant holds only the self-update job. It is installed once
//! by hand and then replaces itself with the full branch pipeline.

use crate::core::names::{image_tag, pipeline_name};
use crate::core::{AllJobsGroup, Job, ParamValue, Pipeline};
use crate::library::{Concourse, GitSource, ImageRegistry, SelfUpdate, ToolImages};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Suffix of every branch pipeline name
pub const BRANCH_PIPELINE_SUFFIX: &str = "-sdpb";

/// Prefix of branches that carry a change to be applied
const TASK_PREFIX: &str = "task/";

/// A git branch a pipeline is generated for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    name: String,
}

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The branch name without its `kind/` prefix
    pub fn friendly_name(&self) -> &str {
        self.name
            .split_once('/')
            .map_or(self.name.as_str(), |(_, rest)| rest)
    }

    /// Whether the branch carries a change, which runs the modify jobs
    pub fn is_task(&self) -> bool {
        self.name.starts_with(TASK_PREFIX)
    }
}

/// Everything the bootstrap pipeline needs to know about a project
pub trait BranchBootstrap {
    /// Branch the pipeline is generated for
    fn branch(&self) -> Branch;

    /// Installation the pipelines are pushed to
    fn concourse(&self) -> Result<Concourse>;

    /// Registry the builder's tool images are pushed to
    fn image_registry(&self) -> Result<ImageRegistry>;

    /// Repository with the builder's scripts and Dockerfiles
    fn builder_git(&self) -> Result<GitSource>;

    /// Script inside the builder repository that writes the pipelines
    fn generator(&self) -> Result<String>;

    /// Params passed to the generator
    fn environment(&self) -> Result<BTreeMap<String, ParamValue>>;
}

/// A project with jobs of its own on every branch
pub trait BranchProject: BranchBootstrap {
    /// Jobs applying the branch's change; only run on task branches
    fn modify_jobs(&self, pipeline: &mut Pipeline) -> Result<Vec<Job>>;

    /// Jobs checking the branch
    fn verify_jobs(&self, pipeline: &mut Pipeline) -> Result<Vec<Job>>;
}

/// Pipeline with the self-update job, named after `branch_name`
///
/// Returns the pipeline and the name of the self-update job.
fn self_updating_pipeline<S>(project: &S, branch_name: &str) -> Result<(Pipeline, String)>
where
    S: BranchBootstrap + ?Sized,
{
    let name = pipeline_name(&format!("{}{}", branch_name, BRANCH_PIPELINE_SUFFIX));
    let mut pipeline = Pipeline::new(&name).with_all_jobs_group(AllJobsGroup::First);

    let builder_git = project.builder_git().context("Failed to get builder repository")?;
    let tools = ToolImages::new(
        project.image_registry().context("Failed to get image registry")?,
        image_tag(&builder_git.branch),
        builder_git,
    );

    let mut self_update = SelfUpdate::new(
        project.concourse().context("Failed to get Concourse connection")?,
        tools,
        project.generator()?,
    );
    for (key, value) in project.environment()? {
        self_update = self_update.with_env(key, value);
    }
    let self_update_job = self_update
        .add_to(&mut pipeline)
        .with_context(|| format!("Failed to add self-update job to '{}'", name))?;

    Ok((pipeline, self_update_job))
}

/// The pipeline installed by hand to start a branch off
pub fn generate_branch_bootstrap<S>(project: &S) -> Result<Pipeline>
where
    S: BranchBootstrap + ?Sized,
{
    let branch = project.branch();
    let (pipeline, _) = self_updating_pipeline(project, branch.name())?;
    info!("Generated bootstrap pipeline '{}'", pipeline.name);
    Ok(pipeline)
}

/// The full branch pipeline
///
/// Modify jobs run after the self-update job; verify jobs run after both.
pub fn generate_branch<S>(project: &S) -> Result<Pipeline>
where
    S: BranchProject + ?Sized,
{
    let branch = project.branch();
    let (mut pipeline, self_update_job) =
        self_updating_pipeline(project, branch.friendly_name())?;

    let mut modify_names = Vec::new();
    if branch.is_task() {
        for job in project.modify_jobs(&mut pipeline)? {
            modify_names.push(job.name.clone());
            pipeline.add_root(job);
        }
        for name in &modify_names {
            if let Some(job) = pipeline.job_mut(name) {
                job.add_run_after(&self_update_job);
            }
        }
    } else {
        debug!("Branch '{}' is not a task branch, skipping modify jobs", branch.name());
    }

    let verify = project.verify_jobs(&mut pipeline)?;
    for job in verify {
        let name = job.name.clone();
        pipeline.add_root(job);
        if let Some(job) = pipeline.job_mut(&name) {
            job.add_run_after(&self_update_job);
            for modify in &modify_names {
                job.add_run_after(modify);
            }
        }
    }

    info!(
        "Generated branch pipeline '{}' with {} jobs",
        pipeline.name,
        pipeline.jobs().count()
    );
    Ok(pipeline)
}
