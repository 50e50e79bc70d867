//! Assembly of the full pipeline document

use crate::compile::closure::Closure;
use crate::compile::columns::Columns;
use crate::compile::groups::model_groups;
use crate::compile::passed::project_gets;
use crate::compile::resources::ResourceSet;
use crate::core::{Job, Pipeline, ScopeInfo, Step};
use crate::error::Result;
use crate::model;
use tracing::{debug, info};

/// Compile a pipeline into its document
///
/// Jobs are emitted column by column. Each plan starts with one aggregate
/// fetching every input of the job, followed by its puts and tasks in
/// declared order.
pub fn assemble(pipeline: &Pipeline, scope: &ScopeInfo) -> Result<model::Pipeline> {
    info!(
        "Compiling pipeline '{}' from {} root jobs",
        pipeline.name,
        pipeline.roots().len()
    );

    let closure = Closure::resolve(pipeline)?;
    let columns = Columns::layer(&closure)?;
    debug!("Layered {} jobs into {} columns", closure.len(), columns.len());

    let groups = model_groups(pipeline, &closure)?;
    let resources = ResourceSet::collect(&closure, &pipeline.resources)?;

    let mut jobs = Vec::with_capacity(closure.len());
    for (column, layer) in columns.iter().enumerate() {
        for job in layer {
            jobs.push(model_job(&columns, column, job));
        }
    }

    let document = model::Pipeline {
        groups,
        resource_types: resources.resource_types(&pipeline.resource_types, scope),
        resources: resources.to_models(scope),
        jobs,
    };

    info!(
        "Compiled pipeline '{}': {} jobs, {} resources, {} groups",
        pipeline.name,
        document.jobs.len(),
        document.resources.len(),
        document.groups.len()
    );
    Ok(document)
}

fn model_job(columns: &Columns<'_>, column: usize, job: &Job) -> model::Job {
    let gets = project_gets(columns, column, job);

    let mut plan = Vec::with_capacity(job.steps.len() + 1);
    if !gets.is_empty() {
        plan.push(model::PlanStep::Aggregate(model::Aggregate { aggregate: gets }));
    }
    plan.extend(job.steps.iter().filter_map(Step::to_model));

    model::Job {
        name: job.name.clone(),
        plan,
    }
}
