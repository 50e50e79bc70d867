//! Test utility functions for concourse-builder

use concourse_builder::core::{Job, JobResource, Pipeline, PutStep, Resource, ScopeInfo, Step};
use concourse_builder::model;

/// A job that fetches each of `resources` as a trigger
pub fn consumer(name: &str, resources: &[&str]) -> Job {
    resources.iter().fold(Job::new(name), |job, resource| {
        job.with_step(Step::get(JobResource::triggered(*resource)))
    })
}

/// A job that fetches `inputs` and pushes `output`
pub fn producer(name: &str, inputs: &[&str], output: &str) -> Job {
    consumer(name, inputs).with_step(PutStep::new(output))
}

/// Register a resource, failing the test on error
pub fn register(pipeline: &mut Pipeline, resource: Resource) {
    pipeline
        .resources
        .register(resource)
        .expect("resource registration should succeed");
}

pub fn scope() -> ScopeInfo {
    ScopeInfo::new("main", "team", "prod")
}

/// Compile a pipeline, failing the test on error
pub fn compile(pipeline: &Pipeline) -> model::Pipeline {
    pipeline.compile(&scope()).expect("pipeline should compile")
}

/// Compile a pipeline into YAML through `save`
pub fn save_to_string(pipeline: &Pipeline) -> String {
    let mut out = Vec::new();
    pipeline
        .save("team", "prod", &mut out)
        .expect("pipeline should save");
    String::from_utf8(out).expect("pipeline YAML should be UTF-8")
}

/// Job names per column
pub fn column_names(pipeline: &Pipeline) -> Vec<Vec<String>> {
    pipeline.columns().expect("pipeline should layer").names()
}

pub fn job_names(document: &model::Pipeline) -> Vec<&str> {
    document.jobs.iter().map(|job| job.name.as_str()).collect()
}

pub fn resource_names(document: &model::Pipeline) -> Vec<&str> {
    document.resources.iter().map(|resource| resource.name.as_str()).collect()
}

pub fn group_names(document: &model::Pipeline) -> Vec<&str> {
    document.groups.iter().map(|group| group.name.as_str()).collect()
}

/// Assert the passed list of `job`'s get for `resource`
pub fn assert_passed(document: &model::Pipeline, job: &str, resource: &str, expected: &[&str]) {
    let job_model = document
        .job(job)
        .unwrap_or_else(|| panic!("job '{}' should be in the document", job));
    let get = job_model
        .get(resource)
        .unwrap_or_else(|| panic!("job '{}' should fetch '{}'", job, resource));
    assert_eq!(
        get.passed, expected,
        "passed list of '{}' in job '{}'",
        resource, job
    );
}

/// Assert that every producer sits in an earlier column than its consumers
pub fn assert_layering(pipeline: &Pipeline) {
    let closure = pipeline.closure().expect("closure should resolve");
    let columns = pipeline.columns().expect("pipeline should layer");
    for (predecessor, job) in closure.edges() {
        let before = columns.column_of(predecessor).expect("predecessor is layered");
        let after = columns.column_of(job).expect("job is layered");
        assert!(
            before < after,
            "'{}' (column {}) should precede '{}' (column {})",
            predecessor,
            before,
            job,
            after
        );
    }
}
