//! Test: Dependency closure - implicit upstream jobs are pulled in

use crate::helpers::*;
use concourse_builder::core::{Job, Pipeline, PutStep, Resource};
use concourse_builder::error::{CompileError, ConstructionError, CycleKind};

fn base_image_pipeline() -> Pipeline {
    let mut pipeline = Pipeline::new("main");
    register(&mut pipeline, Resource::new("repo", "git"));
    register(
        &mut pipeline,
        Resource::new("base-image", "docker-image").produced_by("build-image"),
    );
    pipeline.add_job(producer("build-image", &["repo"], "base-image"));
    pipeline.add_root(consumer("deploy", &["base-image"]));
    pipeline
}

/// Only `deploy` is requested; its producer is discovered through the resource
#[test]
fn test_producer_pulled_in_before_consumer() {
    let pipeline = base_image_pipeline();

    assert_eq!(column_names(&pipeline), vec![vec!["build-image"], vec!["deploy"]]);
    assert_layering(&pipeline);

    let document = compile(&pipeline);
    assert_eq!(job_names(&document), vec!["build-image", "deploy"]);
    assert_passed(&document, "deploy", "base-image", &["build-image"]);
    assert_passed(&document, "build-image", "repo", &[]);
}

#[test]
fn test_every_referenced_resource_emitted_once() {
    let mut pipeline = base_image_pipeline();
    pipeline.add_root(consumer("smoke", &["base-image", "repo"]));

    let document = compile(&pipeline);
    assert_eq!(resource_names(&document), vec!["base-image", "repo"]);
}

#[test]
fn test_transitive_producers() {
    let mut pipeline = Pipeline::new("main");
    register(&mut pipeline, Resource::new("os-image", "docker-image").produced_by("os"));
    register(&mut pipeline, Resource::new("tool-image", "docker-image").produced_by("tools"));
    pipeline.add_job(Job::new("os").with_step(PutStep::new("os-image")));
    pipeline.add_job(producer("tools", &["os-image"], "tool-image"));
    pipeline.add_root(consumer("release", &["tool-image"]));

    assert_eq!(
        column_names(&pipeline),
        vec![vec!["os"], vec!["tools"], vec!["release"]]
    );
    assert_layering(&pipeline);
}

#[test]
fn test_unregistered_resource_aborts_compile() {
    let mut pipeline = Pipeline::new("main");
    pipeline.add_root(consumer("deploy", &["missing"]));

    let mut out = Vec::new();
    let error = pipeline.save("team", "prod", &mut out).unwrap_err();
    assert!(matches!(
        error,
        CompileError::Construction(ConstructionError::UnregisteredResource(ref name))
            if name == "missing"
    ));
    assert!(out.is_empty());
}

/// Two jobs that each produce what the other consumes
#[test]
fn test_predecessor_cycle_fails_without_output() {
    let mut pipeline = Pipeline::new("main");
    register(&mut pipeline, Resource::new("a-out", "s3").produced_by("a"));
    register(&mut pipeline, Resource::new("b-out", "s3").produced_by("b"));
    pipeline.add_job(producer("a", &["b-out"], "a-out"));
    pipeline.add_root(producer("b", &["a-out"], "b-out"));

    let mut out = Vec::new();
    let error = pipeline.save("team", "prod", &mut out).unwrap_err();
    let CompileError::Cycle(cycle) = error else {
        panic!("expected a cycle error");
    };
    assert_eq!(cycle.kind, CycleKind::Jobs);
    assert_eq!(cycle.members, vec!["a", "b"]);
    assert!(out.is_empty());
}
