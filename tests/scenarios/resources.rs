//! Test: Resource registry and deduplication

use crate::helpers::*;
use concourse_builder::core::{Pipeline, Resource, ResourceRegistry, ResourceType};
use concourse_builder::error::ConstructionError;
use serde_yaml::Value;

fn git_repo(uri: &str) -> Resource {
    Resource::new("git-repo", "git").with_source("uri", uri)
}

#[test]
fn test_first_registration_is_emitted() {
    let mut pipeline = Pipeline::new("main");
    register(&mut pipeline, git_repo("git@github.com:example/first.git"));
    register(&mut pipeline, git_repo("git@github.com:example/second.git"));
    pipeline.add_root(consumer("unit", &["git-repo"]));
    pipeline.add_root(consumer("lint", &["git-repo"]));

    let document = compile(&pipeline);
    assert_eq!(document.resources.len(), 1);
    assert_eq!(
        document.resources[0].source.get("uri"),
        Some(&Value::from("git@github.com:example/first.git"))
    );
}

#[test]
fn test_strict_registry_rejects_different_source() {
    let mut pipeline = Pipeline::with_registry("main", ResourceRegistry::strict());
    register(&mut pipeline, git_repo("git@github.com:example/first.git"));

    let error = pipeline
        .resources
        .register(git_repo("git@github.com:example/second.git"))
        .unwrap_err();
    assert_eq!(error, ConstructionError::ConflictingResource("git-repo".to_string()));
}

#[test]
fn test_resources_sorted_and_unreferenced_left_out() {
    let mut pipeline = Pipeline::new("main");
    register(&mut pipeline, Resource::new("zeta", "git"));
    register(&mut pipeline, Resource::new("alpha", "git"));
    register(&mut pipeline, Resource::new("unused", "git"));
    pipeline.add_root(producer("unit", &["zeta"], "alpha"));

    let document = compile(&pipeline);
    assert_eq!(resource_names(&document), vec!["alpha", "zeta"]);
}

#[test]
fn test_custom_types_emitted_once_system_types_never() {
    let mut pipeline = Pipeline::new("main");
    pipeline.resource_types.register(
        ResourceType::custom("slack", "cfcommunity/slack-notification-resource")
            .with_tag("latest"),
    );
    register(&mut pipeline, Resource::new("repo", "git"));
    register(&mut pipeline, Resource::new("alerts", "slack"));
    register(&mut pipeline, Resource::new("releases", "slack"));
    pipeline.add_root(producer("notify", &["repo"], "alerts"));
    pipeline.add_root(producer("announce", &["repo"], "releases"));

    let document = compile(&pipeline);
    assert_eq!(document.resource_types.len(), 1);
    assert_eq!(document.resource_types[0].name, "slack");
    assert_eq!(document.resource_types[0].type_name, "docker-image");
}

#[test]
fn test_scope_placeholders_rendered() {
    let mut pipeline = Pipeline::new("main");
    register(
        &mut pipeline,
        Resource::new("state", "s3")
            .with_source("bucket", "{{ team }}-{{ installation }}-{{ pipeline }}"),
    );
    pipeline.add_root(consumer("unit", &["state"]));

    let document = compile(&pipeline);
    assert_eq!(
        document.resources[0].source.get("bucket"),
        Some(&Value::from("team-prod-main"))
    );
}
