//! Test: YAML authoring produces the same document as the builder API

use crate::helpers::*;
use concourse_builder::core::{
    AllJobsGroup, Job, JobGroup, JobResource, Location, Pipeline, PutStep, Resource, Step,
    TaskStep,
};
use concourse_builder::PipelineConfig;
use std::io::Write;
use tempfile::NamedTempFile;

const SHOP: &str = r#"
name: shop
all_jobs_group: first
roots: [deploy]

resources:
  - name: repo
    type: git
    source:
      uri: git@github.com:example/shop.git
  - name: app-image
    type: docker-image
    source:
      repository: example/shop
    produced_by: [build]

groups:
  - name: build
    before: [deploy]

jobs:
  - name: build
    groups: [build]
    plan:
      - get: repo
        trigger: true
      - task: package
        run: { resource: repo, path: ci/package.sh }
        outputs: [dist]
      - put: app-image
        params:
          build: { output: dist }

  - name: deploy
    groups: [deploy]
    plan:
      - task: rollout
        image: app-image
        run: /usr/bin/rollout
        params:
          ENV: production
"#;

fn shop_by_hand() -> Pipeline {
    let mut pipeline = Pipeline::new("shop").with_all_jobs_group(AllJobsGroup::First);
    register(
        &mut pipeline,
        Resource::new("repo", "git").with_source("uri", "git@github.com:example/shop.git"),
    );
    register(
        &mut pipeline,
        Resource::new("app-image", "docker-image")
            .with_source("repository", "example/shop")
            .produced_by("build"),
    );
    pipeline.declare_group(JobGroup::new("build").before("deploy"));

    pipeline.add_job(
        Job::new("build")
            .in_group("build")
            .with_step(Step::get(JobResource::triggered("repo")))
            .with_step(
                TaskStep::new(
                    "package",
                    Location::resource(JobResource::triggered("repo"), "ci/package.sh"),
                )
                .with_output("dist"),
            )
            .with_step(PutStep::new("app-image").with_param("build", Location::output("dist", ""))),
    );
    pipeline.add_root(
        Job::new("deploy").in_group("deploy").with_step(
            TaskStep::new("rollout", Location::absolute("/usr/bin/rollout"))
                .with_image(JobResource::triggered("app-image"))
                .with_param("ENV", "production"),
        ),
    );
    pipeline
}

#[test]
fn test_config_matches_builder() {
    let config = PipelineConfig::from_yaml(SHOP).unwrap();
    let from_config = config.to_pipeline().unwrap();

    assert_eq!(compile(&from_config), compile(&shop_by_hand()));
    assert_eq!(save_to_string(&from_config), save_to_string(&shop_by_hand()));
}

#[test]
fn test_config_pipeline_shape() {
    let pipeline = PipelineConfig::from_yaml(SHOP).unwrap().to_pipeline().unwrap();
    let document = compile(&pipeline);

    // build is pulled in by deploy's image even though only deploy is a root
    assert_eq!(job_names(&document), vec!["build", "deploy"]);
    assert_eq!(group_names(&document), vec!["all", "build", "deploy"]);
    assert_passed(&document, "deploy", "app-image", &["build"]);
    assert_passed(&document, "build", "repo", &[]);
}

#[test]
fn test_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SHOP.as_bytes()).unwrap();

    let config = PipelineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.name, "shop");
    assert_eq!(config.jobs.len(), 2);
}

#[test]
fn test_invalid_file_names_path() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"name: broken\njobs:\n  - name: a\n    run_after: [ghost]\n")
        .unwrap();

    let error = PipelineConfig::from_file(file.path()).unwrap_err();
    let message = format!("{:#}", error);
    assert!(message.contains("Invalid pipeline file"));
    assert!(message.contains("ghost"));
}
