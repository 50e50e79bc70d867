//! Test: Self-updating branch pipelines

use crate::helpers::*;
use anyhow::Result;
use concourse_builder::core::{Job, JobResource, Location, ParamValue, Pipeline, Step, TaskStep};
use concourse_builder::library::{Concourse, GitSource, ImageRegistry, SELF_UPDATE_JOB};
use concourse_builder::model::PlanStep;
use concourse_builder::template::{
    generate_branch, generate_branch_bootstrap, Branch, BranchBootstrap, BranchProject,
};
use serde_yaml::Value;
use std::collections::BTreeMap;

struct Project {
    branch: &'static str,
}

impl Project {
    fn app_git(pipeline: &mut Pipeline) -> JobResource {
        register(
            pipeline,
            GitSource::new("git@github.com:example/app.git").to_resource("app-git"),
        );
        JobResource::triggered("app-git")
    }

    fn check(name: &str, script: &str, app_git: &JobResource) -> Job {
        Job::new(name).in_group("verify").with_step(TaskStep::new(
            name,
            Location::resource(app_git.clone(), script),
        ))
    }
}

impl BranchBootstrap for Project {
    fn branch(&self) -> Branch {
        Branch::new(self.branch)
    }

    fn concourse(&self) -> Result<Concourse> {
        Ok(Concourse {
            url: "http://concourse.com".to_string(),
            user: "user".to_string(),
            password: "password".to_string(),
            insecure: false,
        })
    }

    fn image_registry(&self) -> Result<ImageRegistry> {
        Ok(ImageRegistry::private("registry.com", "key", "secret"))
    }

    fn builder_git(&self) -> Result<GitSource> {
        Ok(GitSource::new("git@github.com:concourse-friends/concourse-builder.git")
            .with_branch("Feature/Builder")
            .with_private_key("private-key"))
    }

    fn generator(&self) -> Result<String> {
        Ok("example/sdp/generate.sh".to_string())
    }

    fn environment(&self) -> Result<BTreeMap<String, ParamValue>> {
        Ok(BTreeMap::from([(
            "BRANCH".to_string(),
            ParamValue::from(self.branch),
        )]))
    }
}

impl BranchProject for Project {
    fn modify_jobs(&self, pipeline: &mut Pipeline) -> Result<Vec<Job>> {
        let app_git = Self::app_git(pipeline);
        Ok(vec![Job::new("apply").with_step(Step::get(app_git.clone())).with_step(
            TaskStep::new("apply", Location::resource(app_git, "ci/apply.sh")),
        )])
    }

    fn verify_jobs(&self, pipeline: &mut Pipeline) -> Result<Vec<Job>> {
        let app_git = Self::app_git(pipeline);
        Ok(vec![
            Self::check("unit", "ci/unit.sh", &app_git),
            Self::check("lint", "ci/lint.sh", &app_git),
        ])
    }
}

const TASK_BRANCH: Project = Project {
    branch: "task/ABC-12 fix",
};

const MASTER: Project = Project { branch: "master" };

#[test]
fn test_pipeline_named_after_friendly_branch_name() {
    assert_eq!(generate_branch(&TASK_BRANCH).unwrap().name, "abc-12-fix-sdpb");
    assert_eq!(generate_branch(&MASTER).unwrap().name, "master-sdpb");
}

#[test]
fn test_bootstrap_uses_full_branch_name() {
    let pipeline = generate_branch_bootstrap(&TASK_BRANCH).unwrap();
    assert_eq!(pipeline.name, "task-abc-12-fix-sdpb");
    assert_eq!(pipeline.roots(), [SELF_UPDATE_JOB.to_string()]);

    let document = compile(&pipeline);
    assert_eq!(job_names(&document), vec!["curl-image", "fly-image", "self-update"]);
    assert_eq!(group_names(&document), vec!["all", "images", "sys"]);
}

#[test]
fn test_task_branch_runs_modify_then_verify() {
    let pipeline = generate_branch(&TASK_BRANCH).unwrap();

    assert_eq!(
        column_names(&pipeline),
        vec![
            vec!["curl-image"],
            vec!["fly-image"],
            vec!["self-update"],
            vec!["apply"],
            vec!["lint", "unit"],
        ]
    );
    assert_layering(&pipeline);

    let unit = pipeline.job("unit").unwrap();
    let after: Vec<&str> = unit.run_after.iter().map(String::as_str).collect();
    assert_eq!(after, vec!["apply", SELF_UPDATE_JOB]);

    let document = compile(&pipeline);
    assert_passed(&document, "unit", "app-git", &["apply"]);
    assert_passed(&document, "apply", "app-git", &[]);
}

#[test]
fn test_other_branches_skip_modify_jobs() {
    let pipeline = generate_branch(&MASTER).unwrap();

    assert!(pipeline.job("apply").is_none());
    assert_eq!(
        column_names(&pipeline),
        vec![
            vec!["curl-image"],
            vec!["fly-image"],
            vec!["self-update"],
            vec!["lint", "unit"],
        ]
    );
    assert_passed(&compile(&pipeline), "lint", "app-git", &[]);
}

#[test]
fn test_all_group_comes_first() {
    let document = compile(&generate_branch(&TASK_BRANCH).unwrap());

    assert_eq!(group_names(&document), vec!["all", "images", "sys", "verify"]);
    assert_eq!(document.groups[0].jobs.len(), 6);
    assert_eq!(document.groups[3].jobs, vec!["lint", "unit"]);
}

#[test]
fn test_tool_images_tagged_by_builder_branch() {
    let document = compile(&generate_branch(&MASTER).unwrap());

    let fly = document.resources.iter().find(|r| r.name == "fly-image").unwrap();
    assert_eq!(fly.source["tag"], Value::from("feature-builder"));
    assert_eq!(
        fly.source["repository"],
        Value::from("registry.com/concourse-builder/fly-image")
    );

    let git = document.resources.iter().find(|r| r.name == "concourse-builder-git").unwrap();
    assert_eq!(git.source["branch"], Value::from("Feature/Builder"));

    let self_update = document.job(SELF_UPDATE_JOB).unwrap();
    let prepare = self_update
        .plan
        .iter()
        .find_map(|step| match step {
            PlanStep::Task(task) if task.task == "prepare pipelines" => Some(task),
            _ => None,
        })
        .unwrap();
    assert_eq!(prepare.config.params["BRANCH"], Value::from("master"));
    assert_eq!(
        prepare.config.run.path,
        "concourse-builder-git/example/sdp/generate.sh"
    );
}
