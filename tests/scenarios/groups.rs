//! Test: Group ordering and the synthetic all-jobs group

use crate::helpers::*;
use concourse_builder::core::{AllJobsGroup, Job, JobGroup, Pipeline};
use concourse_builder::error::{CompileError, CycleKind};

fn grouped(declarations: Vec<JobGroup>) -> Pipeline {
    let mut pipeline = Pipeline::new("main");
    for group in declarations {
        pipeline.declare_group(group);
    }
    pipeline.add_root(Job::new("job-c").in_group("C"));
    pipeline.add_root(Job::new("job-a").in_group("A"));
    pipeline.add_root(Job::new("job-b").in_group("B"));
    pipeline
}

#[test]
fn test_before_chain_regardless_of_declaration_order() {
    let forward = grouped(vec![
        JobGroup::new("A").before("B"),
        JobGroup::new("B").before("C"),
    ]);
    let backward = grouped(vec![
        JobGroup::new("B").before("C"),
        JobGroup::new("A").before("B"),
    ]);

    assert_eq!(group_names(&compile(&forward)), vec!["A", "B", "C"]);
    assert_eq!(group_names(&compile(&backward)), vec!["A", "B", "C"]);
}

#[test]
fn test_before_overrides_alphabetical() {
    let pipeline = grouped(vec![JobGroup::new("C").before("A")]);
    assert_eq!(group_names(&compile(&pipeline)), vec!["B", "C", "A"]);
}

#[test]
fn test_group_cycle_fails() {
    let pipeline = grouped(vec![
        JobGroup::new("A").before("B"),
        JobGroup::new("B").before("A"),
    ]);

    let mut out = Vec::new();
    let error = pipeline.save("team", "prod", &mut out).unwrap_err();
    let CompileError::Cycle(cycle) = error else {
        panic!("expected a cycle error");
    };
    assert_eq!(cycle.kind, CycleKind::Groups);
    assert_eq!(cycle.members, vec!["A", "B"]);
    assert!(out.is_empty());
}

#[test]
fn test_all_group_prepended_for_split_jobs() {
    let mut pipeline = Pipeline::new("main").with_all_jobs_group(AllJobsGroup::First);
    pipeline.add_root(Job::new("deploy").in_group("release"));
    pipeline.add_root(Job::new("build").in_group("ci"));
    pipeline.add_root(Job::new("test").in_group("ci"));

    let document = compile(&pipeline);
    assert_eq!(group_names(&document), vec!["all", "ci", "release"]);
    assert_eq!(document.groups[0].jobs, vec!["build", "deploy", "test"]);
    assert_eq!(document.groups[1].jobs, vec!["build", "test"]);
}

#[test]
fn test_ungrouped_jobs_only_in_all_group() {
    let mut pipeline = Pipeline::new("main").with_all_jobs_group(AllJobsGroup::Last);
    pipeline.add_root(Job::new("build").in_group("ci"));
    pipeline.add_root(Job::new("lint"));

    let document = compile(&pipeline);
    assert_eq!(group_names(&document), vec!["ci", "all"]);
    assert_eq!(document.groups[0].jobs, vec!["build"]);
    assert_eq!(document.groups[1].jobs, vec!["build", "lint"]);
}

#[test]
fn test_groups_without_jobs_are_not_emitted() {
    let mut pipeline = Pipeline::new("main");
    pipeline.declare_group(JobGroup::new("empty").before("ci"));
    pipeline.add_root(Job::new("build").in_group("ci"));

    assert_eq!(group_names(&compile(&pipeline)), vec!["ci"]);
}
