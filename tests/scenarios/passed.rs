//! Test: Passed constraints - only the nearest upstream referencers are listed

use crate::helpers::*;
use concourse_builder::core::{Job, JobResource, Pipeline, Resource, Step};

/// repo flows a -> b -> c -> d, with e reading it beside b
fn chain() -> Pipeline {
    let mut pipeline = Pipeline::new("main");
    register(&mut pipeline, Resource::new("repo", "git"));
    pipeline.add_job(consumer("a", &["repo"]));
    pipeline.add_job(consumer("b", &["repo"]).after("a"));
    pipeline.add_job(consumer("e", &["repo"]).after("a"));
    pipeline.add_job(Job::new("c").after("b").after("e"));
    pipeline.add_root(consumer("d", &["repo"]).after("c"));
    pipeline
}

#[test]
fn test_nearest_column_wins() {
    let pipeline = chain();
    assert_eq!(
        column_names(&pipeline),
        vec![vec!["a"], vec!["b", "e"], vec!["c"], vec!["d"]]
    );

    let document = compile(&pipeline);
    assert_passed(&document, "a", "repo", &[]);
    assert_passed(&document, "b", "repo", &["a"]);
    assert_passed(&document, "e", "repo", &["a"]);
    // c does not touch repo, so d skips over it to both readers in column 1
    assert_passed(&document, "d", "repo", &["b", "e"]);
}

#[test]
fn test_producer_and_consumer_both_count() {
    let mut pipeline = Pipeline::new("main");
    register(&mut pipeline, Resource::new("repo", "git"));
    register(&mut pipeline, Resource::new("image", "docker-image").produced_by("build"));
    pipeline.add_job(producer("build", &["repo"], "image"));
    pipeline.add_job(consumer("scan", &["repo"]));
    pipeline.add_root(consumer("deploy", &["image", "repo"]).after("scan"));

    let document = compile(&pipeline);
    assert_passed(&document, "deploy", "image", &["build"]);
    assert_passed(&document, "deploy", "repo", &["build", "scan"]);
}

#[test]
fn test_gets_are_sorted_and_keep_first_reference() {
    let mut pipeline = Pipeline::new("main");
    register(&mut pipeline, Resource::new("zeta", "git"));
    register(&mut pipeline, Resource::new("alpha", "git"));
    pipeline.add_root(
        consumer("unit", &["zeta", "alpha"])
            .with_step(Step::get(JobResource::new("zeta"))),
    );

    let document = compile(&pipeline);
    let gets = document.job("unit").unwrap().gets();
    let names: Vec<&str> = gets.iter().map(|get| get.get.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert!(gets[1].trigger);
}
