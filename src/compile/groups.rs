//! Ordering of job groups for the web UI

use crate::compile::closure::Closure;
use crate::compile::cycles::cycle_error;
use crate::core::{AllJobsGroup, Pipeline};
use crate::error::{CycleError, CycleKind};
use crate::model;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet};

/// Name of the synthetic group listing every job
pub const ALL_JOBS_GROUP: &str = "all";

/// Sort group names so that every group comes before the groups in its
/// `before` set, breaking ties alphabetically
pub fn sort_groups(pipeline: &Pipeline) -> Result<Vec<&str>, CycleError> {
    let mut successors: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for group in pipeline.groups() {
        successors.entry(group.name.as_str()).or_default();
        for later in &group.before {
            successors.entry(later.as_str()).or_default();
        }
    }
    for job in pipeline.jobs() {
        for group in &job.groups {
            successors.entry(group.as_str()).or_default();
        }
    }
    for group in pipeline.groups() {
        for later in &group.before {
            if let Some(edges) = successors.get_mut(group.name.as_str()) {
                edges.insert(later.as_str());
            }
        }
    }

    let mut indegree: BTreeMap<&str, usize> = successors.keys().map(|name| (*name, 0)).collect();
    for later in successors.values().flatten() {
        if let Some(count) = indegree.get_mut(later) {
            *count += 1;
        }
    }

    let mut ready: BTreeSet<&str> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut ordered = Vec::with_capacity(successors.len());

    while let Some(name) = ready.pop_first() {
        ordered.push(name);
        for later in &successors[name] {
            if let Some(count) = indegree.get_mut(later) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*later);
                }
            }
        }
    }

    if ordered.len() < successors.len() {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let nodes: BTreeMap<&str, NodeIndex> = successors
            .keys()
            .map(|name| (*name, graph.add_node(*name)))
            .collect();
        for (name, edges) in &successors {
            for later in edges {
                graph.add_edge(nodes[name], nodes[later], ());
            }
        }
        return Err(cycle_error(CycleKind::Groups, &graph));
    }

    Ok(ordered)
}

/// Build the `groups` section for the jobs of a closure
pub fn model_groups(
    pipeline: &Pipeline,
    closure: &Closure<'_>,
) -> Result<Vec<model::Group>, CycleError> {
    let mut members: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut ungrouped = false;
    for job in closure.jobs() {
        if job.groups.is_empty() {
            ungrouped = true;
        }
        for group in &job.groups {
            members.entry(group.as_str()).or_default().insert(job.name.as_str());
        }
    }

    let mut groups: Vec<model::Group> = sort_groups(pipeline)?
        .into_iter()
        .filter_map(|name| {
            members.get(name).map(|jobs| model::Group {
                name: name.to_string(),
                jobs: jobs.iter().map(|job| job.to_string()).collect(),
            })
        })
        .collect();

    let wants_all = ungrouped || groups.len() > 1;
    let all_declared = groups.iter().any(|group| group.name == ALL_JOBS_GROUP);
    if wants_all && !all_declared {
        let all = || model::Group {
            name: ALL_JOBS_GROUP.to_string(),
            jobs: closure.jobs().map(|job| job.name.clone()).collect(),
        };
        match pipeline.all_jobs_group {
            AllJobsGroup::None => {}
            AllJobsGroup::First => groups.insert(0, all()),
            AllJobsGroup::Last => groups.push(all()),
        }
    }

    Ok(groups)
}
