//! Dependency closure - every job the roots need to run

use crate::core::{Job, Pipeline};
use crate::error::ConstructionError;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

/// The closed set of jobs reachable from the roots, with all predecessor edges
///
/// Edges are kept here rather than on the jobs so that implicit edges found
/// through resource producers never mutate the authoring model.
#[derive(Debug, Clone)]
pub struct Closure<'a> {
    jobs: BTreeMap<&'a str, &'a Job>,
    predecessors: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> Closure<'a> {
    /// Resolve the closure of the pipeline's declared roots
    pub fn resolve(pipeline: &'a Pipeline) -> Result<Self, ConstructionError> {
        Self::resolve_from(pipeline, pipeline.roots().iter().map(String::as_str))
    }

    /// Resolve the closure of an explicit set of roots
    pub fn resolve_from<I>(pipeline: &'a Pipeline, roots: I) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lookup = |name: &str| -> Result<&'a Job, ConstructionError> {
            pipeline
                .job(name)
                .ok_or_else(|| ConstructionError::UnregisteredJob(name.to_string()))
        };

        let mut worklist: VecDeque<&'a Job> = VecDeque::new();
        let mut seen: BTreeSet<&'a str> = BTreeSet::new();
        for root in roots {
            let job = lookup(root)?;
            if seen.insert(job.name.as_str()) {
                worklist.push_back(job);
            }
        }

        let mut jobs = BTreeMap::new();
        let mut predecessors = BTreeMap::new();

        while let Some(job) = worklist.pop_front() {
            debug!("Checking resources of job '{}'", job.name);
            jobs.insert(job.name.as_str(), job);

            let mut edges: BTreeSet<&'a str> = BTreeSet::new();
            let mut upstream: Vec<&'a Job> = Vec::new();

            for name in &job.run_after {
                let predecessor = lookup(name)?;
                edges.insert(predecessor.name.as_str());
                upstream.push(predecessor);
            }

            for reference in job.input_resources() {
                let resource = pipeline.resources.require(&reference.name)?;
                for producer in &resource.producers {
                    // A job that updates a resource it also reads does not wait on itself
                    if *producer == job.name {
                        continue;
                    }
                    let producer = lookup(producer)?;
                    if edges.insert(producer.name.as_str()) {
                        debug!(
                            "Job '{}' needs '{}' for resource '{}'",
                            job.name, producer.name, resource.name
                        );
                    }
                    upstream.push(producer);
                }
            }

            for predecessor in upstream {
                if seen.insert(predecessor.name.as_str()) {
                    worklist.push_back(predecessor);
                }
            }

            predecessors.insert(job.name.as_str(), edges);
        }

        Ok(Self { jobs, predecessors })
    }

    /// Jobs in name order
    pub fn jobs(&self) -> impl Iterator<Item = &'a Job> + '_ {
        self.jobs.values().copied()
    }

    pub fn job(&self, name: &str) -> Option<&'a Job> {
        self.jobs.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    /// Direct predecessors of a job, explicit and implicit, in name order
    pub fn predecessors(&self, name: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.predecessors
            .get(name)
            .into_iter()
            .flat_map(|edges| edges.iter().copied())
    }

    /// Every (predecessor, job) edge
    pub fn edges(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.predecessors
            .iter()
            .flat_map(|(job, edges)| edges.iter().map(move |predecessor| (*predecessor, *job)))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
