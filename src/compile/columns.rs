//! Longest-path layering of the closed job set

use crate::compile::closure::Closure;
use crate::compile::cycles::cycle_error;
use crate::core::Job;
use crate::error::{CycleError, CycleKind};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::BTreeMap;

/// Jobs layered so that every predecessor sits in an earlier column
///
/// A job's column is one more than the highest column of its predecessors,
/// or zero when it has none. Jobs within a column are ordered by name.
#[derive(Debug, Clone)]
pub struct Columns<'a> {
    columns: Vec<Vec<&'a Job>>,
    index: BTreeMap<&'a str, usize>,
}

impl<'a> Columns<'a> {
    pub fn layer(closure: &Closure<'a>) -> Result<Self, CycleError> {
        let mut graph: DiGraph<&'a str, ()> = DiGraph::new();
        let mut nodes: BTreeMap<&'a str, NodeIndex> = BTreeMap::new();

        for job in closure.jobs() {
            nodes.insert(job.name.as_str(), graph.add_node(job.name.as_str()));
        }
        for (predecessor, job) in closure.edges() {
            graph.add_edge(nodes[predecessor], nodes[job], ());
        }

        let sorted = toposort(&graph, None).map_err(|_| cycle_error(CycleKind::Jobs, &graph))?;

        let mut levels: BTreeMap<NodeIndex, usize> = BTreeMap::new();
        for node in sorted {
            let level = graph
                .neighbors_directed(node, Direction::Incoming)
                .filter_map(|predecessor| levels.get(&predecessor))
                .map(|level| level + 1)
                .max()
                .unwrap_or(0);
            levels.insert(node, level);
        }

        let mut columns: Vec<Vec<&'a Job>> = Vec::new();
        let mut index = BTreeMap::new();
        // Name order in, name order out
        for job in closure.jobs() {
            let level = levels[&nodes[job.name.as_str()]];
            if level >= columns.len() {
                columns.resize_with(level + 1, Vec::new);
            }
            columns[level].push(job);
            index.insert(job.name.as_str(), level);
        }

        Ok(Self { columns, index })
    }

    /// Column of a job, if it is part of the layering
    pub fn column_of(&self, job: &str) -> Option<usize> {
        self.index.get(job).copied()
    }

    pub fn get(&self, column: usize) -> Option<&[&'a Job]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Every column strictly before `column`, nearest first
    pub fn preceding(&self, column: usize) -> impl Iterator<Item = &[&'a Job]> + '_ {
        self.columns[..column.min(self.columns.len())]
            .iter()
            .rev()
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[&'a Job]> + '_ {
        self.columns.iter().map(Vec::as_slice)
    }

    /// Jobs in emission order: column by column, name order within a column
    pub fn jobs(&self) -> impl Iterator<Item = &'a Job> + '_ {
        self.columns.iter().flatten().copied()
    }

    /// Job names per column
    pub fn names(&self) -> Vec<Vec<String>> {
        self.columns
            .iter()
            .map(|column| column.iter().map(|job| job.name.clone()).collect())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
