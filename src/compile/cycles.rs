//! Cycle participant extraction shared by job and group ordering

use crate::error::{CycleError, CycleKind};
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;

/// Collect every node that sits on a cycle of `graph`
///
/// Nodes downstream of a cycle are not reported, only the strongly
/// connected components with more than one node and self loops.
pub(crate) fn cycle_error(kind: CycleKind, graph: &DiGraph<&str, ()>) -> CycleError {
    let members = tarjan_scc(graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.find_edge(component[0], component[0]).is_some()
        })
        .flatten()
        .map(|index| graph[index].to_string())
        .collect();

    CycleError::new(kind, members)
}
