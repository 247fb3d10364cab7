//! # Topological Scheduler
//!
//! Orders a validated, acyclic graph into a single linear execution
//! sequence using Kahn's algorithm.
//!
//! Tie-break: when several nodes have zero remaining in-degree, the one
//! declared earliest in the node list goes first. The order is therefore
//! stable and reproducible for identical input.

use crate::error::{CompileError, Result};
use crate::graph::{PipelineGraph, PipelineNode};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Produce a total order over the graph's nodes such that every connection
/// source precedes its target.
///
/// Must only be called on a graph that passed validation. If a cycle
/// survives anyway, that is an internal-consistency defect and comes back
/// as [`CompileError::Internal`].
pub fn schedule(graph: &PipelineGraph) -> Result<Vec<&PipelineNode>> {
    let index_of: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; graph.nodes.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
    for conn in &graph.connections {
        // Endpoints are guaranteed by validation; tolerate strays so the
        // scheduler stays usable in isolation.
        if let (Some(&from), Some(&to)) = (
            index_of.get(conn.source.as_str()),
            index_of.get(conn.target.as_str()),
        ) {
            successors[from].push(to);
            in_degree[to] += 1;
        }
    }

    // Min-heap over declaration indices implements the tie-break.
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut ordered = Vec::with_capacity(graph.nodes.len());
    while let Some(Reverse(i)) = ready.pop() {
        ordered.push(&graph.nodes[i]);
        for &next in &successors[i] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if ordered.len() < graph.nodes.len() {
        tracing::error!(
            scheduled = ordered.len(),
            total = graph.nodes.len(),
            "cycle survived validation"
        );
        return Err(CompileError::Internal(format!(
            "scheduler ordered {} of {} nodes; cycle survived validation",
            ordered.len(),
            graph.nodes.len()
        )));
    }

    Ok(ordered)
}
