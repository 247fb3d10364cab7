//! # Graph Validator
//!
//! Structural validation of a pipeline graph before compilation.
//!
//! Rules run in priority order; the first failing category stops the pass
//! and its full set of violations is returned. Validation never panics on
//! user data - problems come back as an ordered list of human-readable
//! messages, and compilation simply does not proceed.

use crate::error::{CompileError, Result};
use crate::graph::{NodeKind, PipelineGraph};
use crate::registry;
use std::collections::{HashMap, HashSet};

/// Validate a graph, returning the violation list of the first failing rule
/// category. An empty list means the graph is structurally sound.
pub fn violations(graph: &PipelineGraph) -> Vec<String> {
    // Rule 1: a pipeline needs nodes and a data source.
    if graph.nodes.is_empty() {
        return vec!["pipeline is empty: add at least one node".to_string()];
    }
    if !graph.nodes.iter().any(|n| n.kind == NodeKind::DataLoader) {
        return vec![
            "pipeline has no data loader: every pipeline needs a data source node".to_string(),
        ];
    }

    // Rule 2: node ids must be unique.
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    for node in &graph.nodes {
        if !seen.insert(node.id.as_str()) {
            found.push(format!("duplicate node id `{}`", node.id));
        }
    }
    if !found.is_empty() {
        return found;
    }

    // Rule 2b: connections may only reference existing nodes.
    for conn in &graph.connections {
        if !seen.contains(conn.source.as_str()) {
            found.push(format!(
                "connection `{}` references missing source node `{}`",
                conn.id, conn.source
            ));
        }
        if !seen.contains(conn.target.as_str()) {
            found.push(format!(
                "connection `{}` references missing target node `{}`",
                conn.id, conn.target
            ));
        }
    }
    if !found.is_empty() {
        return found;
    }

    // Rule 3: every non-source node participates in at least one connection.
    let mut wired = HashSet::new();
    for conn in &graph.connections {
        wired.insert(conn.source.as_str());
        wired.insert(conn.target.as_str());
    }
    for node in &graph.nodes {
        if node.kind != NodeKind::DataLoader && !wired.contains(node.id.as_str()) {
            found.push(format!(
                "{} node `{}` is not connected to the pipeline",
                node.kind, node.id
            ));
        }
    }
    if !found.is_empty() {
        return found;
    }

    // Rule 4: required-socket coverage, and no input socket fed twice.
    let mut incoming: HashMap<(&str, &str), usize> = HashMap::new();
    for conn in &graph.connections {
        *incoming
            .entry((conn.target.as_str(), conn.target_input.as_str()))
            .or_default() += 1;
    }
    for node in &graph.nodes {
        for socket in registry::required_inputs(node.kind) {
            if !incoming.contains_key(&(node.id.as_str(), socket.name)) {
                found.push(format!(
                    "{} node `{}` is missing a connection on required input `{}`",
                    node.kind, node.id, socket.name
                ));
            }
        }
        for socket in registry::spec(node.kind).inputs {
            if incoming
                .get(&(node.id.as_str(), socket.name))
                .is_some_and(|&n| n > 1)
            {
                found.push(format!(
                    "input `{}` of {} node `{}` has multiple incoming connections",
                    socket.name, node.kind, node.id
                ));
            }
        }
    }
    if !found.is_empty() {
        return found;
    }

    // Rule 5: no directed cycles.
    cycle_violations(graph)
}

/// Validate a graph, surfacing violations as a [`CompileError::Validation`].
pub fn validate(graph: &PipelineGraph) -> Result<()> {
    let found = violations(graph);
    if found.is_empty() {
        Ok(())
    } else {
        Err(CompileError::Validation { violations: found })
    }
}

/// Depth-first cycle detection with an explicit recursion stack. A back-edge
/// into a node currently on the stack is reported as a cycle violation.
fn cycle_violations(graph: &PipelineGraph) -> Vec<String> {
    let index_of: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
    for conn in &graph.connections {
        if let (Some(&from), Some(&to)) = (
            index_of.get(conn.source.as_str()),
            index_of.get(conn.target.as_str()),
        ) {
            successors[from].push(to);
        }
    }

    let mut found = Vec::new();
    let mut visited = vec![false; graph.nodes.len()];
    let mut on_stack = vec![false; graph.nodes.len()];

    fn visit(
        node: usize,
        successors: &[Vec<usize>],
        visited: &mut [bool],
        on_stack: &mut [bool],
        graph: &PipelineGraph,
        found: &mut Vec<String>,
    ) {
        visited[node] = true;
        on_stack[node] = true;
        for &next in &successors[node] {
            if on_stack[next] {
                found.push(format!(
                    "cycle detected involving node `{}`",
                    graph.nodes[next].id
                ));
            } else if !visited[next] {
                visit(next, successors, visited, on_stack, graph, found);
            }
        }
        on_stack[node] = false;
    }

    for i in 0..graph.nodes.len() {
        if !visited[i] {
            visit(i, &successors, &mut visited, &mut on_stack, graph, &mut found);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Connection, PipelineNode};

    fn node(id: &str, kind: NodeKind) -> PipelineNode {
        PipelineNode::new(id, kind)
    }

    fn conn(id: &str, source: &str, output: &str, target: &str, input: &str) -> Connection {
        Connection::new(id, source, output, target, input)
    }

    fn linear_chain() -> PipelineGraph {
        let mut graph = PipelineGraph::new("chain");
        graph.nodes = vec![
            node("load", NodeKind::DataLoader),
            node("split", NodeKind::DataSplit),
            node("clf", NodeKind::Classifier),
            node("pred", NodeKind::Predict),
            node("eval", NodeKind::Evaluate),
        ];
        graph.connections = vec![
            conn("c1", "load", "data", "split", "data"),
            conn("c2", "split", "X_train", "clf", "X_train"),
            conn("c3", "split", "y_train", "clf", "y_train"),
            conn("c4", "clf", "model", "pred", "model"),
            conn("c5", "split", "X_test", "pred", "X_test"),
            conn("c6", "pred", "predictions", "eval", "predictions"),
            conn("c7", "split", "y_test", "eval", "y_test"),
        ];
        graph
    }

    #[test]
    fn valid_chain_passes() {
        assert!(validate(&linear_chain()).is_ok());
    }

    #[test]
    fn empty_graph_is_rejected() {
        let found = violations(&PipelineGraph::new("empty"));
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("empty"));
    }

    #[test]
    fn missing_data_loader_is_the_only_violation_reported() {
        let mut graph = PipelineGraph::new("no-loader");
        graph.nodes = vec![node("clf", NodeKind::Classifier)];
        let found = violations(&graph);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("data loader"), "{}", found[0]);
    }

    #[test]
    fn duplicate_node_ids_are_rejected() {
        let mut graph = linear_chain();
        graph.nodes.push(node("clf", NodeKind::Classifier));
        let found = violations(&graph);
        assert!(found.iter().any(|v| v.contains("duplicate node id `clf`")));
    }

    #[test]
    fn dangling_connection_is_rejected() {
        let mut graph = linear_chain();
        graph
            .connections
            .push(conn("c8", "ghost", "data", "split", "data"));
        let found = violations(&graph);
        assert!(found.iter().any(|v| v.contains("missing source node `ghost`")));
    }

    #[test]
    fn disconnected_node_is_rejected() {
        let mut graph = linear_chain();
        graph.nodes.push(node("lonely", NodeKind::Scaler));
        let found = violations(&graph);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("`lonely`"));
        assert!(found[0].contains("not connected"));
    }

    #[test]
    fn classifier_without_inputs_names_the_node() {
        let mut graph = PipelineGraph::new("t");
        graph.nodes = vec![
            node("load", NodeKind::DataLoader),
            node("split", NodeKind::DataSplit),
            node("clf", NodeKind::Classifier),
        ];
        // The classifier participates in no connection at all.
        graph.connections = vec![conn("c1", "load", "data", "split", "data")];
        let found = violations(&graph);
        assert!(found.iter().any(|v| v.contains("`clf`")));
    }

    #[test]
    fn missing_required_socket_is_reported_per_socket() {
        let mut graph = PipelineGraph::new("t");
        graph.nodes = vec![
            node("load", NodeKind::DataLoader),
            node("split", NodeKind::DataSplit),
            node("clf", NodeKind::Classifier),
            node("pred", NodeKind::Predict),
        ];
        graph.connections = vec![
            conn("c1", "load", "data", "split", "data"),
            conn("c2", "split", "X_train", "clf", "X_train"),
            // predict is wired only to the model; X_test is missing.
            conn("c3", "clf", "model", "pred", "model"),
        ];
        let found = violations(&graph);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("predict node `pred`"));
        assert!(found[0].contains("`X_test`"));
    }

    #[test]
    fn duplicate_input_socket_connection_fails_loudly() {
        let mut graph = linear_chain();
        graph
            .connections
            .push(conn("c8", "load", "data", "split", "data"));
        let found = violations(&graph);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("multiple incoming connections"), "{}", found[0]);
    }

    #[test]
    fn cycle_is_detected() {
        let mut graph = linear_chain();
        // clf -> pred -> eval -> clf becomes a directed cycle; rewire clf's
        // y_train input so the earlier rule categories stay quiet.
        graph.connections.retain(|c| c.id != "c3");
        graph
            .connections
            .push(conn("c9", "eval", "scores", "clf", "y_train"));
        let found = violations(&graph);
        assert_eq!(found.len(), 1, "{found:?}");
        assert!(found[0].contains("cycle detected"), "{}", found[0]);
    }
}
