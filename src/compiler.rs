//! # Pipeline Compiler
//!
//! Main entry points for compiling ML pipeline graphs to Python code.
//!
//! Compilation is a pure function of its explicit inputs (the graph
//! snapshot and an optional uploaded-file store): validate, index, order,
//! name, emit, assemble. The returned body text is deterministic -
//! timestamps only exist in the script/notebook wrappers in
//! [`crate::export`].

use crate::codegen::{emit_node, render_fragment, EmitContext, Fragment};
use crate::error::Result;
use crate::graph::{ConnectionIndex, PipelineGraph, PipelineNode};
use crate::registry;
use crate::schedule;
use crate::store::{EmptyStore, FileStore};
use crate::symbols;
use crate::validate;
use std::collections::HashSet;

/// Compile a pipeline graph to Python source code.
///
/// This is the main entry point for the pipeline compiler. It takes a
/// visual node graph and generates an equivalent sequential Python script
/// body: an import preamble followed by one commented code section per
/// node, in dependency order.
///
/// # Arguments
///
/// * `graph` - The pipeline graph to compile
///
/// # Returns
///
/// * `Ok(String)` - The generated Python source code
/// * `Err(CompileError)` - A descriptive error if validation or compilation fails
///
/// # Examples
///
/// ```rust,no_run
/// use mpgc::{compile_graph, PipelineGraph};
///
/// let graph = PipelineGraph::new("my_pipeline");
/// // ... build graph with nodes and connections
///
/// match compile_graph(&graph) {
///     Ok(code) => println!("Generated:\n{}", code),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn compile_graph(graph: &PipelineGraph) -> Result<String> {
    compile_graph_with_files(graph, &EmptyStore)
}

/// Compile a pipeline graph with access to uploaded CSV content.
///
/// When the store holds content for a data loader's configured file name,
/// the generated loader embeds that content (base64) so the script runs
/// without external files. Lookup misses fall back to a plain
/// read-from-path statement.
///
/// # Arguments
///
/// * `graph` - The pipeline graph to compile
/// * `files` - Read-only lookup for uploaded file content
pub fn compile_graph_with_files(graph: &PipelineGraph, files: &dyn FileStore) -> Result<String> {
    tracing::info!("[MPGC] Starting pipeline compilation");
    tracing::info!(
        "[MPGC] Graph: {} ({} nodes, {} connections)",
        graph.name,
        graph.nodes.len(),
        graph.connections.len()
    );

    // Phase 1: structural validation. Compilation never proceeds past a
    // failed validation.
    tracing::info!("[MPGC] Phase 1: Validating graph structure...");
    validate::validate(graph)?;

    // Phase 2: build the connection index once; read-only from here on.
    tracing::info!("[MPGC] Phase 2: Indexing connections...");
    let index = ConnectionIndex::build(graph);

    // Phase 3: topological order.
    tracing::info!("[MPGC] Phase 3: Scheduling nodes...");
    let ordered = schedule::schedule(graph)?;
    tracing::info!("[MPGC]   - {} nodes in execution order", ordered.len());

    // Phase 4: variable names.
    tracing::info!("[MPGC] Phase 4: Allocating variable names...");
    let table = symbols::assign(&ordered);

    // Phase 5: per-node emission.
    tracing::info!("[MPGC] Phase 5: Generating Python code...");
    let ctx = EmitContext {
        graph,
        index: &index,
        symbols: &table,
        files,
    };
    let fragments: Vec<Fragment> = ordered.iter().map(|node| emit_node(node, &ctx)).collect();

    // Phase 6: import preamble + fragments.
    let code = assemble(&ordered, &fragments);
    tracing::info!("[MPGC] Compilation complete ({} bytes)", code.len());
    Ok(code)
}

/// Collect the fixed import lines contributed by the participating kinds,
/// deduplicated and sorted.
fn collect_imports(nodes: &[&PipelineNode]) -> Vec<&'static str> {
    let mut seen: HashSet<&'static str> = HashSet::new();
    for node in nodes {
        for import in registry::spec(node.kind).imports {
            seen.insert(import);
        }
    }
    let mut lines: Vec<&'static str> = seen.into_iter().collect();
    lines.sort_unstable();
    lines
}

fn assemble(nodes: &[&PipelineNode], fragments: &[Fragment]) -> String {
    let mut code = String::new();
    for line in collect_imports(nodes) {
        code.push_str(line);
        code.push('\n');
    }
    for fragment in fragments {
        code.push('\n');
        code.push_str(&render_fragment(fragment));
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::graph::{Connection, NodeKind};

    fn chain_graph() -> PipelineGraph {
        let mut graph = PipelineGraph::new("chain");
        graph.nodes = vec![
            PipelineNode::new("load", NodeKind::DataLoader),
            PipelineNode::new("split", NodeKind::DataSplit),
            PipelineNode::new("clf", NodeKind::Classifier),
            PipelineNode::new("pred", NodeKind::Predict),
            PipelineNode::new("eval", NodeKind::Evaluate),
        ];
        graph.connections = vec![
            Connection::new("c1", "load", "data", "split", "data"),
            Connection::new("c2", "split", "X_train", "clf", "X_train"),
            Connection::new("c3", "split", "y_train", "clf", "y_train"),
            Connection::new("c4", "clf", "model", "pred", "model"),
            Connection::new("c5", "split", "X_test", "pred", "X_test"),
            Connection::new("c6", "pred", "predictions", "eval", "predictions"),
            Connection::new("c7", "split", "y_test", "eval", "y_test"),
        ];
        graph
    }

    #[test]
    fn compiling_twice_is_byte_identical() {
        let graph = chain_graph();
        let first = compile_graph(&graph).unwrap();
        let second = compile_graph(&graph).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn imports_are_deduplicated_and_sorted() {
        let mut graph = chain_graph();
        // A second classifier adds no new import lines.
        graph.nodes.push(PipelineNode::new("clf2", NodeKind::Classifier));
        graph
            .connections
            .push(Connection::new("c8", "split", "X_train", "clf2", "X_train"));
        graph
            .connections
            .push(Connection::new("c9", "split", "y_train", "clf2", "y_train"));

        let code = compile_graph(&graph).unwrap();
        let preamble: Vec<&str> = code
            .lines()
            .take_while(|l| !l.is_empty())
            .collect();
        let occurrences = preamble
            .iter()
            .filter(|&&l| l == "from sklearn.linear_model import LogisticRegression")
            .count();
        assert_eq!(occurrences, 1);
        let mut sorted = preamble.clone();
        sorted.sort_unstable();
        assert_eq!(preamble, sorted);
    }

    #[test]
    fn invalid_graph_produces_no_output() {
        let mut graph = chain_graph();
        graph.connections.retain(|c| c.id != "c5");
        let err = compile_graph(&graph).unwrap_err();
        match err {
            CompileError::Validation { violations } => {
                assert!(violations.iter().any(|v| v.contains("`pred`")));
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn fragments_appear_in_dependency_order() {
        let code = compile_graph(&chain_graph()).unwrap();
        let load = code.find("# Load Data").unwrap();
        let split = code.find("# Train/Test Split").unwrap();
        let train = code.find("# Train Classifier").unwrap();
        let predict = code.find("# Predict").unwrap();
        let evaluate = code.find("# Evaluate Model").unwrap();
        assert!(load < split && split < train && train < predict && predict < evaluate);
    }
}
