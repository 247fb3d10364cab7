//! # Variable-Name Allocator
//!
//! Assigns each scheduled node a short, deterministic symbol for use in
//! generated code: the kind's base name for the first occurrence, then
//! `base2`, `base3`, ... for repeats. The numeric suffix is kept separately
//! so multi-output nodes can suffix their output variables the same way
//! (`X_train`, `X_train2`, ...).

use crate::graph::PipelineNode;
use crate::registry;
use std::collections::HashMap;

/// Node-id to symbol map for one compilation.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, String>,
    suffixes: HashMap<String, String>,
}

impl SymbolTable {
    /// The symbol assigned to a node.
    pub fn symbol(&self, node_id: &str) -> Option<&str> {
        self.symbols.get(node_id).map(String::as_str)
    }

    /// The numeric suffix of a node's symbol; empty for the first occurrence
    /// of a base name.
    pub fn suffix(&self, node_id: &str) -> &str {
        self.suffixes.get(node_id).map(String::as_str).unwrap_or("")
    }
}

/// Assign symbols over the scheduled node order.
pub fn assign(ordered: &[&PipelineNode]) -> SymbolTable {
    let mut table = SymbolTable::default();
    let mut counts: HashMap<&'static str, usize> = HashMap::new();

    for node in ordered {
        let base = registry::spec(node.kind).symbol_base;
        let count = counts.entry(base).or_insert(0);
        *count += 1;
        let suffix = if *count == 1 {
            String::new()
        } else {
            count.to_string()
        };
        table
            .symbols
            .insert(node.id.clone(), format!("{base}{suffix}"));
        table.suffixes.insert(node.id.clone(), suffix);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    #[test]
    fn first_occurrence_has_no_suffix() {
        let load = PipelineNode::new("n1", NodeKind::DataLoader);
        let clf = PipelineNode::new("n2", NodeKind::Classifier);
        let table = assign(&[&load, &clf]);
        assert_eq!(table.symbol("n1"), Some("data"));
        assert_eq!(table.symbol("n2"), Some("model"));
        assert_eq!(table.suffix("n2"), "");
    }

    #[test]
    fn repeats_are_numbered_from_two() {
        let a = PipelineNode::new("a", NodeKind::Classifier);
        let b = PipelineNode::new("b", NodeKind::Classifier);
        let c = PipelineNode::new("c", NodeKind::Classifier);
        let table = assign(&[&a, &b, &c]);
        assert_eq!(table.symbol("a"), Some("model"));
        assert_eq!(table.symbol("b"), Some("model2"));
        assert_eq!(table.symbol("c"), Some("model3"));
        assert_eq!(table.suffix("c"), "3");
    }

    #[test]
    fn kinds_sharing_a_base_stay_unique() {
        // classifier, regressor and neuralNet all use the `model` base.
        let clf = PipelineNode::new("clf", NodeKind::Classifier);
        let reg = PipelineNode::new("reg", NodeKind::Regressor);
        let nn = PipelineNode::new("nn", NodeKind::NeuralNet);
        let table = assign(&[&clf, &reg, &nn]);
        let mut symbols = vec![
            table.symbol("clf").unwrap(),
            table.symbol("reg").unwrap(),
            table.symbol("nn").unwrap(),
        ];
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), 3);
    }
}
