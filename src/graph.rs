//! # Pipeline Graph Model
//!
//! Plain-data representation of a visual ML pipeline: nodes, connections and
//! the lookup index built from them.
//!
//! The editor (or an external graph generator) hands the compiler a finished
//! [`PipelineGraph`] snapshot. The compiler never mutates it; everything
//! derived from it ([`ConnectionIndex`], schedules, symbol tables) is built
//! once per compilation and consumed read-only.

use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The fixed, closed set of pipeline node kinds.
///
/// Unknown kinds are rejected at the JSON import boundary
/// ([`PipelineGraph::from_json`]); past that point every `match` on
/// `NodeKind` is exhaustive and no runtime unknown-kind branch exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    DataLoader,
    DataSplit,
    Scaler,
    FeatureSelection,
    Classifier,
    Regressor,
    NeuralNet,
    HyperparamTune,
    Predict,
    Evaluate,
}

impl NodeKind {
    /// Wire name used by the editor JSON (camelCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::DataLoader => "dataLoader",
            NodeKind::DataSplit => "dataSplit",
            NodeKind::Scaler => "scaler",
            NodeKind::FeatureSelection => "featureSelection",
            NodeKind::Classifier => "classifier",
            NodeKind::Regressor => "regressor",
            NodeKind::NeuralNet => "neuralNet",
            NodeKind::HyperparamTune => "hyperparamTune",
            NodeKind::Predict => "predict",
            NodeKind::Evaluate => "evaluate",
        }
    }

    /// Kinds that fit a model against training data.
    pub fn is_model_training(&self) -> bool {
        matches!(
            self,
            NodeKind::Classifier
                | NodeKind::Regressor
                | NodeKind::NeuralNet
                | NodeKind::HyperparamTune
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "dataLoader" => NodeKind::DataLoader,
            "dataSplit" => NodeKind::DataSplit,
            "scaler" => NodeKind::Scaler,
            "featureSelection" => NodeKind::FeatureSelection,
            "classifier" => NodeKind::Classifier,
            "regressor" => NodeKind::Regressor,
            "neuralNet" => NodeKind::NeuralNet,
            "hyperparamTune" => NodeKind::HyperparamTune,
            "predict" => NodeKind::Predict,
            "evaluate" => NodeKind::Evaluate,
            other => return Err(CompileError::UnknownKind(other.to_string())),
        })
    }
}

/// 2D canvas position. Irrelevant to compilation, retained so a graph
/// round-trips through the compiler unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One node of the pipeline graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineNode {
    /// Opaque unique id assigned by the editor.
    pub id: String,
    pub kind: NodeKind,
    /// Control/setting values (file name, split ratio, algorithm, ...).
    #[serde(default)]
    pub settings: HashMap<String, Value>,
    #[serde(default)]
    pub position: Position,
}

impl PipelineNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            settings: HashMap::new(),
            position: Position::default(),
        }
    }

    /// Builder-style setting assignment, mostly for tests and examples.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(Value::as_str)
    }

    pub fn setting_f64(&self, key: &str) -> Option<f64> {
        self.settings.get(key).and_then(Value::as_f64)
    }

    pub fn setting_u64(&self, key: &str) -> Option<u64> {
        self.settings.get(key).and_then(Value::as_u64)
    }
}

/// Directed edge wiring one node's output socket to another node's input
/// socket. Connections carry no data, only wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Output socket name on the source node.
    pub source_output: String,
    /// Target node id.
    pub target: String,
    /// Input socket name on the target node.
    pub target_input: String,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        source_output: impl Into<String>,
        target: impl Into<String>,
        target_input: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_output: source_output.into(),
            target: target.into(),
            target_input: target_input.into(),
        }
    }
}

/// An immutable snapshot of the user-assembled pipeline.
///
/// The node list order is significant: the scheduler breaks ties in
/// declaration order, so identical input yields identical output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineGraph {
    /// Pipeline name, used in generated script/notebook headers.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<PipelineNode>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl PipelineGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&PipelineNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Parse a graph from editor JSON.
    ///
    /// This is the import boundary: a node whose `kind` is outside the fixed
    /// vocabulary fails the whole import with [`CompileError::UnknownKind`]
    /// rather than being silently dropped, so the compiled output can never
    /// diverge from what the user sees on canvas.
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct RawNode {
            id: String,
            kind: String,
            #[serde(default)]
            settings: HashMap<String, Value>,
            #[serde(default)]
            position: Position,
        }

        #[derive(Deserialize)]
        struct RawGraph {
            #[serde(default)]
            name: String,
            #[serde(default)]
            nodes: Vec<RawNode>,
            #[serde(default)]
            connections: Vec<Connection>,
        }

        let raw: RawGraph = serde_json::from_str(json)?;
        let mut nodes = Vec::with_capacity(raw.nodes.len());
        for n in raw.nodes {
            nodes.push(PipelineNode {
                kind: n.kind.parse()?,
                id: n.id,
                settings: n.settings,
                position: n.position,
            });
        }

        Ok(Self {
            name: raw.name,
            nodes,
            connections: raw.connections,
        })
    }
}

/// Lookup from (target node id, input socket name) to the feeding
/// connection.
///
/// Built once per compilation and consumed read-only by validation and
/// emission, replacing repeated scans of the connection list. Duplicate
/// edges into the same input socket are rejected by the validator before
/// this index is consulted; if built anyway, the first declared connection
/// wins.
pub struct ConnectionIndex<'a> {
    by_target: HashMap<(&'a str, &'a str), &'a Connection>,
}

impl<'a> ConnectionIndex<'a> {
    pub fn build(graph: &'a PipelineGraph) -> Self {
        let mut by_target: HashMap<(&str, &str), &Connection> = HashMap::new();
        for conn in &graph.connections {
            by_target
                .entry((conn.target.as_str(), conn.target_input.as_str()))
                .or_insert(conn);
        }
        Self { by_target }
    }

    /// The connection feeding `input` on `node`, if any.
    pub fn incoming(&self, node: &str, input: &str) -> Option<&'a Connection> {
        self.by_target.get(&(node, input)).copied()
    }

    pub fn has_incoming(&self, node: &str, input: &str) -> bool {
        self.by_target.contains_key(&(node, input))
    }
}
