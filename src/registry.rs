//! # Node Kind Registry
//!
//! Static metadata for the ten pipeline node kinds: input/output sockets,
//! required-socket flags, per-kind base symbols and the fixed import lines
//! each kind contributes to generated code.
//!
//! This table is the single source of truth consulted by validation
//! (required-socket coverage) and code generation (imports, variable
//! naming). It is never duplicated per consumer.

use crate::graph::NodeKind;

/// A named input socket and whether a pipeline must wire it.
#[derive(Debug, Clone, Copy)]
pub struct SocketSpec {
    pub name: &'static str,
    pub required: bool,
}

const fn required(name: &'static str) -> SocketSpec {
    SocketSpec { name, required: true }
}

const fn optional(name: &'static str) -> SocketSpec {
    SocketSpec { name, required: false }
}

/// Static metadata for one node kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    pub kind: NodeKind,
    /// Human label used in section comments of generated code.
    pub label: &'static str,
    pub inputs: &'static [SocketSpec],
    pub outputs: &'static [&'static str],
    /// Base name for generated-code symbols (`model`, `model2`, ...).
    pub symbol_base: &'static str,
    /// Import lines this kind contributes to the generated preamble.
    pub imports: &'static [&'static str],
}

static DATA_LOADER: KindSpec = KindSpec {
    kind: NodeKind::DataLoader,
    label: "Load Data",
    inputs: &[],
    outputs: &["data"],
    symbol_base: "data",
    imports: &["import pandas as pd", "import numpy as np"],
};

static DATA_SPLIT: KindSpec = KindSpec {
    kind: NodeKind::DataSplit,
    label: "Train/Test Split",
    inputs: &[required("data")],
    outputs: &["X_train", "y_train", "X_test", "y_test"],
    symbol_base: "split",
    imports: &["from sklearn.model_selection import train_test_split"],
};

static SCALER: KindSpec = KindSpec {
    kind: NodeKind::Scaler,
    label: "Feature Scaling",
    inputs: &[optional("X_train"), optional("X_test")],
    outputs: &["X_train", "X_test"],
    symbol_base: "scaler",
    imports: &["from sklearn.preprocessing import StandardScaler, MinMaxScaler"],
};

static FEATURE_SELECTION: KindSpec = KindSpec {
    kind: NodeKind::FeatureSelection,
    label: "Feature Selection",
    inputs: &[optional("X_train"), optional("y_train"), optional("X_test")],
    outputs: &["X_train", "X_test"],
    symbol_base: "selector",
    imports: &["from sklearn.feature_selection import SelectKBest, f_classif, f_regression"],
};

static CLASSIFIER: KindSpec = KindSpec {
    kind: NodeKind::Classifier,
    label: "Train Classifier",
    inputs: &[required("X_train"), optional("y_train")],
    outputs: &["model"],
    symbol_base: "model",
    imports: &[
        "from sklearn.linear_model import LogisticRegression",
        "from sklearn.ensemble import RandomForestClassifier",
        "from sklearn.tree import DecisionTreeClassifier",
        "from sklearn.svm import SVC",
        "from sklearn.neighbors import KNeighborsClassifier",
    ],
};

static REGRESSOR: KindSpec = KindSpec {
    kind: NodeKind::Regressor,
    label: "Train Regressor",
    inputs: &[required("X_train"), optional("y_train")],
    outputs: &["model"],
    symbol_base: "model",
    imports: &[
        "from sklearn.linear_model import LinearRegression, Ridge, Lasso",
        "from sklearn.ensemble import RandomForestRegressor, GradientBoostingRegressor",
        "from sklearn.svm import SVR",
    ],
};

static NEURAL_NET: KindSpec = KindSpec {
    kind: NodeKind::NeuralNet,
    label: "Train Neural Network",
    inputs: &[required("X_train"), optional("y_train")],
    outputs: &["model"],
    symbol_base: "model",
    imports: &["from sklearn.neural_network import MLPClassifier, MLPRegressor"],
};

static HYPERPARAM_TUNE: KindSpec = KindSpec {
    kind: NodeKind::HyperparamTune,
    label: "Hyperparameter Tuning",
    inputs: &[required("X_train"), optional("y_train")],
    outputs: &["model"],
    symbol_base: "search",
    imports: &[
        "from sklearn.model_selection import GridSearchCV",
        "from sklearn.ensemble import RandomForestClassifier",
        "from sklearn.ensemble import RandomForestRegressor, GradientBoostingRegressor",
    ],
};

static PREDICT: KindSpec = KindSpec {
    kind: NodeKind::Predict,
    label: "Predict",
    inputs: &[required("model"), required("X_test")],
    outputs: &["predictions"],
    symbol_base: "y_pred",
    imports: &[],
};

static EVALUATE: KindSpec = KindSpec {
    kind: NodeKind::Evaluate,
    label: "Evaluate Model",
    inputs: &[required("predictions"), required("y_test")],
    outputs: &[],
    symbol_base: "scores",
    imports: &["from sklearn.metrics import accuracy_score, classification_report, confusion_matrix"],
};

/// Look up the static spec for a node kind.
pub fn spec(kind: NodeKind) -> &'static KindSpec {
    match kind {
        NodeKind::DataLoader => &DATA_LOADER,
        NodeKind::DataSplit => &DATA_SPLIT,
        NodeKind::Scaler => &SCALER,
        NodeKind::FeatureSelection => &FEATURE_SELECTION,
        NodeKind::Classifier => &CLASSIFIER,
        NodeKind::Regressor => &REGRESSOR,
        NodeKind::NeuralNet => &NEURAL_NET,
        NodeKind::HyperparamTune => &HYPERPARAM_TUNE,
        NodeKind::Predict => &PREDICT,
        NodeKind::Evaluate => &EVALUATE,
    }
}

/// Required input sockets of a kind, in declaration order.
pub fn required_inputs(kind: NodeKind) -> impl Iterator<Item = &'static SocketSpec> {
    spec(kind).inputs.iter().filter(|s| s.required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_spec() {
        for kind in [
            NodeKind::DataLoader,
            NodeKind::DataSplit,
            NodeKind::Scaler,
            NodeKind::FeatureSelection,
            NodeKind::Classifier,
            NodeKind::Regressor,
            NodeKind::NeuralNet,
            NodeKind::HyperparamTune,
            NodeKind::Predict,
            NodeKind::Evaluate,
        ] {
            assert_eq!(spec(kind).kind, kind);
        }
    }

    #[test]
    fn predict_requires_model_and_test_data() {
        let required: Vec<_> = required_inputs(NodeKind::Predict).map(|s| s.name).collect();
        assert_eq!(required, vec!["model", "X_test"]);
    }

    #[test]
    fn evaluate_requires_predictions_and_labels() {
        let required: Vec<_> = required_inputs(NodeKind::Evaluate).map(|s| s.name).collect();
        assert_eq!(required, vec!["predictions", "y_test"]);
    }

    #[test]
    fn training_kinds_require_training_data_only() {
        for kind in [
            NodeKind::Classifier,
            NodeKind::Regressor,
            NodeKind::NeuralNet,
            NodeKind::HyperparamTune,
        ] {
            let required: Vec<_> = required_inputs(kind).map(|s| s.name).collect();
            assert_eq!(required, vec!["X_train"], "kind {kind}");
        }
    }

    #[test]
    fn data_loader_is_a_source() {
        assert!(spec(NodeKind::DataLoader).inputs.is_empty());
        assert_eq!(spec(NodeKind::DataLoader).outputs, &["data"]);
    }
}
