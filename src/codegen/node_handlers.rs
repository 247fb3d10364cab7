//! # Node-Specific Handlers
//!
//! Per-kind code emission. Each handler reads its upstream variables
//! through the connection index (never by guessing names) and produces a
//! [`Fragment`] of statement IR with at least one explanatory print.
//!
//! A handler never fails: when an input is unresolved it degrades to a
//! `# WARNING:` stub with `None` sentinels so the generated artifact stays
//! syntactically valid even for incomplete graphs. Validation normally
//! rejects such graphs first; the stubs are the emitter's second line of
//! defense, reachable only when validation is bypassed.

use crate::graph::{ConnectionIndex, NodeKind, PipelineGraph, PipelineNode};
use crate::registry;
use crate::store::FileStore;
use crate::symbols::SymbolTable;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use super::ir::Fragment;

/// Everything a handler needs to resolve its inputs.
pub struct EmitContext<'a> {
    pub graph: &'a PipelineGraph,
    pub index: &'a ConnectionIndex<'a>,
    pub symbols: &'a SymbolTable,
    pub files: &'a dyn FileStore,
}

impl<'a> EmitContext<'a> {
    /// Symbol assigned to a node, falling back to the kind's base name.
    fn symbol(&self, node: &PipelineNode) -> String {
        self.symbols
            .symbol(&node.id)
            .map(str::to_string)
            .unwrap_or_else(|| registry::spec(node.kind).symbol_base.to_string())
    }

    /// Variable name feeding `input` on `node`, resolved through the
    /// connection index.
    fn resolve_input(&self, node: &PipelineNode, input: &str) -> Option<String> {
        let conn = self.index.incoming(&node.id, input)?;
        let source = self.graph.node(&conn.source)?;
        tracing::debug!(
            node = %node.id,
            input,
            source = %source.id,
            output = %conn.source_output,
            "resolved input"
        );
        Some(self.output_variable(source, &conn.source_output))
    }

    /// Variable name under which `node` publishes `socket` in the
    /// generated code.
    fn output_variable(&self, node: &PipelineNode, socket: &str) -> String {
        let suffix = self.symbols.suffix(&node.id);
        match node.kind {
            NodeKind::DataLoader
            | NodeKind::Classifier
            | NodeKind::Regressor
            | NodeKind::NeuralNet
            | NodeKind::HyperparamTune
            | NodeKind::Predict
            | NodeKind::Evaluate => self.symbol(node),
            NodeKind::DataSplit => format!("{socket}{suffix}"),
            // Pass-through kinds overwrite the upstream variable, so their
            // output name is whatever fed the same-named input.
            NodeKind::Scaler | NodeKind::FeatureSelection => self
                .resolve_input(node, socket)
                .unwrap_or_else(|| format!("{socket}{suffix}")),
        }
    }
}

/// Emit the code fragment for one node.
pub fn emit_node(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    match node.kind {
        NodeKind::DataLoader => emit_data_loader(node, ctx),
        NodeKind::DataSplit => emit_data_split(node, ctx),
        NodeKind::Scaler => emit_scaler(node, ctx),
        NodeKind::FeatureSelection => emit_feature_selection(node, ctx),
        NodeKind::Classifier => emit_classifier(node, ctx),
        NodeKind::Regressor => emit_regressor(node, ctx),
        NodeKind::NeuralNet => emit_neural_net(node, ctx),
        NodeKind::HyperparamTune => emit_hyperparam_tune(node, ctx),
        NodeKind::Predict => emit_predict(node, ctx),
        NodeKind::Evaluate => emit_evaluate(node, ctx),
    }
}

fn emit_data_loader(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let file = node.setting_str("fileName").unwrap_or("data.csv").to_string();
    let sym = ctx.symbol(node);
    let suffix = ctx.symbols.suffix(&node.id);
    let mut frag = Fragment::new(&node.id, node.kind, format!("Load Data: {file}"));

    if let Some(content) = ctx.files.content(&file) {
        // Embed the uploaded content so the script runs without the file.
        let csv_var = format!("csv_content{suffix}");
        frag.raw("import io");
        frag.raw("import base64");
        frag.blank();
        frag.comment("Embedded CSV data (uploaded from browser)");
        frag.assign(
            &csv_var,
            format!("base64.b64decode('{}').decode('utf-8')", BASE64.encode(content)),
        );
        frag.assign(&sym, format!("pd.read_csv(io.StringIO({csv_var}))"));
    } else {
        frag.assign(&sym, format!("pd.read_csv('{file}')"));
    }

    frag.blank();
    frag.comment("Normalize column names (strip whitespace, units, separators)");
    frag.assign(format!("{sym}.columns"), format!("{sym}.columns.str.strip()"));
    frag.assign(
        format!("{sym}.columns"),
        format!(
            "[col.split('(')[0].strip().replace('#', '').replace(' ', '_').lower() for col in {sym}.columns]"
        ),
    );
    frag.print(format!("Data loaded from {file}: {{{sym}.shape}}"));
    frag.print(format!("Columns: {{{sym}.columns.tolist()}}"));
    frag.raw(format!("print({sym}.head())"));
    frag
}

fn emit_data_split(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let target = node.setting_str("targetColumn").unwrap_or("target").to_string();
    let test_size = node.setting_f64("testSize").unwrap_or(0.2);
    let seed = node.setting_u64("randomState").unwrap_or(42);
    let suffix = ctx.symbols.suffix(&node.id);
    let mut frag = Fragment::new(&node.id, node.kind, "Train/Test Split");

    let x_train = format!("X_train{suffix}");
    let x_test = format!("X_test{suffix}");
    let y_train = format!("y_train{suffix}");
    let y_test = format!("y_test{suffix}");

    let Some(data) = ctx.resolve_input(node, "data") else {
        frag.comment(format!(
            "WARNING: data split node `{}` has no incoming data connection",
            node.id
        ));
        frag.assign_many(
            &[&x_train, &x_test, &y_train, &y_test],
            "(None, None, None, None)",
        );
        return frag;
    };

    let x = format!("X{suffix}");
    let y = format!("y{suffix}");
    frag.comment(format!("Target variable: '{target}'"));
    frag.assign(&x, format!("{data}.drop('{target}', axis=1)"));
    frag.assign(&y, format!("{data}['{target}']"));
    frag.assign_many(
        &[&x_train, &x_test, &y_train, &y_test],
        format!("train_test_split(\n    {x}, {y}, test_size={test_size}, random_state={seed}\n)"),
    );
    frag.print(format!(
        "Training samples: {{len({x_train})}}, test samples: {{len({x_test})}}"
    ));
    frag
}

fn emit_scaler(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let class = match node.setting_str("method") {
        Some("minmax") | Some("min_max") => "MinMaxScaler",
        _ => "StandardScaler",
    };
    let sym = ctx.symbol(node);
    let mut frag = Fragment::new(&node.id, node.kind, format!("Feature Scaling ({class})"));

    let Some(x_train) = ctx.resolve_input(node, "X_train") else {
        frag.comment(format!(
            "WARNING: scaler node `{}` has no incoming training data; nothing to scale",
            node.id
        ));
        return frag;
    };

    frag.assign(&sym, format!("{class}()"));
    frag.assign(&x_train, format!("{sym}.fit_transform({x_train})"));
    if let Some(x_test) = ctx.resolve_input(node, "X_test") {
        frag.assign(&x_test, format!("{sym}.transform({x_test})"));
    }
    frag.print(format!(
        "Features scaled with {class}: {{{x_train}.shape[1]}} columns"
    ));
    frag
}

fn emit_feature_selection(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let k = node.setting_u64("k").unwrap_or(10);
    let score = match node.setting_str("scoreFunc") {
        Some("f_regression") => "f_regression",
        _ => "f_classif",
    };
    let sym = ctx.symbol(node);
    let mut frag = Fragment::new(&node.id, node.kind, "Feature Selection (SelectKBest)");

    let (Some(x_train), Some(y_train)) = (
        ctx.resolve_input(node, "X_train"),
        ctx.resolve_input(node, "y_train"),
    ) else {
        frag.comment(format!(
            "WARNING: feature selection node `{}` is missing training data or labels",
            node.id
        ));
        return frag;
    };

    frag.assign(&sym, format!("SelectKBest({score}, k={k})"));
    frag.assign(&x_train, format!("{sym}.fit_transform({x_train}, {y_train})"));
    if let Some(x_test) = ctx.resolve_input(node, "X_test") {
        frag.assign(&x_test, format!("{sym}.transform({x_test})"));
    }
    frag.print(format!("Selected top {k} features"));
    frag
}

/// Classifier constructors, dispatched on the `algorithm` setting.
fn classifier_ctor(algorithm: Option<&str>) -> (&'static str, &'static str) {
    match algorithm {
        Some("random_forest") => (
            "RandomForestClassifier",
            "RandomForestClassifier(n_estimators=100, random_state=42)",
        ),
        Some("decision_tree") => ("DecisionTreeClassifier", "DecisionTreeClassifier(random_state=42)"),
        Some("svm") => ("SVC", "SVC(probability=True, random_state=42)"),
        Some("knn") => ("KNeighborsClassifier", "KNeighborsClassifier()"),
        // Sane default when unspecified or unrecognized.
        _ => ("LogisticRegression", "LogisticRegression(max_iter=1000)"),
    }
}

fn regressor_ctor(algorithm: Option<&str>) -> (&'static str, &'static str) {
    match algorithm {
        Some("ridge") => ("Ridge", "Ridge(alpha=1.0)"),
        Some("lasso") => ("Lasso", "Lasso(alpha=0.1)"),
        Some("random_forest") => (
            "RandomForestRegressor",
            "RandomForestRegressor(n_estimators=100, random_state=42)",
        ),
        Some("gradient_boosting") => (
            "GradientBoostingRegressor",
            "GradientBoostingRegressor(random_state=42)",
        ),
        Some("svr") => ("SVR", "SVR()"),
        _ => ("LinearRegression", "LinearRegression()"),
    }
}

/// Shared construct-and-fit emission for the model-training kinds. Returns
/// the resolved training variables, or `None` after emitting the stub.
fn emit_fit(
    frag: &mut Fragment,
    node: &PipelineNode,
    ctx: &EmitContext,
    sym: &str,
    ctor: &str,
) -> Option<(String, String)> {
    let (Some(x_train), Some(y_train)) = (
        ctx.resolve_input(node, "X_train"),
        ctx.resolve_input(node, "y_train"),
    ) else {
        frag.comment(format!(
            "WARNING: {} node `{}` is missing training data or labels",
            node.kind, node.id
        ));
        frag.assign(sym, "None");
        return None;
    };

    frag.assign(sym, ctor);
    frag.raw(format!("{sym}.fit({x_train}, {y_train})"));
    Some((x_train, y_train))
}

fn emit_classifier(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let (name, ctor) = classifier_ctor(node.setting_str("algorithm"));
    let sym = ctx.symbol(node);
    let mut frag = Fragment::new(&node.id, node.kind, format!("Train Classifier ({name})"));
    if let Some((x_train, y_train)) = emit_fit(&mut frag, node, ctx, &sym, ctor) {
        frag.print(format!("Model trained: {name}"));
        frag.print(format!(
            "Training accuracy: {{{sym}.score({x_train}, {y_train}):.4f}}"
        ));
    }
    frag
}

fn emit_regressor(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let (name, ctor) = regressor_ctor(node.setting_str("algorithm"));
    let sym = ctx.symbol(node);
    let mut frag = Fragment::new(&node.id, node.kind, format!("Train Regressor ({name})"));
    if let Some((x_train, y_train)) = emit_fit(&mut frag, node, ctx, &sym, ctor) {
        frag.print(format!("Model trained: {name}"));
        frag.print(format!(
            "Training R² score: {{{sym}.score({x_train}, {y_train}):.4f}}"
        ));
    }
    frag
}

/// `hiddenLayerSizes` setting ("100,50" or a bare number) as a Python tuple.
fn hidden_layer_tuple(node: &PipelineNode) -> String {
    if let Some(raw) = node.setting_str("hiddenLayerSizes") {
        let sizes: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if !sizes.is_empty() {
            return if sizes.len() == 1 {
                format!("({},)", sizes[0])
            } else {
                format!("({})", sizes.join(", "))
            };
        }
    }
    if let Some(n) = node.setting_u64("hiddenLayerSizes") {
        return format!("({n},)");
    }
    "(100,)".to_string()
}

fn emit_neural_net(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let class = match node.setting_str("task") {
        Some("regression") => "MLPRegressor",
        _ => "MLPClassifier",
    };
    let hidden = hidden_layer_tuple(node);
    let max_iter = node.setting_u64("maxIter").unwrap_or(500);
    let sym = ctx.symbol(node);
    let mut frag = Fragment::new(&node.id, node.kind, format!("Train Neural Network ({class})"));
    let ctor =
        format!("{class}(hidden_layer_sizes={hidden}, max_iter={max_iter}, random_state=42)");
    if let Some((x_train, y_train)) = emit_fit(&mut frag, node, ctx, &sym, &ctor) {
        frag.print(format!("Neural network trained: {class}"));
        frag.print(format!(
            "Training score: {{{sym}.score({x_train}, {y_train}):.4f}}"
        ));
    }
    frag
}

fn emit_hyperparam_tune(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let estimator = match node.setting_str("task") {
        Some("regression") => "RandomForestRegressor",
        _ => "RandomForestClassifier",
    };
    let cv = node.setting_u64("cv").unwrap_or(5);
    let sym = ctx.symbol(node);
    let suffix = ctx.symbols.suffix(&node.id);
    let grid = format!("param_grid{suffix}");
    let mut frag = Fragment::new(&node.id, node.kind, "Hyperparameter Tuning (GridSearchCV)");

    let (Some(x_train), Some(y_train)) = (
        ctx.resolve_input(node, "X_train"),
        ctx.resolve_input(node, "y_train"),
    ) else {
        frag.comment(format!(
            "WARNING: hyperparameter tuning node `{}` is missing training data or labels",
            node.id
        ));
        frag.assign(&sym, "None");
        return frag;
    };

    frag.assign(
        &grid,
        "{\n    'n_estimators': [50, 100, 200],\n    'max_depth': [None, 10, 20],\n}",
    );
    frag.assign(
        &sym,
        format!("GridSearchCV({estimator}(random_state=42), {grid}, cv={cv})"),
    );
    frag.raw(format!("{sym}.fit({x_train}, {y_train})"));
    frag.print(format!("Best parameters: {{{sym}.best_params_}}"));
    frag.print(format!("Best cross-validation score: {{{sym}.best_score_:.4f}}"));
    frag
}

fn emit_predict(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let sym = ctx.symbol(node);
    let mut frag = Fragment::new(&node.id, node.kind, "Predict");

    let model = ctx.resolve_input(node, "model");
    let x_test = ctx.resolve_input(node, "X_test");
    let (Some(model), Some(x_test)) = (model, x_test) else {
        if !ctx.index.has_incoming(&node.id, "model") {
            frag.comment(format!(
                "WARNING: predict node `{}` is missing a model connection",
                node.id
            ));
        }
        if !ctx.index.has_incoming(&node.id, "X_test") {
            frag.comment(format!(
                "WARNING: predict node `{}` is missing a test-data connection",
                node.id
            ));
        }
        frag.assign(&sym, "None");
        return frag;
    };

    frag.assign(&sym, format!("{model}.predict({x_test})"));
    frag.print(format!("Predictions complete: {{len({sym})}} samples"));
    frag.print(format!("First 10 predictions: {{{sym}[:10]}}"));
    frag
}

/// Metric family for an evaluate node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Classification,
    Regression,
}

/// Walk evaluate <- predict <- training node through the connection index to
/// decide which metric set to emit. Defaults to classification when the
/// chain cannot be resolved.
fn upstream_task(node: &PipelineNode, ctx: &EmitContext) -> Task {
    let trainer = ctx
        .index
        .incoming(&node.id, "predictions")
        .and_then(|conn| ctx.graph.node(&conn.source))
        .and_then(|source| match source.kind {
            NodeKind::Predict => ctx
                .index
                .incoming(&source.id, "model")
                .and_then(|conn| ctx.graph.node(&conn.source)),
            _ if source.kind.is_model_training() => Some(source),
            _ => None,
        });

    match trainer {
        Some(t) if t.kind == NodeKind::Regressor => Task::Regression,
        Some(t)
            if matches!(t.kind, NodeKind::NeuralNet | NodeKind::HyperparamTune)
                && t.setting_str("task") == Some("regression") =>
        {
            Task::Regression
        }
        _ => Task::Classification,
    }
}

fn emit_evaluate(node: &PipelineNode, ctx: &EmitContext) -> Fragment {
    let task = upstream_task(node, ctx);
    let label = match task {
        Task::Classification => "classification",
        Task::Regression => "regression",
    };
    let suffix = ctx.symbols.suffix(&node.id);
    let mut frag = Fragment::new(&node.id, node.kind, format!("Evaluate Model ({label})"));

    let predictions = ctx.resolve_input(node, "predictions");
    let y_test = ctx.resolve_input(node, "y_test");
    let (Some(y_pred), Some(y_test)) = (predictions, y_test) else {
        if !ctx.index.has_incoming(&node.id, "predictions") {
            frag.comment(format!(
                "WARNING: evaluate node `{}` is missing a predictions connection",
                node.id
            ));
        }
        if !ctx.index.has_incoming(&node.id, "y_test") {
            frag.comment(format!(
                "WARNING: evaluate node `{}` is missing a test-labels connection",
                node.id
            ));
        }
        return frag;
    };

    match task {
        Task::Classification => {
            let accuracy = format!("accuracy{suffix}");
            frag.assign(&accuracy, format!("accuracy_score({y_test}, {y_pred})"));
            frag.print(format!("Accuracy: {{{accuracy}:.4f}}"));
            frag.print("\\nClassification report:");
            frag.raw(format!("print(classification_report({y_test}, {y_pred}))"));
            frag.print("\\nConfusion matrix:");
            frag.raw(format!("print(confusion_matrix({y_test}, {y_pred}))"));
        }
        Task::Regression => {
            let mse = format!("mse{suffix}");
            let rmse = format!("rmse{suffix}");
            let mae = format!("mae{suffix}");
            let r2 = format!("r2{suffix}");
            frag.raw("from sklearn.metrics import mean_squared_error, r2_score, mean_absolute_error");
            frag.assign(&mse, format!("mean_squared_error({y_test}, {y_pred})"));
            frag.assign(&rmse, format!("np.sqrt({mse})"));
            frag.assign(&mae, format!("mean_absolute_error({y_test}, {y_pred})"));
            frag.assign(&r2, format!("r2_score({y_test}, {y_pred})"));
            frag.print(format!("Mean Squared Error (MSE): {{{mse}:.4f}}"));
            frag.print(format!("Root Mean Squared Error (RMSE): {{{rmse}:.4f}}"));
            frag.print(format!("Mean Absolute Error (MAE): {{{mae}:.4f}}"));
            frag.print(format!("R² Score: {{{r2}:.4f}}"));
        }
    }
    frag
}
