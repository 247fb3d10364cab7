//! # Statement IR
//!
//! Small intermediate representation for generated code: one record per
//! emitted statement, grouped into a per-node fragment. Emission logic
//! builds these records; the Python renderer turns them into text. The two
//! halves are independently testable.

use crate::graph::NodeKind;

/// One emitted statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `# text`
    Comment(String),
    /// `a = expr` or `a, b = expr`; the expression may span lines.
    Assign { targets: Vec<String>, expr: String },
    /// A statement passed through verbatim (imports, bare calls, loops).
    Raw(String),
    /// `print("...")`, rendered as an f-string when the template
    /// interpolates (contains `{`).
    Print(String),
    /// Blank separator line.
    Blank,
}

/// The emitted statements for one node, headed by a section title.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub node_id: String,
    pub kind: NodeKind,
    /// Section comment text, e.g. `Load Data: sales.csv`.
    pub title: String,
    pub body: Vec<Stmt>,
}

impl Fragment {
    pub fn new(node_id: impl Into<String>, kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            kind,
            title: title.into(),
            body: Vec::new(),
        }
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.body.push(Stmt::Comment(text.into()));
    }

    pub fn assign(&mut self, target: impl Into<String>, expr: impl Into<String>) {
        self.body.push(Stmt::Assign {
            targets: vec![target.into()],
            expr: expr.into(),
        });
    }

    pub fn assign_many(&mut self, targets: &[&str], expr: impl Into<String>) {
        self.body.push(Stmt::Assign {
            targets: targets.iter().map(|t| t.to_string()).collect(),
            expr: expr.into(),
        });
    }

    pub fn raw(&mut self, stmt: impl Into<String>) {
        self.body.push(Stmt::Raw(stmt.into()));
    }

    pub fn print(&mut self, template: impl Into<String>) {
        self.body.push(Stmt::Print(template.into()));
    }

    pub fn blank(&mut self) {
        self.body.push(Stmt::Blank);
    }

    /// Whether the fragment degraded to a warning stub.
    pub fn is_stub(&self) -> bool {
        self.body
            .iter()
            .any(|s| matches!(s, Stmt::Comment(c) if c.starts_with("WARNING:")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_helpers_append_in_order() {
        let mut frag = Fragment::new("n1", NodeKind::Predict, "Predict");
        frag.comment("WARNING: missing model");
        frag.assign("y_pred", "None");
        assert_eq!(frag.body.len(), 2);
        assert!(frag.is_stub());
    }

    #[test]
    fn plain_fragment_is_not_a_stub() {
        let mut frag = Fragment::new("n1", NodeKind::Predict, "Predict");
        frag.assign("y_pred", "model.predict(X_test)");
        frag.print("Predictions complete: {len(y_pred)} samples");
        assert!(!frag.is_stub());
    }
}
