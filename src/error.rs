//! # Compiler Errors
//!
//! Error types for pipeline graph compilation.
//!
//! Validation failures carry the full ordered violation list as data so the
//! caller can surface them to the end user without the editor going down.
//! Internal-consistency variants indicate compiler bugs, not user-data
//! problems, and are logged at the point they are detected.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors produced while compiling a pipeline graph.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The graph failed structural validation. Compilation does not proceed.
    #[error("pipeline validation failed:\n{}", violations.join("\n"))]
    Validation {
        /// Human-readable rule violations, in rule-priority order.
        violations: Vec<String>,
    },

    /// A node kind outside the fixed pipeline vocabulary was encountered at
    /// the import boundary.
    #[error("unknown node kind `{0}`")]
    UnknownKind(String),

    /// A node id referenced during compilation does not exist in the graph.
    #[error("node not found: `{0}`")]
    NodeNotFound(String),

    /// JSON parsing or serialization failed (graph import, notebook export).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal consistency violation - a logic bug, not a user-data problem.
    #[error("internal compiler error: {0}")]
    Internal(String),
}

impl CompileError {
    /// The violation list for validation errors, empty otherwise.
    pub fn violations(&self) -> &[String] {
        match self {
            CompileError::Validation { violations } => violations,
            _ => &[],
        }
    }
}
