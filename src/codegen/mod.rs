//! # Pipeline Code Generation
//!
//! Python code generation for ML pipeline graphs: a statement-level IR,
//! per-kind emission handlers and the text renderer.

pub mod ir;
pub mod node_handlers;
pub mod python;

pub use ir::{Fragment, Stmt};
pub use node_handlers::{emit_node, EmitContext};
pub use python::{render_fragment, render_stmt};
