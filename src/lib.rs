//! # ML Pipeline Graph Compiler (MPGC)
//!
//! Production-ready compiler for transforming visual ML pipeline node
//! graphs into runnable Python source code.
//!
//! A pipeline graph is assembled in a browser editor from drag-and-drop
//! nodes (data loading, splitting, scaling, model training, prediction,
//! evaluation) and handed to this crate as a plain data snapshot. The
//! compiler validates it, orders it, and deterministically emits
//! sequential Python with correct data dependencies, ready for download as
//! a script or a Jupyter notebook.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mpgc::{compile_graph, PipelineGraph};
//!
//! let graph = PipelineGraph::from_json(r#"{"name": "demo", "nodes": [], "connections": []}"#)?;
//!
//! match compile_graph(&graph) {
//!     Ok(code) => println!("{code}"),
//!     Err(e) => eprintln!("Compilation failed: {e}"),
//! }
//! # Ok::<(), mpgc::CompileError>(())
//! ```
//!
//! ## Architecture
//!
//! MPGC follows a multi-phase compilation pipeline:
//!
//! 1. **Validation** - Structural rules: source node, connectivity,
//!    required sockets, acyclicity
//! 2. **Indexing** - Build the immutable connection lookup
//! 3. **Scheduling** - Kahn's algorithm, declaration-order tie-break
//! 4. **Name Allocation** - Short deterministic symbols per node
//! 5. **Emission** - Per-kind statement IR, rendered to Python
//! 6. **Assembly** - Import preamble + ordered fragments; script and
//!    notebook wrappers in [`export`]

pub mod codegen;
pub mod compiler;
pub mod error;
pub mod export;
pub mod graph;
pub mod registry;
pub mod schedule;
pub mod store;
pub mod symbols;
pub mod validate;

// Re-export the main compilation API
pub use compiler::{compile_graph, compile_graph_with_files};
pub use error::{CompileError, Result};
pub use export::{to_notebook, to_script};
pub use graph::{Connection, ConnectionIndex, NodeKind, PipelineGraph, PipelineNode, Position};
pub use store::{EmptyStore, FileStore};
