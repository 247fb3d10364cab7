//! # Python Renderer
//!
//! Renders statement IR into Python source text. This is the only place
//! that knows the textual syntax of the target vocabulary; emission logic
//! in `node_handlers` deals purely in [`Stmt`] records.

use super::ir::{Fragment, Stmt};

/// Render a single statement as one or more source lines.
pub fn render_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Comment(text) => format!("# {text}\n"),
        Stmt::Assign { targets, expr } => {
            format!("{} = {expr}\n", targets.join(", "))
        }
        Stmt::Raw(line) => format!("{line}\n"),
        Stmt::Print(template) => {
            // Interpolating templates become f-strings.
            if template.contains('{') {
                format!("print(f\"{template}\")\n")
            } else {
                format!("print(\"{template}\")\n")
            }
        }
        Stmt::Blank => "\n".to_string(),
    }
}

/// Render a fragment: section comment followed by its statements.
pub fn render_fragment(fragment: &Fragment) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n", fragment.title));
    for stmt in &fragment.body {
        out.push_str(&render_stmt(stmt));
    }
    out
}
