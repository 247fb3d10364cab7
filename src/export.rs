//! # Script and Notebook Export
//!
//! Wraps a compiled code body into the two downloadable artifacts: a plain
//! Python script with a banner header, and a Jupyter notebook document.
//!
//! The compiled body itself is deterministic; the generation timestamp
//! only ever appears in the script header, passed in explicitly by the
//! caller.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Wrap a compiled body into a downloadable script with a banner header.
pub fn to_script(name: &str, code: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "# ========================================\n\
         # ML Pipeline: {name}\n\
         # Generated: {}\n\
         # ========================================\n\
         \n\
         {code}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

#[derive(Serialize)]
struct Notebook {
    cells: Vec<Cell>,
    metadata: NotebookMetadata,
    nbformat: u8,
    nbformat_minor: u8,
}

#[derive(Serialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
enum Cell {
    Markdown {
        metadata: Map<String, Value>,
        source: Vec<String>,
    },
    Code {
        execution_count: Option<u32>,
        metadata: Map<String, Value>,
        outputs: Vec<Value>,
        source: Vec<String>,
    },
}

#[derive(Serialize)]
struct NotebookMetadata {
    kernelspec: KernelSpec,
    language_info: LanguageInfo,
}

#[derive(Serialize)]
struct KernelSpec {
    display_name: &'static str,
    language: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct LanguageInfo {
    name: &'static str,
    version: &'static str,
}

/// Wrap a compiled body into a Jupyter notebook document.
///
/// The body is split into paragraph-separated cells (one code cell per
/// blank-line-separated block) behind a markdown title cell; kernel
/// metadata is fixed so two exports of the same body are identical.
pub fn to_notebook(name: &str, code: &str) -> Result<String> {
    let mut cells = vec![Cell::Markdown {
        metadata: Map::new(),
        source: vec![format!("# ML Pipeline: {name}")],
    }];

    for paragraph in code.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        cells.push(Cell::Code {
            execution_count: None,
            metadata: Map::new(),
            outputs: Vec::new(),
            source: source_lines(paragraph),
        });
    }

    let notebook = Notebook {
        cells,
        metadata: NotebookMetadata {
            kernelspec: KernelSpec {
                display_name: "Python 3",
                language: "python",
                name: "python3",
            },
            language_info: LanguageInfo {
                name: "python",
                version: "3",
            },
        },
        nbformat: 4,
        nbformat_minor: 5,
    };

    Ok(serde_json::to_string_pretty(&notebook)?)
}

/// Notebook source convention: every line keeps its trailing newline
/// except the last.
fn source_lines(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let last = lines.len().saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == last {
                (*line).to_string()
            } else {
                format!("{line}\n")
            }
        })
        .collect()
}
