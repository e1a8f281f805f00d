//! Graph export: JSON or a Nuke script fragment.
//!
//! The `.nk` writer uses stack variables for wiring: every node is stored
//! with `set N<id> [stack 0]`, and its inputs are pushed (last slot first)
//! right before it, so any DAG shape pastes back correctly.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::memory_graph::{MemNode, MemoryGraph};
use crate::entities::{NodeType, ParamValue};

/// Output format for a recorded graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Nk,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Nk => "nk",
        }
    }
}

/// Serialize graph to pretty JSON
pub fn to_json(graph: &MemoryGraph) -> Result<String> {
    serde_json::to_string_pretty(graph).context("Serialize graph error")
}

/// Nuke class written for a node type
fn nk_class(kind: NodeType) -> &'static str {
    match kind {
        NodeType::Read => "Read",
        NodeType::Shuffle => "Shuffle2",
        NodeType::Merge => "Merge2",
        NodeType::Dot => "Dot",
    }
}

/// Characters Tcl would substitute or split on inside a bare word
const NK_SPECIAL: &[char] = &['"', '\\', '[', ']', '$', '{', '}', ';'];

/// Knob value as a Tcl word: bare when safe, otherwise quoted with every
/// special character backslash-escaped.
fn nk_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Str(s) if s.is_empty() || s.contains(char::is_whitespace) || s.contains(NK_SPECIAL) => {
            let mut quoted = String::with_capacity(s.len() + 2);
            quoted.push('"');
            for c in s.chars() {
                if NK_SPECIAL.contains(&c) {
                    quoted.push('\\');
                }
                quoted.push(c);
            }
            quoted.push('"');
            quoted
        }
        other => other.to_string(),
    }
}

fn write_nk_node(out: &mut String, node: &MemNode) -> std::fmt::Result {
    for input in node.inputs.iter().rev() {
        match input {
            Some(id) => writeln!(out, "push $N{}", id.0)?,
            None => writeln!(out, "push 0")?,
        }
    }

    writeln!(out, "{} {{", nk_class(node.kind))?;
    writeln!(out, " inputs {}", node.inputs.len())?;
    for (name, value) in &node.params {
        writeln!(out, " {} {}", name, nk_value(value))?;
    }
    writeln!(out, " name {}", node.name)?;
    writeln!(out, " selected {}", node.selected)?;
    writeln!(out, " xpos {}", node.x.round() as i64)?;
    writeln!(out, " ypos {}", node.y.round() as i64)?;
    writeln!(out, "}}")?;
    writeln!(out, "set N{} [stack 0]", node.id.0)
}

fn write_nk(out: &mut String, graph: &MemoryGraph) -> std::fmt::Result {
    for node in graph.nodes() {
        write_nk_node(out, node)?;
    }
    Ok(())
}

/// Render graph as a Nuke script fragment (paste into the node graph)
pub fn to_nk(graph: &MemoryGraph) -> Result<String> {
    let mut out = String::new();
    write_nk(&mut out, graph).context("Format .nk script error")?;
    Ok(out)
}

pub fn render(graph: &MemoryGraph, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(graph),
        ExportFormat::Nk => to_nk(graph),
    }
}

/// Write graph to `path` in `format`
pub fn write(graph: &MemoryGraph, path: &Path, format: ExportFormat) -> Result<()> {
    let text = render(graph, format)?;
    fs::write(path, text).with_context(|| format!("Write graph error: {}", path.display()))?;
    info!("Wrote {} nodes to {}", graph.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::NodeGraph;
    use crate::entities::keys::{OP_PLUS, P_FILE, P_LABEL, P_OPERATION};

    fn small_graph() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        let read = g
            .create_node(NodeType::Read, &[(P_FILE, "/renders/my shot.exr".into())])
            .unwrap();
        let dot = g.create_node(NodeType::Dot, &[]).unwrap();
        g.set_input(dot, 0, read).unwrap();
        let merge = g.create_node(NodeType::Merge, &[(P_OPERATION, OP_PLUS.into())]).unwrap();
        g.set_input(merge, 1, dot).unwrap();
        g.set_param(merge, P_LABEL, "sum".into()).unwrap();
        g.set_position(merge, 150.4, 300.0).unwrap();
        g
    }

    #[test]
    fn test_to_nk() {
        let nk = to_nk(&small_graph()).unwrap();
        let expected = "\
Read {
 inputs 0
 file \"/renders/my shot.exr\"
 name Read1
 selected false
 xpos 0
 ypos 0
}
set N0 [stack 0]
push $N0
Dot {
 inputs 1
 name Dot1
 selected false
 xpos 0
 ypos 0
}
set N1 [stack 0]
push $N1
push 0
Merge2 {
 inputs 2
 operation plus
 label sum
 name Merge1
 selected false
 xpos 150
 ypos 300
}
set N2 [stack 0]
";
        assert_eq!(nk, expected);
    }

    #[test]
    fn test_nk_value_quotes_tcl_specials() {
        let v = |s: &str| nk_value(&ParamValue::from(s));
        assert_eq!(v("plus"), "plus");
        assert_eq!(v("/renders/shot.diffuse.exr"), "/renders/shot.diffuse.exr");
        assert_eq!(v(""), "\"\"");
        assert_eq!(v("/r/shot_[0001].exr"), "\"/r/shot_\\[0001\\].exr\"");
        assert_eq!(v("$HOME/{a}"), "\"\\$HOME/\\{a\\}\"");
        assert_eq!(v("a;b"), "\"a\\;b\"");
        assert_eq!(v("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(nk_value(&ParamValue::Float(1.5)), "1.5");
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&small_graph()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[2]["kind"], "Merge");
        assert_eq!(nodes[2]["params"]["operation"], "plus");
        assert_eq!(nodes[2]["inputs"], serde_json::json!([null, 1]));
    }

    #[test]
    fn test_write_file() {
        let path = std::env::temp_dir().join("aov_compositor_test_export.nk");
        write(&small_graph(), &path, ExportFormat::Nk).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Read {"));
        let _ = std::fs::remove_file(&path);
    }
}
