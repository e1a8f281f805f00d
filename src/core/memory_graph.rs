//! In-process node graph.
//!
//! Records every node the builder creates so the result can be inspected,
//! exported (JSON / `.nk`) or asserted on in tests. Host-side state that a
//! real compositor would own (selection, file prompt, directory contents,
//! channel layers) can be preset; otherwise it falls back to the filesystem
//! and EXR headers.

use anyhow::{Result, bail};
use indexmap::IndexMap;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::host::NodeGraph;
use crate::entities::keys::P_FILE;
use crate::entities::{ChannelLayer, NodeType, ParamValue};
use crate::utils::{exr_header, files};

/// Node handle issued by [`MemoryGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Recorded node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeType,
    pub params: IndexMap<String, ParamValue>,
    /// Inputs by slot; `None` for an unconnected slot below a connected one
    pub inputs: Vec<Option<NodeId>>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub selected: bool,
}

impl MemNode {
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(ParamValue::as_str)
    }

    pub fn input(&self, slot: usize) -> Option<NodeId> {
        self.inputs.get(slot).copied().flatten()
    }
}

/// Default on-screen size of a node type
pub fn default_size(kind: NodeType) -> (f64, f64) {
    match kind {
        NodeType::Read => (80.0, 78.0),
        NodeType::Shuffle => (80.0, 26.0),
        NodeType::Merge => (80.0, 22.0),
        NodeType::Dot => (12.0, 12.0),
    }
}

/// Recording [`NodeGraph`] host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryGraph {
    nodes: Vec<MemNode>,
    /// Where new nodes appear before being placed
    #[serde(skip)]
    origin: (f64, f64),
    #[serde(skip)]
    prompt_answer: Option<PathBuf>,
    #[serde(skip)]
    listings: HashMap<PathBuf, Vec<String>>,
    #[serde(skip)]
    layers: HashMap<PathBuf, Vec<ChannelLayer>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer given to the next file prompts (`None` = user cancels)
    pub fn with_prompt_answer(mut self, answer: Option<PathBuf>) -> Self {
        self.prompt_answer = answer;
        self
    }

    /// Preset listing for a directory instead of reading the filesystem
    pub fn with_listing(mut self, dir: impl Into<PathBuf>, names: &[&str]) -> Self {
        self.listings
            .insert(dir.into(), names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Preset channel layers for a file instead of reading its EXR header
    pub fn with_layers(mut self, path: impl Into<PathBuf>, layers: Vec<ChannelLayer>) -> Self {
        self.layers.insert(path.into(), layers);
        self
    }

    /// Position given to freshly created nodes
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = (x, y);
        self
    }

    /// Add a Read node the way a user would: already in the graph, optionally selected.
    pub fn add_read(&mut self, path: impl AsRef<Path>, x: f64, y: f64, selected: bool) -> NodeId {
        let file = path.as_ref().to_string_lossy().replace('\\', "/");
        let id = self.push_node(NodeType::Read, &[(P_FILE, ParamValue::Str(file))]);
        let node = &mut self.nodes[id.0];
        node.x = x;
        node.y = y;
        node.selected = selected;
        id
    }

    pub fn nodes(&self) -> &[MemNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&MemNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes_of(&self, kind: NodeType) -> impl Iterator<Item = &MemNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn count(&self, kind: NodeType) -> usize {
        self.nodes_of(kind).count()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push_node(&mut self, kind: NodeType, params: &[(&str, ParamValue)]) -> NodeId {
        let id = NodeId(self.nodes.len());
        let (width, height) = default_size(kind);
        let name = format!("{}{}", kind.as_str(), self.count(kind) + 1);

        self.nodes.push(MemNode {
            id,
            name,
            kind,
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            inputs: Vec::new(),
            x: self.origin.0,
            y: self.origin.1,
            width,
            height,
            selected: false,
        });
        id
    }

    fn get(&self, id: NodeId) -> Result<&MemNode> {
        match self.nodes.get(id.0) {
            Some(n) => Ok(n),
            None => bail!("Unknown node {:?}", id),
        }
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut MemNode> {
        match self.nodes.get_mut(id.0) {
            Some(n) => Ok(n),
            None => bail!("Unknown node {:?}", id),
        }
    }
}

impl NodeGraph for MemoryGraph {
    type Node = NodeId;

    fn create_node(&mut self, kind: NodeType, params: &[(&str, ParamValue)]) -> Result<NodeId> {
        let id = self.push_node(kind, params);
        trace!("create {} -> {:?}", kind, id);
        Ok(id)
    }

    fn set_param(&mut self, node: NodeId, name: &str, value: ParamValue) -> Result<()> {
        self.get_mut(node)?.params.insert(name.to_string(), value);
        Ok(())
    }

    fn set_input(&mut self, node: NodeId, slot: usize, input: NodeId) -> Result<()> {
        self.get(input)?;
        if input == node {
            bail!("Node {:?} cannot be its own input", node);
        }
        let inputs = &mut self.get_mut(node)?.inputs;
        if inputs.len() <= slot {
            inputs.resize(slot + 1, None);
        }
        inputs[slot] = Some(input);
        Ok(())
    }

    fn set_position(&mut self, node: NodeId, x: f64, y: f64) -> Result<()> {
        let n = self.get_mut(node)?;
        n.x = x;
        n.y = y;
        Ok(())
    }

    fn position(&self, node: NodeId) -> Result<(f64, f64)> {
        let n = self.get(node)?;
        Ok((n.x, n.y))
    }

    fn size(&self, node: NodeId) -> Result<(f64, f64)> {
        let n = self.get(node)?;
        Ok((n.width, n.height))
    }

    fn set_selected(&mut self, node: NodeId, selected: bool) -> Result<()> {
        self.get_mut(node)?.selected = selected;
        Ok(())
    }

    fn channel_layers(&self, node: NodeId) -> Result<Vec<ChannelLayer>> {
        let n = self.get(node)?;
        match n.param_str(P_FILE) {
            Some(file) => self.file_channel_layers(Path::new(file)),
            None => Ok(Vec::new()),
        }
    }

    fn file_channel_layers(&self, path: &Path) -> Result<Vec<ChannelLayer>> {
        match self.layers.get(path) {
            Some(layers) => Ok(layers.clone()),
            None => exr_header::read_channel_layers(path),
        }
    }

    fn selected_nodes(&self, kind: NodeType) -> Result<Vec<NodeId>> {
        Ok(self
            .nodes_of(kind)
            .filter(|n| n.selected)
            .map(|n| n.id)
            .collect())
    }

    fn prompt_for_file(&mut self, filter: &str) -> Result<Option<PathBuf>> {
        trace!("prompt ({}) -> {:?}", filter, self.prompt_answer);
        Ok(self.prompt_answer.clone())
    }

    fn list_directory(&self, dir: &Path) -> Result<Vec<String>> {
        match self.listings.get(dir) {
            Some(names) => Ok(names.clone()),
            None => files::list_directory(dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_wire() {
        let mut g = MemoryGraph::new().with_origin(10.0, 20.0);
        let a = g.create_node(NodeType::Dot, &[]).unwrap();
        let b = g.create_node(NodeType::Merge, &[]).unwrap();
        g.set_input(b, 1, a).unwrap();

        let merge = g.node(b).unwrap();
        assert_eq!(merge.inputs, vec![None, Some(a)]);
        assert_eq!(merge.name, "Merge1");
        assert_eq!(g.position(a).unwrap(), (10.0, 20.0));
        assert_eq!(g.size(a).unwrap(), (12.0, 12.0));
    }

    #[test]
    fn test_unknown_node_fails() {
        let mut g = MemoryGraph::new();
        let a = g.create_node(NodeType::Dot, &[]).unwrap();
        assert!(g.set_input(a, 0, NodeId(42)).is_err());
        assert!(g.set_input(a, 0, a).is_err());
        assert!(g.position(NodeId(7)).is_err());
    }

    #[test]
    fn test_selection_and_layers() {
        let layers = vec![ChannelLayer::new("diffuse", &["red", "green", "blue"])];
        let mut g = MemoryGraph::new().with_layers("/r/shot.exr", layers.clone());
        g.add_read("/r/other.exr", 0.0, 0.0, false);
        let read = g.add_read("/r/shot.exr", 0.0, 0.0, true);

        assert_eq!(g.selected_nodes(NodeType::Read).unwrap(), vec![read]);
        assert_eq!(g.channel_layers(read).unwrap(), layers);
        assert_eq!(g.node(read).unwrap().name, "Read2");
    }

    #[test]
    fn test_preset_listing() {
        let g = MemoryGraph::new().with_listing("/r", &["b.exr", "a.exr"]);
        assert_eq!(g.list_directory(Path::new("/r")).unwrap(), vec!["b.exr", "a.exr"]);
    }
}
