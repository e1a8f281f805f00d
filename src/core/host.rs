//! Host capability surface.
//!
//! The builder only creates, wires and places nodes through this trait.
//! A host is whatever owns the live node graph: a compositor's scripting
//! API (through the Python extension), or [`MemoryGraph`](super::memory_graph::MemoryGraph)
//! for the command line and tests.
//!
//! Handles are host-issued ids. Every call returns `anyhow::Result` so host
//! failures reach the caller untouched; the builder never retries.

use anyhow::{Result, bail};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::entities::{ChannelLayer, NodeType, ParamValue};

pub trait NodeGraph {
    /// Host node handle
    type Node: Copy + Eq + Debug;

    /// Create a node with initial parameters
    fn create_node(&mut self, kind: NodeType, params: &[(&str, ParamValue)]) -> Result<Self::Node>;

    fn set_param(&mut self, node: Self::Node, name: &str, value: ParamValue) -> Result<()>;

    /// Connect `input` into `slot` of `node`
    fn set_input(&mut self, node: Self::Node, slot: usize, input: Self::Node) -> Result<()>;

    fn set_position(&mut self, node: Self::Node, x: f64, y: f64) -> Result<()>;

    fn position(&self, node: Self::Node) -> Result<(f64, f64)>;

    /// On-screen size `(w, h)` in graph units
    fn size(&self, node: Self::Node) -> Result<(f64, f64)>;

    fn set_selected(&mut self, node: Self::Node, selected: bool) -> Result<()>;

    /// Channel layers declared by a node (Read nodes)
    fn channel_layers(&self, node: Self::Node) -> Result<Vec<ChannelLayer>>;

    /// Channel layers of a file on disk, before any node exists for it
    fn file_channel_layers(&self, path: &Path) -> Result<Vec<ChannelLayer>>;

    /// Currently selected nodes of one type, in host selection order
    fn selected_nodes(&self, kind: NodeType) -> Result<Vec<Self::Node>>;

    /// Ask the user for a file. `None` means cancelled.
    fn prompt_for_file(&mut self, filter: &str) -> Result<Option<PathBuf>>;

    /// File names in a directory. Order is not guaranteed.
    fn list_directory(&self, dir: &Path) -> Result<Vec<String>>;
}

type SameFn<T> = fn(&T, &T) -> Result<bool>;

/// Handle table for hosts whose nodes are foreign objects.
///
/// Issues `usize` handles; a node seen again (by `same`) gets its old handle.
pub struct NodeRegistry<T> {
    nodes: Vec<T>,
    same: SameFn<T>,
}

impl<T: Clone> NodeRegistry<T> {
    pub fn new(same: SameFn<T>) -> Self {
        Self { nodes: Vec::new(), same }
    }

    pub fn find(&self, node: &T) -> Result<Option<usize>> {
        for (i, n) in self.nodes.iter().enumerate() {
            if (self.same)(n, node)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Handle of `node`, registering it on first sight
    pub fn register(&mut self, node: T) -> Result<usize> {
        if let Some(i) = self.find(&node)? {
            return Ok(i);
        }
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    pub fn get(&self, id: usize) -> Result<T> {
        match self.nodes.get(id) {
            Some(n) => Ok(n.clone()),
            None => bail!("Unknown node {}", id),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Binding wrapper: same `node`, new `serial` on every call
    #[derive(Debug, Clone)]
    struct Wrapper {
        node: u32,
        serial: u32,
    }

    fn same_wrapper(a: &Wrapper, b: &Wrapper) -> Result<bool> {
        Ok(a.node == b.node)
    }

    #[test]
    fn test_registry_matches_fresh_wrappers() {
        let mut serial = 0;
        let mut wrap = |node| {
            serial += 1;
            Wrapper { node, serial }
        };
        let mut registry = NodeRegistry::new(same_wrapper);

        // Selected Read seen once by the front-end, once by the builder
        let read = registry.register(wrap(7)).unwrap();
        let dot = registry.register(wrap(9)).unwrap();
        let again = registry.register(wrap(7)).unwrap();

        assert_eq!(read, again);
        assert_ne!(read, dot);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(read).unwrap().serial, 1);
    }

    #[test]
    fn test_registry_errors() {
        fn failing(_: &Wrapper, _: &Wrapper) -> Result<bool> {
            bail!("__eq__ raised")
        }

        let mut registry = NodeRegistry::new(failing);
        assert!(registry.get(0).is_err());
        registry.register(Wrapper { node: 1, serial: 1 }).unwrap();
        assert!(registry.register(Wrapper { node: 1, serial: 2 }).is_err());
    }
}
