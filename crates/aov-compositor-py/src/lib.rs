//! Python bindings for aov-compositor.
//!
//! The compositor side supplies a host object implementing the node-graph
//! surface; the builder drives it. A minimal Nuke host:
//!
//! ```python
//! import nuke, os
//! import aov_compositor_py as aovc
//!
//! class NukeHost:
//!     CLASSES = {"Read": "Read", "Shuffle": "Shuffle2", "Merge": "Merge2", "Dot": "Dot"}
//!
//!     def create_node(self, kind, params):
//!         node = nuke.createNode(self.CLASSES[kind])
//!         for name, value in params.items():
//!             node[name].setValue(value)
//!         return node
//!     def set_param(self, node, name, value): node[name].setValue(value)
//!     def set_input(self, node, slot, other): node.setInput(slot, other)
//!     def set_position(self, node, x, y): node.setXYpos(int(x), int(y))
//!     def get_position(self, node): return (node.xpos(), node.ypos())
//!     def get_size(self, node): return (node.screenWidth(), node.screenHeight())
//!     def set_selected(self, node, selected): node.setSelected(selected)
//!     def list_channel_layers(self, node): ...   # [(layer, [channel, ...]), ...]
//!     def file_channel_layers(self, path): ...
//!     def list_selected_nodes(self, kind): return nuke.selectedNodes(self.CLASSES[kind])
//!     def prompt_for_file(self, filter): return nuke.getFilename("Select file", filter)
//!     def list_directory(self, path): return os.listdir(path)
//!
//! status, output = aovc.create_network(NukeHost(), {"diffuse": "diffuse"}, mode="multi")
//! ```

use anyhow::{Result, bail};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

use aov_compositor::core::{BuildOutcome, InputMode, NetworkBuilder, NodeGraph, NodeRegistry};
use aov_compositor::entities::{AovTable, ChannelLayer, Level, NodeType, ParamValue, RenderEngine, WorkingSet};

/// Bindings may return a new wrapper object for the same node on every
/// call, so identity alone does not find it again.
fn same_py_node<'py>(a: &Bound<'py, PyAny>, b: &Bound<'py, PyAny>) -> Result<bool> {
    Ok(a.is(b) || a.eq(b)?)
}

/// Host implemented by a Python object.
///
/// Selection queries take `&self` but may meet nodes the adapter has not
/// seen yet, hence the `RefCell`.
struct PyHost<'py> {
    host: Bound<'py, PyAny>,
    nodes: RefCell<NodeRegistry<Bound<'py, PyAny>>>,
}

impl<'py> PyHost<'py> {
    fn new(host: Bound<'py, PyAny>) -> Self {
        Self {
            host,
            nodes: RefCell::new(NodeRegistry::new(same_py_node)),
        }
    }

    fn register(&self, node: Bound<'py, PyAny>) -> Result<usize> {
        self.nodes.borrow_mut().register(node)
    }

    fn node(&self, id: usize) -> Result<Bound<'py, PyAny>> {
        self.nodes.borrow().get(id)
    }

    fn layers(value: Bound<'py, PyAny>) -> Result<Vec<ChannelLayer>> {
        let pairs: Vec<(String, Vec<String>)> = value.extract()?;
        Ok(pairs
            .into_iter()
            .map(|(name, channels)| ChannelLayer { name, channels })
            .collect())
    }
}

fn set_item(dict: &Bound<'_, PyDict>, key: &str, value: &ParamValue) -> PyResult<()> {
    match value {
        ParamValue::Bool(v) => dict.set_item(key, *v),
        ParamValue::Int(v) => dict.set_item(key, *v),
        ParamValue::Float(v) => dict.set_item(key, *v),
        ParamValue::Str(v) => dict.set_item(key, v.as_str()),
    }
}

impl<'py> NodeGraph for PyHost<'py> {
    type Node = usize;

    fn create_node(&mut self, kind: NodeType, params: &[(&str, ParamValue)]) -> Result<usize> {
        let dict = PyDict::new(self.host.py());
        for (name, value) in params {
            set_item(&dict, name, value)?;
        }
        let node = self.host.call_method1("create_node", (kind.as_str(), dict))?;
        self.register(node)
    }

    fn set_param(&mut self, node: usize, name: &str, value: ParamValue) -> Result<()> {
        let node = self.node(node)?;
        match value {
            ParamValue::Bool(v) => self.host.call_method1("set_param", (node, name, v))?,
            ParamValue::Int(v) => self.host.call_method1("set_param", (node, name, v))?,
            ParamValue::Float(v) => self.host.call_method1("set_param", (node, name, v))?,
            ParamValue::Str(v) => self.host.call_method1("set_param", (node, name, v))?,
        };
        Ok(())
    }

    fn set_input(&mut self, node: usize, slot: usize, input: usize) -> Result<()> {
        let (node, input) = (self.node(node)?, self.node(input)?);
        self.host.call_method1("set_input", (node, slot, input))?;
        Ok(())
    }

    fn set_position(&mut self, node: usize, x: f64, y: f64) -> Result<()> {
        let node = self.node(node)?;
        self.host.call_method1("set_position", (node, x, y))?;
        Ok(())
    }

    fn position(&self, node: usize) -> Result<(f64, f64)> {
        let node = self.node(node)?;
        Ok(self.host.call_method1("get_position", (node,))?.extract()?)
    }

    fn size(&self, node: usize) -> Result<(f64, f64)> {
        let node = self.node(node)?;
        Ok(self.host.call_method1("get_size", (node,))?.extract()?)
    }

    fn set_selected(&mut self, node: usize, selected: bool) -> Result<()> {
        let node = self.node(node)?;
        self.host.call_method1("set_selected", (node, selected))?;
        Ok(())
    }

    fn channel_layers(&self, node: usize) -> Result<Vec<ChannelLayer>> {
        let node = self.node(node)?;
        Self::layers(self.host.call_method1("list_channel_layers", (node,))?)
    }

    fn file_channel_layers(&self, path: &Path) -> Result<Vec<ChannelLayer>> {
        let path = path.to_string_lossy().into_owned();
        Self::layers(self.host.call_method1("file_channel_layers", (path,))?)
    }

    fn selected_nodes(&self, kind: NodeType) -> Result<Vec<usize>> {
        let selected: Vec<Bound<'py, PyAny>> = self
            .host
            .call_method1("list_selected_nodes", (kind.as_str(),))?
            .extract()?;
        selected.into_iter().map(|node| self.register(node)).collect()
    }

    fn prompt_for_file(&mut self, filter: &str) -> Result<Option<PathBuf>> {
        let answer: Option<String> = self.host.call_method1("prompt_for_file", (filter,))?.extract()?;
        Ok(answer.filter(|s| !s.is_empty()).map(PathBuf::from))
    }

    fn list_directory(&self, dir: &Path) -> Result<Vec<String>> {
        let dir = dir.to_string_lossy().into_owned();
        Ok(self.host.call_method1("list_directory", (dir,))?.extract()?)
    }
}

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// AOVs of an engine at a level.
///
/// Returns:
///     list of (key, display_name, suffix) in declared order; empty for
///     engines without a table
#[pyfunction]
#[pyo3(signature = (engine, level = "standard"))]
fn aov_table(engine: &str, level: &str) -> PyResult<Vec<(String, String, String)>> {
    let engine: RenderEngine = engine.parse().map_err(value_error)?;
    let level: Level = level.parse().map_err(value_error)?;

    Ok(AovTable::builtin(engine)
        .descriptors(level)
        .into_iter()
        .map(|d| (d.key, d.display_name, d.suffix))
        .collect())
}

/// Build an AOV network into the host graph.
///
/// Args:
///     host: object implementing the node-graph methods
///     aovs: dict {aov_key: suffix}
///     mode: "single" (one multi-layer file) or "multi" (one file per AOV)
///     engine: "arnold", "vray" or "redshift"
///     level: "standard" or "advanced"
///     reference: path of one AOV file (multi mode); prompts when None
///
/// Returns:
///     (status, output_node) where status is "built", "no_matches",
///     "cancelled" or "not_supported"; output_node is the merge chain tail
///
/// Raises:
///     ValueError: bad engine/level/mode or conflicting suffixes
///     RuntimeError: host call failed
#[pyfunction]
#[pyo3(signature = (host, aovs, mode = "single", engine = "arnold", level = "standard", reference = None))]
fn create_network<'py>(
    host: Bound<'py, PyAny>,
    aovs: Bound<'py, PyDict>,
    mode: &str,
    engine: &str,
    level: &str,
    reference: Option<PathBuf>,
) -> PyResult<(String, Option<Bound<'py, PyAny>>)> {
    // Init logging (only once)
    let _ = env_logger::try_init();

    let engine: RenderEngine = engine.parse().map_err(value_error)?;
    let level: Level = level.parse().map_err(value_error)?;
    let mode: InputMode = mode.parse().map_err(value_error)?;

    let mut pairs = Vec::with_capacity(aovs.len());
    for (key, suffix) in aovs.iter() {
        pairs.push((key.extract::<String>()?, suffix.extract::<String>()?));
    }
    let working_set = WorkingSet::from_pairs(pairs).map_err(value_error)?;

    log::info!("aov-compositor-py: create_network({} {} {}, {} AOVs)", engine, level, mode, working_set.len());

    let mut builder = NetworkBuilder::new();
    builder.set_working_set(working_set);

    let mut graph = PyHost::new(host);

    let outcome = builder
        .create_network(&mut graph, engine, level, mode, reference.as_deref())
        .map_err(|e| PyRuntimeError::new_err(format!("{:#}", e)))?;

    Ok(match outcome {
        BuildOutcome::Built(network) => ("built".to_string(), graph.node(network.output).ok()),
        BuildOutcome::NoMatches => ("no_matches".to_string(), None),
        BuildOutcome::Cancelled => ("cancelled".to_string(), None),
        BuildOutcome::NotSupported { .. } => ("not_supported".to_string(), None),
    })
}

#[pymodule]
fn aov_compositor_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(aov_table, m)?)?;
    m.add_function(wrap_pyfunction!(create_network, m)?)?;
    Ok(())
}

