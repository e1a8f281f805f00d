//! AOV network builder.
//!
//! Turns a [`WorkingSet`] and an input mode into a laid-out node network
//! that isolates every AOV found and sums them back together:
//!
//! ```text
//! multi-file                          single-file
//!
//! Read  Read  Read                          Read
//!  |     |     |                             |
//! Shuf  Shuf  Shuf                     o --- o --- o      Dot chain
//!  |     |     |                       |     |     |
//!  o --- M --- M  -> output           Shuf  Shuf  Shuf
//!                                      |     |     |
//!                                      o --- M --- M  -> output
//! ```
//!
//! Matching is by suffix: a file `shot.reflect.exr` or a layer `reflect`
//! belongs to whichever AOV owns the suffix `reflect` in the working set.
//!
//! Empty results (nothing matched, prompt cancelled) are outcomes, not
//! errors, and leave the graph untouched. Host errors propagate as-is.

use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::host::NodeGraph;
use super::layout::{column_offset, place_centered};
use crate::entities::keys::*;
use crate::entities::{Level, NodeType, RenderEngine, WorkingSet};
use crate::utils::files::{base_name, match_aov_files};

/// Where the AOVs come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// One multi-layer file, one channel layer per AOV
    #[default]
    Single,
    /// One file per AOV: `<base>.<suffix>.<ext>`
    Multi,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Single => "single",
            InputMode::Multi => "multi",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(InputMode::Single),
            "multi" | "multiple" => Ok(InputMode::Multi),
            _ => Err(format!("Unknown input mode: {} (expected single, multi)", s)),
        }
    }
}

/// Nodes created for one AOV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AovColumn<N> {
    pub key: String,
    pub suffix: String,
    /// Per-AOV Read (multi-file only)
    pub read: Option<N>,
    /// Branch Dot off the source Read (single-file only)
    pub dot: Option<N>,
    pub shuffle: N,
}

/// Everything a build created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network<N> {
    /// Source Read of a single-file build (selected or newly created)
    pub source: Option<N>,
    pub columns: Vec<AovColumn<N>>,
    /// Pass-through Dot heading the merge chain
    pub head: N,
    /// Additive merges, left to right
    pub merges: Vec<N>,
    /// Tail of the merge chain: sum of all AOVs
    pub output: N,
}

/// Result of one build request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome<N> {
    Built(Network<N>),
    /// Nothing matched the working set; graph untouched
    NoMatches,
    /// User cancelled the file prompt; graph untouched
    Cancelled,
    /// Engine/level/mode combination has no network definition yet
    NotSupported {
        engine: RenderEngine,
        level: Level,
        mode: InputMode,
    },
}

impl<N> BuildOutcome<N> {
    pub fn network(&self) -> Option<&Network<N>> {
        match self {
            BuildOutcome::Built(n) => Some(n),
            _ => None,
        }
    }
}

/// Running additive merge chain.
///
/// The first shuffle is wrapped in a Dot, each following shuffle is merged
/// (`plus`) with the running total.
struct MergeChain<N> {
    head: Option<N>,
    tail: Option<N>,
    merges: Vec<N>,
}

impl<N: Copy> MergeChain<N> {
    fn new() -> Self {
        Self {
            head: None,
            tail: None,
            merges: Vec::new(),
        }
    }

    /// Fold `shuffle` into the chain. Merges are centred under `anchor`
    /// shifted by `dx`; the head Dot is centred under the shuffle.
    fn push<G: NodeGraph<Node = N>>(
        &mut self,
        graph: &mut G,
        shuffle: N,
        anchor: N,
        dx: f64,
        merge_y: f64,
        dot_y: f64,
    ) -> Result<()> {
        let node = match self.tail {
            Some(total) => {
                let merge = create_merge(graph, shuffle, total)?;
                place_centered(graph, merge, anchor, dx, merge_y)?;
                self.merges.push(merge);
                merge
            }
            None => {
                let dot = create_dot(graph, shuffle)?;
                place_centered(graph, dot, shuffle, 0.0, dot_y)?;
                self.head = Some(dot);
                dot
            }
        };
        self.tail = Some(node);
        Ok(())
    }
}

/// Builds AOV networks into a host graph.
///
/// Stateless apart from the working set, which must be set before each build.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    working_set: WorkingSet,
    extensions: Vec<String>,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            working_set: WorkingSet::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Image extensions accepted by the multi-file scan
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Replace the working set
    pub fn set_working_set(&mut self, aovs: WorkingSet) {
        self.working_set = aovs;
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    /// Front-end entry point: dispatch on engine, level and mode.
    ///
    /// Redshift and V-Ray advanced have no network definition and report
    /// `NotSupported` without touching the graph.
    pub fn create_network<G: NodeGraph>(
        &self,
        graph: &mut G,
        engine: RenderEngine,
        level: Level,
        mode: InputMode,
        reference: Option<&Path>,
    ) -> Result<BuildOutcome<G::Node>> {
        let supported = match (engine, level) {
            (RenderEngine::Arnold, _) => true,
            (RenderEngine::VRay, Level::Standard) => true,
            (RenderEngine::VRay, Level::Advanced) => false,
            (RenderEngine::Redshift, _) => false,
        };
        if !supported {
            warn!("{} {} network from {} file(s) is not supported yet", engine, level, mode);
            return Ok(BuildOutcome::NotSupported { engine, level, mode });
        }

        match mode {
            InputMode::Single => self.build_from_single_file(graph),
            InputMode::Multi => self.build_from_multiple_files(graph, reference),
        }
    }

    /// Build from one file per AOV.
    ///
    /// `reference` is any one of the AOV files; without it the host is
    /// prompted. Siblings sharing its base name are matched by suffix.
    pub fn build_from_multiple_files<G: NodeGraph>(
        &self,
        graph: &mut G,
        reference: Option<&Path>,
    ) -> Result<BuildOutcome<G::Node>> {
        if self.working_set.is_empty() {
            info!("Working set is empty, nothing to build");
            return Ok(BuildOutcome::NoMatches);
        }

        let reference: PathBuf = match reference {
            Some(p) => p.to_path_buf(),
            None => match graph.prompt_for_file(EXR_FILTER)? {
                Some(p) => p,
                None => {
                    debug!("File prompt cancelled");
                    return Ok(BuildOutcome::Cancelled);
                }
            },
        };

        let dir = match reference.parent() {
            Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base = base_name(&reference);
        let names = graph.list_directory(&dir)?;
        let files = match_aov_files(&dir, &names, &base, &self.working_set, &self.extensions);

        if files.is_empty() {
            info!("No AOV files for '{}' in {}", base, dir.display());
            return Ok(BuildOutcome::NoMatches);
        }
        info!("Building network from {} files of '{}'", files.len(), base);

        let mut origin = (0.0, 0.0);
        let mut chain = MergeChain::new();
        let mut columns = Vec::with_capacity(files.len());

        for (i, file) in files.iter().enumerate() {
            let read = create_read(graph, &file.path)?;
            if i == 0 {
                origin = graph.position(read)?;
            }
            let (x0, y) = origin;
            let x = x0 + column_offset(i + 1);
            graph.set_position(read, x, y)?;

            let shuffle = create_shuffle(graph, LAYER_RGBA, read, &file.suffix)?;
            graph.set_position(shuffle, x, y + MULTI_SHUFFLE_OFFSET)?;

            chain.push(graph, shuffle, shuffle, 0.0, y + MULTI_MERGE_OFFSET, y + MULTI_DOT_OFFSET)?;

            columns.push(AovColumn {
                key: file.key.clone(),
                suffix: file.suffix.clone(),
                read: Some(read),
                dot: None,
                shuffle,
            });
        }

        Ok(finish(None, columns, chain))
    }

    /// Build from the layers of one multi-layer file.
    ///
    /// Uses the last selected Read node; otherwise prompts for a file and
    /// creates its Read only if at least one layer qualifies.
    pub fn build_from_single_file<G: NodeGraph>(&self, graph: &mut G) -> Result<BuildOutcome<G::Node>> {
        if self.working_set.is_empty() {
            info!("Working set is empty, nothing to build");
            return Ok(BuildOutcome::NoMatches);
        }

        let selected = graph.selected_nodes(NodeType::Read)?;
        let (read, layers) = match selected.last() {
            Some(&read) => {
                let layers = self.qualifying_layers(graph.channel_layers(read)?);
                if layers.is_empty() {
                    info!("Selected Read has no AOV layers");
                    return Ok(BuildOutcome::NoMatches);
                }
                (read, layers)
            }
            None => {
                let Some(path) = graph.prompt_for_file(EXR_FILTER)? else {
                    debug!("File prompt cancelled");
                    return Ok(BuildOutcome::Cancelled);
                };
                let layers = self.qualifying_layers(graph.file_channel_layers(&path)?);
                if layers.is_empty() {
                    info!("No AOV layers in {}", path.display());
                    return Ok(BuildOutcome::NoMatches);
                }
                (create_read(graph, &path)?, layers)
            }
        };
        info!("Building network from {} layers", layers.len());

        let (_, read_y) = graph.position(read)?;
        let row = read_y + SINGLE_DOT_ROW;

        let mut chain = MergeChain::new();
        let mut columns = Vec::with_capacity(layers.len());
        let mut branch = read;

        for (i, layer) in layers.iter().enumerate() {
            let dx = column_offset(i);

            let dot = create_dot(graph, branch)?;
            place_centered(graph, dot, read, dx, row)?;

            let shuffle = create_shuffle(graph, layer, dot, layer)?;
            place_centered(graph, shuffle, read, dx, row + SINGLE_SHUFFLE_OFFSET)?;

            chain.push(graph, shuffle, read, dx, row + SINGLE_MERGE_OFFSET, row + SINGLE_TAIL_DOT_OFFSET)?;

            let key = self.working_set.key_for_suffix(layer).unwrap_or(layer.as_str()).to_string();
            columns.push(AovColumn {
                key,
                suffix: layer.clone(),
                read: None,
                dot: Some(dot),
                shuffle,
            });
            branch = dot;
        }

        Ok(finish(Some(read), columns, chain))
    }

    /// Names of RGB-bearing layers whose name is a working-set suffix, sorted
    fn qualifying_layers(&self, layers: Vec<crate::entities::ChannelLayer>) -> Vec<String> {
        layers
            .into_iter()
            .filter(|l| l.has_color() && self.working_set.contains_suffix(&l.name))
            .map(|l| l.name)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn finish<N: Copy>(source: Option<N>, columns: Vec<AovColumn<N>>, chain: MergeChain<N>) -> BuildOutcome<N> {
    match (chain.head, chain.tail) {
        (Some(head), Some(output)) => BuildOutcome::Built(Network {
            source,
            columns,
            head,
            merges: chain.merges,
            output,
        }),
        _ => BuildOutcome::NoMatches,
    }
}

fn create_read<G: NodeGraph>(graph: &mut G, path: &Path) -> Result<G::Node> {
    let file = path.to_string_lossy().replace('\\', "/");
    let node = graph.create_node(NodeType::Read, &[(P_FILE, file.as_str().into())])?;
    graph.set_selected(node, false)?;
    debug!("Read {:?}: {}", node, file);
    Ok(node)
}

fn create_shuffle<G: NodeGraph>(graph: &mut G, layer: &str, input: G::Node, label: &str) -> Result<G::Node> {
    let node = graph.create_node(NodeType::Shuffle, &[(P_IN1, layer.into()), (P_LABEL, label.into())])?;
    graph.set_input(node, 0, input)?;
    graph.set_selected(node, false)?;
    debug!("Shuffle {:?}: {}", node, layer);
    Ok(node)
}

/// `plus` merge of `a` (slot 0) over the running total `b` (slot 1)
fn create_merge<G: NodeGraph>(graph: &mut G, a: G::Node, b: G::Node) -> Result<G::Node> {
    let node = graph.create_node(NodeType::Merge, &[])?;
    graph.set_param(node, P_OPERATION, OP_PLUS.into())?;
    graph.set_input(node, 0, a)?;
    graph.set_input(node, 1, b)?;
    graph.set_selected(node, false)?;
    debug!("Merge {:?}", node);
    Ok(node)
}

fn create_dot<G: NodeGraph>(graph: &mut G, input: G::Node) -> Result<G::Node> {
    let node = graph.create_node(NodeType::Dot, &[])?;
    graph.set_input(node, 0, input)?;
    graph.set_selected(node, false)?;
    Ok(node)
}
