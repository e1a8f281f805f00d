//! Layout helpers for generated networks.
//!
//! ```text
//!  Read   Read   Read          multi-file: one Read per column
//!   |      |      |
//!  Shuf   Shuf   Shuf          +150
//!   |      |      |
//!   o ---- M ---- M            +300 (first column: Dot at +303)
//! ```

use anyhow::Result;

use super::host::NodeGraph;
use crate::entities::keys::COLUMN_STEP;

/// X that centres `candidate` under `reference`:
/// `reference.x + reference.w / 2 - candidate.w / 2`
pub fn center_x<G: NodeGraph>(graph: &G, reference: G::Node, candidate: G::Node) -> Result<f64> {
    let (ref_x, _) = graph.position(reference)?;
    let (ref_w, _) = graph.size(reference)?;
    let (cand_w, _) = graph.size(candidate)?;
    Ok(ref_x + ref_w / 2.0 - cand_w / 2.0)
}

/// Horizontal offset of AOV column `index`
pub fn column_offset(index: usize) -> f64 {
    COLUMN_STEP * index as f64
}

/// Place `node` centred under `reference`, shifted by `dx`, at `y`
pub fn place_centered<G: NodeGraph>(
    graph: &mut G,
    node: G::Node,
    reference: G::Node,
    dx: f64,
    y: f64,
) -> Result<()> {
    let x = center_x(graph, reference, node)? + dx;
    graph.set_position(node, x, y)
}
