//! Parameter, channel and layout constants.
//!
//! Avoid string typos, enable IDE autocomplete.
//! Usage: `host.set_param(node, P_OPERATION, OP_PLUS.into())`

// === Node parameters ===
/// Read: file path
pub const P_FILE: &str = "file";
/// Shuffle: input layer to isolate
pub const P_IN1: &str = "in1";
/// Any node: label drawn under the node name
pub const P_LABEL: &str = "label";
/// Merge: blending operation
pub const P_OPERATION: &str = "operation";

// === Parameter values ===
/// Additive merge operation
pub const OP_PLUS: &str = "plus";
/// Whole-file layer used when each AOV lives in its own file
pub const LAYER_RGBA: &str = "rgba";

// === Channels ===
pub const CH_RED: &str = "red";
pub const CH_GREEN: &str = "green";
pub const CH_BLUE: &str = "blue";
pub const CH_ALPHA: &str = "alpha";

// === Layout (graph units) ===
/// Horizontal distance between AOV columns
pub const COLUMN_STEP: f64 = 150.0;
/// Multi-file: Read row -> Shuffle row
pub const MULTI_SHUFFLE_OFFSET: f64 = 150.0;
/// Multi-file: Read row -> Merge row
pub const MULTI_MERGE_OFFSET: f64 = 300.0;
/// Multi-file: Read row -> first pass-through Dot
pub const MULTI_DOT_OFFSET: f64 = 303.0;
/// Single-file: Read row -> Dot row
pub const SINGLE_DOT_ROW: f64 = 125.0;
/// Single-file: Dot row -> Shuffle row
pub const SINGLE_SHUFFLE_OFFSET: f64 = 50.0;
/// Single-file: Dot row -> Merge row
pub const SINGLE_MERGE_OFFSET: f64 = 200.0;
/// Single-file: Dot row -> first pass-through Dot
pub const SINGLE_TAIL_DOT_OFFSET: f64 = 203.0;

// === Files ===
/// File filter used when prompting for a render
pub const EXR_FILTER: &str = "*.exr";
/// Extensions scanned by default in multi-file mode
pub const DEFAULT_EXTENSIONS: &[&str] = &["exr"];
