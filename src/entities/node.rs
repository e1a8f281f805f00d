//! Node vocabulary shared by the builder and every host.
//!
//! The builder never touches a concrete compositor API. It speaks in terms of
//! four node types, a handful of typed parameter values and channel layers:
//! - `Read`    - loads one image file
//! - `Shuffle` - isolates one named channel layer onto rgba
//! - `Merge`   - combines two inputs (always `plus` here)
//! - `Dot`     - zero-effect pass-through used for layout
//!
//! Hosts map these onto their own classes (e.g. Nuke's `Shuffle2`).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::keys::{CH_BLUE, CH_GREEN, CH_RED};

/// Node classes the builder can ask a host to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Read,
    Shuffle,
    Merge,
    Dot,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [NodeType::Read, NodeType::Shuffle, NodeType::Merge, NodeType::Dot];

    /// Type name as written into graph descriptions
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Read => "Read",
            NodeType::Shuffle => "Shuffle",
            NodeType::Merge => "Merge",
            NodeType::Dot => "Dot",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed parameter value passed to `NodeGraph::set_param`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

/// One channel layer of an image: `diffuse` with `red`, `green`, `blue`.
///
/// Channel names are the short Nuke-style names (`red`, `green`, `blue`,
/// `alpha`, or whatever custom suffix the file uses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLayer {
    pub name: String,
    pub channels: Vec<String>,
}

impl ChannelLayer {
    pub fn new(name: impl Into<String>, channels: &[&str]) -> Self {
        Self {
            name: name.into(),
            channels: channels.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// True if at least one of red/green/blue is present
    pub fn has_color(&self) -> bool {
        self.channels
            .iter()
            .any(|c| c == CH_RED || c == CH_GREEN || c == CH_BLUE)
    }
}
