//! AOV Compositor - AOV network generator library
//!
//! Re-exports all modules for use by the binary and the Python extension.

// Network generation (host trait, builder, layout, export)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod utils;

// Re-export commonly used types from core
pub use crate::core::{BuildOutcome, InputMode, MemoryGraph, Network, NetworkBuilder, NodeGraph};

// Re-export entities
pub use entities::{AovTable, ChannelLayer, Level, NodeType, ParamValue, RenderEngine, WorkingSet};
