//! Network generation: host interface, builder, layout, recording graph, export
//!
//! Independent of any front-end; the CLI and the Python extension both drive
//! `NetworkBuilder` through a `NodeGraph` host.

pub mod builder;
pub mod export;
pub mod host;
pub mod layout;
pub mod memory_graph;

// Re-exports for convenience
pub use builder::{AovColumn, BuildOutcome, InputMode, Network, NetworkBuilder};
pub use export::ExportFormat;
pub use host::{NodeGraph, NodeRegistry};
pub use memory_graph::{MemNode, MemoryGraph, NodeId};
