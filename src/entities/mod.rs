//! Entities module - AOV catalogues, working sets and the node vocabulary
//!
//! Pure data: nothing here talks to a host graph.

pub mod aov;
pub mod keys;
pub mod node;
pub mod working_set;

pub use aov::{AovDescriptor, AovTable, Level, ParseError, RenderEngine};
pub use node::{ChannelLayer, NodeType, ParamValue};
pub use working_set::{WorkingSet, WorkingSetError};
