//! Common types shared across the semfrag workspace.
//!
//! This crate provides the dependency-graph model, the label dictionary,
//! word distributions, search configuration, the graph source boundary and
//! the shared scenario cases used by the matcher tests.

mod config;
mod error;
pub mod graph;
mod label_index;
pub mod source;
mod test_cases;
mod word_dist;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::graph::{Edge, Graph, GraphBuilder, Node, Position};
pub use crate::label_index::*;
pub use crate::source::{
    FormatError, FormatErrorKind, GraphSource, JsonLinesReader, MemorySource, ParsedSentence,
};
pub use crate::test_cases::*;
pub use crate::word_dist::*;
