//! Error types for graph construction and label lookup.

use thiserror::Error;

/// Errors raised while building or interpreting a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge endpoint does not address a node of its own graph.
    #[error("edge {edge} references a node outside the graph ({nodes} nodes)")]
    DanglingEdge {
        /// Rendered edge.
        edge: String,
        /// Node count of the graph the edge was added to.
        nodes: usize,
    },

    /// A node label is absent from the reference index (the "alien" case).
    #[error("label '{label}' is not present in the label index")]
    UnknownLabel {
        /// The offending label.
        label: String,
    },
}

impl GraphError {
    /// Create an unknown label error.
    pub fn unknown_label(label: impl Into<String>) -> Self {
        Self::UnknownLabel {
            label: label.into(),
        }
    }
}
