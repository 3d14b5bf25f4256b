//! Error types for enumeration and matching.
//!
//! Errors are scoped: host-side failures cost one sentence, fragment-side
//! failures cost one query, and only a corpus inconsistency aborts a batch.

use std::fmt;

use semfrag_common::GraphError;
use thiserror::Error;

/// Which graph of a (fragment, host) pair an error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphSide {
    /// The corpus sentence being searched.
    Host,
    /// The fragment being searched for.
    Fragment,
}

impl fmt::Display for GraphSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Errors that can occur while enumerating fragments or matching them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// An edge's position marker does not resolve inside its graph.
    #[error("{side} edge {edge} has a position marker outside its graph")]
    MissingMarker {
        /// Graph the edge came from.
        side: GraphSide,
        /// Rendered edge.
        edge: String,
    },

    /// A node label is absent from the corpus label index.
    #[error("{side} label '{label}' is not present in the label index")]
    UnknownLabel {
        /// Graph the label came from.
        side: GraphSide,
        /// The offending label.
        label: String,
    },

    /// The search budget ran out or the search was cancelled.
    #[error("search aborted after {steps} steps")]
    Aborted {
        /// Steps consumed when the search stopped.
        steps: u64,
    },

    /// Corpus bookkeeping disagrees with itself; not recoverable.
    #[error("corpus inconsistency: {0}")]
    CorpusInconsistency(String),
}

impl SearchError {
    /// Create a missing marker error.
    pub fn missing_marker(side: GraphSide, edge: impl Into<String>) -> Self {
        Self::MissingMarker {
            side,
            edge: edge.into(),
        }
    }

    /// Create an unknown label error.
    pub fn unknown_label(side: GraphSide, label: impl Into<String>) -> Self {
        Self::UnknownLabel {
            side,
            label: label.into(),
        }
    }

    /// Create a corpus inconsistency error.
    pub fn inconsistency(msg: impl Into<String>) -> Self {
        Self::CorpusInconsistency(msg.into())
    }

    /// Lift a graph error onto one side of the pair.
    pub fn from_graph(side: GraphSide, err: GraphError) -> Self {
        match err {
            GraphError::DanglingEdge { edge, .. } => Self::missing_marker(side, edge),
            GraphError::UnknownLabel { label } => Self::unknown_label(side, label),
        }
    }

    /// The graph this error is attributed to, if any.
    pub const fn side(&self) -> Option<GraphSide> {
        match self {
            Self::MissingMarker { side, .. } | Self::UnknownLabel { side, .. } => Some(*side),
            Self::Aborted { .. } | Self::CorpusInconsistency(_) => None,
        }
    }
}
