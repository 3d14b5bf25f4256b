//! The graph source boundary.
//!
//! Corpus and fragment files are turned into [`Graph`] values by a
//! [`GraphSource`]. The matching core only ever sees well-formed graphs;
//! malformed input surfaces here as a [`FormatError`].

mod json;
mod memory;

pub use json::JsonLinesReader;
pub use memory::MemorySource;

use thiserror::Error;

use crate::graph::Graph;

/// A sentence and one parse of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedSentence {
    /// Surface text; identifies the sentence in the corpus.
    pub sentence: String,
    /// The dependency graph of this parse.
    pub graph: Graph,
}

impl ParsedSentence {
    /// Pairs a sentence with its graph.
    pub fn new(sentence: impl Into<String>, graph: Graph) -> Self {
        Self {
            sentence: sentence.into(),
            graph,
        }
    }
}

/// Sequential reader of parsed sentences.
pub trait GraphSource {
    /// True if another record (well-formed or not) is available.
    fn has_next(&mut self) -> bool;

    /// Reads the next record.
    fn next_sentence(&mut self) -> Result<ParsedSentence, FormatError>;
}

/// Closed set of format failure subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The record could not be decoded.
    Syntax,
    /// An edge addresses a node outside its sentence.
    DanglingEdge,
    /// The underlying reader failed.
    Io,
    /// `next_sentence` was called after the source ran dry.
    Exhausted,
}

/// Malformed graph source input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {})", .line_no.map_or_else(|| "?".to_string(), |n| n.to_string()))]
pub struct FormatError {
    /// What went wrong.
    pub message: String,
    /// The offending source line, when one exists.
    pub line: Option<String>,
    /// One-based line number of `line`.
    pub line_no: Option<usize>,
    /// Failure subtype.
    pub kind: Option<FormatErrorKind>,
}

impl FormatError {
    /// Create an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            line_no: None,
            kind: None,
        }
    }

    /// Attach the offending line.
    pub fn at_line(mut self, line_no: usize, line: impl Into<String>) -> Self {
        self.line_no = Some(line_no);
        self.line = Some(line.into());
        self
    }

    /// Attach a subtype.
    pub fn with_kind(mut self, kind: FormatErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Error for a source that has no more records.
    pub fn exhausted() -> Self {
        Self::new("no more sentences").with_kind(FormatErrorKind::Exhausted)
    }
}
