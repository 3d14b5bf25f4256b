//! JSON-lines sentence reader.
//!
//! One record per non-blank line:
//!
//! ```text
//! {"sentence": "John eats an apple", "nodes": ["john", "eat", "an", "apple"],
//!  "edges": [["ncsubj", 1, 0], ["dobj", 1, 3], ["det", 3, 2]]}
//! ```
//!
//! Edges are `[relation, head position, dependent position]`.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FormatError, FormatErrorKind, GraphSource, ParsedSentence};
use crate::graph::{Edge, Graph, Node, Position};

#[derive(Debug, Serialize, Deserialize)]
struct SentenceRecord {
    sentence: String,
    nodes: Vec<String>,
    edges: Vec<(String, u32, u32)>,
}

impl ParsedSentence {
    /// Encodes this sentence as one JSON line understood by [`JsonLinesReader`].
    pub fn to_json_line(&self) -> String {
        let record = SentenceRecord {
            sentence: self.sentence.clone(),
            nodes: self
                .graph
                .nodes()
                .iter()
                .map(|n| n.label().to_owned())
                .collect(),
            edges: self
                .graph
                .edges()
                .iter()
                .map(|e| {
                    (
                        e.relation().to_owned(),
                        e.head().as_usize() as u32,
                        e.dep().as_usize() as u32,
                    )
                })
                .collect(),
        };
        // A record of strings and integers always serializes.
        serde_json::to_string(&record).unwrap_or_default()
    }
}

/// Reads [`ParsedSentence`] records from JSON lines.
pub struct JsonLinesReader<R> {
    lines: Lines<R>,
    line_no: usize,
    pending: Option<(usize, std::io::Result<String>)>,
    failed: bool,
}

impl JsonLinesReader<BufReader<File>> {
    /// Opens a file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            FormatError::new(format!("cannot open {}: {e}", path.display()))
                .with_kind(FormatErrorKind::Io)
        })?;
        debug!("reading sentences from {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesReader<R> {
    /// Wraps any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            pending: None,
            failed: false,
        }
    }

    fn fill(&mut self) {
        while self.pending.is_none() && !self.failed {
            let Some(next) = self.lines.next() else {
                return;
            };
            self.line_no += 1;
            match next {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.pending = Some((self.line_no, Ok(line))),
                Err(e) => self.pending = Some((self.line_no, Err(e))),
            }
        }
    }

    fn decode(line_no: usize, line: String) -> Result<ParsedSentence, FormatError> {
        let record: SentenceRecord = serde_json::from_str(&line).map_err(|e| {
            FormatError::new(format!("malformed sentence record: {e}"))
                .with_kind(FormatErrorKind::Syntax)
                .at_line(line_no, line.clone())
        })?;

        let nodes = record.nodes.into_iter().map(Node::new).collect();
        let edges = record
            .edges
            .into_iter()
            .map(|(rel, head, dep)| Edge::new(rel, Position::new(head), Position::new(dep)))
            .collect();

        let graph = Graph::new(nodes, edges).map_err(|e| {
            FormatError::new(e.to_string())
                .with_kind(FormatErrorKind::DanglingEdge)
                .at_line(line_no, line.clone())
        })?;

        Ok(ParsedSentence::new(record.sentence, graph))
    }
}

impl<R: BufRead> GraphSource for JsonLinesReader<R> {
    fn has_next(&mut self) -> bool {
        self.fill();
        self.pending.is_some()
    }

    fn next_sentence(&mut self) -> Result<ParsedSentence, FormatError> {
        self.fill();
        match self.pending.take() {
            None => Err(FormatError::exhausted()),
            // The undecodable line is already consumed, so the next one is readable.
            Some((line_no, Err(e))) if e.kind() == ErrorKind::InvalidData => {
                Err(FormatError::new(format!("undecodable line: {e}"))
                    .with_kind(FormatErrorKind::Syntax)
                    .at_line(line_no, String::new()))
            }
            Some((line_no, Err(e))) => {
                self.failed = true;
                Err(FormatError::new(format!("read failed: {e}"))
                    .with_kind(FormatErrorKind::Io)
                    .at_line(line_no, String::new()))
            }
            Some((line_no, Ok(line))) => Self::decode(line_no, line),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    fn reader(text: &str) -> JsonLinesReader<Cursor<Vec<u8>>> {
        JsonLinesReader::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn reads_records_and_skips_blank_lines() {
        let mut r = reader(
            "{\"sentence\":\"john eats\",\"nodes\":[\"john\",\"eat\"],\"edges\":[[\"ncsubj\",1,0]]}\n\n\
             {\"sentence\":\"rain\",\"nodes\":[\"rain\"],\"edges\":[]}\n",
        );
        assert!(r.has_next());
        let first = r.next_sentence().unwrap();
        assert_eq!(first.sentence, "john eats");
        assert_eq!(first.graph.describe_edge(&first.graph.edges()[0]), "ncsubj eat john");
        let second = r.next_sentence().unwrap();
        assert_eq!(second.graph.node_count(), 1);
        assert!(!r.has_next());
        assert_eq!(r.next_sentence().unwrap_err().kind, Some(FormatErrorKind::Exhausted));
    }

    #[test]
    fn syntax_error_carries_line() {
        let mut r = reader("{\"sentence\":\"ok\",\"nodes\":[],\"edges\":[]}\nnot json\n");
        r.next_sentence().unwrap();
        let err = r.next_sentence().unwrap_err();
        assert_eq!(err.kind, Some(FormatErrorKind::Syntax));
        assert_eq!(err.line_no, Some(2));
        assert_eq!(err.line.as_deref(), Some("not json"));
        assert!(!r.has_next());
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let mut bytes = b"{\"sentence\":\"a\",\"nodes\":[],\"edges\":[]}\n".to_vec();
        bytes.extend_from_slice(b"\xff\xfe{\"sentence\":\"?\"}\n");
        bytes.extend_from_slice(b"{\"sentence\":\"b\",\"nodes\":[],\"edges\":[]}\n");
        let mut r = JsonLinesReader::new(Cursor::new(bytes));

        assert_eq!(r.next_sentence().unwrap().sentence, "a");
        let err = r.next_sentence().unwrap_err();
        assert_eq!(err.kind, Some(FormatErrorKind::Syntax));
        assert_eq!(err.line_no, Some(2));
        assert!(r.has_next());
        assert_eq!(r.next_sentence().unwrap().sentence, "b");
        assert!(!r.has_next());
    }

    #[test]
    fn dangling_edge_is_a_format_error() {
        let mut r = reader("{\"sentence\":\"x\",\"nodes\":[\"a\"],\"edges\":[[\"r\",0,5]]}\n");
        let err = r.next_sentence().unwrap_err();
        assert_eq!(err.kind, Some(FormatErrorKind::DanglingEdge));
        assert_eq!(err.line_no, Some(1));
    }

    #[test]
    fn json_line_round_trips_through_file() {
        let mut b = Graph::builder();
        let eat = b.node("eat");
        let apple = b.node("apple");
        b.edge("dobj", eat, apple);
        let sentence = ParsedSentence::new("eat apple", b.build().unwrap());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", sentence.to_json_line()).unwrap();

        let mut r = JsonLinesReader::open(file.path()).unwrap();
        assert_eq!(r.next_sentence().unwrap(), sentence);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = JsonLinesReader::open("/definitely/not/here.jsonl").err().unwrap();
        assert_eq!(err.kind, Some(FormatErrorKind::Io));
    }
}
