use std::collections::VecDeque;

use super::{FormatError, GraphSource, ParsedSentence};

/// A [`GraphSource`] over records already held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    records: VecDeque<Result<ParsedSentence, FormatError>>,
}

impl MemorySource {
    /// A source yielding `sentences` in order.
    pub fn new(sentences: impl IntoIterator<Item = ParsedSentence>) -> Self {
        Self {
            records: sentences.into_iter().map(Ok).collect(),
        }
    }

    /// A source that may also yield failures, for exercising error paths.
    pub fn from_records(
        records: impl IntoIterator<Item = Result<ParsedSentence, FormatError>>,
    ) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }
}

impl GraphSource for MemorySource {
    fn has_next(&mut self) -> bool {
        !self.records.is_empty()
    }

    fn next_sentence(&mut self) -> Result<ParsedSentence, FormatError> {
        self.records
            .pop_front()
            .unwrap_or_else(|| Err(FormatError::exhausted()))
    }
}
