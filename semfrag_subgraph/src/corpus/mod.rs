//! The host corpus: every parsed sentence plus the indexes used to prune it.
//!
//! A [`Corpus`] is built once through a [`CorpusBuilder`] and then only
//! read, so queries can share it across threads.

mod postings;

use std::fmt;

use semfrag_common::{FormatError, FormatErrorKind, Graph, GraphSource, LabelId, LabelIndex, WordDistribution};
use tracing::{debug, info, warn};

use postings::Postings;

/// Dense identifier of a corpus sentence, in insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SentenceId {
    inner: u32,
}

impl SentenceId {
    /// Wraps the `id`-th sentence added.
    #[contracts::ensures(ret.inner == id)]
    pub const fn new(id: u32) -> Self {
        Self { inner: id }
    }

    /// The id as a slice index.
    pub const fn as_usize(self) -> usize {
        self.inner as usize
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.inner)
    }
}

impl From<LabelId> for SentenceId {
    fn from(id: LabelId) -> Self {
        Self::new(id.as_usize() as u32)
    }
}

/// Outcome of pulling a [`GraphSource`] into a builder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Parses added.
    pub added: usize,
    /// Records that could not be read; each was skipped.
    pub errors: Vec<FormatError>,
}

/// Accumulates sentences and registers their labels.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    nodes: LabelIndex,
    relations: LabelIndex,
    sentences: LabelIndex,
    parses: Vec<Vec<Graph>>,
    distributions: Vec<WordDistribution>,
}

impl CorpusBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one parse of `sentence`.
    ///
    /// A sentence seen before keeps its id and gains another parse. Its
    /// word distribution always comes from the first parse.
    pub fn add_sentence(&mut self, sentence: &str, graph: Graph) -> SentenceId {
        let id = SentenceId::from(self.sentences.add(sentence));

        for edge in graph.edges() {
            self.relations.add(edge.relation());
        }
        let counts: Vec<(LabelId, usize)> = graph
            .nodes()
            .iter()
            .map(|n| (self.nodes.add(n.label()), 1))
            .collect();

        if id.as_usize() == self.parses.len() {
            self.parses.push(vec![graph]);
            self.distributions.push(counts.into_iter().collect());
        } else if let Some(parses) = self.parses.get_mut(id.as_usize()) {
            parses.push(graph);
        }
        id
    }

    /// Reads `source` to the end, skipping malformed records.
    pub fn ingest<S: GraphSource>(&mut self, source: &mut S) -> IngestReport {
        let mut report = IngestReport::default();
        while source.has_next() {
            match source.next_sentence() {
                Ok(parsed) => {
                    self.add_sentence(&parsed.sentence, parsed.graph);
                    report.added += 1;
                }
                Err(e) if e.kind == Some(FormatErrorKind::Exhausted) => break,
                Err(e) => {
                    warn!("skipping corpus record: {e}");
                    report.errors.push(e);
                }
            }
        }
        debug!(
            "ingested {} parses, {} malformed records",
            report.added,
            report.errors.len()
        );
        report
    }

    /// Freezes the corpus and builds the posting lists.
    pub fn build(self) -> Corpus {
        let mut postings = Postings::default();
        for (i, dist) in self.distributions.iter().enumerate() {
            let id = SentenceId::from(LabelId::from(i));
            for (label, count) in dist.iter() {
                postings.insert(label, count, id);
            }
        }
        info!(
            "corpus: {} sentences, {} node labels, {} relations",
            self.parses.len(),
            self.nodes.len(),
            self.relations.len()
        );
        Corpus {
            nodes: self.nodes,
            relations: self.relations,
            sentences: self.sentences,
            parses: self.parses,
            distributions: self.distributions,
            postings,
        }
    }
}

/// Read-only sentence store with label and relation indexes.
#[derive(Debug)]
pub struct Corpus {
    nodes: LabelIndex,
    relations: LabelIndex,
    sentences: LabelIndex,
    parses: Vec<Vec<Graph>>,
    distributions: Vec<WordDistribution>,
    postings: Postings,
}

impl Corpus {
    /// Starts an empty corpus.
    pub fn builder() -> CorpusBuilder {
        CorpusBuilder::new()
    }

    /// Node label index shared by every query against this corpus.
    pub fn nodes(&self) -> &LabelIndex {
        &self.nodes
    }

    /// Relation index, used to name boundary features.
    pub fn relations(&self) -> &LabelIndex {
        &self.relations
    }

    /// Every sentence id, ascending.
    pub fn sentence_ids(&self) -> impl Iterator<Item = SentenceId> {
        (0..self.parses.len()).map(|i| SentenceId::from(LabelId::from(i)))
    }

    /// Surface text of a sentence.
    pub fn sentence_text(&self, id: SentenceId) -> Option<&str> {
        self.sentences.label_of(LabelId::new(id.as_usize() as u32))
    }

    /// Id of the sentence with this surface text.
    pub fn id_of(&self, sentence: &str) -> Option<SentenceId> {
        self.sentences.id_of(sentence).map(SentenceId::from)
    }

    /// Every parse of a sentence, in insertion order.
    pub fn parses(&self, id: SentenceId) -> &[Graph] {
        self.parses
            .get(id.as_usize())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The parse used for matching and statistics.
    pub fn primary_graph(&self, id: SentenceId) -> Option<&Graph> {
        self.parses(id).first()
    }

    /// Label counts of the first parse.
    pub fn distribution(&self, id: SentenceId) -> Option<&WordDistribution> {
        self.distributions.get(id.as_usize())
    }

    /// Sentences whose first parse has at least the label counts of
    /// `requirement`, ascending.
    ///
    /// Starts from the shortest posting list among the required labels and
    /// filters it by full dominance. An empty requirement selects nothing.
    pub fn candidate_sentences(&self, requirement: &WordDistribution) -> Vec<SentenceId> {
        let mut smallest: Option<Vec<SentenceId>> = None;
        for (label, count) in requirement.iter() {
            let list = self.postings.at_least(label, count);
            if list.is_empty() {
                return Vec::new();
            }
            if smallest.as_ref().is_none_or(|s| list.len() < s.len()) {
                smallest = Some(list);
            }
        }

        smallest
            .unwrap_or_default()
            .into_iter()
            .filter(|id| {
                self.distribution(*id)
                    .is_some_and(|d| d.dominates(requirement))
            })
            .collect()
    }

    /// Number of distinct sentences.
    pub fn len(&self) -> usize {
        self.parses.len()
    }

    /// True if no sentence was added.
    pub fn is_empty(&self) -> bool {
        self.parses.is_empty()
    }
}

#[cfg(test)]
impl Corpus {
    /// Forgets the parses of `id` while keeping it in the posting lists.
    pub(crate) fn drop_parses(&mut self, id: SentenceId) {
        if let Some(parses) = self.parses.get_mut(id.as_usize()) {
            parses.clear();
        }
    }
}
