//! Fragment queries against a corpus.
//!
//! For each fragment the service:
//!
//! 1. rejects fragments with labels the corpus never saw ("alien"),
//! 2. prunes the corpus to sentences whose label counts dominate the
//!    fragment's,
//! 3. walks the connected position-selections of each remaining sentence and
//!    keeps the retained edge-sets the fragment is isomorphic to.
//!
//! Host-side errors skip a sentence, fragment-side errors fail the fragment,
//! budget exhaustion aborts the fragment with what was found so far, and a
//! corpus inconsistency fails the whole call.

use std::ops::ControlFlow;

use indexmap::IndexMap;
use semfrag_common::{
    Config, Edge, Graph, GraphError, MatchMode, ParsedSentence, WordDistribution,
};
use tracing::{debug, info, trace, warn};

use crate::budget::{CancelHandle, SearchBudget};
use crate::candidates::CandidateSelector;
use crate::corpus::{Corpus, SentenceId};
use crate::enumerate::EdgeSet;
use crate::matcher::SubgraphMatcher;
use crate::util::map_ordered;
use crate::{GraphSide, SearchError};

/// Every edge-set of one sentence the fragment is isomorphic to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    /// The host sentence.
    pub sentence: SentenceId,
    /// Matched edge-sets, as indices into the sentence's first parse.
    pub edge_sets: Vec<EdgeSet>,
}

/// Result of one fragment query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// The search completed; possibly with no matches.
    Matched(Vec<Match>),
    /// The fragment uses a label absent from the corpus.
    Alien {
        /// First unknown label.
        label: String,
    },
    /// The fragment itself is unusable.
    Failed {
        /// The fragment-side error.
        error: SearchError,
    },
    /// The budget ran out or the query was cancelled.
    Aborted {
        /// Matches found before the search stopped.
        partial: Vec<Match>,
        /// Steps spent.
        steps: u64,
    },
}

impl FragmentOutcome {
    /// Matches carried by this outcome, complete or partial.
    pub fn matches(&self) -> &[Match] {
        match self {
            Self::Matched(m) | Self::Aborted { partial: m, .. } => m,
            Self::Alien { .. } | Self::Failed { .. } => &[],
        }
    }

    /// Total matched edge-sets.
    pub fn edge_set_count(&self) -> usize {
        self.matches().iter().map(|m| m.edge_sets.len()).sum()
    }
}

/// A host sentence left out of a query because of a host-side error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedSentence {
    /// The sentence left out.
    pub sentence: SentenceId,
    /// What went wrong with it.
    pub error: SearchError,
}

/// What one fragment query found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryReport {
    /// Surface text of the fragment.
    pub fragment: String,
    /// How the search ended.
    pub outcome: FragmentOutcome,
    /// Sentences left after corpus pruning.
    pub candidates: usize,
    /// Sentences dropped because of host-side errors.
    pub skipped: Vec<SkippedSentence>,
}

impl QueryReport {
    fn new(fragment: &str, outcome: FragmentOutcome, candidates: usize, skipped: Vec<SkippedSentence>) -> Self {
        Self {
            fragment: fragment.to_owned(),
            outcome,
            candidates,
            skipped,
        }
    }

    fn early(fragment: &str, outcome: FragmentOutcome) -> Self {
        Self::new(fragment, outcome, 0, Vec::new())
    }

    /// Applies the error scoping to the per-sentence results of one query.
    ///
    /// A corpus inconsistency is returned as `Err` and a fragment-side error
    /// fails the fragment. A host-side error only skips its sentence; an
    /// abort keeps the matches found before it.
    fn collect(
        fragment: &str,
        results: impl ExactSizeIterator<Item = (SentenceId, Result<Option<Match>, SearchError>)>,
    ) -> Result<Self, SearchError> {
        let candidates = results.len();
        let mut matches = Vec::new();
        let mut skipped = Vec::new();
        let mut aborted = None;
        for (id, result) in results {
            match result {
                Ok(Some(m)) => matches.push(m),
                Ok(None) => {}
                Err(e @ SearchError::CorpusInconsistency(_)) => return Err(e),
                Err(SearchError::Aborted { steps }) => {
                    aborted = Some(aborted.map_or(steps, |s: u64| s.max(steps)));
                }
                Err(error) if error.side() == Some(GraphSide::Fragment) => {
                    warn!("fragment '{fragment}' failed on sentence {id}: {error}");
                    return Ok(Self::new(fragment, FragmentOutcome::Failed { error }, candidates, skipped));
                }
                Err(error) => {
                    warn!("sentence {id} skipped for '{fragment}': {error}");
                    skipped.push(SkippedSentence { sentence: id, error });
                }
            }
        }

        let outcome = match aborted {
            Some(steps) => {
                warn!("fragment '{fragment}' aborted after {steps} steps");
                FragmentOutcome::Aborted {
                    partial: matches,
                    steps,
                }
            }
            None => FragmentOutcome::Matched(matches),
        };
        info!(
            "fragment '{fragment}': {} edge-sets in {} sentences",
            outcome.edge_set_count(),
            outcome.matches().len()
        );
        Ok(Self::new(fragment, outcome, candidates, skipped))
    }
}

/// Reports of a batch, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One report per distinct fragment.
    pub reports: Vec<QueryReport>,
}

impl BatchReport {
    /// Matches of every fragment whose search completed, keyed by fragment text.
    pub fn matches(&self) -> IndexMap<&str, &[Match]> {
        self.reports
            .iter()
            .filter_map(|r| match &r.outcome {
                FragmentOutcome::Matched(m) => Some((r.fragment.as_str(), m.as_slice())),
                _ => None,
            })
            .collect()
    }

    /// Fragments rejected as alien, with the offending label.
    pub fn aliens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            FragmentOutcome::Alien { label } => Some((r.fragment.as_str(), label.as_str())),
            _ => None,
        })
    }

    /// The report of `fragment`, if the batch ran it.
    pub fn report(&self, fragment: &str) -> Option<&QueryReport> {
        self.reports.iter().find(|r| r.fragment == fragment)
    }

    /// Number of distinct fragments run.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// True if the batch ran no fragment.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Answers fragment queries against one corpus.
pub struct FragmentMatchService<'c> {
    corpus: &'c Corpus,
    config: Config,
    cancel: CancelHandle,
}

impl<'c> FragmentMatchService<'c> {
    /// A service over `corpus` with its own cancel handle.
    pub fn new(corpus: &'c Corpus, config: Config) -> Self {
        Self {
            corpus,
            config,
            cancel: CancelHandle::new(),
        }
    }

    /// The corpus queries run against.
    pub fn corpus(&self) -> &'c Corpus {
        self.corpus
    }

    /// Settings applied to every query.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Cancels every query of this service that is running or starts later,
    /// until [`CancelHandle::reset`] is called.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Runs every fragment in order.
    ///
    /// A fragment text seen earlier in the batch is skipped. Only a
    /// [`SearchError::CorpusInconsistency`] stops the batch.
    pub fn query_batch<'a>(
        &self,
        fragments: impl IntoIterator<Item = &'a ParsedSentence>,
    ) -> Result<BatchReport, SearchError> {
        let mut batch = BatchReport::default();
        for parsed in fragments {
            if batch.report(&parsed.sentence).is_some() {
                debug!("duplicate fragment '{}' skipped", parsed.sentence);
                continue;
            }
            let report = self.query(&parsed.sentence, &parsed.graph)?;
            batch.reports.push(report);
        }
        info!("batch finished: {} fragments", batch.len());
        Ok(batch)
    }

    /// Finds every sentence with an edge-set isomorphic to `fragment`.
    pub fn query(&self, text: &str, fragment: &Graph) -> Result<QueryReport, SearchError> {
        let requirement = match WordDistribution::of(fragment, self.corpus.nodes()) {
            Ok(r) => r,
            Err(GraphError::UnknownLabel { label }) => {
                info!("fragment '{text}' is alien: unknown label '{label}'");
                return Ok(QueryReport::early(text, FragmentOutcome::Alien { label }));
            }
            Err(e) => {
                let error = SearchError::from_graph(GraphSide::Fragment, e);
                return Ok(QueryReport::early(text, FragmentOutcome::Failed { error }));
            }
        };

        let matcher = match SubgraphMatcher::new(fragment, self.corpus.nodes()) {
            Ok(m) => m,
            Err(error) => {
                warn!("fragment '{text}' cannot be matched: {error}");
                return Ok(QueryReport::early(text, FragmentOutcome::Failed { error }));
            }
        };

        let candidates = self.corpus.candidate_sentences(&requirement);
        debug!("fragment '{text}': {} candidate sentences", candidates.len());

        let budget = SearchBudget::from_config(&self.config, self.cancel.clone());
        let results = map_ordered(&candidates, self.config.parallel, |&id| {
            self.match_sentence(id, &matcher, &requirement, &budget)
        });
        QueryReport::collect(text, candidates.iter().copied().zip(results))
    }

    fn match_sentence(
        &self,
        id: SentenceId,
        matcher: &SubgraphMatcher<'_, '_>,
        requirement: &WordDistribution,
        budget: &SearchBudget,
    ) -> Result<Option<Match>, SearchError> {
        let host = self
            .corpus
            .primary_graph(id)
            .ok_or_else(|| SearchError::inconsistency(format!("candidate {id} has no parse")))?;
        let selector = CandidateSelector::new(host, requirement, self.corpus.nodes())?;
        trace!(
            "sentence {id}: {} position selections",
            selector.selection_count()
        );

        let mut edge_sets: Vec<EdgeSet> = Vec::new();
        let _flow = selector.for_each_connected(budget, |_, retained| {
            let edges: Vec<&Edge> = retained.iter().filter_map(|&i| host.edges().get(i)).collect();
            if matcher.is_exact_match(host, &edges, budget)? {
                edge_sets.push(EdgeSet::new(retained.iter().copied()));
                if self.config.match_mode == MatchMode::First {
                    return Ok(ControlFlow::Break(()));
                }
            }
            Ok(ControlFlow::Continue(()))
        })?;

        Ok((!edge_sets.is_empty()).then(|| Match {
            sentence: id,
            edge_sets,
        }))
    }
}
