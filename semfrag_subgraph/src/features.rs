//! Context-feature statistics over the corpus.
//!
//! A feature is a boundary edge seen from inside a fragment: an edge with
//! exactly one endpoint in the fragment, recorded as its relation plus the
//! label of the endpoint outside. Counting the boundary features of every
//! complete fragment of every sentence gives corpus-wide feature frequencies,
//! and the same extraction over a fragment's matches gives its context vector.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexMap;
use semfrag_common::{Config, Graph, LabelId, Position};
use tracing::{debug, info, warn};

use crate::corpus::{Corpus, SentenceId};
use crate::enumerate::{EdgeSet, FragmentEnumerator};
use crate::service::Match;
use crate::util::map_ordered;
use crate::{GraphSide, SearchError};

/// `(relation, outside node label)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Feature {
    /// Relation id in [`Corpus::relations`].
    pub relation: LabelId,
    /// Label id in [`Corpus::nodes`] of the endpoint outside the fragment.
    pub node: LabelId,
}

impl Feature {
    /// Renders the feature as `relation:label`.
    pub fn describe(&self, corpus: &Corpus) -> String {
        format!(
            "{}:{}",
            corpus.relations().label_of(self.relation).unwrap_or("?"),
            corpus.nodes().label_of(self.node).unwrap_or("?")
        )
    }
}

/// Dense feature identifier, assigned in first-seen order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId {
    inner: u32,
}

impl FeatureId {
    /// Wraps the `id`-th feature seen.
    pub const fn new(id: u32) -> Self {
        Self { inner: id }
    }

    /// The id as a slice index.
    pub const fn as_usize(self) -> usize {
        self.inner as usize
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.inner)
    }
}

/// Why a sentence contributed no features.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// More edges than the enumeration limit allows.
    TooLarge {
        /// Edges in the sentence's first parse.
        edges: usize,
        /// The configured limit.
        limit: usize,
    },
    /// Enumeration or feature extraction failed.
    Failed(SearchError),
}

/// A sentence left out of the statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedGraph {
    /// The sentence left out.
    pub sentence: SentenceId,
    /// Why it was left out.
    pub reason: SkipReason,
}

/// Boundary features of `fragment`, one per boundary edge, in edge order.
pub fn boundary_features(
    corpus: &Corpus,
    graph: &Graph,
    fragment: &EdgeSet,
) -> Result<Vec<Feature>, SearchError> {
    let inside: BTreeSet<Position> = fragment.positions(graph);
    let mut out = Vec::new();
    for edge in graph.edges() {
        let outside = match (inside.contains(&edge.head()), inside.contains(&edge.dep())) {
            (true, false) => edge.dep(),
            (false, true) => edge.head(),
            _ => continue,
        };
        let relation = corpus
            .relations()
            .id_of(edge.relation())
            .ok_or_else(|| SearchError::unknown_label(GraphSide::Host, edge.relation()))?;
        let label = graph
            .label_at(outside)
            .ok_or_else(|| SearchError::missing_marker(GraphSide::Host, graph.describe_edge(edge)))?;
        let node = corpus
            .nodes()
            .id_of(label)
            .ok_or_else(|| SearchError::unknown_label(GraphSide::Host, label))?;
        out.push(Feature { relation, node });
    }
    Ok(out)
}

/// Corpus-wide boundary-feature frequencies.
#[derive(Clone, Debug, Default)]
pub struct FeatureStats {
    counts: IndexMap<Feature, u64>,
    skipped: Vec<SkippedGraph>,
}

impl FeatureStats {
    /// Enumerates the fragments of every sentence's first parse and counts
    /// their boundary features.
    ///
    /// Sentences may be processed in parallel, but their counts are merged in
    /// sentence order, so feature ids do not depend on scheduling. Sentences
    /// over `config.enumeration_edge_limit` edges are skipped. A
    /// [`SearchError::CorpusInconsistency`] aborts the build.
    pub fn build(corpus: &Corpus, config: &Config) -> Result<Self, SearchError> {
        let ids: Vec<SentenceId> = corpus.sentence_ids().collect();
        let limit = config.enumeration_edge_limit;

        let per_sentence = map_ordered(&ids, config.parallel, |&id| {
            Self::sentence_features(corpus, id, limit)
        });

        let mut stats = Self::default();
        for (id, result) in ids.into_iter().zip(per_sentence) {
            match result {
                Ok(local) => {
                    for (feature, n) in local {
                        *stats.counts.entry(feature).or_insert(0) += n;
                    }
                }
                Err(SkipReason::Failed(e @ SearchError::CorpusInconsistency(_))) => return Err(e),
                Err(reason) => {
                    warn!("no features for sentence {id}: {reason:?}");
                    stats.skipped.push(SkippedGraph {
                        sentence: id,
                        reason,
                    });
                }
            }
        }

        info!(
            "feature statistics: {} features from {} sentences ({} skipped)",
            stats.counts.len(),
            corpus.len(),
            stats.skipped.len()
        );
        Ok(stats)
    }

    fn sentence_features(
        corpus: &Corpus,
        id: SentenceId,
        limit: Option<usize>,
    ) -> Result<IndexMap<Feature, u64>, SkipReason> {
        let graph = corpus.primary_graph(id).ok_or_else(|| {
            SkipReason::Failed(SearchError::inconsistency(format!(
                "sentence {id} has no parse"
            )))
        })?;
        if let Some(limit) = limit.filter(|&l| graph.edge_count() > l) {
            return Err(SkipReason::TooLarge {
                edges: graph.edge_count(),
                limit,
            });
        }

        let enumerator = FragmentEnumerator::new(graph).map_err(SkipReason::Failed)?;
        let mut local: IndexMap<Feature, u64> = IndexMap::new();
        let mut failure = None;
        let mut fragments = 0usize;
        enumerator.for_each(|set| {
            if failure.is_some() {
                return;
            }
            fragments += 1;
            match boundary_features(corpus, graph, set) {
                Ok(features) => {
                    for f in features {
                        *local.entry(f).or_insert(0) += 1;
                    }
                }
                Err(e) => failure = Some(e),
            }
        });
        debug!("sentence {id}: {fragments} fragments, {} features", local.len());

        match failure {
            Some(e) => Err(SkipReason::Failed(e)),
            None => Ok(local),
        }
    }

    /// Occurrences of `feature`; zero if never seen.
    pub fn count(&self, feature: &Feature) -> u64 {
        self.counts.get(feature).copied().unwrap_or(0)
    }

    /// Id of `feature`, if it occurred in the corpus.
    pub fn id_of(&self, feature: &Feature) -> Option<FeatureId> {
        self.counts
            .get_index_of(feature)
            .map(|i| FeatureId::new(i as u32))
    }

    /// The feature with id `id`.
    pub fn feature(&self, id: FeatureId) -> Option<Feature> {
        self.counts.get_index(id.as_usize()).map(|(f, _)| *f)
    }

    /// `(id, feature, count)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, Feature, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, (f, n))| (FeatureId::new(i as u32), *f, *n))
    }

    /// Sentences that contributed nothing, in sentence order.
    pub fn skipped(&self) -> &[SkippedGraph] {
        &self.skipped
    }

    /// Number of distinct features.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no feature was seen.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Context vector of a fragment: boundary features of every matched
    /// edge-set, keyed by feature id. Features unseen during
    /// [`build`](Self::build) are dropped.
    pub fn vector_for(
        &self,
        corpus: &Corpus,
        matches: &[Match],
    ) -> Result<BTreeMap<FeatureId, u64>, SearchError> {
        let mut vector = BTreeMap::new();
        for m in matches {
            let graph = corpus.primary_graph(m.sentence).ok_or_else(|| {
                SearchError::inconsistency(format!("matched sentence {} has no parse", m.sentence))
            })?;
            for set in &m.edge_sets {
                for feature in boundary_features(corpus, graph, set)? {
                    if let Some(id) = self.id_of(&feature) {
                        *vector.entry(id).or_insert(0) += 1;
                    }
                }
            }
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        let mut b = Corpus::builder();
        b.add_sentence(
            "eat red apple",
            Graph::from_triples(&["eat", "apple", "red"], &[("dobj", 0, 1), ("amod", 1, 2)])
                .unwrap(),
        );
        b.build()
    }

    #[test]
    fn chain_boundaries() {
        let c = corpus();
        let stats = FeatureStats::build(&c, &Config::default()).unwrap();

        // fragments: {amod} sees dobj->eat, {dobj} sees amod->red, {both} sees nothing
        assert_eq!(stats.len(), 2);
        let dobj_eat = Feature {
            relation: c.relations().id_of("dobj").unwrap(),
            node: c.nodes().id_of("eat").unwrap(),
        };
        assert_eq!(stats.count(&dobj_eat), 1);
        assert_eq!(stats.id_of(&dobj_eat), Some(FeatureId::new(0)));
        assert_eq!(dobj_eat.describe(&c), "dobj:eat");
        assert_eq!(stats.feature(FeatureId::new(0)), Some(dobj_eat));
    }

    #[test]
    fn large_sentences_are_skipped() {
        let c = corpus();
        let config = Config::builder().enumeration_edge_limit(Some(1)).build();
        let stats = FeatureStats::build(&c, &config).unwrap();
        assert!(stats.is_empty());
        assert_eq!(
            stats.skipped()[0].reason,
            SkipReason::TooLarge { edges: 2, limit: 1 }
        );
    }

    #[test]
    fn vector_of_a_match() {
        let c = corpus();
        let stats = FeatureStats::build(&c, &Config::default()).unwrap();
        let m = Match {
            sentence: SentenceId::new(0),
            edge_sets: vec![EdgeSet::new([0])],
        };
        let v = stats.vector_for(&c, &[m]).unwrap();
        let amod_red = Feature {
            relation: c.relations().id_of("amod").unwrap(),
            node: c.nodes().id_of("red").unwrap(),
        };
        let id = stats.id_of(&amod_red).unwrap();
        assert_eq!(v.get(&id), Some(&1));
        assert_eq!(v.len(), 1);
    }
}
