//! Per-graph label multisets.

use std::collections::BTreeMap;

use crate::error::GraphError;
use crate::graph::Graph;
use crate::label_index::{LabelId, LabelIndex};

/// Occurrence count of every node label of one graph, keyed by label id.
///
/// Iteration follows ascending label id, which gives the candidate selector
/// a stable label order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordDistribution {
    counts: BTreeMap<LabelId, usize>,
}

impl WordDistribution {
    /// Counts the node labels of `graph` against `index`.
    ///
    /// Fails with [`GraphError::UnknownLabel`] on the first label the index
    /// does not know.
    pub fn of(graph: &Graph, index: &LabelIndex) -> Result<Self, GraphError> {
        let mut counts = BTreeMap::new();
        for node in graph.nodes() {
            let id = index
                .id_of(node.label())
                .ok_or_else(|| GraphError::unknown_label(node.label()))?;
            *counts.entry(id).or_insert(0) += 1;
        }
        Ok(Self { counts })
    }

    /// Occurrences of `label` (zero if absent).
    pub fn count(&self, label: LabelId) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// True if every label required by `requirement` occurs here at least
    /// as often.
    pub fn dominates(&self, requirement: &WordDistribution) -> bool {
        requirement
            .iter()
            .all(|(label, needed)| self.count(label) >= needed)
    }

    /// Iterates `(label, count)` in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (LabelId, usize)> + '_ {
        self.counts.iter().map(|(l, c)| (*l, *c))
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if the graph had no nodes.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of nodes counted.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl FromIterator<(LabelId, usize)> for WordDistribution {
    fn from_iter<T: IntoIterator<Item = (LabelId, usize)>>(iter: T) -> Self {
        let mut counts = BTreeMap::new();
        for (label, count) in iter {
            *counts.entry(label).or_insert(0) += count;
        }
        Self { counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(labels: &[&str]) -> LabelIndex {
        let mut idx = LabelIndex::new();
        for l in labels {
            idx.add(l);
        }
        idx
    }

    #[test]
    fn counts_repeated_labels() {
        let idx = index(&["the", "dog", "bit"]);
        let mut b = Graph::builder();
        let the1 = b.node("the");
        let dog = b.node("dog");
        let bit = b.node("bit");
        let the2 = b.node("the");
        b.edge("det", dog, the1).edge("ncsubj", bit, dog).edge("det", bit, the2);
        let g = b.build().unwrap();

        let dist = WordDistribution::of(&g, &idx).unwrap();
        assert_eq!(dist.count(idx.id_of("the").unwrap()), 2);
        assert_eq!(dist.count(idx.id_of("dog").unwrap()), 1);
        assert_eq!(dist.total(), 4);
        assert_eq!(dist.len(), 3);
    }

    #[test]
    fn unknown_label_is_alien() {
        let idx = index(&["eat"]);
        let mut b = Graph::builder();
        let eat = b.node("eat");
        let kiwi = b.node("kiwi");
        b.edge("dobj", eat, kiwi);
        let g = b.build().unwrap();

        let err = WordDistribution::of(&g, &idx).unwrap_err();
        assert_eq!(err, GraphError::unknown_label("kiwi"));
    }

    #[test]
    fn dominance_is_per_label() {
        let a = LabelId::new(0);
        let b = LabelId::new(1);
        let host: WordDistribution = [(a, 2), (b, 1)].into_iter().collect();
        let need: WordDistribution = [(a, 2)].into_iter().collect();
        let too_many: WordDistribution = [(b, 2)].into_iter().collect();
        assert!(host.dominates(&need));
        assert!(!host.dominates(&too_many));
        assert!(host.dominates(&WordDistribution::default()));
    }
}
