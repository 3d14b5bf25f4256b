use std::collections::{BTreeMap, HashMap};

use semfrag_common::LabelId;

use super::SentenceId;

/// Inverted index: label → occurrence count → sentences with exactly that
/// many nodes of the label.
#[derive(Clone, Debug, Default)]
pub(crate) struct Postings {
    by_label: HashMap<LabelId, BTreeMap<usize, Vec<SentenceId>>>,
}

impl Postings {
    pub fn insert(&mut self, label: LabelId, count: usize, sentence: SentenceId) {
        self.by_label
            .entry(label)
            .or_default()
            .entry(count)
            .or_default()
            .push(sentence);
    }

    /// Sentences with at least `count` nodes labeled `label`, ascending.
    pub fn at_least(&self, label: LabelId, count: usize) -> Vec<SentenceId> {
        let Some(counts) = self.by_label.get(&label) else {
            return Vec::new();
        };
        // Each sentence sits under exactly one count per label, so the union
        // has no duplicates.
        let mut out: Vec<SentenceId> = counts
            .range(count..)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        out.sort_unstable();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_least_unions_higher_counts() {
        let dog = LabelId::new(0);
        let mut p = Postings::default();
        p.insert(dog, 1, SentenceId::new(2));
        p.insert(dog, 2, SentenceId::new(0));
        p.insert(dog, 3, SentenceId::new(1));

        assert_eq!(p.at_least(dog, 2), vec![SentenceId::new(0), SentenceId::new(1)]);
        assert_eq!(p.at_least(dog, 1).len(), 3);
        assert!(p.at_least(dog, 4).is_empty());
        assert!(p.at_least(LabelId::new(9), 1).is_empty());
    }
}
