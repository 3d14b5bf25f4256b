//! Position-selection over a host sentence.
//!
//! For every label the fragment needs `k` times, the selector picks `k`
//! distinct host positions carrying that label. Per-label choices are
//! combinations, so one set of positions is produced once regardless of order,
//! and the cross product over labels is walked depth-first in ascending
//! label-id order.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;

use itertools::Itertools;
use semfrag_common::{Graph, LabelId, LabelIndex, Position, WordDistribution};
use tracing::trace;

use crate::budget::SearchBudget;
use crate::{GraphSide, SearchError};

/// Host positions grouped by label id, in sentence order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Buckets {
    buckets: BTreeMap<LabelId, Vec<Position>>,
}

impl Buckets {
    /// One bucket per label of `requirement`; labels missing from the host get
    /// an empty bucket.
    pub fn for_host(host: &Graph, requirement: &WordDistribution, index: &LabelIndex) -> Self {
        let mut buckets: BTreeMap<LabelId, Vec<Position>> = requirement
            .iter()
            .map(|(label, _)| (label, Vec::new()))
            .collect();
        for (pos, node) in host.positioned_nodes() {
            let Some(id) = index.id_of(node.label()) else {
                continue;
            };
            if let Some(bucket) = buckets.get_mut(&id) {
                bucket.push(pos);
            }
        }
        Self { buckets }
    }

    /// Host positions labeled `label`; empty for labels outside the requirement.
    pub fn get(&self, label: LabelId) -> &[Position] {
        self.buckets.get(&label).map(Vec::as_slice).unwrap_or_default()
    }
}

/// The positions chosen for every required label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionSelection {
    chosen: BTreeMap<LabelId, Vec<Position>>,
}

impl PositionSelection {
    /// A selection with nothing chosen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the choice for `label`.
    pub fn set(&mut self, label: LabelId, positions: Vec<Position>) {
        self.chosen.insert(label, positions);
    }

    /// Drops the choice for `label`.
    pub fn clear(&mut self, label: LabelId) {
        self.chosen.remove(&label);
    }

    /// Positions chosen for `label`, in sentence order.
    pub fn positions_for(&self, label: LabelId) -> &[Position] {
        self.chosen.get(&label).map(Vec::as_slice).unwrap_or_default()
    }

    /// True if `pos` was chosen for `label`.
    pub fn contains(&self, label: LabelId, pos: Position) -> bool {
        self.positions_for(label).contains(&pos)
    }

    /// Every chosen position, ascending.
    pub fn positions(&self) -> BTreeSet<Position> {
        self.chosen.values().flatten().copied().collect()
    }

    /// Number of chosen positions across all labels.
    pub fn len(&self) -> usize {
        self.chosen.values().map(Vec::len).sum()
    }

    /// True if no position is chosen.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A host edge whose endpoint labels are both known to the index.
#[derive(Clone, Copy, Debug)]
struct HostEdge {
    index: usize,
    head: (LabelId, Position),
    dep: (LabelId, Position),
}

/// Walks the connected position-selections of one host sentence.
pub struct CandidateSelector<'a> {
    host: &'a Graph,
    requirement: Vec<(LabelId, usize)>,
    buckets: Buckets,
    host_edges: Vec<HostEdge>,
}

impl<'a> CandidateSelector<'a> {
    /// Prepares selection over `host` for a fragment with label multiset
    /// `requirement`.
    ///
    /// Host edges touching a label unknown to `index` can never connect a
    /// selection and are dropped here. An edge endpoint outside the host is a
    /// [`SearchError::MissingMarker`].
    pub fn new(
        host: &'a Graph,
        requirement: &WordDistribution,
        index: &LabelIndex,
    ) -> Result<Self, SearchError> {
        let mut host_edges = Vec::with_capacity(host.edge_count());
        for (i, edge) in host.edges().iter().enumerate() {
            let (Some(head), Some(dep)) = (host.label_at(edge.head()), host.label_at(edge.dep()))
            else {
                return Err(SearchError::missing_marker(GraphSide::Host, edge.to_string()));
            };
            if let (Some(h), Some(d)) = (index.id_of(head), index.id_of(dep)) {
                host_edges.push(HostEdge {
                    index: i,
                    head: (h, edge.head()),
                    dep: (d, edge.dep()),
                });
            }
        }

        Ok(Self {
            host,
            requirement: requirement.iter().collect(),
            buckets: Buckets::for_host(host, requirement, index),
            host_edges,
        })
    }

    /// Product of the per-label binomial coefficients. Saturates.
    pub fn selection_count(&self) -> u128 {
        self.requirement
            .iter()
            .map(|&(label, k)| binomial(self.buckets.get(label).len(), k))
            .fold(1u128, u128::saturating_mul)
    }

    /// Host edges with both endpoints selected under their own labels, as
    /// indices into the host edge list.
    pub fn retained_edges(&self, selection: &PositionSelection) -> Vec<usize> {
        self.host_edges
            .iter()
            .filter(|e| {
                selection.contains(e.head.0, e.head.1) && selection.contains(e.dep.0, e.dep.1)
            })
            .map(|e| e.index)
            .collect()
    }

    /// True if every selected position is an endpoint of a retained edge.
    pub fn is_connected(&self, selection: &PositionSelection) -> bool {
        self.connected_edges(selection).is_some()
    }

    fn connected_edges(&self, selection: &PositionSelection) -> Option<Vec<usize>> {
        let retained = self.retained_edges(selection);
        let covered: BTreeSet<Position> = retained
            .iter()
            .filter_map(|&i| self.host.edges().get(i))
            .flat_map(|e| [e.head(), e.dep()])
            .collect();
        selection
            .positions()
            .iter()
            .all(|p| covered.contains(p))
            .then_some(retained)
    }

    /// Visits every connected selection together with its retained edges.
    ///
    /// Each complete selection costs one budget step. The visitor stops the
    /// walk by returning [`ControlFlow::Break`].
    pub fn for_each_connected<F>(
        &self,
        budget: &SearchBudget,
        mut visit: F,
    ) -> Result<ControlFlow<()>, SearchError>
    where
        F: FnMut(&PositionSelection, &[usize]) -> Result<ControlFlow<()>, SearchError>,
    {
        let mut selection = PositionSelection::new();
        self.choose(&self.requirement, &mut selection, budget, &mut visit)
    }

    fn choose<F>(
        &self,
        labels: &[(LabelId, usize)],
        selection: &mut PositionSelection,
        budget: &SearchBudget,
        visit: &mut F,
    ) -> Result<ControlFlow<()>, SearchError>
    where
        F: FnMut(&PositionSelection, &[usize]) -> Result<ControlFlow<()>, SearchError>,
    {
        let Some((&(label, needed), rest)) = labels.split_first() else {
            budget.tick()?;
            return match self.connected_edges(selection) {
                Some(retained) => visit(selection, &retained),
                None => {
                    trace!("selection {:?} is not connected", selection.positions());
                    Ok(ControlFlow::Continue(()))
                }
            };
        };

        for combo in self.buckets.get(label).iter().copied().combinations(needed) {
            selection.set(label, combo);
            if self.choose(rest, selection, budget, visit)?.is_break() {
                selection.clear(label);
                return Ok(ControlFlow::Break(()));
            }
        }
        selection.clear(label);
        Ok(ControlFlow::Continue(()))
    }
}

fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    // C(n, i+1) = C(n, i) * (n-i) / (i+1), dividing out the common factor
    // first so only a result that truly exceeds u128 overflows.
    (0..k)
        .try_fold(1u128, |acc, i| {
            let (num, den) = ((n - i) as u128, i as u128 + 1);
            let g = gcd(acc, den);
            (acc / g).checked_mul(num / (den / g))
        })
        .unwrap_or(u128::MAX)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(host: &[&str], edges: &[(&str, u32, u32)], fragment: &[&str]) -> (Graph, WordDistribution, LabelIndex) {
        let host = Graph::from_triples(host, edges).unwrap();
        let mut index = LabelIndex::new();
        for n in host.nodes() {
            index.add(n.label());
        }
        let frag = Graph::from_triples(fragment, &[]).unwrap();
        let req = WordDistribution::of(&frag, &index).unwrap();
        (host, req, index)
    }

    fn collect(selector: &CandidateSelector<'_>) -> Vec<(BTreeSet<Position>, Vec<usize>)> {
        let mut out = Vec::new();
        selector
            .for_each_connected(&SearchBudget::unlimited(), |sel, retained| {
                out.push((sel.positions(), retained.to_vec()));
                Ok(ControlFlow::Continue(()))
            })
            .unwrap();
        out
    }

    #[test]
    fn repeated_label_combinations_not_permutations() {
        // big big dog with dog -amod-> each big
        let (host, req, index) = setup(
            &["big", "big", "dog"],
            &[("amod", 2, 0), ("amod", 2, 1)],
            &["dog", "big", "big"],
        );
        let selector = CandidateSelector::new(&host, &req, &index).unwrap();
        assert_eq!(selector.selection_count(), 1);
        let found = collect(&selector);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, vec![0, 1]);
    }

    #[test]
    fn disconnected_selection_is_filtered() {
        // the dog bit the cat: the first "the" attaches to dog only
        let (host, req, index) = setup(
            &["the", "dog", "bit", "the", "cat"],
            &[("det", 1, 0), ("ncsubj", 2, 1), ("dobj", 2, 4), ("det", 4, 3)],
            &["dog", "the"],
        );
        let selector = CandidateSelector::new(&host, &req, &index).unwrap();
        assert_eq!(selector.selection_count(), 2);

        let found = collect(&selector);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].0,
            BTreeSet::from([Position::new(0), Position::new(1)])
        );
        assert_eq!(found[0].1, vec![0]);
    }

    #[test]
    fn missing_label_yields_nothing() {
        let (host, _, mut index) = setup(&["a", "b"], &[("r", 0, 1)], &["a"]);
        let c = index.add("c");
        let req: WordDistribution = [(c, 1)].into_iter().collect();
        let selector = CandidateSelector::new(&host, &req, &index).unwrap();
        assert_eq!(selector.selection_count(), 0);
        assert!(collect(&selector).is_empty());
    }

    #[test]
    fn break_stops_the_walk() {
        let (host, req, index) = setup(
            &["x", "y", "x", "y"],
            &[("r", 0, 1), ("r", 2, 3), ("r", 0, 3), ("r", 2, 1)],
            &["x", "y"],
        );
        let selector = CandidateSelector::new(&host, &req, &index).unwrap();
        let mut visits = 0;
        let flow = selector
            .for_each_connected(&SearchBudget::unlimited(), |_, _| {
                visits += 1;
                Ok(ControlFlow::Break(()))
            })
            .unwrap();
        assert!(flow.is_break());
        assert_eq!(visits, 1);
    }

    #[test]
    fn budget_aborts_selection() {
        let (host, req, index) = setup(&["x", "x", "x"], &[("r", 0, 1), ("r", 1, 2)], &["x"]);
        let selector = CandidateSelector::new(&host, &req, &index).unwrap();
        let err = selector
            .for_each_connected(&SearchBudget::new(Some(1)), |_, _| {
                Ok(ControlFlow::Continue(()))
            })
            .unwrap_err();
        assert_eq!(err, SearchError::Aborted { steps: 2 });
    }

    #[test]
    fn is_connected_needs_every_position_covered() {
        let (host, req, index) = setup(&["a", "b", "c"], &[("r", 0, 1)], &["a", "b", "c"]);
        let selector = CandidateSelector::new(&host, &req, &index).unwrap();
        let id = |l: &str| index.id_of(l).unwrap();

        let mut single_edge = PositionSelection::new();
        single_edge.set(id("a"), vec![Position::new(0)]);
        single_edge.set(id("b"), vec![Position::new(1)]);
        assert!(selector.is_connected(&single_edge));
        assert_eq!(selector.retained_edges(&single_edge), vec![0]);

        let mut isolated = single_edge.clone();
        isolated.set(id("c"), vec![Position::new(2)]);
        assert!(!selector.is_connected(&isolated));
    }

    #[test]
    fn binomials() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(2, 3), 0);
        assert_eq!(binomial(4, 0), 1);
        assert_eq!(binomial(128, 64), 23951146041928082866135587776380551750);
        assert_eq!(binomial(200, 100), u128::MAX);
    }
}
