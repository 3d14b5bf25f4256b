//! Exact labeled-graph isomorphism between a fragment and a host edge set.
//!
//! The host edges are taken in order. Each one is paired with an unmatched
//! fragment edge of the same relation and endpoint labels whose endpoints
//! agree with the node mapping built so far, and the search backtracks when
//! no such edge exists. A match needs both edge lists to be used up.

use std::collections::BTreeMap;

use semfrag_common::{Edge, Graph, LabelIndex, Position};
use tracing::trace;

use crate::budget::SearchBudget;
use crate::resolve::{LabeledEdge, resolve_edges};
use crate::state::{MatchState, Step};
use crate::{GraphSide, SearchError};

/// A host → fragment node bijection witnessing a match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isomorphism {
    mapping: BTreeMap<Position, Position>,
}

impl Isomorphism {
    /// Fragment position bound to host position `h`.
    pub fn fragment_of(&self, h: Position) -> Option<Position> {
        self.mapping.get(&h).copied()
    }

    /// Number of bound node pairs.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// True if no node is bound.
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Matcher for one fragment, reusable across host sentences.
pub struct SubgraphMatcher<'f, 'i> {
    fragment_edges: Vec<LabeledEdge<'f>>,
    index: &'i LabelIndex,
}

impl<'f, 'i> SubgraphMatcher<'f, 'i> {
    /// Resolves the fragment's edge labels once.
    ///
    /// Fails with a fragment-side [`SearchError`] if an edge endpoint lies
    /// outside the fragment or a label is not in `index`.
    pub fn new(fragment: &'f Graph, index: &'i LabelIndex) -> Result<Self, SearchError> {
        let fragment_edges = resolve_edges(fragment, fragment.edges(), index, GraphSide::Fragment)?;
        Ok(Self {
            fragment_edges,
            index,
        })
    }

    /// Searches for an isomorphism between `host_edges` (edges of `host`) and
    /// the fragment.
    ///
    /// Returns `Ok(None)` when the edge counts differ or no consistent
    /// assignment exists. An edgeless fragment never matches.
    pub fn find_isomorphism(
        &self,
        host: &Graph,
        host_edges: &[&Edge],
        budget: &SearchBudget,
    ) -> Result<Option<Isomorphism>, SearchError> {
        if self.fragment_edges.is_empty() || host_edges.len() != self.fragment_edges.len() {
            trace!(
                "size mismatch: {} host edges vs {} fragment edges",
                host_edges.len(),
                self.fragment_edges.len()
            );
            return Ok(None);
        }

        let host_edges = resolve_edges(host, host_edges.iter().copied(), self.index, GraphSide::Host)?;
        let mut state = MatchState::new(self.fragment_edges.len());
        self.search(&host_edges, 0, &mut state, budget)
    }

    /// True if [`find_isomorphism`](Self::find_isomorphism) finds a witness.
    pub fn is_exact_match(
        &self,
        host: &Graph,
        host_edges: &[&Edge],
        budget: &SearchBudget,
    ) -> Result<bool, SearchError> {
        Ok(self.find_isomorphism(host, host_edges, budget)?.is_some())
    }

    fn search(
        &self,
        host_edges: &[LabeledEdge<'_>],
        next: usize,
        state: &mut MatchState,
        budget: &SearchBudget,
    ) -> Result<Option<Isomorphism>, SearchError> {
        budget.tick()?;

        let Some(edge) = host_edges.get(next) else {
            return Ok(state.all_consumed().then(|| Isomorphism {
                mapping: state.mapping().clone(),
            }));
        };

        let candidates: Vec<usize> = self
            .fragment_edges
            .iter()
            .enumerate()
            .filter(|(i, f)| !state.is_consumed(*i) && f.same_kind(edge))
            .map(|(i, _)| i)
            .collect();

        if candidates.is_empty() {
            trace!("no fragment edge for host {} at depth {next}", edge.edge);
            return Ok(None);
        }

        match (state.mapped_to(edge.head()), state.mapped_to(edge.dep())) {
            (Some(fh), Some(fd)) => {
                let Some(&c) = candidates.iter().find(|&&c| {
                    let f = &self.fragment_edges[c];
                    f.head() == fh && f.dep() == fd
                }) else {
                    return Ok(None);
                };
                state.with_step(&Step::consume(c), |st| {
                    self.search(host_edges, next + 1, st, budget)
                })
            }
            (Some(fh), None) => {
                for c in candidates {
                    let f = &self.fragment_edges[c];
                    if f.head() != fh || f.is_self_loop() || state.is_used_fragment(f.dep()) {
                        continue;
                    }
                    let step = Step::consume(c).bind(edge.dep(), f.dep());
                    if let Some(found) =
                        state.with_step(&step, |st| self.search(host_edges, next + 1, st, budget))?
                    {
                        return Ok(Some(found));
                    }
                }
                Ok(None)
            }
            (None, Some(fd)) => {
                for c in candidates {
                    let f = &self.fragment_edges[c];
                    if f.dep() != fd || f.is_self_loop() || state.is_used_fragment(f.head()) {
                        continue;
                    }
                    let step = Step::consume(c).bind(edge.head(), f.head());
                    if let Some(found) =
                        state.with_step(&step, |st| self.search(host_edges, next + 1, st, budget))?
                    {
                        return Ok(Some(found));
                    }
                }
                Ok(None)
            }
            (None, None) => {
                for c in candidates {
                    let f = &self.fragment_edges[c];
                    if f.is_self_loop() != edge.is_self_loop()
                        || state.is_used_fragment(f.head())
                        || state.is_used_fragment(f.dep())
                    {
                        continue;
                    }
                    let mut step = Step::consume(c).bind(edge.head(), f.head());
                    if !edge.is_self_loop() {
                        step = step.bind(edge.dep(), f.dep());
                    }
                    if let Some(found) =
                        state.with_step(&step, |st| self.search(host_edges, next + 1, st, budget))?
                    {
                        return Ok(Some(found));
                    }
                }
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(graphs: &[&Graph]) -> LabelIndex {
        let mut index = LabelIndex::new();
        for g in graphs {
            for n in g.nodes() {
                index.add(n.label());
            }
        }
        index
    }

    #[test]
    fn maps_reordered_nodes() {
        let host = Graph::from_triples(&["john", "eat", "apple"], &[("nsubj", 1, 0), ("dobj", 1, 2)])
            .unwrap();
        let frag = Graph::from_triples(&["eat", "apple", "john"], &[("dobj", 0, 1), ("nsubj", 0, 2)])
            .unwrap();
        let index = index_of(&[&host, &frag]);
        let matcher = SubgraphMatcher::new(&frag, &index).unwrap();
        let edges: Vec<&Edge> = host.edges().iter().collect();

        let iso = matcher
            .find_isomorphism(&host, &edges, &SearchBudget::unlimited())
            .unwrap()
            .unwrap();
        assert_eq!(iso.fragment_of(Position::new(0)), Some(Position::new(2)));
        assert_eq!(iso.fragment_of(Position::new(1)), Some(Position::new(0)));
        assert_eq!(iso.fragment_of(Position::new(2)), Some(Position::new(1)));
    }

    #[test]
    fn mapping_is_injective() {
        // host: x -r-> y, x' -r-> y' (two components); fragment: x -r-> y, x -r-> y'
        let host = Graph::from_triples(&["x", "y", "x", "y"], &[("r", 0, 1), ("r", 2, 3)]).unwrap();
        let frag = Graph::from_triples(&["x", "y", "y"], &[("r", 0, 1), ("r", 0, 2)]).unwrap();
        let index = index_of(&[&host, &frag]);
        let matcher = SubgraphMatcher::new(&frag, &index).unwrap();
        let edges: Vec<&Edge> = host.edges().iter().collect();
        assert!(!matcher
            .is_exact_match(&host, &edges, &SearchBudget::unlimited())
            .unwrap());
    }

    #[test]
    fn self_loop_only_matches_self_loop() {
        let looped = Graph::from_triples(&["a"], &[("r", 0, 0)]).unwrap();
        let plain = Graph::from_triples(&["a", "a"], &[("r", 0, 1)]).unwrap();
        let index = index_of(&[&looped, &plain]);
        let budget = SearchBudget::unlimited();

        let m = SubgraphMatcher::new(&looped, &index).unwrap();
        let plain_edges: Vec<&Edge> = plain.edges().iter().collect();
        let loop_edges: Vec<&Edge> = looped.edges().iter().collect();
        assert!(!m.is_exact_match(&plain, &plain_edges, &budget).unwrap());
        assert!(m.is_exact_match(&looped, &loop_edges, &budget).unwrap());

        let m = SubgraphMatcher::new(&plain, &index).unwrap();
        assert!(!m.is_exact_match(&looped, &loop_edges, &budget).unwrap());
    }

    #[test]
    fn foreign_host_edge_is_host_marker_error() {
        let frag = Graph::from_triples(&["a", "b"], &[("r", 0, 1)]).unwrap();
        let host = Graph::from_triples(&["a", "b"], &[("r", 0, 1)]).unwrap();
        let index = index_of(&[&frag]);
        let matcher = SubgraphMatcher::new(&frag, &index).unwrap();

        let stray = Edge::new("r", Position::new(0), Position::new(6));
        let err = matcher
            .find_isomorphism(&host, &[&stray], &SearchBudget::unlimited())
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::MissingMarker {
                side: GraphSide::Host,
                ..
            }
        ));
    }

    #[test]
    fn unknown_fragment_label_fails_construction() {
        let frag = Graph::from_triples(&["a", "zz"], &[("r", 0, 1)]).unwrap();
        let mut index = LabelIndex::new();
        index.add("a");
        let err = SubgraphMatcher::new(&frag, &index).err().unwrap();
        assert_eq!(err.side(), Some(GraphSide::Fragment));
    }

    #[test]
    fn budget_exhaustion_aborts() {
        let host = Graph::from_triples(&["a", "b", "c"], &[("r", 0, 1), ("s", 1, 2)]).unwrap();
        let index = index_of(&[&host]);
        let matcher = SubgraphMatcher::new(&host, &index).unwrap();
        let edges: Vec<&Edge> = host.edges().iter().collect();
        let err = matcher
            .find_isomorphism(&host, &edges, &SearchBudget::new(Some(1)))
            .unwrap_err();
        assert!(matches!(err, SearchError::Aborted { .. }));
    }
}
