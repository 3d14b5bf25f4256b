//! Complete-fragment enumeration.
//!
//! A fragment of a graph is a non-empty edge subset `S` such that `S` is
//! exactly the set of edges induced by the nodes `S` touches. Enumeration
//! walks the power set of the edge list with an include/exclude recursion
//! and keeps the subsets that pass that completeness test.

use std::collections::BTreeSet;

use semfrag_common::{Edge, Graph, Position};
use tracing::debug;

use crate::{GraphSide, SearchError};

/// Edge subset of one graph, as ascending indices into its edge list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeSet {
    indices: Vec<usize>,
}

impl EdgeSet {
    /// Builds a set from edge indices; duplicates collapse.
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        let indices: BTreeSet<usize> = indices.into_iter().collect();
        Self {
            indices: indices.into_iter().collect(),
        }
    }

    /// Indices into the owning graph's edge list, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of selected edges.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True if no edge is selected.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The edges of `graph` this set selects. Indices past the end are skipped.
    pub fn edges<'g>(&self, graph: &'g Graph) -> impl Iterator<Item = &'g Edge> {
        self.indices.iter().filter_map(move |&i| graph.edges().get(i))
    }

    /// Every position touched by a selected edge.
    pub fn positions(&self, graph: &Graph) -> BTreeSet<Position> {
        self.edges(graph).flat_map(|e| [e.head(), e.dep()]).collect()
    }
}

impl FromIterator<usize> for EdgeSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Enumerates the complete fragments of one graph.
pub struct FragmentEnumerator<'g> {
    graph: &'g Graph,
}

impl<'g> FragmentEnumerator<'g> {
    /// Checks that every edge endpoint resolves inside `graph`.
    pub fn new(graph: &'g Graph) -> Result<Self, SearchError> {
        if let Some(edge) = graph
            .edges()
            .iter()
            .find(|e| graph.node(e.head()).is_none() || graph.node(e.dep()).is_none())
        {
            return Err(SearchError::missing_marker(
                GraphSide::Host,
                graph.describe_edge(edge),
            ));
        }
        Ok(Self { graph })
    }

    /// Visits every complete fragment exactly once.
    ///
    /// Visit order is deterministic for a given edge order. Cost is
    /// exponential in the edge count.
    pub fn for_each<F: FnMut(&EdgeSet)>(&self, mut visit: F) {
        let mut selected = Vec::with_capacity(self.graph.edge_count());
        self.include_or_exclude(0, &mut selected, &mut visit);
    }

    /// Collects every complete fragment.
    pub fn fragments(&self) -> Vec<EdgeSet> {
        let mut out = Vec::new();
        self.for_each(|set| out.push(set.clone()));
        debug!(
            "enumerated {} fragments over {} edges",
            out.len(),
            self.graph.edge_count()
        );
        out
    }

    /// Counts complete fragments without collecting them.
    pub fn count(&self) -> usize {
        let mut n = 0;
        self.for_each(|_| n += 1);
        n
    }

    fn include_or_exclude<F: FnMut(&EdgeSet)>(
        &self,
        next: usize,
        selected: &mut Vec<usize>,
        visit: &mut F,
    ) {
        if next == self.graph.edge_count() {
            if !selected.is_empty() && self.is_complete(selected) {
                visit(&EdgeSet {
                    indices: selected.clone(),
                });
            }
            return;
        }

        self.include_or_exclude(next + 1, selected, visit);

        selected.push(next);
        self.include_or_exclude(next + 1, selected, visit);
        selected.pop();
    }

    /// True if `selected` equals the edge set induced by the nodes it touches.
    pub fn is_complete(&self, selected: &[usize]) -> bool {
        let edges = self.graph.edges();
        let touched: BTreeSet<Position> = selected
            .iter()
            .filter_map(|&i| edges.get(i))
            .flat_map(|e| [e.head(), e.dep()])
            .collect();
        let induced = edges
            .iter()
            .filter(|e| touched.contains(&e.head()) && touched.contains(&e.dep()))
            .count();
        induced == selected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&str], edges: &[(&str, u32, u32)]) -> Graph {
        Graph::from_triples(nodes, edges).unwrap()
    }

    #[test]
    fn chain_of_two_edges() {
        // eat -dobj-> apple -amod-> red
        let g = graph(&["eat", "apple", "red"], &[("dobj", 0, 1), ("amod", 1, 2)]);
        let found = FragmentEnumerator::new(&g).unwrap().fragments();
        assert_eq!(
            found,
            vec![EdgeSet::new([1]), EdgeSet::new([0]), EdgeSet::new([0, 1])]
        );
    }

    #[test]
    fn triangle_has_no_two_edge_fragment() {
        let g = graph(&["a", "b", "c"], &[("r", 0, 1), ("r", 1, 2), ("r", 0, 2)]);
        let sizes: Vec<usize> = FragmentEnumerator::new(&g)
            .unwrap()
            .fragments()
            .iter()
            .map(EdgeSet::len)
            .collect();
        assert_eq!(sizes.iter().filter(|&&n| n == 1).count(), 3);
        assert_eq!(sizes.iter().filter(|&&n| n == 2).count(), 0);
        assert_eq!(sizes.iter().filter(|&&n| n == 3).count(), 1);
    }

    #[test]
    fn parallel_edges_are_inseparable() {
        let g = graph(&["a", "b"], &[("r", 0, 1), ("s", 0, 1)]);
        let found = FragmentEnumerator::new(&g).unwrap().fragments();
        assert_eq!(found, vec![EdgeSet::new([0, 1])]);
    }

    #[test]
    fn edgeless_graph_has_no_fragments() {
        let g = graph(&["a", "b"], &[]);
        assert_eq!(FragmentEnumerator::new(&g).unwrap().count(), 0);
    }

    #[test]
    fn edge_set_dedups_and_sorts() {
        let set: EdgeSet = [3, 1, 3, 0].into_iter().collect();
        assert_eq!(set.indices(), &[0, 1, 3]);
    }

    #[test]
    fn edges_outlive_the_edge_set() {
        let g = graph(&["eat", "apple", "red"], &[("dobj", 0, 1), ("amod", 1, 2)]);
        let edges: Vec<&Edge> = {
            let set = EdgeSet::new([1, 7]);
            set.edges(&g).collect()
        };
        assert_eq!(edges, vec![&g.edges()[1]]);
        assert_eq!(
            EdgeSet::new([0]).positions(&g),
            BTreeSet::from([Position::new(0), Position::new(1)])
        );
    }
}
