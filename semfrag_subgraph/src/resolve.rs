use semfrag_common::{Edge, Graph, LabelId, LabelIndex, Position};

use crate::{GraphSide, SearchError};

/// An edge with both endpoint labels resolved to ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LabeledEdge<'g> {
    pub edge: &'g Edge,
    pub head_label: LabelId,
    pub dep_label: LabelId,
}

impl<'g> LabeledEdge<'g> {
    pub fn relation(&self) -> &'g str {
        self.edge.relation()
    }

    pub fn head(&self) -> Position {
        self.edge.head()
    }

    pub fn dep(&self) -> Position {
        self.edge.dep()
    }

    pub fn is_self_loop(&self) -> bool {
        self.head() == self.dep()
    }

    /// Same relation and same endpoint labels.
    pub fn same_kind(&self, other: &LabeledEdge<'_>) -> bool {
        self.head_label == other.head_label
            && self.dep_label == other.dep_label
            && self.relation() == other.relation()
    }
}

/// Resolves the label id at `pos`.
pub(crate) fn label_id_at(
    graph: &Graph,
    edge: &Edge,
    pos: Position,
    index: &LabelIndex,
    side: GraphSide,
) -> Result<LabelId, SearchError> {
    let label = graph
        .label_at(pos)
        .ok_or_else(|| SearchError::missing_marker(side, graph.describe_edge(edge)))?;
    index
        .id_of(label)
        .ok_or_else(|| SearchError::unknown_label(side, label))
}

pub(crate) fn resolve_edges<'g>(
    graph: &Graph,
    edges: impl IntoIterator<Item = &'g Edge>,
    index: &LabelIndex,
    side: GraphSide,
) -> Result<Vec<LabeledEdge<'g>>, SearchError> {
    edges
        .into_iter()
        .map(|edge| {
            Ok(LabeledEdge {
                edge,
                head_label: label_id_at(graph, edge, edge.head(), index, side)?,
                dep_label: label_id_at(graph, edge, edge.dep(), index, side)?,
            })
        })
        .collect()
}
