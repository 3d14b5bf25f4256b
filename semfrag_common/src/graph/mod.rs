//! Immutable dependency-graph value types.
//!
//! A [`Graph`] exclusively owns its nodes and edges. Edges refer to nodes by
//! [`Position`], and construction guarantees that every edge endpoint points
//! at a node of the same graph.

mod edge;
mod node;
mod position;

pub use edge::Edge;
pub use node::Node;
pub use position::Position;

use crate::error::GraphError;

/// An ordered node sequence plus the labeled edges over it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Builds a graph, rejecting any edge whose endpoint lies outside `nodes`.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        if let Some(edge) = edges
            .iter()
            .find(|e| !e.head().is_within(nodes.len()) || !e.dep().is_within(nodes.len()))
        {
            return Err(GraphError::DanglingEdge {
                edge: edge.to_string(),
                nodes: nodes.len(),
            });
        }
        Ok(Self { nodes, edges })
    }

    /// Builds a graph from node labels and `(relation, head, dep)` triples.
    pub fn from_triples(nodes: &[&str], edges: &[(&str, u32, u32)]) -> Result<Self, GraphError> {
        Self::new(
            nodes.iter().map(|l| Node::new(*l)).collect(),
            edges
                .iter()
                .map(|(rel, h, d)| Edge::new(*rel, Position::new(*h), Position::new(*d)))
                .collect(),
        )
    }

    /// Starts an incremental builder.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Nodes in sentence order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in input order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The node at `pos`, if the position belongs to this graph.
    pub fn node(&self, pos: Position) -> Option<&Node> {
        self.nodes.get(pos.as_usize())
    }

    /// Label of the node at `pos`, if the position belongs to this graph.
    pub fn label_at(&self, pos: Position) -> Option<&str> {
        self.node(pos).map(Node::label)
    }

    /// Iterates `(position, node)` pairs.
    pub fn positioned_nodes(&self) -> impl Iterator<Item = (Position, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (Position::from(i), n))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True if the graph has neither nodes nor edges.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Renders an edge with its endpoint labels, e.g. `dobj eat apple`.
    ///
    /// Falls back to the bare positions when an endpoint does not belong to
    /// this graph.
    pub fn describe_edge(&self, edge: &Edge) -> String {
        match (self.label_at(edge.head()), self.label_at(edge.dep())) {
            (Some(h), Some(d)) => format!("{} {} {}", edge.relation(), h, d),
            _ => edge.to_string(),
        }
    }
}

/// Incremental construction of a [`Graph`].
///
/// ```
/// use semfrag_common::Graph;
///
/// let mut b = Graph::builder();
/// let eat = b.node("eat");
/// let john = b.node("john");
/// b.edge("nsubj", eat, john);
/// let g = b.build().unwrap();
/// assert_eq!(g.edge_count(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    /// Appends a node and returns its position.
    pub fn node(&mut self, label: impl Into<String>) -> Position {
        self.nodes.push(Node::new(label));
        Position::from(self.nodes.len() - 1)
    }

    /// Appends an edge between two positions.
    pub fn edge(&mut self, relation: impl Into<String>, head: Position, dep: Position) -> &mut Self {
        self.edges.push(Edge::new(relation, head, dep));
        self
    }

    /// Validates and freezes the graph.
    pub fn build(self) -> Result<Graph, GraphError> {
        Graph::new(self.nodes, self.edges)
    }
}
