use std::fmt;

use super::Position;

/// A directed, labeled dependency from a head node to a dependent node.
///
/// Both endpoint positions are mandatory: an edge cannot exist without
/// knowing where its endpoints sit in the owning graph's node sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    relation: String,
    head: Position,
    dep: Position,
}

impl Edge {
    /// Creates an edge `relation(head, dep)`.
    pub fn new(relation: impl Into<String>, head: Position, dep: Position) -> Self {
        Self {
            relation: relation.into(),
            head,
            dep,
        }
    }

    /// The grammatical relation, e.g. `ncsubj`.
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Position of the head node.
    pub const fn head(&self) -> Position {
        self.head
    }

    /// Position of the dependent node.
    pub const fn dep(&self) -> Position {
        self.dep
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.relation, self.head, self.dep)
    }
}
