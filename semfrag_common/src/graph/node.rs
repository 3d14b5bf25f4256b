use std::fmt;

/// A token of a parsed sentence, e.g. `eat_VV0`.
///
/// Nodes carry no adjacency; edges point at them by [`Position`](super::Position).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
    label: String,
}

impl Node {
    /// Creates a node with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// The node's label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
