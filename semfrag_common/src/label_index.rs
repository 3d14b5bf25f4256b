//! Append-only label dictionary.

use std::fmt;

use contracts::*;
use indexmap::IndexSet;

/// Dense identifier assigned by a [`LabelIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId {
    inner: u32,
}

impl LabelId {
    /// Creates an id from a raw integer.
    #[ensures(ret.inner == id)]
    pub const fn new(id: u32) -> Self {
        Self { inner: id }
    }

    /// Returns the id as a usize for array access.
    pub const fn as_usize(self) -> usize {
        self.inner as usize
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.inner)
    }
}

/// Bidirectional label <-> id mapping.
///
/// Ids are handed out sequentially starting at zero and never reused. The
/// index only grows while a corpus is ingested; matching reads it only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelIndex {
    labels: IndexSet<String>,
}

impl LabelIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `label`, inserting it if unseen.
    #[debug_ensures(self.label_of(ret) == Some(label))]
    pub fn add(&mut self, label: &str) -> LabelId {
        if let Some(idx) = self.labels.get_index_of(label) {
            return LabelId::from(idx);
        }
        let (idx, _) = self.labels.insert_full(label.to_owned());
        LabelId::from(idx)
    }

    /// Looks up the id of `label`.
    pub fn id_of(&self, label: &str) -> Option<LabelId> {
        self.labels.get_index_of(label).map(LabelId::from)
    }

    /// Looks up the label of `id`.
    pub fn label_of(&self, id: LabelId) -> Option<&str> {
        self.labels.get_index(id.as_usize()).map(String::as_str)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if no label has been added.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates `(id, label)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (LabelId, &str)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (LabelId::from(i), l.as_str()))
    }
}

impl From<usize> for LabelId {
    #[inline]
    fn from(id: usize) -> Self {
        Self { inner: id as u32 }
    }
}
