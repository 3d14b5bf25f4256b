use std::fmt;

/// Word offset of a node within its sentence.
///
/// Edges name their endpoints by position, which keeps two nodes with the
/// same label (`the big big dog`) apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position(u32);

impl Position {
    /// The position of the `offset`-th word.
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Offset usable as a node-slice index.
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// True if a sentence of `len` words has a node here.
    #[contracts::debug_ensures(ret == (self.as_usize() < len))]
    pub fn is_within(self, len: usize) -> bool {
        self.as_usize() < len
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Word offsets come from `enumerate`; sentences never exceed `u32::MAX` words.
impl From<usize> for Position {
    fn from(offset: usize) -> Self {
        Self(offset as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_and_display() {
        let p = Position::from(2usize);
        assert!(p.is_within(3));
        assert!(!p.is_within(2));
        assert_eq!(p.to_string(), "@2");
        assert!(Position::new(0) < p);
    }
}
