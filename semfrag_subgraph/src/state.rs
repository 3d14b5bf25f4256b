use std::collections::{BTreeMap, HashSet};

use semfrag_common::Position;

/// One matcher step: bind up to two host positions and consume one fragment
/// edge. Applied before recursing and reverted after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Step {
    pub bindings: Vec<(Position, Position)>,
    pub fragment_edge: usize,
}

impl Step {
    pub fn consume(fragment_edge: usize) -> Self {
        Self {
            bindings: Vec::new(),
            fragment_edge,
        }
    }

    pub fn bind(mut self, host: Position, fragment: Position) -> Self {
        self.bindings.push((host, fragment));
        self
    }
}

/// Matcher bookkeeping: host → fragment node map, its image set, and which
/// fragment edges are already matched.
pub(crate) struct MatchState {
    // Host position -> fragment position
    mapping: BTreeMap<Position, Position>,
    used_f: HashSet<Position>,
    consumed: Vec<bool>,
    remaining: usize,
}

impl MatchState {
    pub fn new(fragment_edges: usize) -> Self {
        Self {
            mapping: BTreeMap::new(),
            used_f: HashSet::new(),
            consumed: vec![false; fragment_edges],
            remaining: fragment_edges,
        }
    }

    pub fn is_mapped(&self, h: Position) -> bool {
        self.mapping.contains_key(&h)
    }

    pub fn mapped_to(&self, h: Position) -> Option<Position> {
        self.mapping.get(&h).copied()
    }

    pub fn is_used_fragment(&self, f: Position) -> bool {
        self.used_f.contains(&f)
    }

    pub fn is_consumed(&self, edge: usize) -> bool {
        self.consumed.get(edge).copied().unwrap_or(true)
    }

    pub fn all_consumed(&self) -> bool {
        self.remaining == 0
    }

    pub fn mapping(&self) -> &BTreeMap<Position, Position> {
        &self.mapping
    }

    #[contracts::debug_requires(!self.is_mapped(h))]
    #[contracts::debug_requires(!self.is_used_fragment(f))]
    #[contracts::debug_ensures(self.is_mapped(h) && self.is_used_fragment(f))]
    fn map(&mut self, h: Position, f: Position) {
        self.mapping.insert(h, f);
        self.used_f.insert(f);
    }

    #[contracts::debug_requires(self.is_mapped(h) && self.is_used_fragment(f))]
    #[contracts::debug_ensures(!self.is_mapped(h) && !self.is_used_fragment(f))]
    fn unmap(&mut self, h: Position, f: Position) {
        self.mapping.remove(&h);
        self.used_f.remove(&f);
    }

    #[contracts::debug_requires(!self.is_consumed(step.fragment_edge))]
    #[contracts::debug_ensures(self.is_consumed(step.fragment_edge))]
    fn apply(&mut self, step: &Step) {
        for &(h, f) in &step.bindings {
            self.map(h, f);
        }
        if let Some(slot) = self.consumed.get_mut(step.fragment_edge) {
            *slot = true;
            self.remaining -= 1;
        }
    }

    #[contracts::debug_requires(self.is_consumed(step.fragment_edge))]
    #[contracts::debug_ensures(!self.is_consumed(step.fragment_edge))]
    fn revert(&mut self, step: &Step) {
        if let Some(slot) = self.consumed.get_mut(step.fragment_edge) {
            *slot = false;
            self.remaining += 1;
        }
        for &(h, f) in step.bindings.iter().rev() {
            self.unmap(h, f);
        }
    }

    /// Runs `f` with `step` applied, then undoes it.
    pub fn with_step<R>(&mut self, step: &Step, f: impl FnOnce(&mut Self) -> R) -> R {
        self.apply(step);
        let out = f(self);
        self.revert(step);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_step_restores_state() {
        let mut st = MatchState::new(2);
        let step = Step::consume(1)
            .bind(Position::new(4), Position::new(0))
            .bind(Position::new(5), Position::new(1));

        let seen = st.with_step(&step, |inner| {
            assert!(inner.is_consumed(1));
            assert!(!inner.all_consumed());
            inner.mapped_to(Position::new(5))
        });

        assert_eq!(seen, Some(Position::new(1)));
        assert!(!st.is_mapped(Position::new(4)));
        assert!(!st.is_used_fragment(Position::new(0)));
        assert!(!st.is_consumed(1));
    }

    #[test]
    fn nested_steps_consume_everything() {
        let mut st = MatchState::new(2);
        let done = st.with_step(&Step::consume(0), |a| {
            a.with_step(&Step::consume(1), |b| b.all_consumed())
        });
        assert!(done);
        assert!(!st.all_consumed());
    }
}
