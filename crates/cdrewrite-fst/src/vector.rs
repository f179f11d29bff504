// Mutable arena-backed transducer.

use std::fmt;

use crate::semiring::Semiring;
use crate::transition::Transition;
use crate::{EPSILON, FstError, Label};

/// Handle to a state of a [`VectorFst`].
///
/// State ids are dense indices into the owning transducer's arena and are
/// only meaningful for that transducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Iterator over the state ids of a transducer, in index order.
#[derive(Debug, Clone)]
pub struct StateIter {
    next: u32,
    end: u32,
}

impl Iterator for StateIter {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        if self.next < self.end {
            let s = StateId(self.next);
            self.next += 1;
            Some(s)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.next) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for StateIter {}

#[derive(Debug, Clone)]
struct State<W> {
    final_weight: W,
    transitions: Vec<Transition<W>>,
}

impl<W: Semiring> State<W> {
    fn new() -> Self {
        Self {
            final_weight: W::zero(),
            transitions: Vec::new(),
        }
    }
}

/// A mutable weighted transducer.
///
/// States live in a `Vec` and are addressed by [`StateId`]. A transducer with
/// no start state accepts nothing.
#[derive(Clone)]
pub struct VectorFst<W> {
    states: Vec<State<W>>,
    start: Option<StateId>,
}

impl<W: Semiring> Default for VectorFst<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Semiring> fmt::Debug for VectorFst<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorFst")
            .field("weight", &W::NAME)
            .field("start", &self.start)
            .field("num_states", &self.states.len())
            .field("num_transitions", &self.num_transitions_total())
            .finish()
    }
}

impl<W: Semiring> VectorFst<W> {
    /// An empty transducer: no states, accepts nothing.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            start: None,
        }
    }

    /// The transducer accepting only the empty string with weight One.
    pub fn epsilon() -> Self {
        let mut fst = Self::new();
        let s = fst.add_state();
        fst.set_start(s);
        fst.set_final(s, W::one());
        fst
    }

    /// Linear acceptor over `labels`. Epsilon labels are skipped.
    pub fn from_labels(labels: &[Label]) -> Self {
        Self::from_label_pairs(labels, labels)
    }

    /// Linear transducer mapping `input` to `output`.
    ///
    /// The shorter side is padded with epsilons at its end.
    pub fn from_label_pairs(input: &[Label], output: &[Label]) -> Self {
        let input: Vec<Label> = input.iter().copied().filter(|&l| l != EPSILON).collect();
        let output: Vec<Label> = output.iter().copied().filter(|&l| l != EPSILON).collect();
        let len = input.len().max(output.len());
        let mut fst = Self::new();
        let mut prev = fst.add_state();
        fst.set_start(prev);
        for i in 0..len {
            let next = fst.add_state();
            let il = input.get(i).copied().unwrap_or(EPSILON);
            let ol = output.get(i).copied().unwrap_or(EPSILON);
            fst.add_transition(prev, Transition::unweighted(il, ol, next));
            prev = next;
        }
        fst.set_final(prev, W::one());
        fst
    }

    /// Two-state acceptor with one transition per label.
    pub fn from_alphabet(labels: impl IntoIterator<Item = Label>) -> Self {
        let mut fst = Self::new();
        let s = fst.add_state();
        let f = fst.add_state();
        fst.set_start(s);
        fst.set_final(f, W::one());
        for label in labels {
            fst.add_transition(s, Transition::unweighted(label, label, f));
        }
        fst
    }

    pub fn add_state(&mut self) -> StateId {
        let id = StateId::from_index(self.states.len());
        self.states.push(State::new());
        id
    }

    /// Add `n` states and return the id of the first one.
    pub fn add_states(&mut self, n: usize) -> StateId {
        let first = StateId::from_index(self.states.len());
        self.states.extend((0..n).map(|_| State::new()));
        first
    }

    #[inline]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    pub fn set_start(&mut self, s: StateId) {
        self.start = Some(s);
    }

    #[inline]
    pub fn final_weight(&self, s: StateId) -> W {
        self.states[s.index()].final_weight
    }

    #[inline]
    pub fn is_final(&self, s: StateId) -> bool {
        !self.states[s.index()].final_weight.is_zero()
    }

    pub fn set_final(&mut self, s: StateId, weight: W) {
        self.states[s.index()].final_weight = weight;
    }

    #[inline]
    pub fn transitions(&self, s: StateId) -> &[Transition<W>] {
        &self.states[s.index()].transitions
    }

    #[inline]
    pub fn transitions_mut(&mut self, s: StateId) -> &mut Vec<Transition<W>> {
        &mut self.states[s.index()].transitions
    }

    #[inline]
    pub fn num_transitions(&self, s: StateId) -> usize {
        self.states[s.index()].transitions.len()
    }

    pub fn num_transitions_total(&self) -> usize {
        self.states.iter().map(|st| st.transitions.len()).sum()
    }

    pub fn add_transition(&mut self, s: StateId, tr: Transition<W>) {
        self.states[s.index()].transitions.push(tr);
    }

    pub fn states(&self) -> StateIter {
        StateIter {
            next: 0,
            end: self.states.len() as u32,
        }
    }

    /// Check that a state id read from outside is within range.
    pub fn check_state(&self, s: u32) -> Result<StateId, FstError> {
        if (s as usize) < self.states.len() {
            Ok(StateId(s))
        } else {
            Err(FstError::InvalidState {
                state: s,
                num_states: self.states.len(),
            })
        }
    }

    /// Remove every state for which `keep` is false, renumbering the rest.
    ///
    /// Transitions into removed states are dropped. If the start state is
    /// removed the transducer becomes empty.
    pub fn retain_states(&mut self, keep: &[bool]) {
        let mut remap: Vec<Option<StateId>> = Vec::with_capacity(self.states.len());
        let mut next = 0usize;
        for &k in keep.iter().take(self.states.len()) {
            if k {
                remap.push(Some(StateId::from_index(next)));
                next += 1;
            } else {
                remap.push(None);
            }
        }
        remap.resize(self.states.len(), None);

        let old = std::mem::take(&mut self.states);
        self.states = Vec::with_capacity(next);
        for (i, mut st) in old.into_iter().enumerate() {
            if remap[i].is_none() {
                continue;
            }
            st.transitions.retain_mut(|tr| match remap[tr.nextstate.index()] {
                Some(n) => {
                    tr.nextstate = n;
                    true
                }
                None => false,
            });
            self.states.push(st);
        }

        self.start = self.start.and_then(|s| remap[s.index()]);
        if self.start.is_none() {
            self.states.clear();
        }
    }

    /// Append a copy of `other`'s states, returning the offset of its state 0.
    ///
    /// `other`'s start and final weights are copied verbatim; no transitions
    /// connect the two parts.
    pub fn append_disjoint(&mut self, other: &VectorFst<W>) -> u32 {
        let offset = self.states.len() as u32;
        for st in &other.states {
            let transitions = st
                .transitions
                .iter()
                .map(|tr| Transition {
                    nextstate: StateId(tr.nextstate.0 + offset),
                    ..*tr
                })
                .collect();
            self.states.push(State {
                final_weight: st.final_weight,
                transitions,
            });
        }
        offset
    }

    /// Convert to another weight type through the `f32` encoding.
    pub fn convert<V: Semiring>(&self) -> VectorFst<V> {
        VectorFst {
            states: self
                .states
                .iter()
                .map(|st| State {
                    final_weight: V::from_f32(st.final_weight.to_f32()),
                    transitions: st
                        .transitions
                        .iter()
                        .map(|tr| {
                            Transition::new(
                                tr.ilabel,
                                tr.olabel,
                                V::from_f32(tr.weight.to_f32()),
                                tr.nextstate,
                            )
                        })
                        .collect(),
                })
                .collect(),
            start: self.start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::TropicalWeight;

    type Fst = VectorFst<TropicalWeight>;

    #[test]
    fn empty_fst() {
        let fst = Fst::new();
        assert!(fst.is_empty());
        assert_eq!(fst.start(), None);
        assert_eq!(fst.states().count(), 0);
    }

    #[test]
    fn epsilon_machine() {
        let fst = Fst::epsilon();
        assert_eq!(fst.num_states(), 1);
        let s = fst.start().unwrap();
        assert!(fst.is_final(s));
        assert_eq!(fst.num_transitions(s), 0);
    }

    #[test]
    fn linear_acceptor() {
        let fst = Fst::from_labels(&[1, 2, 3]);
        assert_eq!(fst.num_states(), 4);
        assert_eq!(fst.num_transitions_total(), 3);
        assert!(fst.is_final(StateId(3)));
        assert!(!fst.is_final(StateId(0)));
        assert_eq!(fst.transitions(StateId(1))[0].ilabel, 2);
    }

    #[test]
    fn label_pairs_pad_shorter_side() {
        let fst = Fst::from_label_pairs(&[1, 2, 3], &[9]);
        let labels: Vec<(Label, Label)> = fst
            .states()
            .flat_map(|s| fst.transitions(s).iter().map(|t| (t.ilabel, t.olabel)))
            .collect();
        assert_eq!(labels, vec![(1, 9), (2, 0), (3, 0)]);
    }

    #[test]
    fn retain_states_renumbers() {
        let mut fst = Fst::from_labels(&[1, 2]);
        let extra = fst.add_state();
        fst.add_transition(StateId(0), Transition::unweighted(5, 5, extra));
        fst.retain_states(&[true, true, true, false]);
        assert_eq!(fst.num_states(), 3);
        assert_eq!(fst.num_transitions(StateId(0)), 1);
    }

    #[test]
    fn retain_without_start_clears() {
        let mut fst = Fst::from_labels(&[1]);
        fst.retain_states(&[false, true]);
        assert!(fst.is_empty());
        assert_eq!(fst.start(), None);
    }

    #[test]
    fn check_state_bounds() {
        let fst = Fst::from_labels(&[1]);
        assert!(fst.check_state(1).is_ok());
        assert!(matches!(
            fst.check_state(2),
            Err(FstError::InvalidState {
                state: 2,
                num_states: 2
            })
        ));
    }

    #[test]
    fn append_disjoint_offsets_targets() {
        let mut a = Fst::from_labels(&[1]);
        let b = Fst::from_labels(&[2]);
        let off = a.append_disjoint(&b);
        assert_eq!(off, 2);
        assert_eq!(a.num_states(), 4);
        assert_eq!(a.transitions(StateId(2))[0].nextstate, StateId(3));
        assert!(a.is_final(StateId(3)));
    }
}
