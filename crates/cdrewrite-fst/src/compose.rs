// Composition with an epsilon-sequencing filter, and the cross product.

use std::collections::VecDeque;

use hashbrown::HashMap;
use log::trace;

use crate::rmepsilon::rm_epsilon;
use crate::semiring::Semiring;
use crate::transform::{SortType, arc_sort, connect, map_labels};
use crate::transition::Transition;
use crate::vector::{StateId, VectorFst};
use crate::{EPSILON, FstError, Label};

/// Filter state of the epsilon-sequencing composition filter.
///
/// After the right operand has moved alone on an epsilon input, the left
/// operand may not move alone again until both have taken a matching step.
/// This admits exactly one interleaving of unmatched epsilons per path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FilterState {
    Clear,
    Blocked,
}

type ComposeTuple = (StateId, StateId, FilterState);

struct ComposeStates<W> {
    out: VectorFst<W>,
    table: HashMap<ComposeTuple, StateId>,
    queue: VecDeque<(ComposeTuple, StateId)>,
}

impl<W: Semiring> ComposeStates<W> {
    fn find_or_add(&mut self, tuple: ComposeTuple) -> StateId {
        if let Some(&s) = self.table.get(&tuple) {
            return s;
        }
        let s = self.out.add_state();
        self.table.insert(tuple, s);
        self.queue.push_back((tuple, s));
        s
    }
}

/// Transitions of `fst` at `s` whose input label equals `label`.
///
/// `fst` must be sorted by input label.
fn matching<W: Semiring>(fst: &VectorFst<W>, s: StateId, label: Label) -> &[Transition<W>] {
    let transitions = fst.transitions(s);
    let lo = transitions.partition_point(|t| t.ilabel < label);
    let hi = lo + transitions[lo..].partition_point(|t| t.ilabel == label);
    &transitions[lo..hi]
}

/// Compose two transducers: the result maps `x` to `z` with weight
/// `⊕_y a(x, y) ⊗ b(y, z)`.
///
/// The output is trimmed; if the relation is empty the result has no states.
pub fn compose<W: Semiring>(a: &VectorFst<W>, b: &VectorFst<W>) -> VectorFst<W> {
    let (Some(start_a), Some(start_b)) = (a.start(), b.start()) else {
        return VectorFst::new();
    };
    let mut b_sorted = b.clone();
    arc_sort(&mut b_sorted, SortType::ILabel);
    let b = &b_sorted;

    let mut states = ComposeStates {
        out: VectorFst::new(),
        table: HashMap::new(),
        queue: VecDeque::new(),
    };
    let start = states.find_or_add((start_a, start_b, FilterState::Clear));
    states.out.set_start(start);

    while let Some(((s1, s2, filter), s)) = states.queue.pop_front() {
        let fw1 = a.final_weight(s1);
        let fw2 = b.final_weight(s2);
        if !fw1.is_zero() && !fw2.is_zero() {
            states.out.set_final(s, fw1.times(&fw2));
        }

        for t1 in a.transitions(s1) {
            if t1.olabel == EPSILON {
                if filter == FilterState::Clear {
                    let next = states.find_or_add((t1.nextstate, s2, FilterState::Clear));
                    states
                        .out
                        .add_transition(s, Transition::new(t1.ilabel, EPSILON, t1.weight, next));
                }
                continue;
            }
            for t2 in matching(b, s2, t1.olabel) {
                let next = states.find_or_add((t1.nextstate, t2.nextstate, FilterState::Clear));
                states.out.add_transition(
                    s,
                    Transition::new(t1.ilabel, t2.olabel, t1.weight.times(&t2.weight), next),
                );
            }
        }

        for t2 in matching(b, s2, EPSILON) {
            let next = states.find_or_add((s1, t2.nextstate, FilterState::Blocked));
            states
                .out
                .add_transition(s, Transition::new(EPSILON, t2.olabel, t2.weight, next));
        }
    }

    let mut out = states.out;
    trace!(
        "compose: {}x{} states -> {} states",
        a.num_states(),
        b.num_states(),
        out.num_states()
    );
    connect(&mut out);
    out
}

/// Cross product of two acceptors: the transducer mapping every string of
/// `a` to every string of `b`.
pub fn cross<W: Semiring>(a: &VectorFst<W>, b: &VectorFst<W>) -> Result<VectorFst<W>, FstError> {
    let mut left = a.clone();
    map_labels(&mut left, |il, _| (il, EPSILON));
    rm_epsilon(&mut left)?;
    let mut right = b.clone();
    map_labels(&mut right, |_, ol| (EPSILON, ol));
    rm_epsilon(&mut right)?;
    Ok(compose(&left, &right))
}
