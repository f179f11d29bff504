// Epsilon removal.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};

use crate::semiring::Semiring;
use crate::transform::connect;
use crate::transition::Transition;
use crate::vector::{StateId, VectorFst};
use crate::{FstError, MAX_LOOP_COUNT};

/// Shortest distances from `source` to every state reachable through
/// epsilon-only transitions, sorted by state id. `source` itself is included.
fn epsilon_closure<W: Semiring>(
    fst: &VectorFst<W>,
    source: StateId,
) -> Result<Vec<(StateId, W)>, FstError> {
    let mut distance: HashMap<StateId, W> = HashMap::new();
    let mut residual: HashMap<StateId, W> = HashMap::new();
    let mut queue: VecDeque<StateId> = VecDeque::new();
    let mut enqueued: HashSet<StateId> = HashSet::new();

    distance.insert(source, W::one());
    residual.insert(source, W::one());
    queue.push_back(source);
    enqueued.insert(source);

    let mut loop_count: u32 = 0;
    while let Some(q) = queue.pop_front() {
        loop_count += 1;
        if loop_count > MAX_LOOP_COUNT {
            return Err(FstError::Diverged);
        }
        enqueued.remove(&q);
        let r = residual.insert(q, W::zero()).unwrap_or_else(W::zero);
        if r.is_zero() {
            continue;
        }
        for tr in fst.transitions(q).iter().filter(|t| t.is_epsilon()) {
            let n = tr.nextstate;
            let step = r.times(&tr.weight);
            let old = distance.get(&n).copied().unwrap_or_else(W::zero);
            let updated = old.plus(&step);
            if updated.approx_eq(&old) {
                continue;
            }
            distance.insert(n, updated);
            let rn = residual.get(&n).copied().unwrap_or_else(W::zero);
            residual.insert(n, rn.plus(&step));
            if enqueued.insert(n) {
                queue.push_back(n);
            }
        }
    }

    let mut closure: Vec<(StateId, W)> = distance.into_iter().collect();
    closure.sort_by_key(|&(s, _)| s);
    Ok(closure)
}

/// Remove all transitions whose input and output labels are both epsilon.
///
/// The result is trimmed. Fails with [`FstError::Diverged`] if an epsilon
/// cycle keeps changing distances beyond [`MAX_LOOP_COUNT`] iterations.
pub fn rm_epsilon<W: Semiring>(fst: &mut VectorFst<W>) -> Result<(), FstError> {
    if fst.start().is_none() {
        *fst = VectorFst::new();
        return Ok(());
    }
    if crate::properties::is_epsilon_free(fst) {
        connect(fst);
        return Ok(());
    }

    let mut new_transitions: Vec<Vec<Transition<W>>> = Vec::with_capacity(fst.num_states());
    let mut new_finals: Vec<W> = Vec::with_capacity(fst.num_states());
    for s in fst.states() {
        let mut transitions = Vec::new();
        let mut final_weight = W::zero();
        for (q, d) in epsilon_closure(fst, s)? {
            for tr in fst.transitions(q).iter().filter(|t| !t.is_epsilon()) {
                transitions.push(Transition::new(
                    tr.ilabel,
                    tr.olabel,
                    d.times(&tr.weight),
                    tr.nextstate,
                ));
            }
            let fw = fst.final_weight(q);
            if !fw.is_zero() {
                final_weight = final_weight.plus(&d.times(&fw));
            }
        }
        new_transitions.push(transitions);
        new_finals.push(final_weight);
    }

    for (s, (transitions, final_weight)) in fst
        .states()
        .zip(new_transitions.into_iter().zip(new_finals))
    {
        *fst.transitions_mut(s) = transitions;
        fst.set_final(s, final_weight);
    }
    connect(fst);
    Ok(())
}
