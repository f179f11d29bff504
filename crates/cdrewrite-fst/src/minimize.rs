// Partition-refinement minimization.

use hashbrown::HashMap;
use log::trace;

use crate::Label;
use crate::semiring::Semiring;
use crate::transform::connect;
use crate::transition::Transition;
use crate::vector::{StateId, VectorFst};

type Signature = (usize, Vec<(Label, Label, i64, usize)>);

/// Merge equivalent states.
///
/// Two states are merged when they have the same final weight and, for every
/// label pair and weight, transitions into the same classes. Weights are not
/// pushed, so the result is minimal for deterministic inputs with
/// canonically distributed weights and language-preserving for any input.
pub fn minimize<W: Semiring>(fst: &mut VectorFst<W>) {
    connect(fst);
    let Some(start) = fst.start() else {
        return;
    };
    let n = fst.num_states();

    let mut block = vec![0usize; n];
    let mut num_blocks = {
        let mut ids: HashMap<i64, usize> = HashMap::new();
        for s in fst.states() {
            let key = fst.final_weight(s).quantize();
            let next_id = ids.len();
            block[s.index()] = *ids.entry(key).or_insert(next_id);
        }
        ids.len()
    };

    let mut rounds = 0usize;
    loop {
        rounds += 1;
        let mut ids: HashMap<Signature, usize> = HashMap::new();
        let mut refined = vec![0usize; n];
        for s in fst.states() {
            let mut arcs: Vec<(Label, Label, i64, usize)> = fst
                .transitions(s)
                .iter()
                .map(|t| (t.ilabel, t.olabel, t.weight.quantize(), block[t.nextstate.index()]))
                .collect();
            arcs.sort_unstable();
            let next_id = ids.len();
            refined[s.index()] = *ids.entry((block[s.index()], arcs)).or_insert(next_id);
        }
        let count = ids.len();
        block = refined;
        if count == num_blocks {
            break;
        }
        num_blocks = count;
    }

    if num_blocks == n {
        trace!("minimize: already minimal ({} states)", n);
        return;
    }

    let mut out = VectorFst::new();
    out.add_states(num_blocks);
    let mut done = vec![false; num_blocks];
    for s in fst.states() {
        let b = block[s.index()];
        if done[b] {
            continue;
        }
        done[b] = true;
        let target = StateId::from_index(b);
        out.set_final(target, fst.final_weight(s));
        for tr in fst.transitions(s) {
            out.add_transition(
                target,
                Transition::new(
                    tr.ilabel,
                    tr.olabel,
                    tr.weight,
                    StateId::from_index(block[tr.nextstate.index()]),
                ),
            );
        }
    }
    out.set_start(StateId::from_index(block[start.index()]));
    trace!(
        "minimize: {} states -> {} states in {} rounds",
        n, num_blocks, rounds
    );
    *fst = out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinize::{DeterminizeMode, determinize};
    use crate::paths::string_pairs;
    use crate::rational::union;
    use crate::rmepsilon::rm_epsilon;
    use crate::semiring::TropicalWeight;

    type Fst = VectorFst<TropicalWeight>;

    #[test]
    fn merges_common_suffixes() {
        // {ac, bc}: the two "c" tails are equivalent.
        let mut fst = Fst::from_labels(&[1, 3]);
        union(&mut fst, &Fst::from_labels(&[2, 3]));
        rm_epsilon(&mut fst).unwrap();
        let mut det = determinize(&fst, DeterminizeMode::Labels).unwrap();
        minimize(&mut det);
        assert_eq!(det.num_states(), 3);
        assert_eq!(string_pairs(&det).unwrap().len(), 2);
    }

    #[test]
    fn distinguishes_final_weights() {
        let mut a = Fst::from_labels(&[1]);
        a.set_final(StateId(1), TropicalWeight(1.0));
        let mut b = Fst::from_labels(&[2]);
        b.set_final(StateId(1), TropicalWeight(2.0));
        union(&mut a, &b);
        rm_epsilon(&mut a).unwrap();
        minimize(&mut a);
        assert_eq!(a.num_states(), 3);
    }

    #[test]
    fn collapses_loop_copies() {
        // Two states both looping on 1 and both final: one state suffices.
        let mut fst = Fst::new();
        let s0 = fst.add_state();
        let s1 = fst.add_state();
        fst.set_start(s0);
        fst.set_final(s0, TropicalWeight::one());
        fst.set_final(s1, TropicalWeight::one());
        fst.add_transition(s0, Transition::unweighted(1, 1, s1));
        fst.add_transition(s1, Transition::unweighted(1, 1, s0));
        minimize(&mut fst);
        assert_eq!(fst.num_states(), 1);
        assert_eq!(fst.num_transitions(StateId(0)), 1);
        assert_eq!(fst.transitions(StateId(0))[0].nextstate, StateId(0));
    }

    #[test]
    fn empty_stays_empty() {
        let mut fst = Fst::new();
        minimize(&mut fst);
        assert!(fst.is_empty());
    }
}
