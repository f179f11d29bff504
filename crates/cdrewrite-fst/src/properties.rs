// Structural property checks.

use hashbrown::HashSet;

use crate::semiring::Semiring;
use crate::vector::{StateId, VectorFst};
use crate::Label;

/// Whether every transition has `ilabel == olabel`.
pub fn is_acceptor<W: Semiring>(fst: &VectorFst<W>) -> bool {
    fst.states()
        .all(|s| fst.transitions(s).iter().all(|t| t.ilabel == t.olabel))
}

/// Whether every transition and final weight is One (or Zero for non-final states).
pub fn is_unweighted<W: Semiring>(fst: &VectorFst<W>) -> bool {
    fst.states().all(|s| {
        let fw = fst.final_weight(s);
        (fw.is_zero() || fw.is_one()) && fst.transitions(s).iter().all(|t| t.weight.is_one())
    })
}

/// Whether the transducer is an unweighted acceptor.
pub fn is_unweighted_acceptor<W: Semiring>(fst: &VectorFst<W>) -> bool {
    is_acceptor(fst) && is_unweighted(fst)
}

/// Whether no state has two outgoing transitions with the same input label.
pub fn is_input_deterministic<W: Semiring>(fst: &VectorFst<W>) -> bool {
    let mut seen: HashSet<Label> = HashSet::new();
    for s in fst.states() {
        seen.clear();
        for t in fst.transitions(s) {
            if !seen.insert(t.ilabel) {
                return false;
            }
        }
    }
    true
}

/// Whether no transition has both labels epsilon.
pub fn is_epsilon_free<W: Semiring>(fst: &VectorFst<W>) -> bool {
    fst.states()
        .all(|s| fst.transitions(s).iter().all(|t| !t.is_epsilon()))
}

/// Strongly connected components.
///
/// Returns the component id of each state. Component ids are assigned in
/// reverse topological order of the condensation (Tarjan's order).
pub fn scc<W: Semiring>(fst: &VectorFst<W>) -> Vec<usize> {
    const UNVISITED: usize = usize::MAX;

    let n = fst.num_states();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut component = vec![UNVISITED; n];
    let mut stack: Vec<usize> = Vec::new();
    // (state, next transition position)
    let mut frames: Vec<(usize, usize)> = Vec::new();
    let mut counter = 0usize;
    let mut num_components = 0usize;

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        frames.push((root, 0));
        index[root] = counter;
        lowlink[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(&(v, pos)) = frames.last() {
            let transitions = fst.transitions(StateId::from_index(v));
            if pos < transitions.len() {
                let w = transitions[pos].nextstate.index();
                let top = frames.len() - 1;
                frames[top].1 += 1;
                if index[w] == UNVISITED {
                    index[w] = counter;
                    lowlink[w] = counter;
                    counter += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if lowlink[v] == index[v] {
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component[w] = num_components;
                    if w == v {
                        break;
                    }
                }
                num_components += 1;
            }
        }
    }
    component
}

/// Whether the transducer has no cycles.
pub fn is_acyclic<W: Semiring>(fst: &VectorFst<W>) -> bool {
    let component = scc(fst);
    let mut sizes = vec![0usize; fst.num_states()];
    for &c in &component {
        sizes[c] += 1;
    }
    fst.states().all(|s| {
        sizes[component[s.index()]] == 1
            && fst.transitions(s).iter().all(|t| t.nextstate != s)
    })
}

/// Whether every transition lying on a cycle carries weight One.
pub fn has_only_unweighted_cycles<W: Semiring>(fst: &VectorFst<W>) -> bool {
    let component = scc(fst);
    fst.states().all(|s| {
        fst.transitions(s).iter().all(|t| {
            component[t.nextstate.index()] != component[s.index()] || t.weight.is_one()
        })
    })
}

/// Largest label appearing on either side of any transition.
pub fn max_label<W: Semiring>(fst: &VectorFst<W>) -> Option<Label> {
    fst.states()
        .flat_map(|s| fst.transitions(s).iter().map(|t| t.ilabel.max(t.olabel)))
        .max()
}

/// Whether `label` appears on either side of any transition.
pub fn contains_label<W: Semiring>(fst: &VectorFst<W>, label: Label) -> bool {
    fst.states().any(|s| {
        fst.transitions(s)
            .iter()
            .any(|t| t.ilabel == label || t.olabel == label)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::TropicalWeight;
    use crate::transition::Transition;

    type Fst = VectorFst<TropicalWeight>;

    fn cycle(weight: f32) -> Fst {
        let mut fst = Fst::new();
        let a = fst.add_state();
        let b = fst.add_state();
        fst.set_start(a);
        fst.set_final(b, TropicalWeight::one());
        fst.add_transition(a, Transition::unweighted(1, 1, b));
        fst.add_transition(b, Transition::new(2, 2, TropicalWeight(weight), a));
        fst
    }

    #[test]
    fn acceptor_and_unweighted() {
        let fst = Fst::from_labels(&[1, 2]);
        assert!(is_acceptor(&fst));
        assert!(is_unweighted(&fst));
        let fst = Fst::from_label_pairs(&[1], &[2]);
        assert!(!is_acceptor(&fst));
        let mut fst = Fst::from_labels(&[1]);
        fst.set_final(StateId(1), TropicalWeight(3.0));
        assert!(!is_unweighted(&fst));
        assert!(!is_unweighted_acceptor(&fst));
    }

    #[test]
    fn linear_is_acyclic() {
        assert!(is_acyclic(&Fst::from_labels(&[1, 2, 3])));
        assert!(!is_acyclic(&cycle(0.0)));
    }

    #[test]
    fn self_loop_is_cycle() {
        let mut fst = Fst::epsilon();
        fst.add_transition(StateId(0), Transition::unweighted(1, 1, StateId(0)));
        assert!(!is_acyclic(&fst));
    }

    #[test]
    fn unweighted_cycles() {
        assert!(has_only_unweighted_cycles(&cycle(0.0)));
        assert!(!has_only_unweighted_cycles(&cycle(1.0)));
        // Weights off the cycle do not matter.
        let mut fst = Fst::from_labels(&[1]);
        fst.transitions_mut(StateId(0))[0].weight = TropicalWeight(5.0);
        assert!(has_only_unweighted_cycles(&fst));
    }

    #[test]
    fn scc_components() {
        let fst = cycle(0.0);
        let comp = scc(&fst);
        assert_eq!(comp[0], comp[1]);
        let fst = Fst::from_labels(&[1]);
        let comp = scc(&fst);
        assert_ne!(comp[0], comp[1]);
    }

    #[test]
    fn input_determinism() {
        let mut fst = Fst::from_alphabet([1, 2]);
        assert!(is_input_deterministic(&fst));
        fst.add_transition(StateId(0), Transition::unweighted(1, 3, StateId(1)));
        assert!(!is_input_deterministic(&fst));
    }

    #[test]
    fn labels() {
        let fst = Fst::from_label_pairs(&[4, 1], &[7]);
        assert_eq!(max_label(&fst), Some(7));
        assert!(contains_label(&fst, 4));
        assert!(!contains_label(&fst, 5));
        assert_eq!(max_label(&Fst::epsilon()), None);
    }
}
