// Label-, weight- and topology-level transforms.

use hashbrown::HashMap;

use crate::Label;
use crate::semiring::Semiring;
use crate::transition::Transition;
use crate::vector::{StateId, VectorFst};

/// Which side of a transducer to keep when projecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Input,
    Output,
}

/// Transition sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortType {
    /// By `(ilabel, olabel)`.
    ILabel,
    /// By `(olabel, ilabel)`.
    OLabel,
}

/// Copy one side's labels onto the other, turning the transducer into an acceptor.
pub fn project<W: Semiring>(fst: &mut VectorFst<W>, project_type: ProjectType) {
    for s in fst.states() {
        for tr in fst.transitions_mut(s) {
            match project_type {
                ProjectType::Input => tr.olabel = tr.ilabel,
                ProjectType::Output => tr.ilabel = tr.olabel,
            }
        }
    }
}

/// Swap input and output labels.
pub fn invert<W: Semiring>(fst: &mut VectorFst<W>) {
    for s in fst.states() {
        for tr in fst.transitions_mut(s) {
            std::mem::swap(&mut tr.ilabel, &mut tr.olabel);
        }
    }
}

/// Sort each state's transitions.
pub fn arc_sort<W: Semiring>(fst: &mut VectorFst<W>, sort_type: SortType) {
    let key = |t: &Transition<W>| match sort_type {
        SortType::ILabel => (t.ilabel, t.olabel, t.nextstate),
        SortType::OLabel => (t.olabel, t.ilabel, t.nextstate),
    };
    for s in fst.states() {
        fst.transitions_mut(s).sort_by_key(key);
    }
}

/// Apply `f` to every transition weight and every non-Zero final weight.
pub fn map_weights<W: Semiring>(fst: &mut VectorFst<W>, f: impl Fn(W) -> W) {
    for s in fst.states() {
        for tr in fst.transitions_mut(s) {
            tr.weight = f(tr.weight);
        }
        let fw = fst.final_weight(s);
        if !fw.is_zero() {
            fst.set_final(s, f(fw));
        }
    }
}

/// Set every transition weight and every final weight to One.
pub fn rm_weights<W: Semiring>(fst: &mut VectorFst<W>) {
    map_weights(fst, |_| W::one());
}

/// Rewrite labels with `f(ilabel, olabel) -> (ilabel, olabel)`.
pub fn map_labels<W: Semiring>(fst: &mut VectorFst<W>, f: impl Fn(Label, Label) -> (Label, Label)) {
    for s in fst.states() {
        for tr in fst.transitions_mut(s) {
            (tr.ilabel, tr.olabel) = f(tr.ilabel, tr.olabel);
        }
    }
}

/// Reverse the transducer.
///
/// The result has a fresh start state 0 with epsilon transitions (weighted by
/// the old final weights) to every old final state; the old start state
/// becomes the only final state. Old state `s` becomes `s + 1`.
pub fn reverse<W: Semiring>(fst: &VectorFst<W>) -> VectorFst<W> {
    let mut out = VectorFst::new();
    let Some(old_start) = fst.start() else {
        return out;
    };
    out.add_states(fst.num_states() + 1);
    let shift = |s: StateId| StateId(s.0 + 1);
    let start = StateId(0);
    out.set_start(start);
    for s in fst.states() {
        for tr in fst.transitions(s) {
            out.add_transition(
                shift(tr.nextstate),
                Transition::new(tr.ilabel, tr.olabel, tr.weight, shift(s)),
            );
        }
        let fw = fst.final_weight(s);
        if !fw.is_zero() {
            out.add_transition(start, Transition::new(0, 0, fw, shift(s)));
        }
    }
    out.set_final(shift(old_start), W::one());
    out
}

/// States reachable from the start state.
pub fn accessible<W: Semiring>(fst: &VectorFst<W>) -> Vec<bool> {
    let mut seen = vec![false; fst.num_states()];
    let Some(start) = fst.start() else {
        return seen;
    };
    let mut stack = vec![start];
    seen[start.index()] = true;
    while let Some(s) = stack.pop() {
        for tr in fst.transitions(s) {
            if !seen[tr.nextstate.index()] {
                seen[tr.nextstate.index()] = true;
                stack.push(tr.nextstate);
            }
        }
    }
    seen
}

/// States from which some final state is reachable.
pub fn coaccessible<W: Semiring>(fst: &VectorFst<W>) -> Vec<bool> {
    let n = fst.num_states();
    let mut incoming: Vec<Vec<StateId>> = vec![Vec::new(); n];
    for s in fst.states() {
        for tr in fst.transitions(s) {
            incoming[tr.nextstate.index()].push(s);
        }
    }
    let mut seen = vec![false; n];
    let mut stack: Vec<StateId> = fst.states().filter(|&s| fst.is_final(s)).collect();
    for s in &stack {
        seen[s.index()] = true;
    }
    while let Some(s) = stack.pop() {
        for &p in &incoming[s.index()] {
            if !seen[p.index()] {
                seen[p.index()] = true;
                stack.push(p);
            }
        }
    }
    seen
}

/// Remove states that are not both accessible and coaccessible.
///
/// A transducer accepting nothing ends up with no states at all.
pub fn connect<W: Semiring>(fst: &mut VectorFst<W>) {
    let acc = accessible(fst);
    let coacc = coaccessible(fst);
    let keep: Vec<bool> = acc.iter().zip(&coacc).map(|(&a, &c)| a && c).collect();
    if keep.iter().all(|&k| k) {
        return;
    }
    fst.retain_states(&keep);
}

/// Merge transitions that share source, labels and destination by ⊕-ing their weights.
pub fn sum_parallel_transitions<W: Semiring>(fst: &mut VectorFst<W>) {
    let mut index: HashMap<(Label, Label, StateId), usize> = HashMap::new();
    for s in fst.states() {
        let transitions = fst.transitions_mut(s);
        if transitions.len() < 2 {
            continue;
        }
        index.clear();
        let mut merged: Vec<Transition<W>> = Vec::with_capacity(transitions.len());
        for tr in transitions.drain(..) {
            match index.get(&(tr.ilabel, tr.olabel, tr.nextstate)) {
                Some(&i) => merged[i].weight = merged[i].weight.plus(&tr.weight),
                None => {
                    index.insert((tr.ilabel, tr.olabel, tr.nextstate), merged.len());
                    merged.push(tr);
                }
            }
        }
        *transitions = merged;
    }
}
