// Rational operations: concatenation, union and closure.

use crate::semiring::Semiring;
use crate::transition::Transition;
use crate::vector::{StateId, VectorFst};

/// Kleene closure flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureType {
    /// Zero or more repetitions.
    Star,
    /// One or more repetitions.
    Plus,
}

/// Replace `fst` with `fst · other`.
pub fn concat<W: Semiring>(fst: &mut VectorFst<W>, other: &VectorFst<W>) {
    let (Some(_), Some(other_start)) = (fst.start(), other.start()) else {
        *fst = VectorFst::new();
        return;
    };
    let finals: Vec<StateId> = fst.states().filter(|&s| fst.is_final(s)).collect();
    let offset = fst.append_disjoint(other);
    let target = StateId(other_start.0 + offset);
    for s in finals {
        let weight = fst.final_weight(s);
        fst.add_transition(s, Transition::new(0, 0, weight, target));
        fst.set_final(s, W::zero());
    }
}

/// Replace `fst` with `prefix · fst`.
pub fn prepend<W: Semiring>(fst: &mut VectorFst<W>, prefix: &VectorFst<W>) {
    let mut result = prefix.clone();
    concat(&mut result, fst);
    *fst = result;
}

/// Replace `fst` with `fst ∪ other`.
///
/// A fresh start state is always added, with epsilon transitions to the
/// start states of both operands.
pub fn union<W: Semiring>(fst: &mut VectorFst<W>, other: &VectorFst<W>) {
    let old_start = fst.start();
    let offset = fst.append_disjoint(other);
    let start = fst.add_state();
    if let Some(s) = old_start {
        fst.add_transition(start, Transition::unweighted(0, 0, s));
    }
    if let Some(s) = other.start() {
        fst.add_transition(start, Transition::unweighted(0, 0, StateId(s.0 + offset)));
    }
    fst.set_start(start);
}

/// Union of any number of transducers. An empty input yields the empty transducer.
pub fn union_all<'a, W: Semiring>(fsts: impl IntoIterator<Item = &'a VectorFst<W>>) -> VectorFst<W> {
    let mut iter = fsts.into_iter();
    let Some(first) = iter.next() else {
        return VectorFst::new();
    };
    let mut result = first.clone();
    for other in iter {
        union(&mut result, other);
    }
    result
}

/// Replace `fst` with its Kleene closure.
pub fn closure<W: Semiring>(fst: &mut VectorFst<W>, closure_type: ClosureType) {
    let Some(start) = fst.start() else {
        if closure_type == ClosureType::Star {
            *fst = VectorFst::epsilon();
        }
        return;
    };
    let finals: Vec<StateId> = fst.states().filter(|&s| fst.is_final(s)).collect();
    for s in finals {
        let weight = fst.final_weight(s);
        fst.add_transition(s, Transition::new(0, 0, weight, start));
    }
    if closure_type == ClosureType::Star {
        let new_start = fst.add_state();
        fst.set_final(new_start, W::one());
        fst.add_transition(new_start, Transition::unweighted(0, 0, start));
        fst.set_start(new_start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::string_pairs;
    use crate::semiring::TropicalWeight;

    type Fst = VectorFst<TropicalWeight>;

    fn accepted(fst: &Fst) -> Vec<Vec<u32>> {
        let mut out: Vec<Vec<u32>> = string_pairs(fst)
            .unwrap()
            .into_iter()
            .map(|(i, _, _)| i)
            .collect();
        out.sort();
        out
    }

    #[test]
    fn concat_two_strings() {
        let mut a = Fst::from_labels(&[1, 2]);
        concat(&mut a, &Fst::from_labels(&[3]));
        assert_eq!(accepted(&a), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn concat_with_empty_is_empty() {
        let mut a = Fst::from_labels(&[1]);
        concat(&mut a, &Fst::new());
        assert!(a.is_empty());
    }

    #[test]
    fn prepend_puts_prefix_first() {
        let mut a = Fst::from_labels(&[3]);
        prepend(&mut a, &Fst::from_labels(&[1]));
        assert_eq!(accepted(&a), vec![vec![1, 3]]);
    }

    #[test]
    fn union_of_strings() {
        let a = Fst::from_labels(&[1]);
        let b = Fst::from_labels(&[2, 2]);
        let e = Fst::epsilon();
        let u = union_all([&a, &b, &e]);
        assert_eq!(accepted(&u), vec![vec![], vec![1], vec![2, 2]]);
    }

    #[test]
    fn union_with_empty() {
        let mut a = Fst::new();
        union(&mut a, &Fst::from_labels(&[4]));
        assert_eq!(accepted(&a), vec![vec![4]]);
    }

    #[test]
    fn closure_star_accepts_empty() {
        let mut a = Fst::from_labels(&[1]);
        closure(&mut a, ClosureType::Star);
        let s = a.start().unwrap();
        assert!(a.is_final(s));
        assert!(!crate::properties::is_acyclic(&a));
    }

    #[test]
    fn closure_plus_keeps_start() {
        let mut a = Fst::from_labels(&[1]);
        closure(&mut a, ClosureType::Plus);
        assert_eq!(a.num_states(), 2);
        assert!(!a.is_final(a.start().unwrap()));
    }

    #[test]
    fn closure_of_empty() {
        let mut a = Fst::new();
        closure(&mut a, ClosureType::Star);
        assert_eq!(accepted(&a), vec![Vec::<u32>::new()]);
    }
}
