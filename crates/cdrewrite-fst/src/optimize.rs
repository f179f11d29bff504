// Generic determinize/minimize heuristics.

use log::debug;

use crate::FstError;
use crate::determinize::{DeterminizeMode, determinize};
use crate::minimize::minimize;
use crate::properties::{
    has_only_unweighted_cycles, is_acyclic, is_epsilon_free, is_input_deterministic,
    is_unweighted,
};
use crate::rmepsilon::rm_epsilon;
use crate::semiring::Semiring;
use crate::transform::sum_parallel_transitions;
use crate::vector::VectorFst;

/// Determinization is only safe without weight encoding when the
/// transducer has no weighted cycles.
fn needs_weight_encoding<W: Semiring>(fst: &VectorFst<W>) -> bool {
    !(is_acyclic(fst) || is_unweighted(fst) || has_only_unweighted_cycles(fst))
}

fn determinize_and_minimize<W: Semiring>(
    fst: &mut VectorFst<W>,
    mode: DeterminizeMode,
) -> Result<(), FstError> {
    *fst = determinize(fst, mode)?;
    minimize(fst);
    Ok(())
}

/// Reduce a transducer without changing the weighted relation it encodes.
///
/// 1. Remove epsilon transitions if there are any.
/// 2. If no state has two transitions on the same input label, minimize.
/// 3. Otherwise, over an idempotent semiring, determinize (treating weights
///    as part of the symbol when there are weighted cycles) and minimize.
/// 4. Over a non-idempotent semiring, determinize and minimize only if the
///    transducer is acyclic; otherwise leave it epsilon-free.
///
/// Parallel transitions are merged at the end.
pub fn optimize<W: Semiring>(fst: &mut VectorFst<W>) -> Result<(), FstError> {
    let before = fst.num_states();
    if !is_epsilon_free(fst) {
        rm_epsilon(fst)?;
    }
    if is_input_deterministic(fst) {
        minimize(fst);
    } else if W::IDEMPOTENT {
        if needs_weight_encoding(fst) {
            determinize_and_minimize(fst, DeterminizeMode::LabelsAndWeights)?;
        } else {
            determinize_and_minimize(fst, DeterminizeMode::Labels)?;
        }
    } else if is_acyclic(fst) {
        determinize_and_minimize(fst, DeterminizeMode::Labels)?;
    }
    sum_parallel_transitions(fst);
    debug!("optimize: {} states -> {} states", before, fst.num_states());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::string_pairs;
    use crate::rational::{ClosureType, closure, union};
    use crate::semiring::{LogWeight, TropicalWeight};
    use crate::transition::Transition;
    use crate::vector::StateId;

    type Fst = VectorFst<TropicalWeight>;

    #[test]
    fn optimize_union_of_strings() {
        let mut fst = Fst::from_labels(&[1, 2, 3]);
        union(&mut fst, &Fst::from_labels(&[1, 2, 4]));
        union(&mut fst, &Fst::from_labels(&[1, 2, 3]));
        optimize(&mut fst).unwrap();
        assert!(is_input_deterministic(&fst));
        assert_eq!(fst.num_states(), 4);
        assert_eq!(string_pairs(&fst).unwrap().len(), 2);
    }

    #[test]
    fn optimize_sigma_star() {
        let mut fst = Fst::from_alphabet([1, 2]);
        closure(&mut fst, ClosureType::Star);
        optimize(&mut fst).unwrap();
        assert_eq!(fst.num_states(), 1);
        assert_eq!(fst.num_transitions(StateId(0)), 2);
        assert!(fst.is_final(StateId(0)));
    }

    #[test]
    fn optimize_weighted_cycle_terminates() {
        // Two different weighted loops on the same label: not determinizable
        // without encoding weights.
        let mut fst = Fst::new();
        let s = fst.add_state();
        let a = fst.add_state();
        let b = fst.add_state();
        fst.set_start(s);
        fst.set_final(a, TropicalWeight::one());
        fst.set_final(b, TropicalWeight::one());
        fst.add_transition(s, Transition::new(1, 1, TropicalWeight(1.0), a));
        fst.add_transition(s, Transition::new(1, 1, TropicalWeight(2.0), b));
        fst.add_transition(a, Transition::new(2, 2, TropicalWeight(1.0), a));
        fst.add_transition(b, Transition::new(2, 2, TropicalWeight(3.0), b));
        optimize(&mut fst).unwrap();
        assert!(fst.num_states() >= 2);
    }

    #[test]
    fn optimize_log_acyclic() {
        let half = LogWeight(std::f32::consts::LN_2);
        let mut a: VectorFst<LogWeight> = VectorFst::from_labels(&[1]);
        a.set_final(StateId(1), half);
        let b = a.clone();
        union(&mut a, &b);
        optimize(&mut a).unwrap();
        let paths = string_pairs(&a).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].2.approx_eq(&LogWeight::one()));
    }

    #[test]
    fn optimize_empty() {
        let mut fst = Fst::new();
        optimize(&mut fst).unwrap();
        assert!(fst.is_empty());
    }
}
