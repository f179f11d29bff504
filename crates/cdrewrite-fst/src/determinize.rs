// Weighted subset construction over label pairs.

use std::collections::{BTreeMap, VecDeque};

use hashbrown::HashMap;
use log::{debug, trace};

use crate::semiring::Semiring;
use crate::transform::connect;
use crate::transition::Transition;
use crate::vector::{StateId, VectorFst};
use crate::{FstError, Label, MAX_DETERMINIZED_STATES};

/// What the subset construction treats as the transition symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeterminizeMode {
    /// Symbols are `(ilabel, olabel)` pairs; weights are pushed into residuals.
    ///
    /// Only guaranteed to terminate on unweighted, acyclic, or
    /// unweighted-cycle inputs over an idempotent semiring.
    Labels,
    /// Symbols are `(ilabel, olabel, weight)` triples; weights are left in place.
    ///
    /// Always terminates, at the cost of a larger result.
    LabelsAndWeights,
}

/// A weighted subset: residual weight per member state, sorted by state.
type Subset<W> = Vec<(StateId, W)>;
type SubsetKey = Vec<(u32, i64)>;

fn subset_key<W: Semiring>(subset: &Subset<W>) -> SubsetKey {
    subset.iter().map(|(s, w)| (s.0, w.quantize())).collect()
}

/// Determinize `fst`, treating it as an acceptor over label pairs.
///
/// The input must not contain transitions with both labels epsilon.
/// Fails with [`FstError::StateLimit`] if more than
/// [`MAX_DETERMINIZED_STATES`] subsets are created.
pub fn determinize<W: Semiring>(
    fst: &VectorFst<W>,
    mode: DeterminizeMode,
) -> Result<VectorFst<W>, FstError> {
    let mut out = VectorFst::new();
    let Some(start) = fst.start() else {
        return Ok(out);
    };

    let mut table: HashMap<SubsetKey, StateId> = HashMap::new();
    let mut queue: VecDeque<(Subset<W>, StateId)> = VecDeque::new();

    let initial: Subset<W> = vec![(start, W::one())];
    let s0 = out.add_state();
    out.set_start(s0);
    table.insert(subset_key(&initial), s0);
    queue.push_back((initial, s0));

    while let Some((subset, s)) = queue.pop_front() {
        let mut final_weight = W::zero();
        // (ilabel, olabel, weight key) -> (transition weight, member contributions)
        let mut groups: BTreeMap<(Label, Label, i64), (W, Vec<(StateId, W)>)> = BTreeMap::new();

        for &(q, r) in &subset {
            let fw = fst.final_weight(q);
            if !fw.is_zero() {
                final_weight = final_weight.plus(&r.times(&fw));
            }
            for tr in fst.transitions(q) {
                let weighted = r.times(&tr.weight);
                if weighted.is_zero() {
                    continue;
                }
                let wkey = match mode {
                    DeterminizeMode::Labels => 0,
                    DeterminizeMode::LabelsAndWeights => tr.weight.quantize(),
                };
                let entry = groups
                    .entry((tr.ilabel, tr.olabel, wkey))
                    .or_insert_with(|| (W::zero(), Vec::new()));
                match mode {
                    DeterminizeMode::Labels => {
                        entry.0 = entry.0.plus(&weighted);
                        entry.1.push((tr.nextstate, weighted));
                    }
                    DeterminizeMode::LabelsAndWeights => {
                        entry.0 = tr.weight;
                        entry.1.push((tr.nextstate, W::one()));
                    }
                }
            }
        }
        out.set_final(s, final_weight);

        for ((ilabel, olabel, _), (weight, members)) in groups {
            let mut next: BTreeMap<StateId, W> = BTreeMap::new();
            for (n, w) in members {
                let residual = match mode {
                    DeterminizeMode::Labels => w.divide(&weight),
                    DeterminizeMode::LabelsAndWeights => w,
                };
                next.entry(n)
                    .and_modify(|acc| *acc = acc.plus(&residual))
                    .or_insert(residual);
            }
            let next: Subset<W> = next.into_iter().collect();
            let key = subset_key(&next);
            let target = match table.get(&key) {
                Some(&t) => t,
                None => {
                    if out.num_states() >= MAX_DETERMINIZED_STATES {
                        debug!("determinize: giving up after {} states", out.num_states());
                        return Err(FstError::StateLimit {
                            limit: MAX_DETERMINIZED_STATES,
                        });
                    }
                    let t = out.add_state();
                    table.insert(key, t);
                    queue.push_back((next, t));
                    t
                }
            };
            out.add_transition(s, Transition::new(ilabel, olabel, weight, target));
        }
    }

    trace!(
        "determinize: {} states -> {} states",
        fst.num_states(),
        out.num_states()
    );
    connect(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::string_pairs;
    use crate::properties::is_input_deterministic;
    use crate::rational::union;
    use crate::rmepsilon::rm_epsilon;
    use crate::semiring::TropicalWeight;

    type Fst = VectorFst<TropicalWeight>;

    fn union_of(strings: &[&[Label]]) -> Fst {
        let mut fst = Fst::new();
        for s in strings {
            union(&mut fst, &Fst::from_labels(s));
        }
        rm_epsilon(&mut fst).unwrap();
        fst
    }

    #[test]
    fn merges_common_prefixes() {
        let fst = union_of(&[&[1, 2], &[1, 3]]);
        let det = determinize(&fst, DeterminizeMode::Labels).unwrap();
        assert!(is_input_deterministic(&det));
        assert_eq!(det.num_transitions(det.start().unwrap()), 1);
        assert_eq!(string_pairs(&det).unwrap().len(), 2);
    }

    #[test]
    fn duplicate_paths_collapse() {
        let fst = union_of(&[&[1, 2], &[1, 2]]);
        let det = determinize(&fst, DeterminizeMode::Labels).unwrap();
        assert_eq!(string_pairs(&det).unwrap().len(), 1);
        assert_eq!(det.num_states(), 3);
    }

    #[test]
    fn tropical_keeps_best_weight() {
        let mut a = Fst::from_labels(&[1]);
        a.set_final(StateId(1), TropicalWeight(3.0));
        let mut b = Fst::from_labels(&[1]);
        b.set_final(StateId(1), TropicalWeight(1.0));
        let mut fst = a;
        union(&mut fst, &b);
        rm_epsilon(&mut fst).unwrap();
        let det = determinize(&fst, DeterminizeMode::Labels).unwrap();
        let paths = string_pairs(&det).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].2.approx_eq(&TropicalWeight(1.0)));
    }

    #[test]
    fn labels_and_weights_keeps_distinct_weights() {
        let mut a = Fst::from_labels(&[1]);
        a.transitions_mut(StateId(0))[0].weight = TropicalWeight(3.0);
        let mut b = Fst::from_labels(&[1]);
        b.transitions_mut(StateId(0))[0].weight = TropicalWeight(1.0);
        let mut fst = a;
        union(&mut fst, &b);
        rm_epsilon(&mut fst).unwrap();
        let det = determinize(&fst, DeterminizeMode::LabelsAndWeights).unwrap();
        assert_eq!(det.num_transitions(det.start().unwrap()), 2);
    }

    #[test]
    fn transducer_pairs_are_symbols() {
        let mut fst = Fst::from_label_pairs(&[1], &[2]);
        union(&mut fst, &Fst::from_label_pairs(&[1], &[3]));
        rm_epsilon(&mut fst).unwrap();
        let det = determinize(&fst, DeterminizeMode::Labels).unwrap();
        // Same input label, different output labels: both kept.
        assert_eq!(det.num_transitions(det.start().unwrap()), 2);
    }
}
