// Marker transducers and marker loops.
//
// A marker pair `(ilabel, olabel)` is one bracket transition. Pairs such as
// `(0, rbrace)` insert a bracket, `(lbrace1, 0)` delete one, and
// `(lbrace2, lbrace2)` let one pass through untouched.

use cdrewrite_fst::properties::is_acceptor;
use cdrewrite_fst::rational::{concat, prepend};
use cdrewrite_fst::rmepsilon::rm_epsilon;
use cdrewrite_fst::{FstError, Label, Semiring, StateId, Transition, VectorFst};

use crate::CompileError;

/// One bracket transition, as `(ilabel, olabel)`.
pub type MarkerPair = (Label, Label);

/// How a marker transducer relates brackets to matches of its language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerType {
    /// Insert brackets right after every match, and only there.
    Mark,
    /// Allow brackets only right after a match.
    Check,
    /// Allow brackets only where no match has just ended.
    CheckComplement,
}

/// The language a marker transducer is built over.
#[derive(Debug, Clone)]
pub enum Language<W: Semiring> {
    /// An explicit deterministic acceptor.
    Explicit(VectorFst<W>),
    /// The complement of `sigma*`, which no string matches.
    ComplementOfSigma,
}

fn add_marker_loops<W: Semiring>(fst: &mut VectorFst<W>, s: StateId, markers: &[MarkerPair]) {
    for &(il, ol) in markers {
        fst.add_transition(s, Transition::unweighted(il, ol, s));
    }
}

/// Build the marker transducer of `language` over the alphabet closure `sigma`.
pub fn make_marker<W: Semiring>(
    language: Language<W>,
    sigma: &VectorFst<W>,
    marker_type: MarkerType,
    markers: &[MarkerPair],
) -> Result<VectorFst<W>, CompileError> {
    let mut fst = match language {
        Language::Explicit(fst) => {
            if !is_acceptor(&fst) {
                return Err(CompileError::MarkerInputNotAcceptor);
            }
            fst
        }
        Language::ComplementOfSigma => {
            let mut fst = sigma.clone();
            if marker_type == MarkerType::CheckComplement {
                let finals: Vec<StateId> = fst.states().filter(|&s| fst.is_final(s)).collect();
                for s in finals {
                    add_marker_loops(&mut fst, s, markers);
                }
            }
            return Ok(fst);
        }
    };

    let num_states = fst.num_states();
    for s in (0..num_states).map(|i| StateId(i as u32)) {
        let is_final = fst.is_final(s);
        match marker_type {
            MarkerType::Mark => {
                if is_final {
                    let split = fst.add_state();
                    fst.set_final(split, fst.final_weight(s));
                    let moved = std::mem::take(fst.transitions_mut(s));
                    *fst.transitions_mut(split) = moved;
                    fst.set_final(s, W::zero());
                    for &(il, ol) in markers {
                        fst.add_transition(s, Transition::unweighted(il, ol, split));
                    }
                } else {
                    fst.set_final(s, W::one());
                }
            }
            MarkerType::Check => {
                if is_final {
                    add_marker_loops(&mut fst, s, markers);
                } else {
                    fst.set_final(s, W::one());
                }
            }
            MarkerType::CheckComplement => {
                if !is_final {
                    fst.set_final(s, W::one());
                    add_marker_loops(&mut fst, s, markers);
                }
            }
        }
    }
    Ok(fst)
}

/// Add a self-loop for every marker pair at every state.
pub fn ignore_markers<W: Semiring>(fst: &mut VectorFst<W>, markers: &[MarkerPair]) {
    for s in fst.states() {
        add_marker_loops(fst, s, markers);
    }
}

/// Let markers restart `sigma*`: every final state gets marker transitions
/// back to the start state.
pub fn add_markers_to_sigma<W: Semiring>(sigma: &mut VectorFst<W>, markers: &[MarkerPair]) {
    let Some(start) = sigma.start() else {
        return;
    };
    let finals: Vec<StateId> = sigma.states().filter(|&s| sigma.is_final(s)).collect();
    for s in finals {
        for &(il, ol) in markers {
            sigma.add_transition(s, Transition::unweighted(il, ol, start));
        }
    }
}

fn one_of<W: Semiring>(markers: &[MarkerPair]) -> VectorFst<W> {
    let mut fst = VectorFst::new();
    let s = fst.add_state();
    let f = fst.add_state();
    fst.set_start(s);
    fst.set_final(f, W::one());
    for &(il, ol) in markers {
        fst.add_transition(s, Transition::unweighted(il, ol, f));
    }
    fst
}

/// Replace `fst` with `fst` followed by one marker transition.
pub fn append_markers<W: Semiring>(fst: &mut VectorFst<W>, markers: &[MarkerPair]) {
    concat(fst, &one_of(markers));
}

/// Make every path of `fst` begin with one marker transition.
pub fn prepend_markers<W: Semiring>(fst: &mut VectorFst<W>, markers: &[MarkerPair]) {
    let old_start = match fst.start() {
        Some(s) => s,
        None => {
            let s = fst.add_state();
            fst.set_start(s);
            s
        }
    };
    let start = fst.add_state();
    for &(il, ol) in markers {
        fst.add_transition(start, Transition::unweighted(il, ol, old_start));
    }
    fst.set_start(start);
}

/// Replace `fst` with `sigma · fst`, epsilon-free.
pub fn prepend_sigma_star<W: Semiring>(
    fst: &mut VectorFst<W>,
    sigma: &VectorFst<W>,
) -> Result<(), FstError> {
    prepend(fst, sigma);
    rm_epsilon(fst)
}
