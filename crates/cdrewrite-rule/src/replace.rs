// The replace transducer.
//
// Rewrites every bracketed span of phi into psi and passes everything
// outside the brackets through. Which brackets open and close a span, and
// which are deleted on the way, depends on direction and mode.

use cdrewrite_core::{Direction, Mode};
use cdrewrite_fst::optimize::optimize;
use cdrewrite_fst::rational::{ClosureType, closure};
use cdrewrite_fst::transform::{SortType, arc_sort};
use cdrewrite_fst::{EPSILON, Semiring, StateId, Transition, VectorFst};
use log::debug;

use crate::CompileError;
use crate::labels::MarkerLabels;
use crate::marker::{MarkerPair, add_markers_to_sigma, ignore_markers, prepend_sigma_star};

/// Bracket transitions used to wire the replace transducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceWiring {
    /// Transition entering a rewritten span.
    pub initial_pair: MarkerPair,
    /// Transition leaving a rewritten span.
    pub final_pair: MarkerPair,
    /// Brackets allowed between spans.
    pub initial_loops: Vec<MarkerPair>,
    /// Brackets ignored inside a span.
    pub all_loops: Vec<MarkerPair>,
}

impl ReplaceWiring {
    pub fn new(direction: Direction, mode: Mode, m: &MarkerLabels) -> Self {
        let (initial_pair, final_pair, initial_loops, all_loops) = match (mode, direction) {
            (Mode::Obligatory, Direction::LeftToRight) => (
                (m.lbrace1, m.lbrace1),
                (m.rbrace, EPSILON),
                vec![(m.lbrace2, m.lbrace2), (m.rbrace, EPSILON)],
                vec![(m.lbrace1, EPSILON), (m.lbrace2, EPSILON), (m.rbrace, EPSILON)],
            ),
            (Mode::Obligatory, Direction::RightToLeft) => (
                (m.rbrace, EPSILON),
                (m.lbrace1, m.lbrace1),
                vec![(m.lbrace2, m.lbrace2), (m.rbrace, EPSILON)],
                vec![(m.lbrace1, EPSILON), (m.lbrace2, EPSILON), (m.rbrace, EPSILON)],
            ),
            (Mode::Obligatory, Direction::Simultaneous) => (
                (m.lbrace1, EPSILON),
                (m.rbrace, EPSILON),
                vec![(m.lbrace2, EPSILON), (m.rbrace, EPSILON)],
                vec![(m.lbrace1, EPSILON), (m.lbrace2, EPSILON), (m.rbrace, EPSILON)],
            ),
            (Mode::Optional, Direction::LeftToRight) => (
                (EPSILON, m.lbrace1),
                (m.rbrace, EPSILON),
                vec![(m.rbrace, EPSILON)],
                vec![(m.rbrace, EPSILON)],
            ),
            (Mode::Optional, Direction::RightToLeft) => (
                (m.rbrace, EPSILON),
                (EPSILON, m.lbrace1),
                vec![(m.rbrace, EPSILON)],
                vec![(m.rbrace, EPSILON)],
            ),
            (Mode::Optional, Direction::Simultaneous) => (
                (m.lbrace1, EPSILON),
                (m.rbrace, EPSILON),
                vec![(m.rbrace, EPSILON)],
                vec![(m.rbrace, EPSILON)],
            ),
        };
        Self {
            initial_pair,
            final_pair,
            initial_loops,
            all_loops,
        }
    }
}

/// Build the replace transducer from the rewrite relation `tau`.
///
/// The result is `(sigma_m* · [initial_pair tau final_pair])*`, where
/// `sigma_m` is `sigma` extended with the wiring's initial loops, and brackets
/// inside `tau` are ignored.
pub fn make_replace<W: Semiring>(
    mut fst: VectorFst<W>,
    sigma: &VectorFst<W>,
    wiring: &ReplaceWiring,
) -> Result<VectorFst<W>, CompileError> {
    optimize(&mut fst)?;
    let old_start = match fst.start() {
        Some(s) => s,
        None => {
            let s = fst.add_state();
            fst.set_start(s);
            s
        }
    };
    ignore_markers(&mut fst, &wiring.all_loops);

    let finals: Vec<StateId> = fst.states().filter(|&s| fst.is_final(s)).collect();
    let start_state = fst.add_state();
    let final_state = fst.add_state();
    let (il, ol) = wiring.initial_pair;
    fst.add_transition(start_state, Transition::unweighted(il, ol, old_start));
    let (il, ol) = wiring.final_pair;
    for s in finals {
        let weight = fst.final_weight(s);
        fst.add_transition(s, Transition::new(il, ol, weight, final_state));
        fst.set_final(s, W::zero());
    }
    fst.set_final(final_state, W::one());
    fst.set_final(start_state, W::one());
    fst.set_start(start_state);

    let mut sigma_m = sigma.clone();
    add_markers_to_sigma(&mut sigma_m, &wiring.initial_loops);
    prepend_sigma_star(&mut fst, &sigma_m)?;
    closure(&mut fst, ClosureType::Star);
    optimize(&mut fst)?;
    arc_sort(&mut fst, SortType::ILabel);
    debug!("replace: {} states", fst.num_states());
    Ok(fst)
}
