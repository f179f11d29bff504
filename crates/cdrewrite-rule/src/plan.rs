// Composition plans.
//
// Each (direction, mode) combination is a fixed chain of context filters
// around the replace transducer. The chain is composed left to right.

use cdrewrite_core::{Direction, Mode};
use cdrewrite_fst::EPSILON;

use crate::labels::MarkerLabels;
use crate::marker::{MarkerPair, MarkerType};

/// The language a filter stage is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    /// The left context.
    Lambda,
    /// The right context.
    Rho,
    /// `phi` followed by a close bracket, over `sigma` with close brackets.
    PhiThenClose,
    /// A close bracket followed by `phi`, over `sigma` with close brackets.
    CloseThenPhi,
}

/// A filter stage of a composition plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStage {
    pub source: FilterSource,
    pub marker_type: MarkerType,
    pub markers: Vec<MarkerPair>,
    /// Brackets passed through unchanged at every state after marking.
    pub ignore: Vec<MarkerPair>,
    pub reverse: bool,
}

/// One operand of the composition chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Filter(FilterStage),
    Replace,
}

fn filter(
    source: FilterSource,
    marker_type: MarkerType,
    markers: Vec<MarkerPair>,
    ignore: Vec<MarkerPair>,
    reverse: bool,
) -> Stage {
    Stage::Filter(FilterStage {
        source,
        marker_type,
        markers,
        ignore,
        reverse,
    })
}

/// The composition chain for a rule compiled in `direction` and `mode`.
pub fn plan(direction: Direction, mode: Mode, m: &MarkerLabels) -> Vec<Stage> {
    use FilterSource::*;
    use MarkerType::*;

    let (rb, lb1, lb2) = (m.rbrace, m.lbrace1, m.lbrace2);
    // Insert rbrace before every rho match / after every lambda match.
    let r_mark = || filter(Rho, Mark, vec![(EPSILON, rb)], vec![], true);
    let l_mark = || filter(Lambda, Mark, vec![(EPSILON, rb)], vec![], false);
    let open_brackets = vec![(EPSILON, lb1), (EPSILON, lb2)];

    match (direction, mode) {
        (Direction::LeftToRight, Mode::Obligatory) => vec![
            r_mark(),
            filter(PhiThenClose, Mark, open_brackets, vec![], true),
            Stage::Replace,
            filter(Lambda, Check, vec![(lb1, EPSILON)], vec![(lb2, lb2)], false),
            filter(Lambda, CheckComplement, vec![(lb2, EPSILON)], vec![], false),
        ],
        (Direction::LeftToRight, Mode::Optional) => vec![
            r_mark(),
            Stage::Replace,
            filter(Lambda, Check, vec![(lb1, EPSILON)], vec![], false),
        ],
        (Direction::RightToLeft, Mode::Obligatory) => vec![
            l_mark(),
            filter(CloseThenPhi, Mark, open_brackets, vec![], false),
            Stage::Replace,
            filter(Rho, Check, vec![(lb1, EPSILON)], vec![(lb2, lb2)], true),
            filter(Rho, CheckComplement, vec![(lb2, EPSILON)], vec![], true),
        ],
        (Direction::RightToLeft, Mode::Optional) => vec![
            l_mark(),
            Stage::Replace,
            filter(Rho, Check, vec![(lb1, EPSILON)], vec![], true),
        ],
        (Direction::Simultaneous, Mode::Obligatory) => vec![
            r_mark(),
            filter(PhiThenClose, Mark, open_brackets, vec![], true),
            filter(Lambda, Check, vec![(lb1, lb1)], vec![(lb2, lb2), (rb, rb)], false),
            filter(
                Lambda,
                CheckComplement,
                vec![(lb2, lb2)],
                vec![(lb1, lb1), (rb, rb)],
                false,
            ),
            Stage::Replace,
        ],
        (Direction::Simultaneous, Mode::Optional) => vec![
            r_mark(),
            filter(Lambda, Check, vec![(EPSILON, lb1)], vec![(rb, rb)], false),
            Stage::Replace,
        ],
    }
}
