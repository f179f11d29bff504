// Bracket label allocation.

use cdrewrite_fst::properties::max_label;
use cdrewrite_fst::{Label, Semiring, VectorFst};

/// The three synthetic labels used while compiling one rule.
///
/// `rbrace` closes a span; `lbrace1` opens a span whose left context
/// matched and `lbrace2` one whose left context did not. They are only
/// unique within a single compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerLabels {
    pub rbrace: Label,
    pub lbrace1: Label,
    pub lbrace2: Label,
}

impl MarkerLabels {
    /// Allocate labels strictly above every label in `sigma` and `operands`.
    ///
    /// `sigma` should already contain any active boundary markers.
    pub fn allocate<'a, W: Semiring + 'a>(
        sigma: &VectorFst<W>,
        operands: impl IntoIterator<Item = &'a VectorFst<W>>,
    ) -> Self {
        let max = operands
            .into_iter()
            .filter_map(max_label)
            .chain(max_label(sigma))
            .max()
            .unwrap_or(0);
        Self {
            rbrace: max + 1,
            lbrace1: max + 2,
            lbrace2: max + 3,
        }
    }
}
