// Context filters.
//
// A filter recognizes sigma* beta (or its mirror image) and inserts or
// checks bracket labels wherever a match of beta ends. Acceptance is all
// the filter needs, so it is built in the boolean semiring and mapped back
// to the target semiring with identity weights at the end.

use cdrewrite_fst::determinize::{DeterminizeMode, determinize};
use cdrewrite_fst::minimize::minimize;
use cdrewrite_fst::rmepsilon::rm_epsilon;
use cdrewrite_fst::transform::{SortType, arc_sort, reverse};
use cdrewrite_fst::{BooleanWeight, Semiring, VectorFst};
use log::debug;

use crate::CompileError;
use crate::marker::{Language, MarkerPair, MarkerType, make_marker, prepend_sigma_star};

/// Map every non-zero weight to boolean true.
pub fn erase_weights<W: Semiring>(fst: &VectorFst<W>) -> VectorFst<BooleanWeight> {
    fst.convert()
}

/// Map a boolean automaton into `W`: true becomes One and false Zero.
pub fn restore_identity_weights<W: Semiring>(fst: &VectorFst<BooleanWeight>) -> VectorFst<W> {
    fst.convert()
}

/// Build the marker transducer for `sigma* beta`.
///
/// With `reverse`, the language is built on the mirror images of `beta`
/// and `sigma` and the result is mirrored back, so brackets are placed
/// relative to matches that start at each position instead of ending there.
/// The result is sorted by input label.
pub fn make_filter<W: Semiring>(
    beta: &VectorFst<W>,
    sigma: &VectorFst<W>,
    marker_type: MarkerType,
    markers: &[MarkerPair],
    reverse_filter: bool,
) -> Result<VectorFst<W>, CompileError> {
    let usigma = erase_weights(sigma);
    let mut ufilter = erase_weights(beta);
    if ufilter.start().is_none() {
        let s = ufilter.add_state();
        ufilter.set_start(s);
    }

    if reverse_filter {
        ufilter = reverse(&ufilter);
        let mut reversed_sigma = reverse(&usigma);
        rm_epsilon(&mut reversed_sigma)?;
        prepend_sigma_star(&mut ufilter, &reversed_sigma)?;
    } else {
        prepend_sigma_star(&mut ufilter, &usigma)?;
    }

    rm_epsilon(&mut ufilter)?;
    let mut ufilter = determinize(&ufilter, DeterminizeMode::Labels)?;
    minimize(&mut ufilter);

    let language = if ufilter.is_empty() {
        Language::ComplementOfSigma
    } else {
        Language::Explicit(ufilter)
    };
    let mut marked = make_marker(language, &usigma, marker_type, markers)?;
    if reverse_filter {
        marked = reverse(&marked);
    }
    arc_sort(&mut marked, SortType::ILabel);
    debug!(
        "filter {:?}{}: {} states",
        marker_type,
        if reverse_filter { " (reversed)" } else { "" },
        marked.num_states()
    );
    Ok(restore_identity_weights(&marked))
}
