// Applying compiled rules.
//
// A rule is applied by composing a string acceptor with it and reading the
// output side of the result, the rewrite lattice. The lattice of a string
// under a rule without input-epsilon cycles is acyclic.

use cdrewrite_fst::compose::compose;
use cdrewrite_fst::determinize::{DeterminizeMode, determinize};
use cdrewrite_fst::paths::string_pairs;
use cdrewrite_fst::properties::is_acyclic;
use cdrewrite_fst::rmepsilon::rm_epsilon;
use cdrewrite_fst::transform::{ProjectType, project};
use cdrewrite_fst::{FstError, Label, Semiring, SymbolTable, VectorFst};
use log::trace;

use crate::RewriteError;

/// The output-side acceptor of `input ∘ rule`, epsilon-free.
///
/// Fails with [`RewriteError::RewriteFailed`] if the rule does not accept
/// the input.
pub fn rewrite_lattice<W: Semiring>(
    input: &VectorFst<W>,
    rule: &VectorFst<W>,
) -> Result<VectorFst<W>, RewriteError> {
    let mut lattice = compose(input, rule);
    if lattice.start().is_none() {
        return Err(RewriteError::RewriteFailed);
    }
    project(&mut lattice, ProjectType::Output);
    rm_epsilon(&mut lattice)?;
    trace!("rewrite lattice: {} states", lattice.num_states());
    Ok(lattice)
}

/// Every distinct output string of the lattice with its total weight.
fn weighted_outputs<W: Semiring>(lattice: &VectorFst<W>) -> Result<Vec<(Vec<Label>, W)>, FstError> {
    if !is_acyclic(lattice) {
        return Err(FstError::Cyclic);
    }
    let det = determinize(lattice, DeterminizeMode::Labels)?;
    Ok(string_pairs(&det)?
        .into_iter()
        .map(|(_, output, weight)| (output, weight))
        .collect())
}

/// Whether `a` is a strictly better weight than `b`.
///
/// Idempotent semirings use their natural order; the others compare costs.
fn better<W: Semiring>(a: &W, b: &W) -> bool {
    if W::IDEMPOTENT {
        a.natural_less(b)
    } else {
        a.to_f32() < b.to_f32()
    }
}

/// All distinct rewrites of `input`.
pub fn rewrites<W: Semiring>(
    input: &VectorFst<W>,
    rule: &VectorFst<W>,
) -> Result<Vec<Vec<Label>>, RewriteError> {
    let lattice = rewrite_lattice(input, rule)?;
    Ok(weighted_outputs(&lattice)?
        .into_iter()
        .map(|(output, _)| output)
        .collect())
}

/// The rewrites of `input` tied for the best weight.
pub fn top_rewrites<W: Semiring>(
    input: &VectorFst<W>,
    rule: &VectorFst<W>,
) -> Result<Vec<Vec<Label>>, RewriteError> {
    let lattice = rewrite_lattice(input, rule)?;
    let outputs = weighted_outputs(&lattice)?;
    let Some(best) = outputs
        .iter()
        .map(|(_, w)| *w)
        .reduce(|best, w| if better(&w, &best) { w } else { best })
    else {
        return Err(RewriteError::RewriteFailed);
    };
    Ok(outputs
        .into_iter()
        .filter(|(_, w)| !better(&best, w))
        .map(|(output, _)| output)
        .collect())
}

/// One best rewrite of `input`. Ties are broken arbitrarily.
pub fn top_rewrite<W: Semiring>(
    input: &VectorFst<W>,
    rule: &VectorFst<W>,
) -> Result<Vec<Label>, RewriteError> {
    top_rewrites(input, rule)?
        .into_iter()
        .next()
        .ok_or(RewriteError::RewriteFailed)
}

/// The best rewrite of `input`, which must be unique.
pub fn one_top_rewrite<W: Semiring>(
    input: &VectorFst<W>,
    rule: &VectorFst<W>,
) -> Result<Vec<Label>, RewriteError> {
    single(top_rewrites(input, rule)?, |labels| format!("{labels:?}"))
}

fn single(
    mut tops: Vec<Vec<Label>>,
    render: impl Fn(&[Label]) -> String,
) -> Result<Vec<Label>, RewriteError> {
    match tops.len() {
        0 => Err(RewriteError::RewriteFailed),
        1 => Ok(tops.remove(0)),
        _ => Err(RewriteError::AmbiguousTopRewrite {
            first: render(&tops[0]),
            second: render(&tops[1]),
        }),
    }
}

/// Whether the rule rewrites `input` to `output`.
pub fn matches<W: Semiring>(
    input: &VectorFst<W>,
    output: &VectorFst<W>,
    rule: &VectorFst<W>,
) -> Result<bool, RewriteError> {
    match rewrite_lattice(input, rule) {
        Ok(lattice) => Ok(!compose(&lattice, output).is_empty()),
        Err(RewriteError::RewriteFailed) => Ok(false),
        Err(err) => Err(err),
    }
}

/// [`rewrites`] over strings compiled and printed through `symbols`.
pub fn rewrites_str<W: Semiring>(
    input: &str,
    rule: &VectorFst<W>,
    symbols: &mut SymbolTable,
) -> Result<Vec<String>, RewriteError> {
    let input = symbols.acceptor(input)?;
    Ok(rewrites(&input, rule)?
        .iter()
        .map(|labels| symbols.labels_to_string(labels))
        .collect())
}

/// [`top_rewrites`] over strings.
pub fn top_rewrites_str<W: Semiring>(
    input: &str,
    rule: &VectorFst<W>,
    symbols: &mut SymbolTable,
) -> Result<Vec<String>, RewriteError> {
    let input = symbols.acceptor(input)?;
    Ok(top_rewrites(&input, rule)?
        .iter()
        .map(|labels| symbols.labels_to_string(labels))
        .collect())
}

/// [`top_rewrite`] over strings.
pub fn top_rewrite_str<W: Semiring>(
    input: &str,
    rule: &VectorFst<W>,
    symbols: &mut SymbolTable,
) -> Result<String, RewriteError> {
    let input = symbols.acceptor(input)?;
    Ok(symbols.labels_to_string(&top_rewrite(&input, rule)?))
}

/// [`one_top_rewrite`] over strings.
pub fn one_top_rewrite_str<W: Semiring>(
    input: &str,
    rule: &VectorFst<W>,
    symbols: &mut SymbolTable,
) -> Result<String, RewriteError> {
    let input = symbols.acceptor(input)?;
    let tops = top_rewrites(&input, rule)?;
    let best = single(tops, |labels| symbols.labels_to_string(labels))?;
    Ok(symbols.labels_to_string(&best))
}

/// [`matches`] over strings.
pub fn matches_str<W: Semiring>(
    input: &str,
    output: &str,
    rule: &VectorFst<W>,
    symbols: &mut SymbolTable,
) -> Result<bool, RewriteError> {
    let input = symbols.acceptor(input)?;
    let output = symbols.acceptor(output)?;
    matches(&input, &output, rule)
}
