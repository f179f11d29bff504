//! Compiler for context-dependent rewrite rules.
//!
//! A rule `phi -> psi / lambda __ rho` rewrites every occurrence of `phi`
//! that appears between a left context `lambda` and a right context `rho`.
//! The compiler turns such a rule into a single weighted transducer over the
//! alphabet closure `sigma*`, using the marker construction of Mohri and
//! Sproat: context filters insert and check synthetic bracket labels, a
//! replace transducer rewrites bracketed spans, and the brackets are gone
//! again by the time the pipeline ends.
//!
//! # Architecture
//!
//! - [`labels`] -- Allocation of the three bracket labels
//! - [`marker`] -- Marker transducers (mark, check, check-complement) and marker loops
//! - [`filter`] -- "sigma* beta" context filters
//! - [`replace`] -- The replace transducer and its direction/mode wiring
//! - [`boundary`] -- Boundary-marker insertion and deletion
//! - [`plan`] -- Composition plan for each direction and mode
//! - [`rule`] -- The rule value type and the top-level compiler
//! - [`apply`] -- Applying a compiled rule to strings

pub mod apply;
pub mod boundary;
pub mod filter;
pub mod labels;
pub mod marker;
pub mod plan;
pub mod replace;
pub mod rule;

use std::fmt;

pub use cdrewrite_core::{Direction, Label, Mode, RewriteOptions};
use cdrewrite_fst::{FstError, Semiring, VectorFst};

pub use rule::RewriteRule;

/// Rule operand named in precondition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Phi,
    Lambda,
    Rho,
    Sigma,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operand::Phi => "phi",
            Operand::Lambda => "lambda",
            Operand::Rho => "rho",
            Operand::Sigma => "sigma",
        })
    }
}

/// Error type for rule compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A rule operand that must be an unweighted acceptor is not one.
    #[error("{operand} must be an unweighted acceptor")]
    NotUnweightedAcceptor { operand: Operand },

    /// `psi` is a transducer but the rule was not built from a cross product.
    #[error("psi must be an acceptor unless the rule is given as phi x psi")]
    PsiNotAcceptor,

    /// A marker transducer was requested over a relation.
    #[error("marker construction requires an acceptor")]
    MarkerInputNotAcceptor,

    /// An engine operation failed.
    #[error(transparent)]
    Fst(#[from] FstError),
}

/// Error type for applying a compiled rule.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The rule does not accept the input.
    #[error("rule does not accept the input")]
    RewriteFailed,

    /// More than one output is tied for the best weight.
    #[error("multiple top rewrites: {first:?} and {second:?}")]
    AmbiguousTopRewrite { first: String, second: String },

    /// An engine operation failed.
    #[error(transparent)]
    Fst(#[from] FstError),
}

/// Compile `phi -> psi / lambda __ rho` over the alphabet closure `sigma`.
///
/// When `phi_cross_psi` is set, `psi` is taken to be the full rewrite
/// relation over the domain `phi` rather than an acceptor of replacements.
pub fn compile_rewrite<W: Semiring>(
    phi: &VectorFst<W>,
    psi: &VectorFst<W>,
    lambda: &VectorFst<W>,
    rho: &VectorFst<W>,
    sigma: &VectorFst<W>,
    phi_cross_psi: bool,
    options: RewriteOptions,
) -> Result<VectorFst<W>, CompileError> {
    RewriteRule::new(phi.clone(), psi.clone(), lambda.clone(), rho.clone())
        .with_phi_cross_psi(phi_cross_psi)
        .with_options(options)
        .compile(sigma)
}

/// Compile `tau / lambda __ rho`, where `tau` is the rewrite relation itself.
///
/// `phi` is derived from `tau` by projecting onto its input side.
pub fn compile_rewrite_tau<W: Semiring>(
    tau: &VectorFst<W>,
    lambda: &VectorFst<W>,
    rho: &VectorFst<W>,
    sigma: &VectorFst<W>,
    options: RewriteOptions,
) -> Result<VectorFst<W>, CompileError> {
    RewriteRule::from_tau(tau.clone(), lambda.clone(), rho.clone())?
        .with_options(options)
        .compile(sigma)
}
