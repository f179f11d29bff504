//! Weighted finite-state transducer engine.
//!
//! This crate provides the automaton substrate the rewrite-rule compiler is
//! built on: an arena-backed mutable transducer, the usual rational and
//! algebraic operations, and a generic `optimize` pass.
//!
//! # Architecture
//!
//! - [`semiring`] -- Weight algebras (tropical, log, boolean)
//! - [`transition`] -- In-memory transitions and their fixed-size binary records
//! - [`vector`] -- The mutable `VectorFst` arena and its state handles
//! - [`properties`] -- Structural property checks (acceptor, unweighted, acyclic, ...)
//! - [`rational`] -- Concatenation, union and closure
//! - [`transform`] -- Projection, inversion, reversal, mapping, sorting, trimming
//! - [`compose`] -- Composition with an epsilon-sequencing filter, cross product
//! - [`rmepsilon`] -- Epsilon removal
//! - [`determinize`] -- Weighted subset construction over label pairs
//! - [`minimize`] -- Partition-refinement minimization
//! - [`optimize`] -- Generic determinize/minimize heuristics
//! - [`config`] -- Explicit DFS stack used by path traversal
//! - [`paths`] -- Enumeration of the string pairs of an acyclic transducer
//! - [`symbols`] -- Symbol table and string compilation
//! - [`format`] -- Binary file format
//! - [`text`] -- AT&T text format

pub mod compose;
pub mod config;
pub mod determinize;
pub mod format;
pub mod minimize;
pub mod optimize;
pub mod paths;
pub mod properties;
pub mod rational;
pub mod rmepsilon;
pub mod semiring;
pub mod symbols;
pub mod text;
pub mod transform;
pub mod transition;
pub mod vector;

pub use cdrewrite_core::{EPSILON, Label};
pub use semiring::{BooleanWeight, LogWeight, Semiring, TropicalWeight};
pub use symbols::SymbolTable;
pub use transition::Transition;
pub use vector::{StateId, VectorFst};

/// Error type for engine operations and serialization.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("invalid magic number in FST header")]
    InvalidMagic,
    #[error("file too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("weight type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },
    #[error("invalid symbol table: {0}")]
    InvalidSymbolTable(String),
    #[error("state {state} out of range (FST has {num_states} states)")]
    InvalidState { state: u32, num_states: usize },
    #[error("determinization exceeded {limit} states")]
    StateLimit { limit: usize },
    #[error("shortest-distance computation did not converge")]
    Diverged,
    #[error("operation requires an acyclic FST")]
    Cyclic,
    #[error("invalid symbol string {text:?}: {reason}")]
    InvalidString { text: String, reason: String },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Maximum number of queue iterations in shortest-distance style loops.
/// Acts as a safety limit against non-converging weight cycles.
pub const MAX_LOOP_COUNT: u32 = 100_000;

/// Maximum number of states a determinization may create.
pub const MAX_DETERMINIZED_STATES: usize = 1 << 20;
