//! Shared vocabulary for the cdrewrite crates.
//!
//! - [`enums`] -- Rewrite direction and mode
//! - [`options`] -- Compilation options for a single rule

pub mod enums;
pub mod options;

pub use enums::{Direction, Mode, ParseEnumError};
pub use options::RewriteOptions;

/// Transition label. Label `0` is reserved for epsilon.
pub type Label = u32;

/// The epsilon label.
pub const EPSILON: Label = 0;
