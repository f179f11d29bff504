// Per-rule compilation options.

use serde::{Deserialize, Serialize};

use crate::Label;
use crate::enums::{Direction, Mode};

/// Options controlling how a single rewrite rule is compiled.
///
/// Boundary markers are only activated when the rule actually references
/// them (in `phi`, or in the matching context), so leaving them set on a rule
/// that never mentions them costs nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    pub direction: Direction,
    pub mode: Mode,
    /// Label standing for the start of the string, if any.
    pub initial_boundary_marker: Option<Label>,
    /// Label standing for the end of the string, if any.
    pub final_boundary_marker: Option<Label>,
}

impl RewriteOptions {
    pub fn new(direction: Direction, mode: Mode) -> Self {
        Self {
            direction,
            mode,
            ..Self::default()
        }
    }

    /// Set both boundary markers.
    pub fn with_boundary_markers(mut self, initial: Label, final_: Label) -> Self {
        self.initial_boundary_marker = Some(initial);
        self.final_boundary_marker = Some(final_);
        self
    }
}
