// Traversal configuration: the explicit DFS stack used by path enumeration.

use crate::Label;
use crate::semiring::Semiring;
use crate::vector::StateId;

/// One level of the depth-first traversal.
#[derive(Debug, Clone, Copy)]
pub struct Frame<W> {
    pub state: StateId,
    /// Index of the next transition of `state` to follow.
    pub next_transition: usize,
    /// Whether the final weight of `state` has already been reported.
    pub visited_final: bool,
    /// Weight of the path prefix leading to `state`.
    pub weight: W,
    /// Length of `input_labels` at this depth.
    pub input_length: usize,
    /// Length of `output_labels` at this depth.
    pub output_length: usize,
}

/// Traversal configuration for path enumeration.
///
/// Holds the explicit DFS stack and the label buffers shared by all levels.
/// A level only owns the prefix `..input_length` / `..output_length` of the
/// buffers; pushing a level truncates them back to its parent's lengths first.
#[derive(Debug, Clone)]
pub struct TraversalConfig<W> {
    pub frames: Vec<Frame<W>>,
    pub input_labels: Vec<Label>,
    pub output_labels: Vec<Label>,
}

impl<W: Semiring> Default for TraversalConfig<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Semiring> TraversalConfig<W> {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            input_labels: Vec::new(),
            output_labels: Vec::new(),
        }
    }

    /// Reset to a single level at `start`.
    pub fn reset(&mut self, start: Option<StateId>) {
        self.frames.clear();
        self.input_labels.clear();
        self.output_labels.clear();
        if let Some(state) = start {
            self.frames.push(Frame {
                state,
                next_transition: 0,
                visited_final: false,
                weight: W::one(),
                input_length: 0,
                output_length: 0,
            });
        }
    }

    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut Frame<W>> {
        self.frames.last_mut()
    }

    /// Descend through a transition from the current top level.
    pub fn push(&mut self, state: StateId, weight: W, ilabel: Label, olabel: Label) {
        let (input_length, output_length) = self
            .frames
            .last()
            .map_or((0, 0), |f| (f.input_length, f.output_length));
        self.input_labels.truncate(input_length);
        self.output_labels.truncate(output_length);
        if ilabel != 0 {
            self.input_labels.push(ilabel);
        }
        if olabel != 0 {
            self.output_labels.push(olabel);
        }
        self.frames.push(Frame {
            state,
            next_transition: 0,
            visited_final: false,
            weight,
            input_length: self.input_labels.len(),
            output_length: self.output_labels.len(),
        });
    }

    /// Backtrack one level.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Labels of the path prefix at the top level.
    pub fn current_labels(&self) -> (&[Label], &[Label]) {
        match self.frames.last() {
            Some(f) => (
                &self.input_labels[..f.input_length],
                &self.output_labels[..f.output_length],
            ),
            None => (&[], &[]),
        }
    }
}
