// Enumeration of the string pairs of an acyclic transducer.

use crate::config::TraversalConfig;
use crate::properties::is_acyclic;
use crate::semiring::Semiring;
use crate::transform::connect;
use crate::vector::VectorFst;
use crate::{FstError, Label};

/// One successful path: its input labels, output labels (epsilons removed)
/// and total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct StringPath<W> {
    pub input: Vec<Label>,
    pub output: Vec<Label>,
    pub weight: W,
}

/// Depth-first iterator over every successful path of an acyclic transducer.
///
/// Paths are produced in transition order; distinct paths with the same
/// label strings are reported separately.
pub struct StringPaths<W> {
    fst: VectorFst<W>,
    config: TraversalConfig<W>,
}

impl<W: Semiring> StringPaths<W> {
    /// Fails with [`FstError::Cyclic`] if the trimmed transducer has a cycle.
    pub fn new(fst: &VectorFst<W>) -> Result<Self, FstError> {
        let mut fst = fst.clone();
        connect(&mut fst);
        if !is_acyclic(&fst) {
            return Err(FstError::Cyclic);
        }
        let mut config = TraversalConfig::new();
        config.reset(fst.start());
        Ok(Self { fst, config })
    }
}

impl<W: Semiring> Iterator for StringPaths<W> {
    type Item = StringPath<W>;

    fn next(&mut self) -> Option<StringPath<W>> {
        loop {
            let frame = self.config.top_mut()?;
            let state = frame.state;

            if !frame.visited_final {
                frame.visited_final = true;
                let fw = self.fst.final_weight(state);
                if !fw.is_zero() {
                    let weight = frame.weight.times(&fw);
                    let (input, output) = self.config.current_labels();
                    return Some(StringPath {
                        input: input.to_vec(),
                        output: output.to_vec(),
                        weight,
                    });
                }
            }

            let transitions = self.fst.transitions(state);
            if frame.next_transition < transitions.len() {
                let tr = transitions[frame.next_transition];
                frame.next_transition += 1;
                let weight = frame.weight.times(&tr.weight);
                self.config.push(tr.nextstate, weight, tr.ilabel, tr.olabel);
            } else {
                self.config.pop();
            }
        }
    }
}

/// Collect every path of an acyclic transducer as `(input, output, weight)`.
pub fn string_pairs<W: Semiring>(
    fst: &VectorFst<W>,
) -> Result<Vec<(Vec<Label>, Vec<Label>, W)>, FstError> {
    Ok(StringPaths::new(fst)?
        .map(|p| (p.input, p.output, p.weight))
        .collect())
}
