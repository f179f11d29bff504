// Transition types: the in-memory arc and the fixed-size records of the binary format.

use bytemuck::{Pod, Zeroable};

use crate::Label;
use crate::semiring::Semiring;
use crate::vector::StateId;

/// A single labeled, weighted transition.
///
/// `ilabel` and `olabel` are 0 for epsilon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<W> {
    pub ilabel: Label,
    pub olabel: Label,
    pub weight: W,
    pub nextstate: StateId,
}

impl<W: Semiring> Transition<W> {
    pub fn new(ilabel: Label, olabel: Label, weight: W, nextstate: StateId) -> Self {
        Self {
            ilabel,
            olabel,
            weight,
            nextstate,
        }
    }

    /// A transition carrying the weight One.
    pub fn unweighted(ilabel: Label, olabel: Label, nextstate: StateId) -> Self {
        Self::new(ilabel, olabel, W::one(), nextstate)
    }

    /// Whether both labels are epsilon.
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        self.ilabel == 0 && self.olabel == 0
    }
}

/// Per-state record in the binary format (16 bytes).
///
/// - `final_weight` (f32): final weight, `+inf` for non-final states
/// - `first_transition` (u32): index of the state's first record in the transition table
/// - `num_transitions` (u32): number of consecutive transition records
/// - `_reserved` (u32): padding, written as zero
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct StateRecord {
    pub final_weight: f32,
    pub first_transition: u32,
    pub num_transitions: u32,
    pub _reserved: u32,
}

/// Per-transition record in the binary format (16 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransitionRecord {
    pub ilabel: u32,
    pub olabel: u32,
    pub nextstate: u32,
    pub weight: f32,
}

impl TransitionRecord {
    pub fn from_transition<W: Semiring>(tr: &Transition<W>) -> Self {
        Self {
            ilabel: tr.ilabel,
            olabel: tr.olabel,
            nextstate: tr.nextstate.0,
            weight: tr.weight.to_f32(),
        }
    }

    pub fn to_transition<W: Semiring>(&self) -> Transition<W> {
        Transition::new(
            self.ilabel,
            self.olabel,
            W::from_f32(self.weight),
            StateId(self.nextstate),
        )
    }
}

const _: () = assert!(size_of::<StateRecord>() == 16);
const _: () = assert!(size_of::<TransitionRecord>() == 16);
