//! Anchor lookup.
//!
//! Many instructions share an opcode, so anchors are matched on opcode and operand
//! together. Method operands are compared by [`SymbolId`], never by name.

use splicer_core::Opcode;
use splicer_core::decoder::{Instruction, InstructionSequence, Operand};
use splicer_core::symbol::SymbolId;
use tracing::debug;

/// Structural test selecting the anchor instruction.
pub trait AnchorPredicate {
    fn matches(&self, instruction: &Instruction) -> bool;
}

impl<F> AnchorPredicate for F
where
    F: Fn(&Instruction) -> bool,
{
    fn matches(&self, instruction: &Instruction) -> bool {
        self(instruction)
    }
}

/// Matches a call of one specific method through one specific call opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallTo {
    pub op: Opcode,
    pub method: SymbolId,
}

impl CallTo {
    pub fn new(op: Opcode, method: SymbolId) -> Self {
        Self { op, method }
    }

    /// `callvirt method`
    pub fn virtual_call(method: SymbolId) -> Self {
        Self::new(Opcode::Callvirt, method)
    }
}

impl AnchorPredicate for CallTo {
    fn matches(&self, instruction: &Instruction) -> bool {
        instruction.is(self.op, Operand::Method(self.method))
    }
}

/// Returns the position of the first instruction accepted by `predicate`, scanning
/// from position 0 upwards. `None` means no instruction matched.
pub fn locate<P>(sequence: &InstructionSequence, predicate: &P) -> Option<usize>
where
    P: AnchorPredicate + ?Sized,
{
    let found = sequence.iter().position(|ins| predicate.matches(ins));
    debug!(
        "Anchor scan over {} instructions: {:?}",
        sequence.len(),
        found
    );
    found
}

/// Returns every position accepted by `predicate`, in increasing order.
pub fn locate_all<P>(sequence: &InstructionSequence, predicate: &P) -> Vec<usize>
where
    P: AnchorPredicate + ?Sized,
{
    sequence
        .iter()
        .enumerate()
        .filter_map(|(position, ins)| predicate.matches(ins).then_some(position))
        .collect()
}
