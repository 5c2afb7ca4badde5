//! Fragment splicing.
//!
//! Inserts a fragment into a copy of a method body. Everything before the
//! insertion point keeps its position, everything after it moves down by the
//! fragment length, and no instruction outside the window is touched.
//!
//! ```text
//! // base, insert_at = 2
//! ldarg 1
//! callvirt VoiceModuleBase::ValidateReceive
//! stloc 4
//!
//! // spliced
//! ldarg 1
//! callvirt VoiceModuleBase::ValidateReceive
//! ldarg 1                 // fragment
//! ldfld VoiceMessage::Speaker
//! ldloc 3
//! call ChannelHooks::Redirect
//! stloc 4
//! ```

use splicer_core::decoder::{Instruction, InstructionSequence};
use tracing::debug;

/// Returns `sequence` with `fragment` inserted starting at `insert_at`.
///
/// # Panics
/// If `insert_at > sequence.len()`. Callers derive the position from a successful
/// anchor lookup, so an out-of-range position is a programming error.
pub fn splice(
    sequence: &InstructionSequence,
    insert_at: usize,
    fragment: &[Instruction],
) -> InstructionSequence {
    assert!(
        insert_at <= sequence.len(),
        "splice position {insert_at} is past the end of a {}-instruction sequence",
        sequence.len()
    );

    let (head, tail) = sequence.as_slice().split_at(insert_at);
    let mut spliced = Vec::with_capacity(sequence.len() + fragment.len());
    spliced.extend_from_slice(head);
    spliced.extend_from_slice(fragment);
    spliced.extend_from_slice(tail);

    debug!(
        "Spliced {} instructions at position {} ({} -> {})",
        fragment.len(),
        insert_at,
        sequence.len(),
        spliced.len()
    );
    InstructionSequence::new(spliced)
}
