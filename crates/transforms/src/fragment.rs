//! Hook call fragment.
//!
//! The fragment loads the call-site values and invokes the hook so that its return
//! value takes the place of the value it was given:
//!
//! ```text
//! // value on the evaluation stack (default)
//! ldarg 1                          // inbound message
//! ldfld VoiceMessage::Speaker      // speaker
//! ldloc 3                          // listener
//! call ChannelHooks::Redirect      // (channel, speaker, listener) -> channel
//!
//! // value in a temporary, spliced after the anchor's `stloc 5`
//! ldloc 5
//! ldarg 1
//! ldfld VoiceMessage::Speaker
//! ldloc 3
//! call ChannelHooks::Redirect
//! stloc 5
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use splicer_core::decoder::Instruction;
use splicer_core::method::MethodShape;
use splicer_core::symbol::{SymbolId, SymbolTable};
use splicer_core::validator::validate_fragment;
use tracing::debug;

/// Where the value replaced by the hook lives at the insertion point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSlot {
    /// On top of the evaluation stack.
    #[default]
    EvaluationStack,
    /// In the given local slot.
    Temporary(u16),
}

/// Resolved operands the fragment loads and calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookArgs {
    /// Argument holding the inbound message.
    pub message_arg: u16,
    /// Field of the message holding the speaker.
    pub speaker_field: SymbolId,
    /// Local slot holding the listener.
    pub listener_local: u16,
    /// The hook method.
    pub hook: SymbolId,
}

/// A validated, immutable hook call fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookFragment {
    instructions: Vec<Instruction>,
    slot: ValueSlot,
}

impl HookFragment {
    /// Builds the fragment and checks it against the method it will be spliced into.
    ///
    /// `value_ty` is the type of the value being replaced. For
    /// [`ValueSlot::EvaluationStack`] it must be on top of the stack at the
    /// insertion point; for [`ValueSlot::Temporary`] it must be the slot's type.
    pub fn build(
        args: HookArgs,
        slot: ValueSlot,
        value_ty: &str,
        shape: &MethodShape,
        table: &SymbolTable,
    ) -> Result<Self> {
        let core = [
            Instruction::ldarg(args.message_arg),
            Instruction::ldfld(args.speaker_field),
            Instruction::ldloc(args.listener_local),
            Instruction::call(args.hook),
        ];

        let (instructions, entry) = match slot {
            ValueSlot::EvaluationStack => (core.to_vec(), vec![value_ty.to_string()]),
            ValueSlot::Temporary(local) => {
                let mut instructions = Vec::with_capacity(core.len() + 2);
                instructions.push(Instruction::ldloc(local));
                instructions.extend(core);
                instructions.push(Instruction::stloc(local));
                (instructions, Vec::new())
            }
        };

        if let ValueSlot::Temporary(local) = slot {
            let held = shape.local_type(local)?;
            if held != value_ty {
                return Err(splicer_core::result::Error::LocalTypeMismatch {
                    slot: local,
                    expected: held.to_string(),
                    found: value_ty.to_string(),
                }
                .into());
            }
        }

        validate_fragment(&instructions, shape, table, &entry)?;
        debug!(
            "Built {}-instruction hook fragment for {:?}",
            instructions.len(),
            slot
        );

        Ok(Self {
            instructions,
            slot,
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn slot(&self) -> ValueSlot {
        self.slot
    }
}
