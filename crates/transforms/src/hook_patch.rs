//! Hook patch driver.
//!
//! Finds the anchor call in a method body and splices the hook fragment right after
//! it, so the hook sees the value the anchor produced and hands back its
//! replacement before any later instruction reads it.

use crate::fragment::{HookArgs, HookFragment, ValueSlot};
use crate::locate::{CallTo, locate, locate_all};
use crate::splice::splice;
use crate::{Error, Result, Transform};
use serde::{Deserialize, Serialize};
use splicer_core::Opcode;
use splicer_core::decoder::{Instruction, InstructionSequence};
use splicer_core::method::MethodShape;
use splicer_core::symbol::SymbolTable;
use tracing::{debug, warn};

/// Configuration for the hook patch.
///
/// Symbol keys are resolved once, when the patch is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookPatchConfig {
    /// Call opcode of the anchor instruction
    pub anchor_opcode: Opcode,
    /// Method called by the anchor instruction
    pub anchor: String,
    /// Argument slot holding the inbound message
    pub message_arg: u16,
    /// Field of the message holding the speaker
    pub speaker_field: String,
    /// Local slot holding the listener
    pub listener_local: u16,
    /// Hook method invoked by the fragment. Defaults to the guarded redirect
    /// (`RedirectPolicy::tutorial_hears_scp_chat`), which only moves speech already
    /// on SCP chat.
    pub hook: String,
    /// Where the replaced value lives after the anchor
    pub value_slot: ValueSlot,
}

impl Default for HookPatchConfig {
    fn default() -> Self {
        Self {
            anchor_opcode: Opcode::Callvirt,
            anchor: "VoiceModuleBase::ValidateReceive".into(),
            message_arg: 1,
            speaker_field: "VoiceMessage::Speaker".into(),
            listener_local: 3,
            hook: "ChannelHooks::RedirectGuarded".into(),
            value_slot: ValueSlot::EvaluationStack,
        }
    }
}

/// Splices a hook call after the first call to the anchor method.
#[derive(Debug, Clone)]
pub struct HookPatch {
    anchor: CallTo,
    anchor_key: String,
    fragment: HookFragment,
}

impl HookPatch {
    /// Resolves the configured symbols and builds the fragment once.
    ///
    /// Fails if any symbol is unknown or the fragment does not fit `shape`.
    pub fn new(config: &HookPatchConfig, table: &SymbolTable, shape: &MethodShape) -> Result<Self> {
        if !config.anchor_opcode.is_call() {
            return Err(Error::InvalidAnchorOpcode(config.anchor_opcode.to_string()));
        }

        let anchor_id = table.resolve_method(&config.anchor)?;
        let anchor_sig = table.method(anchor_id)?;
        let args = HookArgs {
            message_arg: config.message_arg,
            speaker_field: table.resolve_field(&config.speaker_field)?,
            listener_local: config.listener_local,
            hook: table.resolve_method(&config.hook)?,
        };

        // the replaced value is whatever the anchor returned, in either slot
        let value_ty = anchor_sig
            .returns
            .as_deref()
            .ok_or_else(|| Error::AnchorWithoutResult(anchor_sig.key()))?;
        let fragment = HookFragment::build(args, config.value_slot, value_ty, shape, table)?;

        debug!(
            "HookPatch ready: {} {} in {}::{}, {}-instruction fragment",
            config.anchor_opcode,
            anchor_sig.key(),
            shape.owner,
            shape.name,
            fragment.len()
        );

        Ok(Self {
            anchor: CallTo::new(config.anchor_opcode, anchor_id),
            anchor_key: format!("{} {}", config.anchor_opcode, anchor_sig.key()),
            fragment,
        })
    }

    /// The fragment spliced by every application.
    pub fn fragment(&self) -> &[Instruction] {
        self.fragment.instructions()
    }

    /// Position of the anchor instruction in `body`.
    pub fn anchor_position(&self, body: &InstructionSequence) -> Result<usize> {
        locate(body, &self.anchor).ok_or_else(|| Error::AnchorNotFound(self.anchor_key.clone()))
    }

    /// Position the fragment is spliced at.
    ///
    /// Right after the anchor when the value is on the stack. For a temporary the
    /// anchor must be followed by the store into it, and the fragment goes after
    /// that store.
    pub fn insertion_point(&self, body: &InstructionSequence) -> Result<usize> {
        let anchor = self.anchor_position(body)?;
        match self.fragment.slot() {
            ValueSlot::EvaluationStack => Ok(anchor + 1),
            ValueSlot::Temporary(local) => {
                let store = Instruction::stloc(local);
                match body.get(anchor + 1) {
                    Some(next) if next.is(store.op, store.operand) => Ok(anchor + 2),
                    _ => Err(Error::TemporaryNotAssigned {
                        anchor: self.anchor_key.clone(),
                        local,
                    }),
                }
            }
        }
    }

    /// Returns `body` with the hook fragment inserted after the anchor.
    pub fn patch(&self, body: &InstructionSequence) -> Result<InstructionSequence> {
        let insert_at = self.insertion_point(body)?;

        let candidates = locate_all(body, &self.anchor);
        if candidates.len() > 1 {
            warn!(
                "{} matches at positions {:?}; patching the first",
                self.anchor_key, candidates
            );
        }
        if let Some(next) = body.get(insert_at)
            && !next.labels.is_empty()
        {
            warn!(
                "Instruction at the insertion point is a branch target ({:?}); branches there bypass the hook",
                next.labels
            );
        }

        Ok(splice(body, insert_at, self.fragment.instructions()))
    }
}

impl Transform for HookPatch {
    fn name(&self) -> &'static str {
        "HookPatch"
    }

    fn apply(&self, body: &InstructionSequence) -> Result<InstructionSequence> {
        self.patch(body)
    }
}
