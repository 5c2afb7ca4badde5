//! Channel redirect hook policies.
//!
//! A policy is the decision function the spliced fragment calls at runtime. It
//! receives the channel computed by the original code plus the speaker and
//! listener, and returns the channel to use from then on. Policies differ only in
//! their decision; every policy has the same call signature, so the fragment and
//! the patched body are identical whichever one is installed.

use serde::{Deserialize, Serialize};
use splicer_core::symbol::MethodSig;

/// Type name of the channel value on the evaluation stack.
pub const CHANNEL_TYPE: &str = "VoiceChatChannel";
/// Type name of speaker and listener handles.
pub const PARTICIPANT_TYPE: &str = "ReferenceHub";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceChatChannel {
    None,
    Proximity,
    Radio,
    ScpChat,
    Spectator,
    RoundSummary,
    Intercom,
    Mimicry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleId {
    ClassD,
    Scientist,
    FacilityGuard,
    NtfPrivate,
    ChaosRifleman,
    Tutorial,
    Spectator,
    Scp049,
    Scp079,
    Scp096,
    Scp106,
    Scp173,
    Scp939,
    Scp3114,
}

impl RoleId {
    pub fn is_scp(self) -> bool {
        matches!(
            self,
            RoleId::Scp049
                | RoleId::Scp079
                | RoleId::Scp096
                | RoleId::Scp106
                | RoleId::Scp173
                | RoleId::Scp939
                | RoleId::Scp3114
        )
    }
}

/// Speaker or listener as seen by a policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub role: RoleId,
}

impl Participant {
    pub fn new(role: RoleId) -> Self {
        Self { role }
    }
}

/// Runtime decision function invoked by the hook fragment.
pub trait HookPolicy: Send + Sync {
    /// Method name the host registers the policy under.
    fn name(&self) -> &'static str;

    /// Returns the channel to use in place of `channel`.
    fn decide(
        &self,
        channel: VoiceChatChannel,
        speaker: &Participant,
        listener: &Participant,
    ) -> VoiceChatChannel;

    /// Signature of the hook method, for interning into a symbol table.
    fn signature(&self, owner: &str) -> MethodSig {
        MethodSig {
            owner: owner.to_string(),
            name: self.name().to_string(),
            params: vec![
                CHANNEL_TYPE.to_string(),
                PARTICIPANT_TYPE.to_string(),
                PARTICIPANT_TYPE.to_string(),
            ],
            returns: Some(CHANNEL_TYPE.to_string()),
            is_static: true,
        }
    }
}

/// Redirects SCP speech to listeners of one role.
///
/// With `guard` set, only speech already on that channel is redirected; without
/// it, any channel is. Both behaviours have shipped, so callers pick one
/// explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectPolicy {
    pub listener_role: RoleId,
    pub redirect_to: VoiceChatChannel,
    #[serde(default)]
    pub guard: Option<VoiceChatChannel>,
}

impl RedirectPolicy {
    /// Tutorials hear SCPs, only when they speak on SCP chat.
    pub fn tutorial_hears_scp_chat() -> Self {
        Self {
            listener_role: RoleId::Tutorial,
            redirect_to: VoiceChatChannel::RoundSummary,
            guard: Some(VoiceChatChannel::ScpChat),
        }
    }

    /// Tutorials hear SCPs on any channel.
    pub fn tutorial_hears_scps() -> Self {
        Self {
            guard: None,
            ..Self::tutorial_hears_scp_chat()
        }
    }
}

impl HookPolicy for RedirectPolicy {
    fn name(&self) -> &'static str {
        if self.guard.is_some() {
            "RedirectGuarded"
        } else {
            "Redirect"
        }
    }

    fn decide(
        &self,
        channel: VoiceChatChannel,
        speaker: &Participant,
        listener: &Participant,
    ) -> VoiceChatChannel {
        let guard_passes = self.guard.is_none_or(|required| channel == required);
        if listener.role == self.listener_role && speaker.role.is_scp() && guard_passes {
            self.redirect_to
        } else {
            channel
        }
    }
}
