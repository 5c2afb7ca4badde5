pub mod fragment;
pub mod hook_patch;
pub mod locate;
pub mod pass;
pub mod policy;
pub mod splice;

use splicer_core::decoder::InstructionSequence;
use splicer_core::result::Error as CoreError;
use thiserror::Error;

/// Transform error type encompassing all transform module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No instruction matched the anchor predicate; nothing was patched.
    #[error("anchor not found: no {0} in method body")]
    AnchorNotFound(String),

    /// The anchor leaves no value on the stack for the hook to replace.
    #[error("anchor {0} returns no value to replace")]
    AnchorWithoutResult(String),

    /// Core operation failed (symbol resolution, fragment validation).
    #[error("core operation failed: {0}")]
    Core(#[from] CoreError),

    /// The anchor is not followed by the store into the configured temporary.
    #[error("{anchor} is not followed by stloc {local}")]
    TemporaryNotAssigned {
        /// Rendered anchor.
        anchor: String,
        /// The configured local slot.
        local: u16,
    },

    /// The anchor opcode does not reference a method.
    #[error("anchor opcode {0} does not call a method")]
    InvalidAnchorOpcode(String),

    /// A pass in a pipeline failed; earlier results are discarded.
    #[error("transform {name} failed: {source}")]
    Pass {
        /// Transform name.
        name: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },
}

/// Transform result type
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for instruction-sequence rewrites.
///
/// Implementations never mutate their input; they return a new sequence or fail as
/// a whole.
pub trait Transform: Send + Sync {
    /// Returns the transform's name for logging and identification.
    fn name(&self) -> &'static str;
    /// Applies the transform to a method body, returning the rewritten body.
    fn apply(&self, body: &InstructionSequence) -> Result<InstructionSequence>;
}
