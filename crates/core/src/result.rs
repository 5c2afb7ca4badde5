//! Core results and error types

use thiserror::Error;

/// Core error type encompassing all core module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A symbol key was interned twice with conflicting signatures.
    #[error("symbol '{0}' already declared with a different signature")]
    ConflictingSymbol(String),

    /// The fragment loads a field from a value of the wrong type.
    #[error("field {field} belongs to '{owner}' but the stack holds '{found}'")]
    FieldOwnerMismatch {
        /// The field key.
        field: String,
        /// The type declaring the field.
        owner: String,
        /// The type found on the evaluation stack.
        found: String,
    },

    /// A call passes a value whose type differs from the declared parameter.
    #[error("argument {index} of {method} expects '{expected}', got '{found}'")]
    ArgumentTypeMismatch {
        /// The called method key.
        method: String,
        /// Zero-based parameter index (the receiver counts as parameter 0 on instance calls).
        index: usize,
        /// Declared type.
        expected: String,
        /// Type found on the evaluation stack.
        found: String,
    },

    /// Failed to parse a listing at the specified line.
    #[error("listing parse error at line {line}: {msg} ⇒ `{raw}`")]
    ParseError {
        /// The line number where parsing failed.
        line: usize,
        /// Description of the parsing error.
        msg: String,
        /// The raw content that failed to parse.
        raw: String,
    },

    /// The mnemonic does not name a supported opcode.
    #[error("unsupported opcode: {0}")]
    UnsupportedOpcode(String),

    /// An operand does not fit the opcode that carries it.
    #[error("operand {operand} is not valid for {opcode}")]
    OperandMismatch {
        /// Rendered opcode.
        opcode: String,
        /// Rendered operand.
        operand: String,
    },

    /// The argument index is outside the method's parameter list.
    #[error("argument slot {0} does not exist in the method shape")]
    MissingArgument(u16),

    /// The local slot is outside the method's local table.
    #[error("local slot {0} does not exist in the method shape")]
    MissingLocal(u16),

    /// The handle does not refer to a symbol of the expected kind.
    #[error("symbol #{id} is not a {expected}")]
    WrongSymbolKind {
        /// Raw handle value.
        id: u32,
        /// Expected kind.
        expected: &'static str,
    },

    /// More values were consumed than the evaluation stack held.
    #[error("evaluation stack underflow at fragment position {0}")]
    StackUnderflow(usize),

    /// The fragment left the evaluation stack in a different shape than it found it.
    #[error("fragment changes stack depth from {before} to {after}")]
    StackImbalance {
        /// Depth on entry.
        before: usize,
        /// Depth on exit.
        after: usize,
    },

    /// The value left in the patched slot has a different type than the original.
    #[error("fragment replaces a '{expected}' value with '{found}'")]
    ResultTypeMismatch {
        /// Type of the value being replaced.
        expected: String,
        /// Type produced by the fragment.
        found: String,
    },

    /// The opcode cannot be checked by the fragment validator.
    #[error("opcode {0} is not allowed inside a fragment")]
    UnsupportedInFragment(String),

    /// A short symbol key matches more than one overload.
    #[error("symbol '{key}' is ambiguous between {candidates} overloads")]
    AmbiguousSymbol {
        /// The key as written.
        key: String,
        /// Number of overloads sharing the short key.
        candidates: usize,
    },

    /// A value stored into a local has a different type than the slot.
    #[error("local slot {slot} holds '{expected}', fragment stores '{found}'")]
    LocalTypeMismatch {
        /// The local slot.
        slot: u16,
        /// Declared slot type.
        expected: String,
        /// Type found on the evaluation stack.
        found: String,
    },

    /// A symbol key could not be resolved through the table.
    #[error("unresolved symbol: {0}")]
    UnresolvedSymbol(String),

    /// A JSON manifest could not be decoded.
    #[error("manifest decode failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
