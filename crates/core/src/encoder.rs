//! Module for rendering instruction sequences back into the listing format read by
//! [`crate::decoder::parse_listing`].

use crate::decoder::{Instruction, InstructionSequence, Operand};
use crate::result::{Error, Result};
use crate::symbol::SymbolTable;
use std::fmt::Write;

/// Encodes a sequence as a listing, naming symbols through `table`.
///
/// Labelled instructions are prefixed with their labels; all others are indented
/// to the same column so the output parses back to an equal sequence.
///
/// # Examples
/// ```rust,ignore
/// let text = encode(&sequence, &table)?;
/// assert_eq!(parse_listing(&text, &table)?, sequence);
/// ```
pub fn encode(sequence: &InstructionSequence, table: &SymbolTable) -> Result<String> {
    let mut out = String::with_capacity(sequence.len() * 24);

    for ins in sequence {
        let prefix = ins
            .labels
            .iter()
            .map(|label| format!("{label}: "))
            .collect::<String>();
        let body = encode_instruction(ins, table)?;
        // infallible: writing to a String
        let _ = writeln!(out, "{prefix:>8}{body}");
    }

    tracing::debug!(
        "Encoded {} instructions into {} bytes of listing",
        sequence.len(),
        out.len()
    );
    Ok(out)
}

/// Renders one instruction without its labels.
pub fn encode_instruction(ins: &Instruction, table: &SymbolTable) -> Result<String> {
    let operand = match ins.operand {
        Operand::None => return Ok(ins.op.to_string()),
        Operand::Method(id) | Operand::Field(id) => table
            .key(id)
            .ok_or_else(|| Error::UnresolvedSymbol(id.to_string()))?,
        other => other.to_string(),
    };
    Ok(format!("{} {}", ins.op, operand))
}
