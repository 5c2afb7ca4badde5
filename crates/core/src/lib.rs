pub mod decoder;
pub mod encoder;
pub mod method;
pub mod opcode;
pub mod result;
pub mod stack;
pub mod symbol;
pub mod validator;

pub use opcode::Opcode;

/// High-level convenience function that loads a method listing together with the
/// symbol manifest it refers to.
///
/// # Difference from `decoder::parse_listing`
/// - `decoder::parse_listing` expects an already-built [`symbol::SymbolTable`]
/// - This function builds the table from a JSON manifest first, then parses the
///   listing against it, returning both so callers can render or patch the result.
///
/// # Example
/// ```rust,ignore
/// let (table, body) = load_listing(&listing, &manifest)?;
/// let text = encoder::encode(&body, &table)?;
/// ```
pub fn load_listing(
    listing: &str,
    manifest_json: &str,
) -> result::Result<(symbol::SymbolTable, decoder::InstructionSequence)> {
    let table = symbol::SymbolTable::from_manifest_json(manifest_json)?;
    let body = decoder::parse_listing(listing, &table)?;
    Ok((table, body))
}
