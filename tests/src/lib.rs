//! Shared fixtures for the integration tests.

use splicer_core::decoder::{InstructionSequence, parse_listing};
use splicer_core::method::MethodShape;
use splicer_core::symbol::SymbolTable;

pub const SYMBOLS: &str = include_str!("../fixtures/symbols.json");
pub const SHAPE: &str = include_str!("../fixtures/shape.json");
/// Ten instructions, `callvirt VoiceModuleBase::ValidateReceive` at position 6.
pub const RECEIVE_LISTING: &str = include_str!("../fixtures/receive_message.il");

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_test_writer()
        .try_init();
}

pub fn table() -> SymbolTable {
    SymbolTable::from_manifest_json(SYMBOLS).expect("fixture manifest")
}

pub fn shape() -> MethodShape {
    MethodShape::from_json(SHAPE).expect("fixture shape")
}

pub fn receive_body(table: &SymbolTable) -> InstructionSequence {
    parse_listing(RECEIVE_LISTING, table).expect("fixture listing")
}
