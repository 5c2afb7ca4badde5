use splicer_core::load_listing;
use splicer_core::result::Error;
use splicer_core::symbol::{MethodSig, Symbol};
use splicer_tests::{RECEIVE_LISTING, SYMBOLS, table};

#[test]
fn manifest_interns_every_declaration() {
    let table = table();
    assert_eq!(table.len(), 6);
    let speaker = table.resolve_field("VoiceMessage::Speaker").unwrap();
    match table.get(speaker) {
        Some(Symbol::Field(sig)) => assert_eq!(sig.ty, "ReferenceHub"),
        other => panic!("unexpected symbol: {other:?}"),
    }
}

#[test]
fn same_method_name_on_different_types_is_distinct() {
    let table = table();
    let base = table.resolve_method("VoiceModuleBase::ValidateReceive").unwrap();
    let scp = table.resolve_method("ScpVoiceModule::ValidateReceive").unwrap();
    assert_ne!(base, scp);
}

#[test]
fn adding_an_overload_makes_short_key_ambiguous() {
    let mut table = table();
    table
        .intern_method(MethodSig {
            owner: "VoiceModuleBase".into(),
            name: "ValidateReceive".into(),
            params: vec!["ReferenceHub".into(), "ReferenceHub".into(), "Boolean".into()],
            returns: Some("VoiceChatChannel".into()),
            is_static: false,
        })
        .unwrap();

    let err = table
        .resolve_method("VoiceModuleBase::ValidateReceive")
        .unwrap_err();
    assert!(matches!(err, Error::AmbiguousSymbol { candidates: 2, .. }));
    assert!(
        table
            .resolve_method("VoiceModuleBase::ValidateReceive(ReferenceHub,ReferenceHub)")
            .is_ok()
    );
}

#[test]
fn method_key_is_not_a_field() {
    let table = table();
    let id = table.resolve_method("ChannelHooks::Redirect").unwrap();
    assert!(matches!(
        table.field(id),
        Err(Error::WrongSymbolKind { expected: "field", .. })
    ));
}

#[test]
fn load_listing_builds_table_and_body() {
    let (table, body) = load_listing(RECEIVE_LISTING, SYMBOLS).unwrap();
    assert_eq!(table.len(), 6);
    assert_eq!(body.len(), 10);
}

#[test]
fn malformed_manifest_is_reported() {
    let err = load_listing(RECEIVE_LISTING, "{\"methods\": 3}").unwrap_err();
    assert!(matches!(err, Error::Manifest(_)));
}
