use splicer_core::Opcode;
use splicer_core::decoder::{Instruction, InstructionSequence, Label, Operand, parse_listing};
use splicer_core::encoder::encode;
use splicer_core::result::Error as CoreError;
use splicer_core::symbol::MethodSig;
use splicer_tests::{init_tracing, receive_body, shape, table};
use splicer_transform::Error;
use splicer_transform::Transform;
use splicer_transform::fragment::ValueSlot;
use splicer_transform::hook_patch::{HookPatch, HookPatchConfig};
use splicer_transform::pass::{DefaultPass, Pass};

#[test]
fn patch_inserts_fragment_after_anchor() {
    init_tracing();
    let table = table();
    let body = receive_body(&table);
    let patch = HookPatch::new(&HookPatchConfig::default(), &table, &shape()).unwrap();

    let patched = patch.patch(&body).unwrap();
    tracing::debug!("\n{}", encode(&patched, &table).unwrap());

    assert_eq!(patched.len(), 14);
    for p in 0..=6 {
        assert_eq!(patched[p], body[p]);
    }
    assert_eq!(&patched.as_slice()[7..11], patch.fragment());
    for p in 11..14 {
        assert_eq!(patched[p], body[p - 4]);
    }
}

#[test]
fn fragment_loads_message_speaker_listener_then_calls_hook() {
    let table = table();
    let speaker = table.resolve_field("VoiceMessage::Speaker").unwrap();
    let hook = table.resolve_method("ChannelHooks::RedirectGuarded").unwrap();
    let patch = HookPatch::new(&HookPatchConfig::default(), &table, &shape()).unwrap();

    assert_eq!(
        patch.fragment(),
        &[
            Instruction::ldarg(1),
            Instruction::ldfld(speaker),
            Instruction::ldloc(3),
            Instruction::call(hook),
        ]
    );
}

#[test]
fn fragment_is_identical_across_constructions() {
    let table = table();
    let shape = shape();
    let first = HookPatch::new(&HookPatchConfig::default(), &table, &shape).unwrap();
    let second = HookPatch::new(&HookPatchConfig::default(), &table, &shape).unwrap();
    assert_eq!(first.fragment(), second.fragment());
}

#[test]
fn patching_is_deterministic_and_leaves_input_alone() {
    let table = table();
    let body = receive_body(&table);
    let snapshot = body.clone();
    let patch = HookPatch::new(&HookPatchConfig::default(), &table, &shape()).unwrap();

    let first = patch.patch(&body).unwrap();
    let second = patch.patch(&body).unwrap();
    assert_eq!(first, second);
    assert_eq!(body, snapshot);
}

#[test]
fn missing_anchor_fails_without_output() {
    let table = table();
    let body = InstructionSequence::new(vec![Instruction::ldloc(3), Instruction::ldarg(1)]);
    let patch = HookPatch::new(&HookPatchConfig::default(), &table, &shape()).unwrap();
    assert!(matches!(patch.patch(&body), Err(Error::AnchorNotFound(_))));
}

#[test]
fn temporary_slot_writes_back_into_the_same_local() {
    let table = table();
    let body = receive_body(&table);
    let config = HookPatchConfig {
        value_slot: ValueSlot::Temporary(2),
        ..HookPatchConfig::default()
    };
    let patch = HookPatch::new(&config, &table, &shape()).unwrap();
    let patched = patch.patch(&body).unwrap();

    // the anchor at 6 stores into local 2 at 7, so the fragment follows that store
    assert_eq!(patch.insertion_point(&body).unwrap(), 8);
    assert_eq!(patched.len(), body.len() + 6);
    assert_eq!(patched[7], body[7]);
    assert_eq!(patched[8], Instruction::ldloc(2));
    assert!(patched[12].is(
        Opcode::Call,
        Operand::Method(table.resolve_method("ChannelHooks::RedirectGuarded").unwrap())
    ));
    assert_eq!(patched[13], Instruction::stloc(2));
    assert_eq!(patched[14], body[8]);
}

#[test]
fn temporary_slot_requires_the_anchor_store() {
    let table = table();
    let body = receive_body(&table);
    let mut shape = shape();
    shape.locals.push("VoiceChatChannel".into());
    let config = HookPatchConfig {
        value_slot: ValueSlot::Temporary(4),
        ..HookPatchConfig::default()
    };
    let patch = HookPatch::new(&config, &table, &shape).unwrap();
    assert!(matches!(
        patch.patch(&body),
        Err(Error::TemporaryNotAssigned { local: 4, .. })
    ));
}

#[test]
fn temporary_slot_is_checked_against_the_anchor_result() {
    let mut table = table();
    let mut shape = shape();
    shape.locals.push("VoiceChatChannel".into());

    // void anchor: nothing to store into the temporary
    table
        .intern_method(MethodSig {
            owner: "VoiceModuleBase".into(),
            name: "Reset".into(),
            params: vec![],
            returns: None,
            is_static: false,
        })
        .unwrap();
    let config = HookPatchConfig {
        anchor: "VoiceModuleBase::Reset".into(),
        value_slot: ValueSlot::Temporary(4),
        ..HookPatchConfig::default()
    };
    let err = HookPatch::new(&config, &table, &shape).unwrap_err();
    assert!(matches!(err, Error::AnchorWithoutResult(_)));

    // anchor result of another type than the temporary
    table
        .intern_method(MethodSig {
            owner: "VoiceModuleBase".into(),
            name: "IsAudible".into(),
            params: vec!["ReferenceHub".into(), "ReferenceHub".into()],
            returns: Some("Boolean".into()),
            is_static: false,
        })
        .unwrap();
    let config = HookPatchConfig {
        anchor: "VoiceModuleBase::IsAudible".into(),
        value_slot: ValueSlot::Temporary(4),
        ..HookPatchConfig::default()
    };
    let err = HookPatch::new(&config, &table, &shape).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(CoreError::LocalTypeMismatch { slot: 4, .. })
    ));

    // the same anchor feeding the stack fails on the hook's channel parameter
    let config = HookPatchConfig {
        anchor: "VoiceModuleBase::IsAudible".into(),
        ..HookPatchConfig::default()
    };
    let err = HookPatch::new(&config, &table, &shape).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(CoreError::ArgumentTypeMismatch { index: 0, .. })
    ));
}

#[test]
fn first_of_several_anchors_is_patched() {
    init_tracing();
    let table = table();
    let listing = "
        ldloc 0
        ldarg 1
        ldfld VoiceMessage::Speaker
        ldloc 3
        callvirt VoiceModuleBase::ValidateReceive
        pop
        ldloc 0
        ldarg 1
        ldfld VoiceMessage::Speaker
        ldloc 3
        callvirt VoiceModuleBase::ValidateReceive
        stloc 2
        ret
    ";
    let body = parse_listing(listing, &table).unwrap();
    let patch = HookPatch::new(&HookPatchConfig::default(), &table, &shape()).unwrap();

    let patched = patch.patch(&body).unwrap();
    assert_eq!(patched.len(), body.len() + 4);
    assert_eq!(&patched.as_slice()[5..9], patch.fragment());
    assert_eq!(patched[9], body[5]);
    // the second call is untouched and still followed by its own store
    assert_eq!(patched[14], body[10]);
    assert_eq!(patched[15], body[11]);
}

#[test]
fn branch_target_after_the_anchor_keeps_its_label() {
    init_tracing();
    let table = table();
    let listing = "
        ldloc 3
        brfalse L1
        ldloc 0
        ldarg 1
        ldfld VoiceMessage::Speaker
        ldloc 3
        callvirt VoiceModuleBase::ValidateReceive
    L1: stloc 2
        ret
    ";
    let body = parse_listing(listing, &table).unwrap();
    let patch = HookPatch::new(&HookPatchConfig::default(), &table, &shape()).unwrap();

    let patched = patch.patch(&body).unwrap();
    // the label stays on the stloc, so the branch skips the hook
    assert!(patched.as_slice()[7..11].iter().all(|ins| ins.labels.is_empty()));
    assert_eq!(patched[11], body[7]);
    assert_eq!(patched[11].labels, vec![Label(1)]);
}

#[test]
fn listener_slot_outside_the_method_is_rejected_up_front() {
    let table = table();
    let config = HookPatchConfig {
        listener_local: 8,
        ..HookPatchConfig::default()
    };
    let err = HookPatch::new(&config, &table, &shape()).unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::MissingLocal(8))));
}

#[test]
fn speaker_field_of_another_type_is_rejected_up_front() {
    let table = table();
    let config = HookPatchConfig {
        message_arg: 0,
        ..HookPatchConfig::default()
    };
    let err = HookPatch::new(&config, &table, &shape()).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(CoreError::FieldOwnerMismatch { .. })
    ));
}

#[test]
fn hook_argument_order_is_checked() {
    let table = table();
    // loading the channel field instead of the speaker puts a channel where the
    // hook expects a participant
    let config = HookPatchConfig {
        speaker_field: "VoiceMessage::Channel".into(),
        ..HookPatchConfig::default()
    };
    let err = HookPatch::new(&config, &table, &shape()).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(CoreError::ArgumentTypeMismatch { index: 1, .. })
    ));
}

#[test]
fn default_pass_reports_inserted_instructions() {
    let table = table();
    let body = receive_body(&table);
    let patch = HookPatch::new(&HookPatchConfig::default(), &table, &shape()).unwrap();
    assert_eq!(patch.name(), "HookPatch");

    let passes: Vec<Box<dyn Transform>> = vec![Box::new(patch)];
    let (patched, report) = DefaultPass.run(&body, &passes).unwrap();
    assert_eq!(patched.len(), 14);
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].inserted(), 4);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["steps"][0]["transform"], "HookPatch");
}
