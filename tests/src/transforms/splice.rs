use splicer_core::decoder::{Instruction, InstructionSequence};
use splicer_transform::splice::splice;

fn body(len: usize) -> InstructionSequence {
    (0..len).map(|n| Instruction::ldloc(n as u16)).collect()
}

fn fragment(len: usize) -> Vec<Instruction> {
    (0..len).map(|n| Instruction::ldarg(100 + n as u16)).collect()
}

#[test]
fn splice_preserves_prefix_window_and_suffix() {
    for base_len in [0, 1, 5, 10] {
        for frag_len in [0, 1, 4] {
            let base = body(base_len);
            let frag = fragment(frag_len);
            for k in 0..=base_len {
                let out = splice(&base, k, &frag);
                assert_eq!(out.len(), base_len + frag_len);
                for p in 0..k {
                    assert_eq!(out[p], base[p], "prefix at {p}");
                }
                for p in k..k + frag_len {
                    assert_eq!(out[p], frag[p - k], "window at {p}");
                }
                for p in k + frag_len..out.len() {
                    assert_eq!(out[p], base[p - frag_len], "suffix at {p}");
                }
            }
        }
    }
}

#[test]
fn labels_stay_with_their_instruction() {
    use splicer_core::decoder::Label;

    let base = InstructionSequence::new(vec![
        Instruction::ldloc(0),
        Instruction::ldloc(1).labelled(Label(9)),
    ]);
    let out = splice(&base, 1, &fragment(2));
    assert_eq!(out[3].labels, vec![Label(9)]);
    assert!(out[1].labels.is_empty());
}

#[test]
#[should_panic]
fn splice_past_end_is_a_contract_failure() {
    let _ = splice(&body(3), 4, &fragment(1));
}
