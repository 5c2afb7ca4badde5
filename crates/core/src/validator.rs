//! Validate that an instruction fragment fits the method it will be spliced into.
//!
//! `validate_fragment` simulates the evaluation stack with type names. It only
//! understands straight-line loads, stores and calls; anything with control flow
//! or literal values is rejected because a fragment never needs it.

use crate::decoder::{Instruction, Operand};
use crate::method::MethodShape;
use crate::result::{Error, Result};
use crate::stack::Stack;
use crate::symbol::SymbolTable;
use crate::Opcode;

/// Checks `fragment` against `shape` and `table`, starting from the `entry` stack
/// (bottom to top).
///
/// The fragment must leave the stack at the same depth with the same types as it
/// found it, so the instructions after the insertion point see an unchanged layout.
pub fn validate_fragment(
    fragment: &[Instruction],
    shape: &MethodShape,
    table: &SymbolTable,
    entry: &[String],
) -> Result<()> {
    let exit = simulate(fragment, shape, table, entry)?;

    if exit.len() != entry.len() {
        return Err(Error::StackImbalance {
            before: entry.len(),
            after: exit.len(),
        });
    }
    if let Some((expected, found)) = entry.iter().zip(&exit).find(|(a, b)| a != b) {
        return Err(Error::ResultTypeMismatch {
            expected: expected.clone(),
            found: found.clone(),
        });
    }
    Ok(())
}

/// Runs the fragment over a typed stack and returns the exit stack (bottom to top).
pub fn simulate(
    fragment: &[Instruction],
    shape: &MethodShape,
    table: &SymbolTable,
    entry: &[String],
) -> Result<Vec<String>> {
    let mut stack: Stack<String> = entry.iter().cloned().collect();

    for (position, ins) in fragment.iter().enumerate() {
        let pop = |stack: &mut Stack<String>| stack.pop().ok_or(Error::StackUnderflow(position));

        match (ins.op, ins.operand) {
            (Opcode::Nop, Operand::None) => {}
            (Opcode::Ldarg, Operand::Arg(index)) => stack.push(shape.arg_type(index)?.to_string()),
            (Opcode::Ldloc, Operand::Local(slot)) => stack.push(shape.local_type(slot)?.to_string()),
            (Opcode::Stloc, Operand::Local(slot)) => {
                let expected = shape.local_type(slot)?;
                let found = pop(&mut stack)?;
                if found != expected {
                    return Err(Error::LocalTypeMismatch {
                        slot,
                        expected: expected.to_string(),
                        found,
                    });
                }
            }
            (Opcode::Ldfld, Operand::Field(id)) => {
                let field = table.field(id)?;
                let found = pop(&mut stack)?;
                if found != field.owner {
                    return Err(Error::FieldOwnerMismatch {
                        field: field.key(),
                        owner: field.owner.clone(),
                        found,
                    });
                }
                stack.push(field.ty.clone());
            }
            (Opcode::Dup, Operand::None) => {
                let top = stack.peek().cloned().ok_or(Error::StackUnderflow(position))?;
                stack.push(top);
            }
            (Opcode::Pop, Operand::None) => {
                pop(&mut stack)?;
            }
            (Opcode::Call | Opcode::Callvirt, Operand::Method(id)) => {
                let method = table.method(id)?;
                let receiver = (!method.is_static).then_some(&method.owner);
                let expected: Vec<&String> = receiver.into_iter().chain(&method.params).collect();

                for (index, ty) in expected.iter().enumerate().rev() {
                    let found = pop(&mut stack)?;
                    if &found != *ty {
                        return Err(Error::ArgumentTypeMismatch {
                            method: method.key(),
                            index,
                            expected: (*ty).clone(),
                            found,
                        });
                    }
                }
                if let Some(returns) = &method.returns {
                    stack.push(returns.clone());
                }
            }
            (op, _) => return Err(Error::UnsupportedInFragment(op.to_string())),
        }

        tracing::debug!(
            "Fragment position {}: {} leaves depth {}",
            position,
            ins,
            stack.len()
        );
    }

    Ok(stack.into_vec())
}
