//! Splicer's entry-point for turning textual method listings into instruction sequences.
//!
//! A listing holds one instruction per line:
//!
//! ```text
//! # comments run to the end of the line
//!     ldarg 1
//! L2: callvirt VoiceModuleBase::ValidateReceive(ReferenceHub,ReferenceHub)
//!     brfalse L2
//! ```
//!
//! Method and field operands are resolved through a [`SymbolTable`] while parsing,
//! so the resulting [`Instruction`]s only ever carry interned handles.

use crate::opcode::{Opcode, OperandKind};
use crate::result::{Error, Result};
use crate::symbol::{SymbolId, SymbolTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::Index;

/// Branch target name. Labels travel with the instruction they mark, not with a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Optional operand of an instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    #[default]
    None,
    Method(SymbolId),
    Field(SymbolId),
    Arg(u16),
    Local(u16),
    Int(i64),
    Label(Label),
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::None => OperandKind::None,
            Operand::Method(_) => OperandKind::Method,
            Operand::Field(_) => OperandKind::Field,
            Operand::Arg(_) => OperandKind::Arg,
            Operand::Local(_) => OperandKind::Local,
            Operand::Int(_) => OperandKind::Int,
            Operand::Label(_) => OperandKind::Label,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Method(id) | Operand::Field(id) => write!(f, "{id}"),
            Operand::Arg(n) | Operand::Local(n) => write!(f, "{n}"),
            Operand::Int(v) => write!(f, "{v}"),
            Operand::Label(label) => write!(f, "{label}"),
        }
    }
}

/// Single instruction: opcode, operand and the labels that name it as a branch target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Opcode,
    #[serde(default)]
    pub operand: Operand,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl Instruction {
    /// Builds an instruction, checking the operand fits the opcode.
    pub fn new(op: Opcode, operand: Operand) -> Result<Self> {
        if op.operand_kind() != operand.kind() {
            return Err(Error::OperandMismatch {
                opcode: op.to_string(),
                operand: format!("{operand:?}"),
            });
        }
        Ok(Self {
            op,
            operand,
            labels: Vec::new(),
        })
    }

    fn raw(op: Opcode, operand: Operand) -> Self {
        Self {
            op,
            operand,
            labels: Vec::new(),
        }
    }

    pub fn ldarg(index: u16) -> Self {
        Self::raw(Opcode::Ldarg, Operand::Arg(index))
    }

    pub fn ldloc(slot: u16) -> Self {
        Self::raw(Opcode::Ldloc, Operand::Local(slot))
    }

    pub fn stloc(slot: u16) -> Self {
        Self::raw(Opcode::Stloc, Operand::Local(slot))
    }

    pub fn ldfld(field: SymbolId) -> Self {
        Self::raw(Opcode::Ldfld, Operand::Field(field))
    }

    pub fn call(method: SymbolId) -> Self {
        Self::raw(Opcode::Call, Operand::Method(method))
    }

    pub fn callvirt(method: SymbolId) -> Self {
        Self::raw(Opcode::Callvirt, Operand::Method(method))
    }

    /// Instruction with no operand, e.g. `nop` or `ret`.
    pub fn bare(op: Opcode) -> Result<Self> {
        Self::new(op, Operand::None)
    }

    /// Attaches a branch label to this instruction.
    pub fn labelled(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Structural match on opcode and operand, ignoring labels.
    #[inline]
    pub fn is(&self, op: Opcode, operand: Operand) -> bool {
        self.op == op && self.operand == operand
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self.operand, Operand::None) {
            write!(f, "{}", self.op)
        } else {
            write!(f, "{:<8} {}", self.op, self.operand)
        }
    }
}

/// Ordered instruction list; position 0 executes first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionSequence {
    instructions: Vec<Instruction>,
}

impl InstructionSequence {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Instruction> {
        self.instructions.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_vec(self) -> Vec<Instruction> {
        self.instructions
    }
}

impl Index<usize> for InstructionSequence {
    type Output = Instruction;

    fn index(&self, position: usize) -> &Instruction {
        &self.instructions[position]
    }
}

impl From<Vec<Instruction>> for InstructionSequence {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}

impl FromIterator<Instruction> for InstructionSequence {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for InstructionSequence {
    type Item = Instruction;
    type IntoIter = std::vec::IntoIter<Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}

impl<'a> IntoIterator for &'a InstructionSequence {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

/// Parses a listing into an instruction sequence, resolving symbols through `table`.
pub fn parse_listing(listing: &str, table: &SymbolTable) -> Result<InstructionSequence> {
    let mut instructions = Vec::new();
    let mut defined = HashSet::new();
    let mut referenced = Vec::new();

    for (line_no, raw) in listing.lines().enumerate() {
        let mut line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let parse_error = |msg: String| Error::ParseError {
            line: line_no,
            msg,
            raw: raw.to_string(),
        };

        let mut labels = Vec::new();
        while let Some((head, rest)) = line.split_once(':') {
            // `::` belongs to a symbol key, not a label definition
            if rest.starts_with(':') || head.contains(char::is_whitespace) {
                break;
            }
            let label = parse_label(head.trim())
                .ok_or_else(|| parse_error(format!("invalid label '{head}'")))?;
            if !defined.insert(label) {
                return Err(parse_error(format!("label {label} defined twice")));
            }
            labels.push(label);
            line = rest.trim_start();
        }

        let (mnemonic, operand_text) = match line.split_once(char::is_whitespace) {
            Some((mnemonic, rest)) => (mnemonic, rest.trim()),
            None => (line, ""),
        };
        if mnemonic.is_empty() {
            return Err(parse_error("missing opcode".into()));
        }

        let op: Opcode = mnemonic
            .parse()
            .map_err(|e: Error| parse_error(e.to_string()))?;
        let operand = parse_operand(op, operand_text, table).map_err(parse_error)?;
        if let Operand::Label(target) = operand {
            referenced.push((line_no, raw, target));
        }

        tracing::debug!("Parsed line {}: {} {}", line_no, op, operand);
        instructions.push(Instruction {
            op,
            operand,
            labels,
        });
    }

    if instructions.is_empty() {
        return Err(Error::ParseError {
            line: 0,
            msg: "empty listing".into(),
            raw: listing.to_string(),
        });
    }

    if let Some((line, raw, target)) = referenced
        .into_iter()
        .find(|(_, _, target)| !defined.contains(target))
    {
        return Err(Error::ParseError {
            line,
            msg: format!("branch to undefined label {target}"),
            raw: raw.to_string(),
        });
    }

    Ok(InstructionSequence::new(instructions))
}

fn parse_label(text: &str) -> Option<Label> {
    text.strip_prefix('L')?.parse().ok().map(Label)
}

fn parse_operand(
    op: Opcode,
    text: &str,
    table: &SymbolTable,
) -> std::result::Result<Operand, String> {
    let kind = op.operand_kind();
    if kind == OperandKind::None {
        return if text.is_empty() {
            Ok(Operand::None)
        } else {
            Err(format!("{op} takes no operand"))
        };
    }
    if text.is_empty() {
        return Err(format!("{op} requires an operand"));
    }

    match kind {
        OperandKind::Method => table
            .resolve_method(text)
            .map(Operand::Method)
            .map_err(|e| e.to_string()),
        OperandKind::Field => table
            .resolve_field(text)
            .map(Operand::Field)
            .map_err(|e| e.to_string()),
        OperandKind::Arg => text
            .parse()
            .map(Operand::Arg)
            .map_err(|_| format!("invalid argument index '{text}'")),
        OperandKind::Local => text
            .parse()
            .map(Operand::Local)
            .map_err(|_| format!("invalid local slot '{text}'")),
        OperandKind::Int => text
            .parse()
            .map(Operand::Int)
            .map_err(|_| format!("invalid integer '{text}'")),
        OperandKind::Label => parse_label(text)
            .map(Operand::Label)
            .ok_or_else(|| format!("invalid label '{text}'")),
        OperandKind::None => unreachable!("handled above"),
    }
}
