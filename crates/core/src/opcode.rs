//! Stack-machine opcode set understood by the listing codec and the fragment validator.

use crate::result::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of operand an opcode carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    None,
    Method,
    Field,
    Arg,
    Local,
    Int,
    Label,
}

/// Executable action of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opcode {
    Nop,
    Ldarg,
    Ldloc,
    Stloc,
    Ldfld,
    Stfld,
    Ldc,
    Ldnull,
    Dup,
    Pop,
    Call,
    Callvirt,
    Newobj,
    Br,
    Brtrue,
    Brfalse,
    Ret,
}

impl Opcode {
    pub const ALL: [Opcode; 17] = [
        Opcode::Nop,
        Opcode::Ldarg,
        Opcode::Ldloc,
        Opcode::Stloc,
        Opcode::Ldfld,
        Opcode::Stfld,
        Opcode::Ldc,
        Opcode::Ldnull,
        Opcode::Dup,
        Opcode::Pop,
        Opcode::Call,
        Opcode::Callvirt,
        Opcode::Newobj,
        Opcode::Br,
        Opcode::Brtrue,
        Opcode::Brfalse,
        Opcode::Ret,
    ];

    /// Listing mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Ldarg => "ldarg",
            Opcode::Ldloc => "ldloc",
            Opcode::Stloc => "stloc",
            Opcode::Ldfld => "ldfld",
            Opcode::Stfld => "stfld",
            Opcode::Ldc => "ldc",
            Opcode::Ldnull => "ldnull",
            Opcode::Dup => "dup",
            Opcode::Pop => "pop",
            Opcode::Call => "call",
            Opcode::Callvirt => "callvirt",
            Opcode::Newobj => "newobj",
            Opcode::Br => "br",
            Opcode::Brtrue => "brtrue",
            Opcode::Brfalse => "brfalse",
            Opcode::Ret => "ret",
        }
    }

    /// The operand kind this opcode requires.
    pub fn operand_kind(self) -> OperandKind {
        match self {
            Opcode::Ldarg => OperandKind::Arg,
            Opcode::Ldloc | Opcode::Stloc => OperandKind::Local,
            Opcode::Ldfld | Opcode::Stfld => OperandKind::Field,
            Opcode::Ldc => OperandKind::Int,
            Opcode::Call | Opcode::Callvirt | Opcode::Newobj => OperandKind::Method,
            Opcode::Br | Opcode::Brtrue | Opcode::Brfalse => OperandKind::Label,
            Opcode::Nop | Opcode::Ldnull | Opcode::Dup | Opcode::Pop | Opcode::Ret => {
                OperandKind::None
            }
        }
    }

    /// Returns true for opcodes that invoke a method.
    #[inline]
    pub fn is_call(self) -> bool {
        matches!(self, Opcode::Call | Opcode::Callvirt | Opcode::Newobj)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Opcode::ALL
            .into_iter()
            .find(|op| op.mnemonic() == lowered)
            .ok_or_else(|| Error::UnsupportedOpcode(s.to_string()))
    }
}
