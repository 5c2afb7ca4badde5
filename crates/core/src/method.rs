//! Shape of the method being patched: receiver, parameters and local slots.

use crate::result::{Error, Result};
use serde::{Deserialize, Serialize};

/// Argument and local layout of a method body, as reported by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodShape {
    /// Declaring type; argument 0 on instance methods.
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    /// Parameter types, excluding the receiver.
    #[serde(default)]
    pub params: Vec<String>,
    /// Local slot types, indexed by slot.
    #[serde(default)]
    pub locals: Vec<String>,
}

impl MethodShape {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Type loaded by `ldarg index`.
    pub fn arg_type(&self, index: u16) -> Result<&str> {
        let param = match (self.is_static, index) {
            (false, 0) => return Ok(&self.owner),
            (false, n) => usize::from(n) - 1,
            (true, n) => usize::from(n),
        };
        self.params
            .get(param)
            .map(String::as_str)
            .ok_or(Error::MissingArgument(index))
    }

    /// Type held by local `slot`.
    pub fn local_type(&self, slot: u16) -> Result<&str> {
        self.locals
            .get(usize::from(slot))
            .map(String::as_str)
            .ok_or(Error::MissingLocal(slot))
    }
}
