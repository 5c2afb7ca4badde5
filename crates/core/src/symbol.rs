//! Resolution table for external symbols.
//!
//! Methods and fields referenced by instructions are interned once into a
//! [`SymbolTable`] and afterwards compared by [`SymbolId`] only. Method keys carry
//! their parameter list (`Owner::Name(A,B)`), so overloads and same-named members
//! of unrelated types always resolve to distinct handles.

use crate::result::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Interned handle to a resolved method or field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Signature of a resolved method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSig {
    /// Declaring type.
    pub owner: String,
    pub name: String,
    /// Parameter types, excluding the receiver.
    #[serde(default)]
    pub params: Vec<String>,
    /// Return type, `None` for void.
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub is_static: bool,
}

impl MethodSig {
    /// Fully qualified key, e.g. `VoiceModuleBase::ValidateReceive(ReferenceHub,ReferenceHub)`.
    pub fn key(&self) -> String {
        format!("{}({})", self.short_key(), self.params.join(","))
    }

    /// Key without the parameter list.
    pub fn short_key(&self) -> String {
        format!("{}::{}", self.owner, self.name)
    }

    /// Number of values a call pops, receiver included.
    pub fn stack_inputs(&self) -> usize {
        self.params.len() + usize::from(!self.is_static)
    }
}

/// Signature of a resolved field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSig {
    /// Declaring type.
    pub owner: String,
    pub name: String,
    /// Field type.
    pub ty: String,
}

impl FieldSig {
    /// Fully qualified key, e.g. `VoiceMessage::Speaker`.
    pub fn key(&self) -> String {
        format!("{}::{}", self.owner, self.name)
    }
}

/// A resolved symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    Method(MethodSig),
    Field(FieldSig),
}

impl Symbol {
    pub fn key(&self) -> String {
        match self {
            Symbol::Method(sig) => sig.key(),
            Symbol::Field(sig) => sig.key(),
        }
    }
}

/// Host-supplied symbol declarations, as stored in a JSON manifest.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SymbolManifest {
    #[serde(default)]
    pub methods: Vec<MethodSig>,
    #[serde(default)]
    pub fields: Vec<FieldSig>,
}

/// Interning table mapping symbol keys to handles.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_key: HashMap<String, SymbolId>,
    overloads: HashMap<String, Vec<SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a JSON [`SymbolManifest`].
    pub fn from_manifest_json(json: &str) -> Result<Self> {
        let manifest: SymbolManifest = serde_json::from_str(json)?;
        Self::from_manifest(manifest)
    }

    pub fn from_manifest(manifest: SymbolManifest) -> Result<Self> {
        let mut table = Self::new();
        for method in manifest.methods {
            table.intern_method(method)?;
        }
        for field in manifest.fields {
            table.intern_field(field)?;
        }
        tracing::debug!("Symbol table holds {} symbols", table.len());
        Ok(table)
    }

    /// Interns a method, returning the existing handle if the same signature is already known.
    pub fn intern_method(&mut self, sig: MethodSig) -> Result<SymbolId> {
        let short = sig.short_key();
        let id = self.intern(Symbol::Method(sig))?;
        let overloads = self.overloads.entry(short).or_default();
        if !overloads.contains(&id) {
            overloads.push(id);
        }
        Ok(id)
    }

    /// Interns a field, returning the existing handle if the same signature is already known.
    pub fn intern_field(&mut self, sig: FieldSig) -> Result<SymbolId> {
        self.intern(Symbol::Field(sig))
    }

    fn intern(&mut self, symbol: Symbol) -> Result<SymbolId> {
        let key = symbol.key();
        if let Some(&id) = self.by_key.get(&key) {
            if self.symbols[id.0 as usize] != symbol {
                return Err(Error::ConflictingSymbol(key));
            }
            return Ok(id);
        }

        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        self.by_key.insert(key, id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// Key of the symbol behind a handle, used when rendering listings.
    pub fn key(&self, id: SymbolId) -> Option<String> {
        self.get(id).map(Symbol::key)
    }

    pub fn method(&self, id: SymbolId) -> Result<&MethodSig> {
        match self.get(id) {
            Some(Symbol::Method(sig)) => Ok(sig),
            _ => Err(Error::WrongSymbolKind {
                id: id.0,
                expected: "method",
            }),
        }
    }

    pub fn field(&self, id: SymbolId) -> Result<&FieldSig> {
        match self.get(id) {
            Some(Symbol::Field(sig)) => Ok(sig),
            _ => Err(Error::WrongSymbolKind {
                id: id.0,
                expected: "field",
            }),
        }
    }

    /// Resolves a method key.
    ///
    /// Accepts the full `Owner::Name(Params)` form, or `Owner::Name` when exactly one
    /// overload carries that name.
    pub fn resolve_method(&self, key: &str) -> Result<SymbolId> {
        let key: String = key.chars().filter(|c| !c.is_whitespace()).collect();
        if key.contains('(') {
            let id = self
                .by_key
                .get(&key)
                .copied()
                .ok_or_else(|| Error::UnresolvedSymbol(key.clone()))?;
            self.method(id)?;
            return Ok(id);
        }

        match self.overloads.get(&key).map(Vec::as_slice) {
            Some([id]) => Ok(*id),
            Some(candidates) if !candidates.is_empty() => Err(Error::AmbiguousSymbol {
                key,
                candidates: candidates.len(),
            }),
            _ => Err(Error::UnresolvedSymbol(key)),
        }
    }

    /// Resolves a field key of the form `Owner::Name`.
    pub fn resolve_field(&self, key: &str) -> Result<SymbolId> {
        let key = key.trim();
        let id = self
            .by_key
            .get(key)
            .copied()
            .ok_or_else(|| Error::UnresolvedSymbol(key.to_string()))?;
        self.field(id)?;
        Ok(id)
    }
}
