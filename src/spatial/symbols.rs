//! Symbol interning for tile identities
//!
//! Every distinct tile identity seen in a sample is mapped to a small integer so that
//! domains can be stored as bitsets. Index 0 is reserved for the air sentinel.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Interned tile identifier
///
/// `Symbol::EMPTY` marks open space inside authored content. It is only introduced by
/// extraction and is mapped back to "no tile" when a generated volume is emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(u32);

impl Symbol {
    /// Air sentinel, always index 0
    pub const EMPTY: Self = Self(0);

    /// Wrap a raw symbol index
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Bit position of this symbol in a domain bitset
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this is the air sentinel
    pub const fn is_sentinel(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "EMPTY")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Bidirectional mapping between external tile identities and symbols
///
/// Identities receive symbols in first-seen order starting at 1.
#[derive(Clone, Debug)]
pub struct SymbolTable<T> {
    identities: Vec<T>,
    lookup: HashMap<T, Symbol>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self {
            identities: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> SymbolTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from identities listed in symbol order (symbol 1 first)
    pub fn from_identities(identities: Vec<T>) -> Self {
        let mut table = Self::new();
        for identity in identities {
            table.intern(identity);
        }
        table
    }

    /// Return the symbol for an identity, assigning the next free one if unseen
    pub fn intern(&mut self, identity: T) -> Symbol {
        if let Some(&symbol) = self.lookup.get(&identity) {
            return symbol;
        }
        let symbol = Symbol::new(self.identities.len() as u32 + 1);
        self.identities.push(identity.clone());
        self.lookup.insert(identity, symbol);
        symbol
    }

    /// Look up an identity without interning it
    pub fn symbol_of(&self, identity: &T) -> Option<Symbol> {
        self.lookup.get(identity).copied()
    }

    /// Resolve a symbol to its identity; the sentinel has none
    pub fn resolve(&self, symbol: Symbol) -> Option<&T> {
        symbol
            .index()
            .checked_sub(1)
            .and_then(|slot| self.identities.get(slot))
    }

    /// Number of interned identities, excluding the sentinel
    pub const fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether nothing has been interned yet
    pub const fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Bitset width needed to hold every symbol of this table plus the sentinel
    pub fn capacity(&self) -> usize {
        self.identities.len() + 1
    }

    /// Identities in symbol order
    pub fn identities(&self) -> &[T] {
        &self.identities
    }
}
