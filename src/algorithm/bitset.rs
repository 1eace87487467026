use crate::spatial::symbols::Symbol;
use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset holding the candidate symbols of one cell
///
/// Bit `i` stands for `Symbol::new(i)`, so the air sentinel occupies bit 0.
/// Provides O(1) membership testing and word-wise intersection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolBitset {
    bits: BitVec,
}

impl SymbolBitset {
    /// Create a bitset with no symbols present
    pub fn new(capacity: usize) -> Self {
        Self {
            bits: bitvec![0; capacity],
        }
    }

    /// Create a bitset containing the given symbols
    pub fn from_symbols(symbols: &[Symbol], capacity: usize) -> Self {
        let mut bitset = Self::new(capacity);
        for &symbol in symbols {
            bitset.insert(symbol);
        }
        bitset
    }

    /// Number of symbol slots
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert a symbol; symbols beyond capacity are ignored
    pub fn insert(&mut self, symbol: Symbol) {
        if symbol.index() < self.bits.len() {
            self.bits.set(symbol.index(), true);
        }
    }

    /// Test symbol membership
    pub fn contains(&self, symbol: Symbol) -> bool {
        self.bits.get(symbol.index()).as_deref() == Some(&true)
    }

    /// Intersect this bitset with another in-place
    pub fn intersect_with(&mut self, other: &Self) {
        self.bits &= &other.bits;
    }

    /// Whether every member of this set is also in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits.iter_ones().all(|index| other.bits.get(index).as_deref() == Some(&true))
    }

    /// Test if no symbols are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count symbols in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Iterate members in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.bits.iter_ones().map(|index| Symbol::new(index as u32))
    }

    /// Extract all members as a vector
    pub fn to_vec(&self) -> Vec<Symbol> {
        self.iter().collect()
    }
}

impl fmt::Display for SymbolBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolBitset({} symbols: [", self.count())?;
        for (i, symbol) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{symbol}")?;
        }
        write!(f, "])")
    }
}
