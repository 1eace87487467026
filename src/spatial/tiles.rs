//! Kernel patterns and the deduplicating kernel store
//!
//! A kernel is a fixed-size 3-D window of symbols read from the sample. The store keeps
//! exactly one entry per distinct window and counts how often it was observed.

use crate::io::error::{Result, invalid_parameter};
use crate::spatial::grid::{Extent, Position};
use crate::spatial::symbols::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Symbols of one window, stored x-fastest (`x + y*sx + z*sx*sy`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelPattern {
    size: Extent,
    symbols: Vec<Symbol>,
}

impl KernelPattern {
    /// Build a pattern from its size and symbols in x-fastest order
    ///
    /// # Errors
    ///
    /// Returns an error if the size is degenerate or the symbol count does not match it
    pub fn new(size: Extent, symbols: Vec<Symbol>) -> Result<Self> {
        if size.is_degenerate() {
            return Err(invalid_parameter(
                "kernel_size",
                &size,
                &"every dimension must be at least 1",
            ));
        }
        if symbols.len() != size.volume() {
            return Err(invalid_parameter(
                "kernel_symbols",
                &symbols.len(),
                &format!("expected {} symbols for size {size}", size.volume()),
            ));
        }
        Ok(Self { size, symbols })
    }

    /// Window dimensions
    pub const fn size(&self) -> Extent {
        self.size
    }

    /// Symbol at a local offset, or `None` outside the window
    pub fn at(&self, offset: Position) -> Option<Symbol> {
        if !self.size.contains(offset) {
            return None;
        }
        let index = offset[0] + offset[1] * self.size.x + offset[2] * self.size.x * self.size.y;
        self.symbols.get(index).copied()
    }

    /// All symbols in storage order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Local offsets paired with their symbols, x varying fastest
    pub fn cells(&self) -> impl Iterator<Item = (Position, Symbol)> + '_ {
        self.size.positions().zip(self.symbols.iter().copied())
    }
}

/// An observed window together with how often it occurred
///
/// Equality considers the pattern only, never the count.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Kernel {
    pattern: KernelPattern,
    count: u32,
}

impl Kernel {
    /// Wrap a pattern observed once
    pub const fn new(pattern: KernelPattern) -> Self {
        Self { pattern, count: 1 }
    }

    /// Wrap a pattern with an explicit occurrence count (clamped to at least 1)
    pub fn with_count(pattern: KernelPattern, count: u32) -> Self {
        Self {
            pattern,
            count: count.max(1),
        }
    }

    /// The window contents
    pub const fn pattern(&self) -> &KernelPattern {
        &self.pattern
    }

    /// Window dimensions
    pub const fn size(&self) -> Extent {
        self.pattern.size
    }

    /// Symbol at a local offset
    pub fn at(&self, offset: Position) -> Option<Symbol> {
        self.pattern.at(offset)
    }

    /// Number of observations
    pub const fn count(&self) -> u32 {
        self.count
    }
}

impl PartialEq for Kernel {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for Kernel {}

/// Canonical set of kernels with occurrence counts
///
/// Lookup is by exact pattern value, so the store never holds two equal kernels.
/// Enumeration order is first-observation order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Kernel>", into = "Vec<Kernel>")]
pub struct KernelStore {
    kernels: Vec<Kernel>,
    index: HashMap<KernelPattern, usize>,
}

impl KernelStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of a pattern and return its slot
    ///
    /// Increments the count of an existing equal kernel or inserts a new one.
    pub fn observe(&mut self, pattern: KernelPattern) -> usize {
        self.observe_many(pattern, 1)
    }

    /// Record `count` observations of a pattern at once
    pub fn observe_many(&mut self, pattern: KernelPattern, count: u32) -> usize {
        if let Some(slot) = self.find(&pattern) {
            if let Some(kernel) = self.kernels.get_mut(slot) {
                kernel.count = kernel.count.saturating_add(count);
            }
            return slot;
        }
        let slot = self.kernels.len();
        self.index.insert(pattern.clone(), slot);
        self.kernels.push(Kernel::with_count(pattern, count));
        slot
    }

    /// Kernel at a slot
    pub fn get(&self, slot: usize) -> Option<&Kernel> {
        self.kernels.get(slot)
    }

    /// Slot of a pattern, if stored
    pub fn find(&self, pattern: &KernelPattern) -> Option<usize> {
        self.index.get(pattern).copied()
    }

    /// All kernels in first-observation order
    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    /// Number of distinct kernels
    pub const fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Whether no kernel has been observed
    pub const fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Sum of all occurrence counts
    pub fn total_observations(&self) -> u64 {
        self.kernels.iter().map(|k| u64::from(k.count)).sum()
    }

    /// Component-wise maximum kernel size, or `None` when empty
    pub fn max_extent(&self) -> Option<Extent> {
        self.kernels
            .iter()
            .map(Kernel::size)
            .reduce(Extent::max)
    }
}

impl From<Vec<Kernel>> for KernelStore {
    fn from(kernels: Vec<Kernel>) -> Self {
        let mut store = Self::new();
        for kernel in kernels {
            store.observe_many(kernel.pattern, kernel.count);
        }
        store
    }
}

impl From<KernelStore> for Vec<Kernel> {
    fn from(store: KernelStore) -> Self {
        store.kernels
    }
}
