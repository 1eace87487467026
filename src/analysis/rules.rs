//! Rule sets: the extracted vocabulary consumed by generation

use crate::algorithm::bitset::SymbolBitset;
use crate::analysis::statistics::AdjacencyTable;
use crate::io::error::{Result, invalid_parameter, invalid_source};
use crate::spatial::grid::Extent;
use crate::spatial::symbols::Symbol;
use crate::spatial::tiles::{Kernel, KernelPattern, KernelStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Canonical kernels, the symbols they use, and neighbour statistics
///
/// Created fresh by each extraction and read-only afterwards. All kernels share one size.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleSet {
    kernels: KernelStore,
    symbols: Vec<Symbol>,
    adjacency: AdjacencyTable,
}

impl RuleSet {
    /// Assemble a rule set from a filled store
    ///
    /// The symbol set is the union of every kernel symbol; the air sentinel is dropped
    /// unless `include_empty` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the store mixes kernel sizes
    pub fn new(kernels: KernelStore, adjacency: AdjacencyTable, include_empty: bool) -> Result<Self> {
        if let Some(first) = kernels.kernels().first() {
            if let Some(odd) = kernels.kernels().iter().find(|k| k.size() != first.size()) {
                return Err(invalid_parameter(
                    "kernel_size",
                    &odd.size(),
                    &format!("all kernels of a rule set must be {}", first.size()),
                ));
            }
        }

        let symbols: BTreeSet<Symbol> = kernels
            .kernels()
            .iter()
            .flat_map(|k| k.pattern().symbols().iter().copied())
            .filter(|s| include_empty || !s.is_sentinel())
            .collect();

        Ok(Self {
            kernels,
            symbols: symbols.into_iter().collect(),
            adjacency,
        })
    }

    /// Build a rule set from hand-written kernels, keeping the air sentinel
    ///
    /// Equal kernels are merged by summing their counts. No adjacency statistics are
    /// attached, so weighted collapse falls back to uniform choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernels differ in size
    pub fn from_kernels(kernels: Vec<Kernel>) -> Result<Self> {
        let store = KernelStore::from(kernels);
        let capacity = store
            .kernels()
            .iter()
            .flat_map(|k| k.pattern().symbols().iter())
            .map(|s| s.index() + 1)
            .max()
            .unwrap_or(1);
        Self::new(store, AdjacencyTable::new(capacity), true)
    }

    /// The kernel store
    pub const fn kernels(&self) -> &KernelStore {
        &self.kernels
    }

    /// Distinct symbols in ascending order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Neighbour co-occurrence counts
    pub const fn adjacency(&self) -> &AdjacencyTable {
        &self.adjacency
    }

    /// Bitset width covering every symbol of the rule set and its statistics
    pub fn symbol_capacity(&self) -> usize {
        let from_symbols = self
            .kernels
            .kernels()
            .iter()
            .flat_map(|k| k.pattern().symbols().iter())
            .map(|s| s.index() + 1)
            .max()
            .unwrap_or(1);
        from_symbols.max(self.adjacency.capacity())
    }

    /// Domain every cell starts generation with
    pub fn alphabet(&self) -> SymbolBitset {
        SymbolBitset::from_symbols(&self.symbols, self.symbol_capacity())
    }

    /// Largest kernel size, which bounds the propagation neighbourhood
    pub fn max_extent(&self) -> Option<Extent> {
        self.kernels.max_extent()
    }

    /// Check the invariants of a rule set read from outside
    ///
    /// # Errors
    ///
    /// Returns an error if a kernel's symbol count does not match its size, the kernels
    /// differ in size, or the symbol list names a symbol no kernel uses
    pub fn validate(&self) -> Result<()> {
        let mut used = BTreeSet::new();
        let mut size = None;
        for kernel in self.kernels.kernels() {
            let pattern = kernel.pattern();
            KernelPattern::new(pattern.size(), pattern.symbols().to_vec())?;
            let expected = *size.get_or_insert(pattern.size());
            if expected != pattern.size() {
                return Err(invalid_source(&format!(
                    "kernel of size {} in a rule set of {expected}",
                    pattern.size()
                )));
            }
            used.extend(pattern.symbols().iter().copied());
        }
        if let Some(stray) = self.symbols.iter().find(|s| !used.contains(*s)) {
            return Err(invalid_source(&format!(
                "symbol {stray} is listed but used by no kernel"
            )));
        }
        Ok(())
    }

    /// Whether the rule set has no symbols to generate with
    pub const fn is_exhausted(&self) -> bool {
        self.symbols.is_empty() || self.kernels.is_empty()
    }
}
