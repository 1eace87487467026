//! Neighbour co-occurrence statistics gathered from the sample
//!
//! For every authored cell and each of its 26 neighbours, counts how often a base symbol
//! sees a neighbour symbol at a given relative offset. Weighted collapse reads these counts
//! to favour arrangements that were common in the sample.

use crate::spatial::grid::Offset;
use crate::spatial::symbols::Symbol;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

/// The 26 offsets of a cell's Moore neighbourhood, x varying fastest
pub const NEIGHBOR_OFFSETS: [Offset; 26] = [
    [-1, -1, -1],
    [0, -1, -1],
    [1, -1, -1],
    [-1, 0, -1],
    [0, 0, -1],
    [1, 0, -1],
    [-1, 1, -1],
    [0, 1, -1],
    [1, 1, -1],
    [-1, -1, 0],
    [0, -1, 0],
    [1, -1, 0],
    [-1, 0, 0],
    [1, 0, 0],
    [-1, 1, 0],
    [0, 1, 0],
    [1, 1, 0],
    [-1, -1, 1],
    [0, -1, 1],
    [1, -1, 1],
    [-1, 0, 1],
    [0, 0, 1],
    [1, 0, 1],
    [-1, 1, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Slot of an offset in `NEIGHBOR_OFFSETS`
pub fn neighbor_index(offset: Offset) -> Option<usize> {
    if offset.iter().any(|c| !(-1..=1).contains(c)) || offset == [0, 0, 0] {
        return None;
    }
    let raw = (offset[0] + 1) + (offset[1] + 1) * 3 + (offset[2] + 1) * 9;
    // Skip the centre slot (raw 13)
    let raw = raw as usize;
    Some(if raw > 13 { raw - 1 } else { raw })
}

/// Co-occurrence counts indexed by `[offset slot, base symbol, neighbour symbol]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyTable {
    counts: Array3<u32>,
}

impl Default for AdjacencyTable {
    fn default() -> Self {
        Self::new(0)
    }
}

impl AdjacencyTable {
    /// Create an all-zero table for symbols below `capacity`
    pub fn new(capacity: usize) -> Self {
        Self {
            counts: Array3::zeros((NEIGHBOR_OFFSETS.len(), capacity, capacity)),
        }
    }

    /// Number of symbol slots per axis
    pub fn capacity(&self) -> usize {
        self.counts.dim().1
    }

    /// Record that `neighbor` was seen at `offset` from `base`
    pub fn record(&mut self, offset: Offset, base: Symbol, neighbor: Symbol) {
        if let Some(slot) = neighbor_index(offset) {
            if let Some(count) = self
                .counts
                .get_mut([slot, base.index(), neighbor.index()])
            {
                *count = count.saturating_add(1);
            }
        }
    }

    /// How often `neighbor` was seen at `offset` from `base`
    pub fn count(&self, offset: Offset, base: Symbol, neighbor: Symbol) -> u32 {
        neighbor_index(offset)
            .and_then(|slot| {
                self.counts
                    .get([slot, base.index(), neighbor.index()])
                    .copied()
            })
            .unwrap_or(0)
    }

    /// Sum of every recorded pair
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }
}
