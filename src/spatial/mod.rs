//! Spatial data structures for kernels and generation grids
//!
//! This module contains spatial-related functionality including:
//! - Symbol interning for tile identities
//! - Kernel windows and their deduplicating store
//! - The wave grid of per-cell domains

/// Wave grid, extents and positions
pub mod grid;
/// Tile identity interning
pub mod symbols;
/// Kernel patterns and the kernel store
pub mod tiles;

pub use grid::{Cell, Extent, Position, WaveGrid};
pub use symbols::{Symbol, SymbolTable};
