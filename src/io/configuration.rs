//! Algorithm constants and runtime configuration defaults

use crate::spatial::grid::Extent;

/// Kernel window read during extraction
pub const DEFAULT_KERNEL_SIZE: Extent = Extent::new(3, 3, 3);

/// Size of the generated volume
pub const DEFAULT_OUTPUT_SIZE: Extent = Extent::new(32, 32, 3);

// Hops a single collapse may ripple through before propagation stops
/// Default propagation depth per triggering event
pub const PROPAGATION_DEPTH: usize = 2;

/// Region resets allowed before a run is reported as failed
pub const DEFAULT_RETRY_BUDGET: usize = 10;

/// Seed cell position
pub const SEED_POSITION: [usize; 3] = [0, 0, 0];

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;
/// Maximum number of cells in a generated volume
pub const MAX_GRID_CELLS: usize = 1 << 24;
/// Maximum number of distinct tiles in a sample
pub const MAX_PALETTE_SIZE: usize = 256;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

// Output settings
/// Rule file written by extraction when no path is given
pub const DEFAULT_RULES_FILE: &str = "rules.json";
/// Directory generated slices are written to when no path is given
pub const DEFAULT_OUTPUT_DIR: &str = "generated";
/// File name prefix for each exported z slice
pub const SLICE_PREFIX: &str = "slice";
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
