//! Kernel extraction from authored sample volumes

use crate::analysis::rules::RuleSet;
use crate::analysis::statistics::{AdjacencyTable, NEIGHBOR_OFFSETS};
use crate::io::configuration::{DEFAULT_KERNEL_SIZE, MAX_PALETTE_SIZE};
use crate::io::error::{AlgorithmError, Result, invalid_parameter, invalid_source};
use crate::spatial::grid::{Extent, Position};
use crate::spatial::symbols::Symbol;
use crate::spatial::tiles::{KernelPattern, KernelStore};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Authored volume indexed `[x, y, z]`; `None` marks a position with no tile
pub type Sample = Array3<Option<Symbol>>;

/// Which absent cells are treated as open air during extraction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirFill {
    /// Fill absent cells only in (x, y) columns holding at least one tile along z
    #[default]
    Columns,
    /// Fill every absent cell inside the sample bounds
    Bounds,
}

impl fmt::Display for AirFill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Columns => write!(f, "columns"),
            Self::Bounds => write!(f, "bounds"),
        }
    }
}

impl FromStr for AirFill {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "columns" => Ok(Self::Columns),
            "bounds" => Ok(Self::Bounds),
            _ => Err(invalid_parameter(
                "air_fill",
                &s,
                &"expected 'columns' or 'bounds'",
            )),
        }
    }
}

/// Parameters for one extraction run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Window size read at every anchor
    pub kernel_size: Extent,
    /// Air fill policy applied before windows are read
    pub air_fill: AirFill,
    /// Whether the air sentinel joins the generation alphabet
    pub include_empty: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            air_fill: AirFill::Columns,
            include_empty: true,
        }
    }
}

/// Fill absent cells with the air sentinel and return the filled positions
///
/// The returned list is exactly what `clear_air` needs to undo the fill.
pub fn fill_air(sample: &mut Sample, policy: AirFill) -> Vec<Position> {
    let (sx, sy, sz) = sample.dim();
    let mut filled = Vec::new();

    for y in 0..sy {
        for x in 0..sx {
            let populated = match policy {
                AirFill::Bounds => true,
                AirFill::Columns => (0..sz).any(|z| matches!(sample.get([x, y, z]), Some(Some(_)))),
            };
            if !populated {
                continue;
            }
            for z in 0..sz {
                if let Some(cell) = sample.get_mut([x, y, z]) {
                    if cell.is_none() {
                        *cell = Some(Symbol::EMPTY);
                        filled.push([x, y, z]);
                    }
                }
            }
        }
    }

    filled
}

/// Restore positions filled by `fill_air` to absent
pub fn clear_air(sample: &mut Sample, filled: &[Position]) {
    for &position in filled {
        if let Some(cell) = sample.get_mut(position) {
            *cell = None;
        }
    }
}

/// Slides a kernel window over a sample and canonicalizes what it reads
pub struct RuleExtractor {
    config: ExtractionConfig,
}

impl RuleExtractor {
    /// Create an extractor
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel size has a zero dimension
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        if config.kernel_size.is_degenerate() {
            return Err(invalid_parameter(
                "kernel_size",
                &config.kernel_size,
                &"every dimension must be at least 1",
            ));
        }
        Ok(Self { config })
    }

    /// Extraction parameters
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract a fresh rule set from a sample
    ///
    /// The sample is temporarily filled with air and restored before returning, so the
    /// caller observes it unchanged. Windows reaching any cell that is still absent after
    /// the fill are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionEmptyInput` if the sample holds no tile at all, and
    /// `InvalidSourceData` if a symbol index exceeds `MAX_PALETTE_SIZE`
    pub fn extract(&self, sample: &mut Sample) -> Result<RuleSet> {
        if sample.iter().all(Option::is_none) {
            return Err(AlgorithmError::ExtractionEmptyInput);
        }
        // Adjacency counts are dense over every symbol pair
        if let Some(symbol) = sample
            .iter()
            .flatten()
            .find(|s| s.index() > MAX_PALETTE_SIZE)
        {
            return Err(invalid_source(&format!(
                "symbol {symbol} exceeds the palette limit of {MAX_PALETTE_SIZE}"
            )));
        }

        let filled = fill_air(sample, self.config.air_fill);
        debug!(filled = filled.len(), policy = ?self.config.air_fill, "filled air");

        let kernels = self.slide_window(sample);
        let adjacency = Self::count_neighbors(sample);

        clear_air(sample, &filled);

        if kernels.is_empty() {
            warn!(
                kernel = %self.config.kernel_size,
                sample = ?sample.dim(),
                "no complete kernel window fits inside the sample"
            );
        }

        let rules = RuleSet::new(kernels, adjacency, self.config.include_empty)?;
        info!(
            kernels = rules.kernels().len(),
            observations = rules.kernels().total_observations(),
            symbols = rules.symbols().len(),
            "extracted rules"
        );
        Ok(rules)
    }

    fn slide_window(&self, sample: &Sample) -> KernelStore {
        let (sx, sy, sz) = sample.dim();
        let size = self.config.kernel_size;
        let mut store = KernelStore::new();

        let anchors = Extent::new(
            (sx + 1).saturating_sub(size.x),
            (sy + 1).saturating_sub(size.y),
            (sz + 1).saturating_sub(size.z),
        );

        for anchor in anchors.positions() {
            if let Some(pattern) = Self::read_window(sample, anchor, size) {
                store.observe(pattern);
            }
        }

        store
    }

    fn read_window(sample: &Sample, anchor: Position, size: Extent) -> Option<KernelPattern> {
        let mut symbols = Vec::with_capacity(size.volume());
        for local in size.positions() {
            let at = [anchor[0] + local[0], anchor[1] + local[1], anchor[2] + local[2]];
            // Absent or out of range means the window leaves authored content
            let symbol = sample.get(at).copied().flatten()?;
            symbols.push(symbol);
        }
        KernelPattern::new(size, symbols).ok()
    }

    fn count_neighbors(sample: &Sample) -> AdjacencyTable {
        let (sx, sy, sz) = sample.dim();
        let extent = Extent::new(sx, sy, sz);
        let capacity = sample
            .iter()
            .flatten()
            .map(|s| s.index() + 1)
            .max()
            .unwrap_or(1);
        let mut table = AdjacencyTable::new(capacity);

        for position in extent.positions() {
            let Some(Some(base)) = sample.get(position).copied() else {
                continue;
            };
            for offset in NEIGHBOR_OFFSETS {
                let neighbor = extent
                    .offset(position, offset)
                    .and_then(|p| sample.get(p).copied().flatten());
                if let Some(neighbor) = neighbor {
                    table.record(offset, base, neighbor);
                }
            }
        }

        table
    }
}
