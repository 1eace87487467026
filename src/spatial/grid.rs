//! Wave grid state for three-dimensional generation
//!
//! Holds one `Cell` per output position in an `ndarray` arena. Cells start open with
//! every rule-set symbol as a candidate and are narrowed in place by propagation and
//! collapse. The grid never grows; positions outside the extent are simply absent.

use crate::algorithm::bitset::SymbolBitset;
use crate::io::error::{AlgorithmError, Result, invalid_parameter};
use crate::spatial::symbols::Symbol;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grid index, ordered `[x, y, z]`
pub type Position = [usize; 3];

/// Signed relative displacement, ordered `[x, y, z]`
pub type Offset = [i32; 3];

/// Kernel anchor, which may lie outside the grid
pub type Anchor = [i64; 3];

/// Size of a box along each axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    /// Cells along x
    pub x: usize,
    /// Cells along y
    pub y: usize,
    /// Cells along z
    pub z: usize,
}

impl Extent {
    /// Create an extent from its three dimensions
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Total number of cells
    pub const fn volume(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Total number of cells, or `None` when it overflows `usize`
    pub const fn checked_volume(&self) -> Option<usize> {
        match self.x.checked_mul(self.y) {
            Some(area) => area.checked_mul(self.z),
            None => None,
        }
    }

    /// Whether any dimension is zero
    pub const fn is_degenerate(&self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    /// Dimensions as an `ndarray` shape
    pub const fn shape(&self) -> (usize, usize, usize) {
        (self.x, self.y, self.z)
    }

    /// Dimensions as an array
    pub const fn as_array(&self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }

    /// Whether an unsigned position lies inside
    pub const fn contains(&self, position: Position) -> bool {
        position[0] < self.x && position[1] < self.y && position[2] < self.z
    }

    /// Component-wise maximum of two extents
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Shift a position by a signed offset, returning `None` when it leaves the extent
    pub fn offset(&self, position: Position, offset: Offset) -> Option<Position> {
        let shifted = [
            position[0] as i64 + i64::from(offset[0]),
            position[1] as i64 + i64::from(offset[1]),
            position[2] as i64 + i64::from(offset[2]),
        ];
        if shifted.iter().any(|&c| c < 0) {
            return None;
        }
        let candidate = [shifted[0] as usize, shifted[1] as usize, shifted[2] as usize];
        self.contains(candidate).then_some(candidate)
    }

    /// Positions within `reach` of `center` along each axis, clipped to the extent
    ///
    /// Includes `center` itself when it lies inside.
    pub fn around(&self, center: Position, reach: [usize; 3]) -> impl Iterator<Item = Position> + use<> {
        let span = |c: usize, r: usize, d: usize| {
            c.saturating_sub(r)..c.saturating_add(r).saturating_add(1).min(d)
        };
        let [cx, cy, cz] = center;
        let [rx, ry, rz] = reach;
        let xs = span(cx, rx, self.x);
        let ys = span(cy, ry, self.y);
        span(cz, rz, self.z).flat_map(move |z| {
            let xs = xs.clone();
            ys.clone()
                .flat_map(move |y| xs.clone().map(move |x| [x, y, z]))
        })
    }

    /// Iterate every position with x varying fastest, then y, then z
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let Self { x, y, z } = *self;
        (0..z).flat_map(move |k| (0..y).flat_map(move |j| (0..x).map(move |i| [i, j, k])))
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

impl FromStr for Extent {
    type Err = AlgorithmError;

    /// Parse `"x,y,z"` (an `x` separator is accepted too)
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split([',', 'x']).map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(invalid_parameter(
                "extent",
                &s,
                &"expected three comma-separated dimensions",
            ));
        };
        let parse = |part: &str| {
            part.parse::<usize>()
                .map_err(|e| invalid_parameter("extent", &s, &e))
        };
        Ok(Self::new(parse(*x)?, parse(*y)?, parse(*z)?))
    }
}

/// State of one output position
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    /// Still undecided, with its remaining candidates
    Open(SymbolBitset),
    /// Committed to a single symbol
    Collapsed(Symbol),
    /// Every candidate was ruled out before collapse
    Contradiction,
}

impl Cell {
    /// Whether the cell could hold `symbol` without violating its state
    ///
    /// Contradiction cells admit everything so that a dead cell does not poison
    /// the kernels covering its neighbours.
    pub fn admits(&self, symbol: Symbol) -> bool {
        match self {
            Self::Open(domain) => domain.contains(symbol),
            Self::Collapsed(placed) => *placed == symbol,
            Self::Contradiction => true,
        }
    }

    /// Domain size of an open cell
    pub fn entropy(&self) -> Option<usize> {
        match self {
            Self::Open(domain) => Some(domain.count()),
            Self::Collapsed(_) | Self::Contradiction => None,
        }
    }

    /// Collapsed symbol, if any
    pub const fn symbol(&self) -> Option<Symbol> {
        match self {
            Self::Collapsed(symbol) => Some(*symbol),
            Self::Open(_) | Self::Contradiction => None,
        }
    }

    /// Whether the cell has been committed
    pub const fn is_collapsed(&self) -> bool {
        matches!(self, Self::Collapsed(_))
    }

    /// Whether the cell ran out of candidates
    pub const fn is_contradiction(&self) -> bool {
        matches!(self, Self::Contradiction)
    }
}

/// Result of intersecting a cell's domain with an allowed set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Restriction {
    /// Domain kept every candidate, or the cell was not open
    Unchanged,
    /// Domain lost this many candidates but is still non-empty
    Narrowed(usize),
    /// Domain became empty and the cell is now a contradiction
    Contradiction,
}

/// Per-cell domains for one generation run
#[derive(Clone, Debug)]
pub struct WaveGrid {
    cells: Array3<Cell>,
    extent: Extent,
    alphabet: SymbolBitset,
}

impl WaveGrid {
    /// Create a grid where every cell is open over the full alphabet
    pub fn reset(extent: Extent, alphabet: &SymbolBitset) -> Self {
        Self {
            cells: Array3::from_elem(extent.shape(), Cell::Open(alphabet.clone())),
            extent,
            alphabet: alphabet.clone(),
        }
    }

    /// Output volume size
    pub const fn extent(&self) -> Extent {
        self.extent
    }

    /// Symbols every fresh cell starts with
    pub const fn alphabet(&self) -> &SymbolBitset {
        &self.alphabet
    }

    /// Borrow a cell
    pub fn get(&self, position: Position) -> Option<&Cell> {
        self.cells.get(position)
    }

    /// Force a cell to a symbol before generation starts
    ///
    /// # Errors
    ///
    /// Returns an error if the position is outside the grid or the symbol is not part
    /// of the alphabet
    pub fn place(&mut self, position: Position, symbol: Symbol) -> Result<()> {
        if !self.alphabet.contains(symbol) {
            return Err(invalid_parameter(
                "seed_symbol",
                &symbol,
                &"symbol does not occur in the rule set",
            ));
        }
        let cell = self.cells.get_mut(position).ok_or_else(|| {
            invalid_parameter(
                "seed_position",
                &format!("{position:?}"),
                &format!("outside grid of size {}", self.extent),
            )
        })?;
        *cell = Cell::Collapsed(symbol);
        Ok(())
    }

    /// Commit an open cell to one of its candidates
    ///
    /// Returns `false` and leaves the cell untouched when it is not open or the symbol is
    /// not among its candidates; a collapsed cell never changes symbol.
    pub fn collapse(&mut self, position: Position, symbol: Symbol) -> bool {
        let Some(cell) = self.cells.get_mut(position) else {
            return false;
        };
        if matches!(cell, Cell::Open(_)) && cell.admits(symbol) {
            *cell = Cell::Collapsed(symbol);
            true
        } else {
            false
        }
    }

    /// Intersect an open cell's domain with `allowed`
    pub fn restrict(&mut self, position: Position, allowed: &SymbolBitset) -> Restriction {
        let Some(cell) = self.cells.get_mut(position) else {
            return Restriction::Unchanged;
        };
        let Cell::Open(domain) = cell else {
            return Restriction::Unchanged;
        };
        let before = domain.count();
        domain.intersect_with(allowed);
        let after = domain.count();
        if after == 0 {
            *cell = Cell::Contradiction;
            Restriction::Contradiction
        } else if after < before {
            Restriction::Narrowed(before - after)
        } else {
            Restriction::Unchanged
        }
    }

    /// Return a cell to the full alphabet, discarding any collapse or contradiction
    pub fn reopen(&mut self, position: Position) {
        if let Some(cell) = self.cells.get_mut(position) {
            *cell = Cell::Open(self.alphabet.clone());
        }
    }

    /// Number of collapsed cells
    pub fn collapsed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_collapsed()).count()
    }

    /// Whether every cell is collapsed
    pub fn is_fully_collapsed(&self) -> bool {
        self.cells.iter().all(Cell::is_collapsed)
    }

    /// Positions currently in contradiction
    pub fn contradictions(&self) -> Vec<Position> {
        self.extent
            .positions()
            .filter(|&p| self.get(p).is_some_and(Cell::is_contradiction))
            .collect()
    }

    /// Positions that are not collapsed
    pub fn unresolved(&self) -> Vec<Position> {
        self.extent
            .positions()
            .filter(|&p| self.get(p).is_some_and(|cell| !cell.is_collapsed()))
            .collect()
    }

    /// Collapsed symbols with the air sentinel mapped back to "no tile"
    ///
    /// Returns `None` while any cell is still open or contradicted.
    pub fn to_output(&self) -> Option<Array3<Option<Symbol>>> {
        if !self.is_fully_collapsed() {
            return None;
        }
        Some(self.cells.map(|cell| cell.symbol().filter(|s| !s.is_sentinel())))
    }
}
