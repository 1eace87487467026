use crate::spatial::grid::{Cell, Extent, Position, WaveGrid};
use std::fmt;

/// Axis-aligned box of grid positions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Lowest corner, inclusive
    pub min: Position,
    /// Cells covered along each axis
    pub size: Extent,
}

impl Region {
    /// Create a region from its lowest corner and size
    pub const fn new(min: Position, size: Extent) -> Self {
        Self { min, size }
    }

    /// Region covering a whole volume
    pub const fn whole(volume: Extent) -> Self {
        Self::new([0, 0, 0], volume)
    }

    /// Highest corner, exclusive
    pub const fn max(&self) -> Position {
        [
            self.min[0] + self.size.x,
            self.min[1] + self.size.y,
            self.min[2] + self.size.z,
        ]
    }

    /// Whether a position lies inside
    pub fn contains(&self, position: Position) -> bool {
        let [px, py, pz] = position;
        let [mx, my, mz] = self.min;
        match (px.checked_sub(mx), py.checked_sub(my), pz.checked_sub(mz)) {
            (Some(x), Some(y), Some(z)) => self.size.contains([x, y, z]),
            _ => false,
        }
    }

    /// Positions inside, x varying fastest
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let min = self.min;
        self.size
            .positions()
            .map(move |p| [p[0] + min[0], p[1] + min[1], p[2] + min[2]])
    }

    /// Grow by `reach` on every side, clipped to `bounds`
    #[must_use]
    pub fn expanded(&self, reach: [usize; 3], bounds: Extent) -> Self {
        let [rx, ry, rz] = reach;
        let [lx, ly, lz] = self.min;
        let [ux, uy, uz] = self.max();
        let min = [lx.saturating_sub(rx), ly.saturating_sub(ry), lz.saturating_sub(rz)];
        let upper = [
            ux.saturating_add(rx).min(bounds.x),
            uy.saturating_add(ry).min(bounds.y),
            uz.saturating_add(rz).min(bounds.z),
        ];
        Self::new(
            min,
            Extent::new(
                upper[0].saturating_sub(min[0]),
                upper[1].saturating_sub(min[1]),
                upper[2].saturating_sub(min[2]),
            ),
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}+{}", self.min, self.size)
    }
}

/// Split a volume into boxes of `region_size`, processed z slowest and x fastest
///
/// Boxes at the far edges are truncated to fit. `None` yields one region covering the
/// whole volume.
pub fn partition(volume: Extent, region_size: Option<Extent>) -> Vec<Region> {
    let Some(size) = region_size.filter(|s| !s.is_degenerate()) else {
        return vec![Region::whole(volume)];
    };

    let mut regions = Vec::new();
    for z in (0..volume.z).step_by(size.z) {
        for y in (0..volume.y).step_by(size.y) {
            for x in (0..volume.x).step_by(size.x) {
                let clipped = Extent::new(
                    size.x.min(volume.x - x),
                    size.y.min(volume.y - y),
                    size.z.min(volume.z - z),
                );
                regions.push(Region::new([x, y, z], clipped));
            }
        }
    }
    regions
}

/// Summary of cells returned to the full alphabet
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Total number of cells that were reopened
    pub cells_reopened: usize,
    /// Grid positions of all reopened cells
    pub reopened_positions: Vec<Position>,
}

/// Reopen a failed region so it can be generated again
///
/// Every cell of the region except the pinned ones returns to the full alphabet. In a
/// halo of `halo` cells around it, cells that are open or contradicted are reopened too,
/// since the failed attempt may have narrowed them; collapsed halo cells are kept.
pub fn reset_region(
    grid: &mut WaveGrid,
    region: Region,
    halo: [usize; 3],
    pinned: &[Position],
) -> RecoveryResult {
    let mut result = RecoveryResult::default();
    let outer = region.expanded(halo, grid.extent());

    for position in outer.positions() {
        if pinned.contains(&position) {
            continue;
        }
        let inside = region.contains(position);
        let reopen = match grid.get(position) {
            Some(Cell::Collapsed(_)) => inside,
            Some(Cell::Open(_) | Cell::Contradiction) => true,
            None => false,
        };
        if reopen {
            grid.reopen(position);
            result.reopened_positions.push(position);
            result.cells_reopened += 1;
        }
    }

    result
}
