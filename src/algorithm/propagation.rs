use crate::{
    algorithm::bitset::SymbolBitset,
    algorithm::cache::{FitCache, FitKey},
    analysis::rules::RuleSet,
    io::configuration::PROPAGATION_DEPTH,
    spatial::grid::{Anchor, Cell, Extent, Position, Restriction, WaveGrid},
    spatial::tiles::Kernel,
};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Summary of one propagation call
///
/// Informational only; contradictions are recorded in the grid itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Cells whose domain shrank but stayed non-empty, in revision order
    pub narrowed: Vec<Position>,
    /// Cells that became contradictions during this call
    pub contradictions: Vec<Position>,
    /// Number of open cells revised
    pub revisions: usize,
}

impl PropagationReport {
    /// Whether no domain changed
    pub const fn is_quiet(&self) -> bool {
        self.narrowed.is_empty() && self.contradictions.is_empty()
    }
}

/// Whether a kernel anchored at `anchor` agrees with every cell it covers
///
/// Cells outside the grid admit everything, so kernels may hang over the border.
pub fn kernel_fits(grid: &WaveGrid, kernel: &Kernel, anchor: Anchor) -> bool {
    kernel.pattern().cells().all(|(local, symbol)| {
        let [ax, ay, az] = anchor;
        let [lx, ly, lz] = local;
        // Negative coordinates lie outside the grid
        let (Ok(x), Ok(y), Ok(z)) = (
            usize::try_from(ax + lx as i64),
            usize::try_from(ay + ly as i64),
            usize::try_from(az + lz as i64),
        ) else {
            return true;
        };
        grid.get([x, y, z]).is_none_or(|cell| cell.admits(symbol))
    })
}

/// Symbols that some fitting kernel can place at `position`
///
/// For each offset of the kernel extent, collects the union of `K[o]` over kernels K that
/// fit with `position` at offset `o`, then intersects the unions. Returns `None` when the
/// cell is not open.
pub fn supported_symbols(
    grid: &WaveGrid,
    position: Position,
    rules: &RuleSet,
    cache: &mut FitCache,
) -> Option<SymbolBitset> {
    let Some(Cell::Open(domain)) = grid.get(position) else {
        return None;
    };
    let Some(extent) = rules.max_extent() else {
        return Some(domain.clone());
    };

    let mut allowed = domain.clone();
    for offset in extent.positions() {
        let [px, py, pz] = position;
        let [ox, oy, oz] = offset;
        let anchor: Anchor = [
            px as i64 - ox as i64,
            py as i64 - oy as i64,
            pz as i64 - oz as i64,
        ];
        let mut union = SymbolBitset::new(domain.capacity());
        let mut covered = false;

        for (slot, kernel) in rules.kernels().kernels().iter().enumerate() {
            let Some(symbol) = kernel.at(offset) else {
                continue;
            };
            covered = true;
            if union.contains(symbol) || !domain.contains(symbol) {
                continue;
            }
            let fits = cache.get_or_compute(FitKey::new(slot, anchor), || {
                kernel_fits(grid, kernel, anchor)
            });
            if fits {
                union.insert(symbol);
                // Nothing left to remove at this offset
                if domain.is_subset(&union) {
                    break;
                }
            }
        }

        if covered {
            allowed.intersect_with(&union);
            if allowed.is_empty() {
                break;
            }
        }
    }

    Some(allowed)
}

/// Depth-bounded constraint propagation over the wave grid
///
/// Revises every open cell inside the kernel-extent block around each origin. A cell that
/// shrinks becomes an origin itself one level deeper, until `max_depth` is reached. This is
/// an approximation of arc consistency; later calls tighten what an earlier call left.
pub struct Propagator {
    max_depth: usize,
    cache: FitCache,
}

impl Default for Propagator {
    fn default() -> Self {
        Self::new(PROPAGATION_DEPTH)
    }
}

impl Propagator {
    /// Create a propagator with the given depth bound
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            cache: FitCache::new(),
        }
    }

    /// Depth bound
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Fit cache, exposed for statistics
    pub const fn cache(&self) -> &FitCache {
        &self.cache
    }

    /// Propagate constraints outward from `origins`
    ///
    /// Never fails. Domains only shrink; collapsed and contradicted cells are left alone.
    pub fn propagate(
        &mut self,
        grid: &mut WaveGrid,
        origins: &[Position],
        rules: &RuleSet,
    ) -> PropagationReport {
        let mut report = PropagationReport::default();
        let Some(kernel_extent) = rules.max_extent() else {
            return report;
        };
        let reach = propagation_reach(kernel_extent, 1);

        // The caller may have collapsed cells since the last call
        self.cache.invalidate();

        let mut queue: VecDeque<(Position, usize)> = VecDeque::new();
        let mut pending: HashSet<Position> = HashSet::new();
        for &origin in origins {
            if grid.extent().contains(origin) && pending.insert(origin) {
                queue.push_back((origin, 0));
            }
        }

        while let Some((origin, depth)) = queue.pop_front() {
            pending.remove(&origin);

            for target in grid.extent().around(origin, reach) {
                if target == origin {
                    continue;
                }
                let Some(allowed) = supported_symbols(grid, target, rules, &mut self.cache)
                else {
                    continue;
                };
                report.revisions += 1;

                match grid.restrict(target, &allowed) {
                    Restriction::Unchanged => {}
                    Restriction::Narrowed(_) => {
                        self.cache.invalidate();
                        report.narrowed.push(target);
                        if depth + 1 < self.max_depth && pending.insert(target) {
                            queue.push_back((target, depth + 1));
                        }
                    }
                    Restriction::Contradiction => {
                        self.cache.invalidate();
                        report.contradictions.push(target);
                    }
                }
            }
        }

        debug!(
            origins = origins.len(),
            revisions = report.revisions,
            narrowed = report.narrowed.len(),
            contradictions = report.contradictions.len(),
            "propagated"
        );
        report
    }
}

/// Kernel-extent reach used for halos around a region
pub fn propagation_reach(kernel_extent: Extent, max_depth: usize) -> [usize; 3] {
    let depth = max_depth.max(1);
    [
        kernel_extent.x.saturating_sub(1) * depth,
        kernel_extent.y.saturating_sub(1) * depth,
        kernel_extent.z.saturating_sub(1) * depth,
    ]
}
