use crate::{
    algorithm::executor::RandomSource,
    analysis::statistics::{AdjacencyTable, NEIGHBOR_OFFSETS},
    spatial::grid::{Cell, Position, WaveGrid},
    spatial::symbols::Symbol,
};
use serde::{Deserialize, Serialize};

/// How a symbol is drawn from the chosen cell's domain
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Every candidate is equally likely
    #[default]
    Uniform,
    /// Candidates are weighted by how often they neighboured the already collapsed cells
    /// in the sample
    Weighted,
}

/// Open cells of minimum entropy within `area`
///
/// Returns the minimum domain size together with every position attaining it, or `None`
/// when the area has no open cell.
pub fn min_entropy_candidates(
    grid: &WaveGrid,
    area: impl Iterator<Item = Position>,
) -> Option<(usize, Vec<Position>)> {
    let mut best: Option<(usize, Vec<Position>)> = None;

    for position in area {
        let Some(entropy) = grid.get(position).and_then(Cell::entropy) else {
            continue;
        };
        let lower = best.as_ref().is_none_or(|(min, _)| entropy < *min);
        if lower {
            best = Some((entropy, vec![position]));
        } else if let Some((min, positions)) = &mut best {
            if entropy == *min {
                positions.push(position);
            }
        }
    }

    best
}

/// Break a tie between equally constrained cells uniformly
pub fn select_cell(candidates: &[Position], rng: &mut dyn RandomSource) -> Option<Position> {
    if candidates.is_empty() {
        return None;
    }
    candidates.get(rng.choose_index(candidates.len())).copied()
}

/// Adjacency weight of each candidate against the collapsed cells around `position`
///
/// The weight of candidate `c` sums, over each collapsed neighbour `s` at offset `d`, how
/// often `s` was seen at `d` from `c` in the sample.
pub fn neighbor_weights(
    grid: &WaveGrid,
    position: Position,
    candidates: &[Symbol],
    adjacency: &AdjacencyTable,
) -> Vec<f64> {
    let neighbours: Vec<_> = NEIGHBOR_OFFSETS
        .iter()
        .filter_map(|&offset| {
            let neighbour = grid.extent().offset(position, offset)?;
            let symbol = grid.get(neighbour).and_then(Cell::symbol)?;
            Some((offset, symbol))
        })
        .collect();

    candidates
        .iter()
        .map(|&candidate| {
            neighbours
                .iter()
                .map(|&(offset, symbol)| f64::from(adjacency.count(offset, candidate, symbol)))
                .sum()
        })
        .collect()
}

/// Draw a symbol for an open cell according to `policy`
///
/// Weighted selection falls back to uniform when no candidate has any support. Returns
/// `None` when the cell is not open or its domain is empty.
pub fn choose_symbol(
    grid: &WaveGrid,
    position: Position,
    policy: SelectionPolicy,
    adjacency: &AdjacencyTable,
    rng: &mut dyn RandomSource,
) -> Option<Symbol> {
    let Some(Cell::Open(domain)) = grid.get(position) else {
        return None;
    };
    let candidates = domain.to_vec();
    if candidates.is_empty() {
        return None;
    }

    let index = match policy {
        SelectionPolicy::Uniform => rng.choose_index(candidates.len()),
        SelectionPolicy::Weighted => {
            let weights = neighbor_weights(grid, position, &candidates, adjacency);
            if weights.iter().all(|&w| w <= 0.0) {
                rng.choose_index(candidates.len())
            } else {
                rng.weighted_choice(&weights)
            }
        }
    };

    candidates.get(index).copied()
}
