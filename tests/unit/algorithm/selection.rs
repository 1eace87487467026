//! Tests for minimum entropy cell selection and symbol choice

#[cfg(test)]
mod tests {
    use voxtile::algorithm::bitset::SymbolBitset;
    use voxtile::algorithm::executor::RandomSource;
    use voxtile::algorithm::selection::{
        SelectionPolicy, choose_symbol, min_entropy_candidates, neighbor_weights, select_cell,
    };
    use voxtile::analysis::statistics::AdjacencyTable;
    use voxtile::spatial::grid::{Extent, WaveGrid};
    use voxtile::spatial::symbols::Symbol;

    const A: Symbol = Symbol::new(1);
    const B: Symbol = Symbol::new(2);

    /// Replays a fixed index and picks the heaviest weight
    struct Scripted {
        index: usize,
        weighted_calls: usize,
    }

    impl Scripted {
        const fn new(index: usize) -> Self {
            Self {
                index,
                weighted_calls: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn choose_index(&mut self, len: usize) -> usize {
            self.index.min(len - 1)
        }

        fn weighted_choice(&mut self, weights: &[f64]) -> usize {
            self.weighted_calls += 1;
            weights
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map_or(0, |(i, _)| i)
        }
    }

    fn row(length: usize) -> WaveGrid {
        let alphabet = SymbolBitset::from_symbols(&[Symbol::EMPTY, A, B], 3);
        WaveGrid::reset(Extent::new(length, 1, 1), &alphabet)
    }

    // Verifies the single most constrained cell is the only candidate
    // Verified by selecting the maximum entropy instead
    #[test]
    fn test_min_entropy_single() {
        let mut grid = row(3);
        grid.restrict([1, 0, 0], &SymbolBitset::from_symbols(&[A], 3));
        grid.restrict([2, 0, 0], &SymbolBitset::from_symbols(&[A, B], 3));

        let (entropy, candidates) = min_entropy_candidates(&grid, grid.extent().positions()).unwrap();
        assert_eq!(entropy, 1);
        assert_eq!(candidates, vec![[1, 0, 0]]);
    }

    // Tests ties are all returned and collapsed cells are ignored
    // Verified by keeping only the first cell of each entropy
    #[test]
    fn test_min_entropy_ties() {
        let mut grid = row(3);
        assert!(grid.collapse([1, 0, 0], A));
        let (entropy, candidates) = min_entropy_candidates(&grid, grid.extent().positions()).unwrap();
        assert_eq!(entropy, 3);
        assert_eq!(candidates, vec![[0, 0, 0], [2, 0, 0]]);
    }

    // Tests an area without open cells has no candidates
    // Verified by treating collapsed cells as entropy zero
    #[test]
    fn test_min_entropy_none() {
        let mut grid = row(1);
        assert!(grid.collapse([0, 0, 0], B));
        assert!(min_entropy_candidates(&grid, grid.extent().positions()).is_none());
    }

    // Tests tie breaking draws from the random source
    // Verified by always returning the first candidate
    #[test]
    fn test_select_cell() {
        let candidates = [[0, 0, 0], [4, 0, 0], [7, 0, 0]];
        assert_eq!(select_cell(&candidates, &mut Scripted::new(2)), Some([7, 0, 0]));
        assert_eq!(select_cell(&[], &mut Scripted::new(0)), None);
    }

    // Tests weights sum adjacency counts against collapsed neighbours only
    // Verified by swapping base and neighbour in the count lookup
    #[test]
    fn test_neighbor_weights() {
        let mut grid = row(3);
        assert!(grid.collapse([1, 0, 0], B));
        let mut adjacency = AdjacencyTable::new(3);
        adjacency.record([1, 0, 0], A, B);
        adjacency.record([1, 0, 0], A, B);
        adjacency.record([-1, 0, 0], B, A);

        let weights = neighbor_weights(&grid, [0, 0, 0], &[A, B], &adjacency);
        assert_eq!(weights, vec![2.0, 0.0]);
    }

    // Tests weighted choice follows the adjacency statistics
    // Verified by ignoring the policy and choosing uniformly
    #[test]
    fn test_choose_weighted() {
        let mut grid = row(2);
        assert!(grid.collapse([1, 0, 0], B));
        let mut adjacency = AdjacencyTable::new(3);
        adjacency.record([1, 0, 0], A, B);

        let mut rng = Scripted::new(0);
        let symbol = choose_symbol(&grid, [0, 0, 0], SelectionPolicy::Weighted, &adjacency, &mut rng);
        assert_eq!(symbol, Some(A));
        assert_eq!(rng.weighted_calls, 1);
    }

    // Tests weighted choice falls back to uniform when nothing has support
    // Verified by passing all-zero weights to weighted_choice
    #[test]
    fn test_choose_weighted_fallback() {
        let grid = row(2);
        let mut rng = Scripted::new(2);
        let symbol = choose_symbol(
            &grid,
            [0, 0, 0],
            SelectionPolicy::Weighted,
            &AdjacencyTable::new(3),
            &mut rng,
        );
        assert_eq!(symbol, Some(B));
        assert_eq!(rng.weighted_calls, 0);
    }

    // Tests only open cells can be chosen for
    // Verified by returning the collapsed symbol again
    #[test]
    fn test_choose_closed_cell() {
        let mut grid = row(1);
        assert!(grid.collapse([0, 0, 0], A));
        let symbol = choose_symbol(
            &grid,
            [0, 0, 0],
            SelectionPolicy::Uniform,
            &AdjacencyTable::new(3),
            &mut Scripted::new(0),
        );
        assert_eq!(symbol, None);
    }
}
