//! Tests for extents, cell states and wave grid mutation

#[cfg(test)]
mod tests {
    use voxtile::algorithm::bitset::SymbolBitset;
    use voxtile::spatial::grid::{Cell, Extent, Restriction, WaveGrid};
    use voxtile::spatial::symbols::Symbol;

    const A: Symbol = Symbol::new(1);
    const B: Symbol = Symbol::new(2);

    fn alphabet() -> SymbolBitset {
        SymbolBitset::from_symbols(&[Symbol::EMPTY, A, B], 3)
    }

    // Verifies positions iterate with x fastest and cover the volume once
    // Verified by swapping the x and z loops
    #[test]
    fn test_extent_positions_order() {
        let extent = Extent::new(2, 2, 2);
        let positions: Vec<_> = extent.positions().collect();
        assert_eq!(positions.len(), extent.volume());
        assert_eq!(positions.first(), Some(&[0, 0, 0]));
        assert_eq!(positions.get(1), Some(&[1, 0, 0]));
        assert_eq!(positions.get(2), Some(&[0, 1, 0]));
        assert_eq!(positions.get(4), Some(&[0, 0, 1]));
    }

    // Tests signed offsets stay inside the extent or yield None
    // Verified by dropping the negative coordinate check
    #[test]
    fn test_extent_offset() {
        let extent = Extent::new(3, 3, 1);
        assert_eq!(extent.offset([1, 1, 0], [1, -1, 0]), Some([2, 0, 0]));
        assert_eq!(extent.offset([0, 0, 0], [-1, 0, 0]), None);
        assert_eq!(extent.offset([2, 2, 0], [0, 0, 1]), None);
    }

    // Tests the neighbourhood block is clipped to the extent and includes its centre
    // Verified by removing the upper clamp in around
    #[test]
    fn test_extent_around() {
        let extent = Extent::new(4, 4, 1);
        let corner: Vec<_> = extent.around([0, 0, 0], [1, 1, 1]).collect();
        assert_eq!(corner, vec![[0, 0, 0], [1, 0, 0], [0, 1, 0], [1, 1, 0]]);

        let middle = extent.around([2, 2, 0], [1, 1, 0]).count();
        assert_eq!(middle, 9);
    }

    // Tests extents parse from comma or x separated strings
    // Verified by accepting only two components
    #[test]
    fn test_extent_from_str() {
        assert_eq!("32,32,3".parse::<Extent>().unwrap(), Extent::new(32, 32, 3));
        assert_eq!("4x5x6".parse::<Extent>().unwrap(), Extent::new(4, 5, 6));
        assert!("1,2".parse::<Extent>().is_err());
        assert!("a,b,c".parse::<Extent>().is_err());
        assert_eq!(Extent::new(3, 3, 1).to_string(), "3x3x1");
    }

    // Tests contradiction cells admit everything while collapsed cells admit only their symbol
    // Verified by making contradiction cells admit nothing
    #[test]
    fn test_cell_admits() {
        assert!(Cell::Contradiction.admits(A));
        assert!(Cell::Collapsed(A).admits(A));
        assert!(!Cell::Collapsed(A).admits(B));
        assert!(Cell::Open(alphabet()).admits(B));
        assert_eq!(Cell::Open(alphabet()).entropy(), Some(3));
        assert_eq!(Cell::Collapsed(A).entropy(), None);
    }

    // Tests reset opens every cell over the alphabet
    // Verified by initializing cells as contradictions
    #[test]
    fn test_reset() {
        let grid = WaveGrid::reset(Extent::new(2, 1, 1), &alphabet());
        assert_eq!(grid.get([0, 0, 0]), Some(&Cell::Open(alphabet())));
        assert_eq!(grid.get([1, 0, 0]), Some(&Cell::Open(alphabet())));
        assert_eq!(grid.get([2, 0, 0]), None);
        assert_eq!(grid.collapsed_count(), 0);
    }

    // Tests place rejects out-of-bounds positions and foreign symbols
    // Verified by skipping the alphabet membership check
    #[test]
    fn test_place_validation() {
        let mut grid = WaveGrid::reset(Extent::new(2, 2, 1), &alphabet());
        assert!(grid.place([0, 0, 0], A).is_ok());
        assert!(grid.place([5, 0, 0], A).is_err());
        assert!(grid.place([1, 0, 0], Symbol::new(9)).is_err());
        assert_eq!(grid.get([0, 0, 0]), Some(&Cell::Collapsed(A)));
    }

    // Tests a collapsed cell never changes symbol
    // Verified by allowing collapse on already collapsed cells
    #[test]
    fn test_collapse_is_final() {
        let mut grid = WaveGrid::reset(Extent::new(1, 1, 1), &alphabet());
        assert!(grid.collapse([0, 0, 0], A));
        assert!(!grid.collapse([0, 0, 0], B));
        assert_eq!(grid.get([0, 0, 0]).and_then(Cell::symbol), Some(A));
    }

    // Tests restriction reports narrowing and turns empty domains into contradictions
    // Verified by leaving an empty domain open
    #[test]
    fn test_restrict() {
        let mut grid = WaveGrid::reset(Extent::new(1, 1, 1), &alphabet());
        let only_a = SymbolBitset::from_symbols(&[A], 3);
        assert_eq!(grid.restrict([0, 0, 0], &alphabet()), Restriction::Unchanged);
        assert_eq!(grid.restrict([0, 0, 0], &only_a), Restriction::Narrowed(2));
        assert_eq!(
            grid.restrict([0, 0, 0], &SymbolBitset::from_symbols(&[B], 3)),
            Restriction::Contradiction
        );
        assert_eq!(grid.contradictions(), vec![[0, 0, 0]]);

        grid.reopen([0, 0, 0]);
        assert_eq!(grid.get([0, 0, 0]), Some(&Cell::Open(alphabet())));
    }

    // Tests output maps the sentinel to no tile and waits for full collapse
    // Verified by emitting the sentinel symbol as a tile
    #[test]
    fn test_to_output() {
        let mut grid = WaveGrid::reset(Extent::new(2, 1, 1), &alphabet());
        assert!(grid.collapse([0, 0, 0], A));
        assert!(grid.to_output().is_none());
        assert_eq!(grid.unresolved(), vec![[1, 0, 0]]);

        assert!(grid.collapse([1, 0, 0], Symbol::EMPTY));
        let output = grid.to_output().unwrap();
        assert_eq!(output.get([0, 0, 0]), Some(&Some(A)));
        assert_eq!(output.get([1, 0, 0]), Some(&None));
        assert!(grid.is_fully_collapsed());
    }
}
