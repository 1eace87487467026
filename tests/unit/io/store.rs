//! Tests for rule file encoding, validation and persistence

#[cfg(test)]
mod tests {
    use voxtile::AlgorithmError;
    use voxtile::analysis::rules::RuleSet;
    use voxtile::io::store::RuleFile;
    use voxtile::spatial::grid::Extent;
    use voxtile::spatial::symbols::{Symbol, SymbolTable};
    use voxtile::spatial::tiles::{Kernel, KernelPattern};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn rule_file(palette: Vec<[u8; 4]>) -> RuleFile {
        let pattern =
            KernelPattern::new(Extent::new(2, 1, 1), vec![Symbol::new(1), Symbol::new(2)])
                .unwrap();
        let rules = RuleSet::from_kernels(vec![Kernel::with_count(pattern, 4)]).unwrap();
        RuleFile::new(&SymbolTable::from_identities(palette), rules)
    }

    // Verifies the palette keeps symbol order so symbol n maps to entry n - 1
    // Verified by sorting the palette on save
    #[test]
    fn test_palette_order() {
        let file = rule_file(vec![RED, BLUE]);
        assert_eq!(file.palette, vec![RED, BLUE]);
        let table = file.symbol_table();
        assert_eq!(table.resolve(Symbol::new(1)), Some(&RED));
        assert_eq!(table.resolve(Symbol::new(2)), Some(&BLUE));
    }

    // Tests JSON decoding reproduces kernels and their counts
    // Verified by dropping counts from the encoding
    #[test]
    fn test_json_round_trip() {
        let file = rule_file(vec![RED, BLUE]);
        let decoded = RuleFile::from_json(&file.to_json().unwrap()).unwrap();
        assert_eq!(decoded.palette, file.palette);
        assert_eq!(decoded.rules.symbols(), file.rules.symbols());
        assert_eq!(
            decoded.rules.kernels().get(0).map(Kernel::count),
            Some(4)
        );
    }

    // Tests a palette missing a tile color is rejected
    // Verified by comparing against the symbol index without the sentinel offset
    #[test]
    fn test_validate_short_palette() {
        assert!(rule_file(vec![RED, BLUE]).validate().is_ok());
        assert!(rule_file(vec![RED]).validate().is_err());
    }

    // Tests malformed JSON is a serialization error
    // Verified by converting JSON errors into file system errors
    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            RuleFile::from_json("{\"palette\": 3}"),
            Err(AlgorithmError::Serialization { .. })
        ));
    }

    // Tests saving creates parent directories and loading reads the file back
    // Verified by skipping create_dir_all for the parent
    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("rules.json");
        let file = rule_file(vec![RED, BLUE]);

        file.save(&path).unwrap();
        let loaded = RuleFile::load(&path).unwrap();
        assert_eq!(loaded.palette, file.palette);
        assert_eq!(loaded.rules.kernels().len(), 1);
    }

    // Tests a missing rule file names the path and operation
    // Verified by leaving the placeholder path on I/O errors
    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(matches!(
            RuleFile::load(&path),
            Err(AlgorithmError::FileSystem { path: reported, operation: "read rules", .. })
                if reported == path
        ));
    }
}
