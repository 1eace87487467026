//! Tests for air filling and kernel extraction from sample volumes

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use voxtile::AlgorithmError;
    use voxtile::analysis::patterns::{
        AirFill, ExtractionConfig, RuleExtractor, Sample, clear_air, fill_air,
    };
    use voxtile::io::configuration::MAX_PALETTE_SIZE;
    use voxtile::spatial::grid::Extent;
    use voxtile::spatial::symbols::Symbol;
    use voxtile::spatial::tiles::{Kernel, KernelPattern};

    const A: Symbol = Symbol::new(1);
    const B: Symbol = Symbol::new(2);

    fn lone_tile() -> Sample {
        let mut sample = Array3::from_elem((3, 3, 1), None);
        if let Some(cell) = sample.get_mut([1, 1, 0]) {
            *cell = Some(A);
        }
        sample
    }

    fn extractor(kernel_size: Extent, air_fill: AirFill) -> RuleExtractor {
        RuleExtractor::new(ExtractionConfig {
            kernel_size,
            air_fill,
            include_empty: true,
        })
        .unwrap()
    }

    // Tests the column policy fills only columns holding a tile somewhere along z
    // Verified by filling every column regardless of content
    #[test]
    fn test_fill_columns() {
        let mut sample: Sample = Array3::from_elem((2, 1, 3), None);
        if let Some(cell) = sample.get_mut([0, 0, 1]) {
            *cell = Some(A);
        }
        let filled = fill_air(&mut sample, AirFill::Columns);

        assert_eq!(filled, vec![[0, 0, 0], [0, 0, 2]]);
        assert_eq!(sample.get([0, 0, 0]), Some(&Some(Symbol::EMPTY)));
        assert_eq!(sample.get([1, 0, 0]), Some(&None));
    }

    // Tests the bounds policy fills every absent cell
    // Verified by applying the column rule under the bounds policy
    #[test]
    fn test_fill_bounds() {
        let mut sample = lone_tile();
        let filled = fill_air(&mut sample, AirFill::Bounds);
        assert_eq!(filled.len(), 8);
        assert!(sample.iter().all(Option::is_some));
    }

    // Tests clearing the returned positions restores the sample exactly
    // Verified by clearing authored tiles as well as filled air
    #[test]
    fn test_clear_restores() {
        let original = lone_tile();
        let mut sample = original.clone();
        let filled = fill_air(&mut sample, AirFill::Bounds);
        clear_air(&mut sample, &filled);
        assert_eq!(sample, original);
    }

    // Tests a single tile surrounded by air yields one kernel observed once
    // Verified by sliding anchors one step past the last valid position
    #[test]
    fn test_extract_lone_tile() {
        let mut sample = lone_tile();
        let rules = extractor(Extent::new(3, 3, 1), AirFill::Bounds)
            .extract(&mut sample)
            .unwrap();

        assert_eq!(rules.kernels().len(), 1);
        assert_eq!(rules.kernels().get(0).map(Kernel::count), Some(1));
        assert_eq!(rules.symbols(), &[Symbol::EMPTY, A]);

        let mut expected = vec![Symbol::EMPTY; 9];
        if let Some(centre) = expected.get_mut(4) {
            *centre = A;
        }
        let pattern = KernelPattern::new(Extent::new(3, 3, 1), expected).unwrap();
        assert_eq!(rules.kernels().find(&pattern), Some(0));
    }

    // Tests extraction leaves the caller's sample unchanged
    // Verified by removing the clear_air call after extraction
    #[test]
    fn test_extract_restores_sample() {
        let original = lone_tile();
        let mut sample = original.clone();
        extractor(Extent::new(2, 2, 1), AirFill::Bounds)
            .extract(&mut sample)
            .unwrap();
        assert_eq!(sample, original);
    }

    // Tests windows reaching cells left absent by the column policy are skipped
    // Verified by treating absent cells as air inside read_window
    #[test]
    fn test_extract_skips_absent_windows() {
        let mut sample = lone_tile();
        let rules = extractor(Extent::new(3, 3, 1), AirFill::Columns)
            .extract(&mut sample)
            .unwrap();
        assert!(rules.kernels().is_empty());
        assert!(rules.is_exhausted());
    }

    // Tests repeated windows are merged and counted
    // Verified by inserting each window as a new kernel
    #[test]
    fn test_extract_counts_duplicates() {
        let mut sample: Sample = Array3::from_elem((4, 1, 1), Some(A));
        if let Some(cell) = sample.get_mut([3, 0, 0]) {
            *cell = Some(B);
        }
        let rules = extractor(Extent::new(2, 1, 1), AirFill::Bounds)
            .extract(&mut sample)
            .unwrap();

        let aa = KernelPattern::new(Extent::new(2, 1, 1), vec![A, A]).unwrap();
        let ab = KernelPattern::new(Extent::new(2, 1, 1), vec![A, B]).unwrap();
        let count_of = |pattern| {
            rules
                .kernels()
                .find(pattern)
                .and_then(|slot| rules.kernels().get(slot))
                .map(Kernel::count)
        };
        assert_eq!(rules.kernels().len(), 2);
        assert_eq!(count_of(&aa), Some(2));
        assert_eq!(count_of(&ab), Some(1));
        assert_eq!(rules.symbols(), &[A, B]);
    }

    // Tests neighbour statistics are gathered over the filled sample
    // Verified by counting neighbours before air is filled
    #[test]
    fn test_extract_adjacency() {
        let mut sample = lone_tile();
        let rules = extractor(Extent::new(3, 3, 1), AirFill::Bounds)
            .extract(&mut sample)
            .unwrap();
        let adjacency = rules.adjacency();

        assert_eq!(adjacency.count([1, 0, 0], Symbol::EMPTY, A), 1);
        assert_eq!(adjacency.count([1, 0, 0], A, Symbol::EMPTY), 1);
        assert_eq!(adjacency.count([1, 0, 0], A, A), 0);
    }

    // Tests an all-absent sample is rejected
    // Verified by removing the empty input check
    #[test]
    fn test_extract_empty_input() {
        let mut sample: Sample = Array3::from_elem((2, 2, 2), None);
        let result = extractor(Extent::new(1, 1, 1), AirFill::Bounds).extract(&mut sample);
        assert!(matches!(result, Err(AlgorithmError::ExtractionEmptyInput)));
    }

    // Tests symbols past the palette limit are rejected before adjacency counting
    // Verified by removing the palette limit check in extract
    #[test]
    fn test_extract_palette_limit() {
        let beyond = Symbol::new(u32::try_from(MAX_PALETTE_SIZE + 1).unwrap());
        let mut sample: Sample = Array3::from_elem((2, 1, 1), Some(A));
        if let Some(cell) = sample.get_mut([1, 0, 0]) {
            *cell = Some(beyond);
        }
        let result = extractor(Extent::new(1, 1, 1), AirFill::Bounds).extract(&mut sample);
        assert!(matches!(result, Err(AlgorithmError::InvalidSourceData { .. })));
    }

    // Tests dropping the sentinel from the alphabet when requested
    // Verified by ignoring include_empty
    #[test]
    fn test_extract_without_empty() {
        let mut sample = lone_tile();
        let rules = RuleExtractor::new(ExtractionConfig {
            kernel_size: Extent::new(3, 3, 1),
            air_fill: AirFill::Bounds,
            include_empty: false,
        })
        .unwrap()
        .extract(&mut sample)
        .unwrap();
        assert_eq!(rules.symbols(), &[A]);
    }

    // Tests degenerate kernel sizes are rejected up front
    // Verified by skipping the degenerate check in RuleExtractor::new
    #[test]
    fn test_extractor_rejects_zero_kernel() {
        let result = RuleExtractor::new(ExtractionConfig {
            kernel_size: Extent::new(0, 1, 1),
            ..ExtractionConfig::default()
        });
        assert!(result.is_err());
    }

    // Tests air fill policies parse case-insensitively
    // Verified by matching the raw string without lowering it
    #[test]
    fn test_air_fill_from_str() {
        assert_eq!("Columns".parse::<AirFill>().unwrap(), AirFill::Columns);
        assert_eq!("bounds".parse::<AirFill>().unwrap(), AirFill::Bounds);
        assert!("sky".parse::<AirFill>().is_err());
        assert_eq!(AirFill::Bounds.to_string(), "bounds");
    }
}
