use crate::spatial::grid::Anchor;
use std::collections::HashMap;

/// Key for caching kernel fit results
///
/// Identifies one kernel of the rule set anchored at one grid position.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FitKey {
    kernel: usize,
    anchor: Anchor,
}

impl FitKey {
    /// Create a key for a kernel slot at an anchor
    pub const fn new(kernel: usize, anchor: Anchor) -> Self {
        Self { kernel, anchor }
    }
}

/// Memoization cache for kernel fit tests
///
/// A fit only depends on the domains the kernel covers, so the cache stays valid until
/// any domain changes. Propagation clears it after every narrowing.
#[derive(Default)]
pub struct FitCache {
    fits: HashMap<FitKey, bool>,

    /// Cache performance statistics
    pub stats: CacheStats,
}

/// Performance metrics for cache effectiveness
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

impl FitCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a cached fit or compute and store it
    pub fn get_or_compute<F>(&mut self, key: FitKey, compute_fn: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        use std::collections::hash_map::Entry;

        match self.fits.entry(key) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                *entry.get()
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                *entry.insert(compute_fn())
            }
        }
    }

    /// Drop every cached fit, keeping the statistics
    pub fn invalidate(&mut self) {
        self.fits.clear();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.fits.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }
}
