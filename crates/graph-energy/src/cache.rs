//! Memoized pairwise similarity weights keyed by canonical index pairs.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Order a pair so that `(i, j)` and `(j, i)` share one key.
#[inline]
pub fn canonical_pair(i: usize, j: usize) -> (usize, usize) {
    if i <= j {
        (i, j)
    } else {
        (j, i)
    }
}

/// Lazily filled, symmetric weight store.
///
/// Only the canonical `(min, max)` key is ever stored, so a weight is
/// computed at most once per unordered pair for the lifetime of the cache.
#[derive(Debug, Default, Clone)]
pub struct WeightCache {
    weights: HashMap<(usize, usize), f64>,
    hits: u64,
    misses: u64,
}

impl WeightCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached weight for `(i, j)`, computing it with `compute` on
    /// the first request.
    pub fn get_or_insert_with<F>(&mut self, i: usize, j: usize, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        match self.weights.entry(canonical_pair(i, j)) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                *entry.get()
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                *entry.insert(compute())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Return (hits, misses) since creation.
    pub fn counters(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_orders_indices() {
        assert_eq!(canonical_pair(3, 1), (1, 3));
        assert_eq!(canonical_pair(1, 3), (1, 3));
        assert_eq!(canonical_pair(2, 2), (2, 2));
    }

    #[test]
    fn computes_once_per_unordered_pair() {
        let mut cache = WeightCache::new();
        let mut calls = 0;
        let a = cache.get_or_insert_with(4, 1, || {
            calls += 1;
            0.25
        });
        let b = cache.get_or_insert_with(1, 4, || {
            calls += 1;
            0.75
        });
        assert_eq!(a, 0.25);
        assert_eq!(b, 0.25);
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.counters(), (1, 1));
    }
}
