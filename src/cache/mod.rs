//! Candidate score cache
//!
//! Provides an LRU cache of VNS candidate scores so a center revisited after a
//! shake is not solved twice within one selection call. A cached `None`
//! records a candidate whose solve failed.

use lru::LruCache;
use std::num::NonZeroUsize;

/// LRU cache from candidate sample index to its removal score
pub struct ScoreCache {
    cache: LruCache<usize, Option<usize>>,
    hits: u64,
    misses: u64,
}

impl ScoreCache {
    /// Create a new score cache with capacity in number of entries
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Get a cached score
    pub fn get(&mut self, candidate: usize) -> Option<Option<usize>> {
        if let Some(&score) = self.cache.get(&candidate) {
            self.hits += 1;
            Some(score)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Record the score of a candidate
    pub fn put(&mut self, candidate: usize, score: Option<usize>) {
        self.cache.put(candidate, score);
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_cache_basic() {
        let mut cache = ScoreCache::new(3);

        assert_eq!(cache.get(7), None);
        assert_eq!(cache.stats().misses, 1);

        cache.put(7, Some(4));
        assert_eq!(cache.get(7), Some(Some(4)));
        assert_eq!(cache.stats().hits, 1);

        cache.put(8, None);
        assert_eq!(cache.get(8), Some(None));
    }

    #[test]
    fn test_score_cache_lru_eviction() {
        let mut cache = ScoreCache::new(2);

        cache.put(0, Some(1));
        cache.put(1, Some(2));
        cache.put(2, Some(3)); // Should evict 0

        assert_eq!(cache.get(0), None);
        assert_eq!(cache.get(1), Some(Some(2)));
        assert_eq!(cache.get(2), Some(Some(3)));
    }

    #[test]
    fn test_hit_rate_calculation() {
        let mut cache = ScoreCache::new(10);
        assert_eq!(cache.hit_rate(), 0.0);

        cache.get(0);
        cache.get(1);
        cache.put(0, Some(1));
        cache.get(0);
        cache.get(0);

        // 2 hits, 2 misses
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = ScoreCache::new(0);
        assert_eq!(cache.stats().capacity, 1);
    }
}
