//! Request cache counters.

/// Snapshot of a request cache's counters.
///
/// A retrieve that finds only an empty result list counts as a miss.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Descriptors currently held.
    pub entry_count: u64,
    /// Descriptors dropped to stay within capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Retrieves counted so far.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of retrieves answered from the cache, 0.0 before any retrieve.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::request_cache::RequestCache;

    #[test]
    fn test_hit_rate_tracks_request_cache_traffic() {
        let cache: RequestCache<&str, u32> = RequestCache::new(2);
        assert_eq!(cache.stats().unwrap().hit_rate(), 0.0);

        assert!(cache.retrieve(&"station").unwrap().is_empty());
        cache.put("station", vec![1]).unwrap();
        for _ in 0..3 {
            assert_eq!(cache.retrieve(&"station").unwrap(), vec![1]);
        }

        let stats = cache.stats().unwrap();
        assert_eq!(stats.lookups(), 4);
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_results_lower_hit_rate() {
        let cache: RequestCache<&str, u32> = RequestCache::new(2);
        cache.put("nothing", Vec::new()).unwrap();
        cache.put("channel", vec![7]).unwrap();

        cache.retrieve(&"nothing").unwrap();
        cache.retrieve(&"channel").unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!((stats.hits, stats.misses, stats.entry_count), (1, 1, 2));
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
