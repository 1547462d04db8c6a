//! Memoization of whole accessor calls.
//!
//! Maps a request descriptor to the list of results that call produced. An
//! empty list is indistinguishable from a miss. The cache is bounded and
//! evicts the oldest descriptor first.

use super::stats::CacheStats;
use stadef_core::{StadefError, StadefResult, StorageError};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug)]
struct Entries<K, V> {
    results: HashMap<K, Vec<V>>,
    insertion_order: VecDeque<K>,
}

#[derive(Debug)]
pub struct RequestCache<K, V> {
    capacity: usize,
    entries: RwLock<Entries<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Hash + Eq + Clone, V: Clone> RequestCache<K, V> {
    /// Create a cache holding at most `capacity` descriptors (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(Entries {
                results: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Cached results for `descriptor`, or an empty list.
    pub fn retrieve(&self, descriptor: &K) -> StadefResult<Vec<V>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StadefError::Storage(StorageError::LockPoisoned))?;

        match entries.results.get(descriptor) {
            Some(results) if !results.is_empty() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(results.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(Vec::new())
            }
        }
    }

    /// Remember `results` for `descriptor`.
    pub fn put(&self, descriptor: K, results: Vec<V>) -> StadefResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StadefError::Storage(StorageError::LockPoisoned))?;

        if entries.results.insert(descriptor.clone(), results).is_none() {
            entries.insertion_order.push_back(descriptor);
        }

        while entries.results.len() > self.capacity {
            let Some(oldest) = entries.insertion_order.pop_front() else {
                break;
            };
            entries.results.remove(&oldest);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(capacity = self.capacity, "Evicted oldest request descriptor");
        }
        Ok(())
    }

    pub fn clear(&self) -> StadefResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StadefError::Storage(StorageError::LockPoisoned))?;
        entries.results.clear();
        entries.insertion_order.clear();
        Ok(())
    }

    pub fn stats(&self) -> StadefResult<CacheStats> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StadefError::Storage(StorageError::LockPoisoned))?;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: entries.results.len() as u64,
            evictions: self.evictions.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_then_hit() {
        let cache: RequestCache<String, i32> = RequestCache::new(4);
        assert!(cache.retrieve(&"a".to_string()).unwrap().is_empty());

        cache.put("a".to_string(), vec![1, 2]).unwrap();
        assert_eq!(cache.retrieve(&"a".to_string()).unwrap(), vec![1, 2]);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[test]
    fn test_empty_results_are_misses() {
        let cache: RequestCache<String, i32> = RequestCache::new(4);
        cache.put("a".to_string(), vec![]).unwrap();
        assert!(cache.retrieve(&"a".to_string()).unwrap().is_empty());
        assert_eq!(cache.stats().unwrap().misses, 1);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let cache: RequestCache<u32, u32> = RequestCache::new(2);
        cache.put(1, vec![1]).unwrap();
        cache.put(2, vec![2]).unwrap();
        cache.put(1, vec![11]).unwrap();
        cache.put(3, vec![3]).unwrap();

        assert!(cache.retrieve(&1).unwrap().is_empty());
        assert_eq!(cache.retrieve(&2).unwrap(), vec![2]);
        assert_eq!(cache.retrieve(&3).unwrap(), vec![3]);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entry_count, 2);
    }

    #[test]
    fn test_clear() {
        let cache: RequestCache<u32, u32> = RequestCache::new(2);
        cache.put(1, vec![1]).unwrap();
        cache.clear().unwrap();
        assert!(cache.retrieve(&1).unwrap().is_empty());
        assert_eq!(cache.stats().unwrap().entry_count, 0);
    }
}
