//! Per-key store of time-versioned values.
//!
//! Each key owns a [`RangeMap`] of validity intervals. Keys are sharded in a
//! `DashMap`, so writers to different keys do not block each other and a
//! reader never observes a half-written interval map.

use super::range_map::RangeMap;
use dashmap::DashMap;
use stadef_core::Timestamp;

#[derive(Debug)]
pub struct VersionCache<V> {
    entries: DashMap<String, RangeMap<V>>,
}

impl<V> Default for VersionCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V: Clone + PartialEq> VersionCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any version of `key` is cached.
    pub fn has_key(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|map| !map.is_empty())
    }

    /// Version of `key` valid at `time`.
    pub fn get(&self, key: &str, time: Timestamp) -> Option<V> {
        self.entries.get(key).and_then(|map| map.get(time).cloned())
    }

    /// Most recently starting version of `key`.
    pub fn get_latest(&self, key: &str) -> Option<V> {
        self.entries.get(key).and_then(|map| map.latest().cloned())
    }

    /// Snapshot of every interval cached for `key`.
    pub fn get_range_map(&self, key: &str) -> Option<RangeMap<V>> {
        self.entries.get(key).map(|map| map.clone())
    }

    /// Cache one version valid over `[start, end)`.
    pub fn put(&self, key: &str, start: Timestamp, end: Option<Timestamp>, value: V) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .insert(start, end, value);
    }

    /// Merge a batch of versions into `key`'s intervals.
    pub fn put_range_map(&self, key: &str, versions: RangeMap<V>) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .merge(versions);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
