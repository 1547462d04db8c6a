//! Interval map keyed by time.
//!
//! A [`RangeMap`] holds non-overlapping half-open intervals `[start, end)`,
//! each mapped to one value. An interval with no end runs forever. Inserting
//! over existing intervals trims or splits them so the newest write wins, and
//! touching intervals holding equal values are coalesced.

use stadef_core::Timestamp;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
struct Segment<V> {
    end: Option<Timestamp>,
    value: V,
}

/// One interval of a [`RangeMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct RangeEntry<V> {
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    pub value: V,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeMap<V> {
    segments: BTreeMap<Timestamp, Segment<V>>,
}

impl<V> Default for RangeMap<V> {
    fn default() -> Self {
        Self {
            segments: BTreeMap::new(),
        }
    }
}

fn ends_after(end: Option<Timestamp>, time: Timestamp) -> bool {
    end.map_or(true, |end| end > time)
}

impl<V: Clone + PartialEq> RangeMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Value whose interval contains `time`.
    pub fn get(&self, time: Timestamp) -> Option<&V> {
        self.segments
            .range(..=time)
            .next_back()
            .filter(|(_, segment)| ends_after(segment.end, time))
            .map(|(_, segment)| &segment.value)
    }

    /// Map `[start, end)` to `value`, replacing whatever it overlaps.
    ///
    /// Empty intervals (`end <= start`) are ignored.
    pub fn insert(&mut self, start: Timestamp, end: Option<Timestamp>, value: V) {
        if end.is_some_and(|end| end <= start) {
            return;
        }

        let overlapping: Vec<Timestamp> = self
            .overlapping_keys(start, end)
            .into_iter()
            .collect();

        for key in overlapping {
            let Some(segment) = self.segments.remove(&key) else {
                continue;
            };
            if key < start {
                self.segments.insert(
                    key,
                    Segment {
                        end: Some(start),
                        value: segment.value.clone(),
                    },
                );
            }
            if let Some(new_end) = end {
                if ends_after(segment.end, new_end) {
                    self.segments.insert(
                        new_end,
                        Segment {
                            end: segment.end,
                            value: segment.value,
                        },
                    );
                }
            }
        }

        self.segments.insert(start, Segment { end, value });
        self.coalesce_around(start);
    }

    /// Insert every interval of `other`, in order.
    pub fn merge(&mut self, other: RangeMap<V>) {
        for (start, segment) in other.segments {
            self.insert(start, segment.end, segment.value);
        }
    }

    /// Intervals that intersect the closed range `[start, end]`, in order.
    pub fn overlapping(&self, start: Timestamp, end: Timestamp) -> Vec<RangeEntry<V>> {
        self.segments
            .range(..=end)
            .filter(|(_, segment)| ends_after(segment.end, start))
            .map(|(&seg_start, segment)| RangeEntry {
                start: seg_start,
                end: segment.end,
                value: segment.value.clone(),
            })
            .collect()
    }

    /// Closed sub-ranges of `[start, end]` that no interval covers.
    pub fn gaps(&self, start: Timestamp, end: Timestamp) -> Vec<(Timestamp, Timestamp)> {
        let mut gaps = Vec::new();
        let mut cursor = start;

        for entry in self.overlapping(start, end) {
            if entry.start > cursor {
                gaps.push((cursor, entry.start));
            }
            match entry.end {
                Some(seg_end) => cursor = cursor.max(seg_end),
                None => return gaps,
            }
        }

        if cursor <= end {
            gaps.push((cursor, end));
        }
        gaps
    }

    /// Value of the interval that starts last.
    pub fn latest(&self) -> Option<&V> {
        self.segments.values().next_back().map(|segment| &segment.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = RangeEntry<&V>> + '_ {
        self.segments.iter().map(|(&start, segment)| RangeEntry {
            start,
            end: segment.end,
            value: &segment.value,
        })
    }

    fn overlapping_keys(&self, start: Timestamp, end: Option<Timestamp>) -> Vec<Timestamp> {
        let candidates: Box<dyn Iterator<Item = (&Timestamp, &Segment<V>)>> = match end {
            Some(end) => Box::new(self.segments.range(..end)),
            None => Box::new(self.segments.iter()),
        };
        candidates
            .filter(|(_, segment)| ends_after(segment.end, start))
            .map(|(&key, _)| key)
            .collect()
    }

    fn coalesce_around(&mut self, start: Timestamp) {
        let mut start = start;

        // Left neighbour ending exactly where this interval starts
        let left = self
            .segments
            .range(..start)
            .next_back()
            .map(|(&key, segment)| (key, segment.end));
        if let (Some((left_start, Some(left_end))), Some(current)) = (left, self.segments.get(&start)) {
            let same = self
                .segments
                .get(&left_start)
                .is_some_and(|left| left.value == current.value);
            if left_end == start && same {
                if let Some(current) = self.segments.remove(&start) {
                    if let Some(left) = self.segments.get_mut(&left_start) {
                        left.end = current.end;
                    }
                }
                start = left_start;
            }
        }

        // Right neighbour starting exactly where this interval ends
        let Some(Some(end)) = self.segments.get(&start).map(|segment| segment.end) else {
            return;
        };
        let same = match (self.segments.get(&start), self.segments.get(&end)) {
            (Some(current), Some(right)) => current.value == right.value,
            _ => false,
        };
        if same {
            if let Some(right) = self.segments.remove(&end) {
                if let Some(current) = self.segments.get_mut(&start) {
                    current.end = right.end;
                }
            }
        }
    }
}

impl<V: Clone + PartialEq> FromIterator<RangeEntry<V>> for RangeMap<V> {
    fn from_iter<I: IntoIterator<Item = RangeEntry<V>>>(entries: I) -> Self {
        let mut map = RangeMap::new();
        for entry in entries {
            map.insert(entry.start, entry.end, entry.value);
        }
        map
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_600_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_get_is_half_open() {
        let mut map = RangeMap::new();
        map.insert(t(0), Some(t(10)), "a");
        assert_eq!(map.get(t(0)), Some(&"a"));
        assert_eq!(map.get(t(9)), Some(&"a"));
        assert_eq!(map.get(t(10)), None);
        assert_eq!(map.get(t(-1)), None);
    }

    #[test]
    fn test_open_ended_interval() {
        let mut map = RangeMap::new();
        map.insert(t(0), None, "a");
        assert_eq!(map.get(t(1_000_000)), Some(&"a"));
    }

    #[test]
    fn test_empty_interval_ignored() {
        let mut map = RangeMap::new();
        map.insert(t(5), Some(t(5)), "a");
        assert!(map.is_empty());
    }

    #[test]
    fn test_last_write_wins_splits_existing() {
        let mut map = RangeMap::new();
        map.insert(t(0), None, "a");
        map.insert(t(10), Some(t(20)), "b");

        assert_eq!(map.get(t(5)), Some(&"a"));
        assert_eq!(map.get(t(15)), Some(&"b"));
        assert_eq!(map.get(t(25)), Some(&"a"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_insert_trims_both_sides() {
        let mut map = RangeMap::new();
        map.insert(t(0), Some(t(10)), "a");
        map.insert(t(10), Some(t(20)), "b");
        map.insert(t(5), Some(t(15)), "c");

        let entries: Vec<_> = map.iter().map(|e| (e.start, e.end, *e.value)).collect();
        assert_eq!(
            entries,
            vec![
                (t(0), Some(t(5)), "a"),
                (t(5), Some(t(15)), "c"),
                (t(15), Some(t(20)), "b"),
            ]
        );
    }

    #[test]
    fn test_adjacent_equal_values_coalesce() {
        let mut map = RangeMap::new();
        map.insert(t(0), Some(t(10)), "a");
        map.insert(t(20), None, "a");
        map.insert(t(10), Some(t(20)), "a");
        assert_eq!(map.len(), 1);
        assert_eq!(map.iter().next().map(|e| (e.start, e.end)), Some((t(0), None)));
    }

    #[test]
    fn test_gaps() {
        let mut map = RangeMap::new();
        map.insert(t(10), Some(t(20)), "a");
        map.insert(t(30), Some(t(40)), "b");

        assert_eq!(
            map.gaps(t(0), t(50)),
            vec![(t(0), t(10)), (t(20), t(30)), (t(40), t(50))]
        );
        assert_eq!(map.gaps(t(12), t(18)), vec![]);
        assert_eq!(map.gaps(t(12), t(25)), vec![(t(20), t(25))]);
    }

    #[test]
    fn test_gaps_open_ended_covers_rest() {
        let mut map = RangeMap::new();
        map.insert(t(10), None, "a");
        assert_eq!(map.gaps(t(0), t(100)), vec![(t(0), t(10))]);
        assert!(RangeMap::<&str>::new().gaps(t(0), t(1)) == vec![(t(0), t(1))]);
    }

    #[test]
    fn test_overlapping_closed_query() {
        let mut map = RangeMap::new();
        map.insert(t(0), Some(t(10)), "a");
        map.insert(t(10), Some(t(20)), "b");
        map.insert(t(20), None, "c");

        let values: Vec<_> = map.overlapping(t(10), t(20)).into_iter().map(|e| e.value).collect();
        assert_eq!(values, vec!["b", "c"]);
    }

    #[test]
    fn test_merge_and_latest() {
        let mut left = RangeMap::new();
        left.insert(t(0), Some(t(10)), "a");
        let mut right = RangeMap::new();
        right.insert(t(10), None, "b");

        left.merge(right);
        assert_eq!(left.latest(), Some(&"b"));
        assert_eq!(left.get(t(5)), Some(&"a"));
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn t(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_600_000_000 + secs, 0).unwrap()
    }

    fn interval() -> impl Strategy<Value = (i64, Option<i64>, u8)> {
        (0i64..100, prop::option::of(1i64..50), 0u8..3)
            .prop_map(|(start, len, value)| (start, len.map(|len| start + len), value))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: after any insert sequence, intervals are sorted and never overlap
        #[test]
        fn prop_intervals_never_overlap(inserts in prop::collection::vec(interval(), 1..20)) {
            let mut map = RangeMap::new();
            for (start, end, value) in inserts {
                map.insert(t(start), end.map(t), value);
            }
            let entries: Vec<_> = map.iter().collect();
            for pair in entries.windows(2) {
                let end = pair[0].end;
                prop_assert!(end.is_some());
                prop_assert!(end.unwrap() <= pair[1].start);
            }
        }

        /// Property: the last insert covering a point determines its value
        #[test]
        fn prop_last_write_wins(inserts in prop::collection::vec(interval(), 1..20), probe in 0i64..160) {
            let mut map = RangeMap::new();
            for &(start, end, value) in &inserts {
                map.insert(t(start), end.map(t), value);
            }
            let expected = inserts
                .iter()
                .rev()
                .find(|(start, end, _)| *start <= probe && end.map_or(true, |end| probe < end))
                .map(|(_, _, value)| *value);
            prop_assert_eq!(map.get(t(probe)).copied(), expected);
        }

        /// Property: gaps and covered points partition the query range
        #[test]
        fn prop_gaps_are_uncovered(inserts in prop::collection::vec(interval(), 0..10), probe in 0i64..160) {
            let mut map = RangeMap::new();
            for (start, end, value) in inserts {
                map.insert(t(start), end.map(t), value);
            }
            let gaps = map.gaps(t(0), t(160));
            let in_gap = gaps.iter().any(|(start, end)| *start <= t(probe) && t(probe) <= *end);
            if map.get(t(probe)).is_none() {
                prop_assert!(in_gap);
            } else {
                let on_boundary = gaps.iter().any(|(start, end)| t(probe) == *start || t(probe) == *end);
                prop_assert!(!in_gap || on_boundary);
            }
        }
    }
}
