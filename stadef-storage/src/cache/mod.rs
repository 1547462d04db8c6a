//! Cache layer for station definitions.
//!
//! Two independent caches sit between accessor callers and the repositories:
//!
//! - [`VersionCache`] stores time-versioned entities per key, as intervals of
//!   validity in a [`RangeMap`]. Point lookups and range lookups both read it;
//!   range lookups use [`RangeMap::gaps`] to find what still has to be fetched.
//! - [`RequestCache`] memoizes whole accessor calls by descriptor value.
//!
//! Neither cache knows anything about entity semantics. Both are safe to share
//! across threads.

pub mod range_map;
pub mod request_cache;
pub mod stats;
pub mod version_cache;

pub use range_map::{RangeEntry, RangeMap};
pub use request_cache::RequestCache;
pub use stats::CacheStats;
pub use version_cache::VersionCache;
