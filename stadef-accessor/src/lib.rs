//! stadef Accessor - Layered Station Definition Access
//!
//! Three interchangeable implementations of [`StationDefinitionAccessor`],
//! meant to be stacked:
//!
//! ```text
//! RequestCaching -> EntityCaching -> Bridged -> repositories
//! ```
//!
//! - [`BridgedStationDefinitionAccessor`] answers from the repositories.
//! - [`EntityCachingStationDefinitionAccessor`] keeps individual versions in a
//!   version cache and fetches only what it is missing.
//! - [`RequestCachingStationDefinitionAccessor`] memoizes whole calls.
//!
//! Faceting and change-time resolution are shared by all layers.

pub mod accessor;
pub mod bridged;
pub mod change_time;
pub mod entity_caching;
pub mod faceting;
pub mod request_caching;

pub use accessor::{find_faceted, AccessorKind, StationDefinitionAccessor};
pub use bridged::{BridgedStationDefinitionAccessor, StationDefinitionRepositories};
pub use change_time::{determine_station_change_times, StationHistory};
pub use entity_caching::EntityCachingStationDefinitionAccessor;
pub use faceting::{facet, Facetable};
pub use request_caching::{CachedValue, RequestCachingStationDefinitionAccessor};
