//! Identity and time types for station definition entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Opaque identifier for instrument responses.
pub type ResponseId = Uuid;

/// Legacy waveform (wfdisc) record identifier.
pub type WaveformId = i64;

/// Build the version cache key for an entity of the given kind.
///
/// Keys are the kind name and the entity's name or id joined by `:`, e.g.
/// `Station:ASAR` or `Response:6f1c...`. Kind names never contain `:`, so
/// `StationGroup:X` and `Station:GroupX` stay distinct.
pub fn cache_key(kind: crate::EntityKind, id: &impl std::fmt::Display) -> String {
    format!("{}:{}", kind.as_str(), id)
}
