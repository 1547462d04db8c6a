//! stadef Core - Station Definition Types
//!
//! Pure data structures for time-versioned station definitions. All other
//! crates depend on this. This crate contains ONLY data types, reference
//! reduction, and argument/config validation - no caching or lookup logic.

mod config;
mod entities;
mod enums;
mod error;
mod facet;
mod identity;
mod request;

pub use config::*;
pub use entities::*;
pub use enums::*;
pub use error::*;
pub use facet::*;
pub use identity::*;
pub use request::*;

// ============================================================================
// ARGUMENT VALIDATION
// ============================================================================

/// Reject a blank name.
pub fn require_name(field: &str, name: &str) -> StadefResult<()> {
    if name.trim().is_empty() {
        return Err(StadefError::missing(field));
    }
    Ok(())
}

/// Reject a range whose end precedes its start.
pub fn require_ordered(start: Timestamp, end: Timestamp) -> StadefResult<()> {
    if end < start {
        return Err(StadefError::invalid_range(format!(
            "End time cannot be before start time ({} < {})",
            end, start
        )));
    }
    Ok(())
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
    fn test_require_name() {
        assert!(require_name("station", "ASAR").is_ok());
        assert_eq!(
            require_name("station", "  "),
            Err(StadefError::Validation(ValidationError::RequiredFieldMissing {
                field: "station".to_string()
            }))
        );
    }

    #[test]
    fn test_require_ordered() {
        assert!(require_ordered(t(0), t(0)).is_ok());
        assert!(require_ordered(t(0), t(1)).is_ok());
        assert!(matches!(
            require_ordered(t(1), t(0)),
            Err(StadefError::Validation(ValidationError::InvalidRange { .. }))
        ));
    }

    #[test]
    fn test_station_serializes_with_nested_references() {
        let group: ChannelGroup = Versioned::entity_reference("ASAR_GROUP".to_string());
        let station = Station::new(
            "ASAR".to_string(),
            t(0),
            StationData {
                station_type: StationType::SeismicArray,
                description: "Alice Springs Array".to_string(),
                location: Location {
                    latitude_degrees: -23.665,
                    longitude_degrees: 133.905,
                    depth_km: 0.0,
                    elevation_km: 0.6273,
                },
                effective_until: None,
                channel_groups: vec![group],
                all_raw_channels: vec![],
            },
        );

        let json = serde_json::to_value(&station).unwrap();
        assert_eq!(json["id"], "ASAR");
        assert!(json["data"]["channel_groups"][0]["data"].is_null());

        let back: Station = serde_json::from_value(json).unwrap();
        assert_eq!(back, station);
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
