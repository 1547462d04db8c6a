//! Enum types shared across the station definition model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity kind discriminator for the containment hierarchy.
///
/// The string form doubles as the faceting `class_type` and as the prefix of
/// version cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    StationGroup,
    Station,
    ChannelGroup,
    Channel,
    Response,
}

impl EntityKind {
    /// All kinds, root to leaf.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::StationGroup,
        EntityKind::Station,
        EntityKind::ChannelGroup,
        EntityKind::Channel,
        EntityKind::Response,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::StationGroup => "StationGroup",
            EntityKind::Station => "Station",
            EntityKind::ChannelGroup => "ChannelGroup",
            EntityKind::Channel => "Channel",
            EntityKind::Response => "Response",
        }
    }

    /// Parse a faceting class type back into a kind.
    pub fn from_class_type(class_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == class_type)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of monitoring station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationType {
    Seismic3Component,
    Seismic1Component,
    SeismicArray,
    Hydroacoustic,
    HydroacousticArray,
    Infrasound,
    InfrasoundArray,
    Weather,
    Unknown,
}

/// Type of channel grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelGroupType {
    /// Channels co-located at one physical site
    PhysicalSite,
    /// Channels grouped for processing
    ProcessingGroup,
}

/// Legacy record type a derived channel was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagName {
    Arid,
    Evid,
    Clustaid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_type_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_class_type(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::from_class_type("Network"), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EntityKind::ChannelGroup.to_string(), "ChannelGroup");
    }
}
