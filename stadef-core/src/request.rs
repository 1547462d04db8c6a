//! Request descriptors
//!
//! A [`RequestDescriptor`] identifies one accessor read call by value. Two
//! descriptors are equal only when every field is equal, so calls that differ
//! in any name, time, or faceting definition never share a cache entry.

use crate::{EntityKind, FacetingDefinition, Timestamp};
use serde::{Deserialize, Serialize};

/// Read operation a descriptor was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestOperation {
    /// Lookup of one entity kind by names (or response ids)
    Find(EntityKind),
    /// Change times of one station's sub-graph
    StationChangeTimes,
}

/// Time component of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestWindow {
    At(Timestamp),
    Between { start: Timestamp, end: Timestamp },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub operation: RequestOperation,
    pub keys: Vec<String>,
    pub window: RequestWindow,
    pub faceting: Option<FacetingDefinition>,
}

impl RequestDescriptor {
    /// Point-in-time lookup.
    pub fn at(kind: EntityKind, keys: Vec<String>, time: Timestamp) -> Self {
        Self {
            operation: RequestOperation::Find(kind),
            keys,
            window: RequestWindow::At(time),
            faceting: None,
        }
    }

    /// Time-range lookup.
    pub fn between(kind: EntityKind, keys: Vec<String>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            operation: RequestOperation::Find(kind),
            keys,
            window: RequestWindow::Between { start, end },
            faceting: None,
        }
    }

    /// Change-time computation for one station.
    pub fn change_times(station: String, start: Timestamp, end: Timestamp) -> Self {
        Self {
            operation: RequestOperation::StationChangeTimes,
            keys: vec![station],
            window: RequestWindow::Between { start, end },
            faceting: None,
        }
    }

    pub fn with_faceting(mut self, faceting: FacetingDefinition) -> Self {
        self.faceting = Some(faceting);
        self
    }
}
