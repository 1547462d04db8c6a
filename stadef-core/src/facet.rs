//! Faceting definitions
//!
//! A [`FacetingDefinition`] says how much of an entity graph to hydrate. It
//! names the class it applies to, whether that entity keeps its data, and
//! optional nested definitions keyed by containment field.

use crate::{EntityKind, FacetingError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field key for `StationGroup.stations`.
pub const STATIONS_KEY: &str = "stations";
/// Field key for `Station.channel_groups`.
pub const CHANNEL_GROUPS_KEY: &str = "channelGroups";
/// Field key for `Station.all_raw_channels` and `ChannelGroup.channels`.
pub const CHANNELS_KEY: &str = "channels";
/// Field key for `Channel.response`.
pub const RESPONSE_KEY: &str = "response";

/// Recursive hydration rules for an entity graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacetingDefinition {
    pub class_type: String,
    pub populated: bool,
    pub faceting_definitions: BTreeMap<String, FacetingDefinition>,
}

impl FacetingDefinition {
    pub fn new(kind: EntityKind, populated: bool) -> Self {
        Self {
            class_type: kind.as_str().to_string(),
            populated,
            faceting_definitions: BTreeMap::new(),
        }
    }

    /// Keep the entity's data, with default rules for every field.
    pub fn populated(kind: EntityKind) -> Self {
        Self::new(kind, true)
    }

    /// Reduce the entity to a reference.
    pub fn reference(kind: EntityKind) -> Self {
        Self::new(kind, false)
    }

    /// Add a nested definition for `key`.
    pub fn with_field(mut self, key: impl Into<String>, definition: FacetingDefinition) -> Self {
        self.faceting_definitions.insert(key.into(), definition);
        self
    }

    /// Nested definition for `key`, if one was given.
    pub fn get(&self, key: &str) -> Option<&FacetingDefinition> {
        self.faceting_definitions.get(key)
    }

    /// Nested definition for `key`, or the populated default for `kind`.
    pub fn field_or_default(&self, key: &str, kind: EntityKind) -> FacetingDefinition {
        self.get(key)
            .cloned()
            .unwrap_or_else(|| Self::populated(kind))
    }

    /// Kind named by `class_type`, if it names one.
    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::from_class_type(&self.class_type)
    }

    /// Check that this definition applies to `kind`.
    pub fn check_class(&self, kind: EntityKind) -> Result<(), FacetingError> {
        match self.kind() {
            Some(named) if named == kind => Ok(()),
            _ => Err(FacetingError::ClassTypeMismatch {
                expected: kind.as_str().to_string(),
                actual: self.class_type.clone(),
            }),
        }
    }
}
