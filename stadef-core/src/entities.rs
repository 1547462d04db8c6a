//! Versioned entity structures
//!
//! Every entity in the containment hierarchy is a [`Versioned`] value: an
//! identity (name or id), the instant its version took effect, and an optional
//! data payload. A value without data is a reference; one without an
//! `effective_at` is an *entity reference*, one with it a *version reference*.
//!
//! Entities are immutable values. "Updating" one means building a new value.

use crate::{cache_key, ChannelGroupType, EntityKind, ResponseId, StationType, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

// ============================================================================
// ENTITY DATA TRAIT
// ============================================================================

/// Per-kind payload of a versioned entity.
///
/// Implementations describe how a kind is identified and how it converts to
/// and from the kind-erased [`StationDefinitionObject`] used by the caches.
pub trait EntityData: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Identity type (a name for most kinds, a UUID for responses).
    type Id: Clone + fmt::Debug + fmt::Display + Eq + Hash + Ord + Send + Sync + 'static;

    /// The kind this payload belongs to.
    const KIND: EntityKind;

    /// End of this version's validity, if bounded.
    fn effective_until(&self) -> Option<Timestamp>;

    /// Erase the kind of a versioned entity.
    fn into_object(entity: Versioned<Self>) -> StationDefinitionObject;

    /// Recover a versioned entity of this kind, if the object holds one.
    fn from_object(object: &StationDefinitionObject) -> Option<&Versioned<Self>>;
}

// ============================================================================
// VERSIONED ENTITY
// ============================================================================

/// One version of an entity, or a reference to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "D: Serialize, D::Id: Serialize",
    deserialize = "D: Deserialize<'de>, D::Id: Deserialize<'de>"
))]
pub struct Versioned<D: EntityData> {
    pub id: D::Id,
    pub effective_at: Option<Timestamp>,
    pub data: Option<D>,
}

impl<D: EntityData> Versioned<D> {
    /// Build a fully populated version.
    pub fn new(id: D::Id, effective_at: Timestamp, data: D) -> Self {
        Self {
            id,
            effective_at: Some(effective_at),
            data: Some(data),
        }
    }

    /// Reference by identity only.
    pub fn entity_reference(id: D::Id) -> Self {
        Self {
            id,
            effective_at: None,
            data: None,
        }
    }

    /// Reference to one specific version.
    pub fn version_reference(id: D::Id, effective_at: Timestamp) -> Self {
        Self {
            id,
            effective_at: Some(effective_at),
            data: None,
        }
    }

    /// True when the data payload is present.
    pub fn is_present(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    pub fn effective_until(&self) -> Option<Timestamp> {
        self.data.as_ref().and_then(EntityData::effective_until)
    }

    /// Strip to identity only.
    pub fn to_entity_reference(&self) -> Self {
        Self::entity_reference(self.id.clone())
    }

    /// Strip the data payload, keeping the version time.
    pub fn to_version_reference(&self) -> Self {
        Self {
            id: self.id.clone(),
            effective_at: self.effective_at,
            data: None,
        }
    }

    /// Identity of this particular version.
    pub fn version_key(&self) -> (D::Id, Option<Timestamp>) {
        (self.id.clone(), self.effective_at)
    }

    /// Version cache key for this entity's kind and identity.
    pub fn cache_key(&self) -> String {
        cache_key(D::KIND, &self.id)
    }

    /// Validity interval `[effective_at, effective_until)`.
    ///
    /// The end is only honoured when the payload is present; references are
    /// treated as open-ended. Entity references have no interval.
    pub fn validity(&self) -> Option<(Timestamp, Option<Timestamp>)> {
        self.effective_at.map(|start| (start, self.effective_until()))
    }

    /// True if this version is in effect at `time`.
    pub fn is_effective_at(&self, time: Timestamp) -> bool {
        match self.validity() {
            Some((start, end)) => start <= time && end.map_or(true, |end| time < end),
            None => false,
        }
    }

    /// Rebuild with a transformed payload. References are returned unchanged.
    pub fn map_data(self, f: impl FnOnce(D) -> D) -> Self {
        Self {
            data: self.data.map(f),
            ..self
        }
    }

    pub fn into_object(self) -> StationDefinitionObject {
        D::into_object(self)
    }
}

/// Sort versions by identity, then by effective time (references first).
pub fn sort_versions<D: EntityData>(versions: &mut [Versioned<D>]) {
    versions.sort_by(|a, b| a.id.cmp(&b.id).then(a.effective_at.cmp(&b.effective_at)));
}

/// Drop repeated versions, keeping the first occurrence of each version key.
pub fn distinct_versions<D: EntityData>(versions: Vec<Versioned<D>>) -> Vec<Versioned<D>> {
    let mut seen = HashSet::new();
    versions
        .into_iter()
        .filter(|version| seen.insert(version.version_key()))
        .collect()
}

/// Pick the version of `id` in effect at `time`, preferring the latest start.
pub fn version_in_effect<'a, D: EntityData>(
    versions: &'a [Versioned<D>],
    id: &D::Id,
    time: Timestamp,
) -> Option<&'a Versioned<D>> {
    versions
        .iter()
        .filter(|version| &version.id == id && version.is_effective_at(time))
        .max_by_key(|version| version.effective_at)
}

// ============================================================================
// SHARED VALUE TYPES
// ============================================================================

/// Geographic location of a station or site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude_degrees: f64,
    pub longitude_degrees: f64,
    pub depth_km: f64,
    pub elevation_km: f64,
}

/// Instrument calibration carried by a response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub calibration_period_sec: f64,
    pub calibration_factor: f64,
}

// ============================================================================
// PER-KIND PAYLOADS
// ============================================================================

/// Payload of a [`StationGroup`] version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationGroupData {
    pub description: String,
    pub effective_until: Option<Timestamp>,
    pub stations: Vec<Station>,
}

/// Payload of a [`Station`] version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationData {
    pub station_type: StationType,
    pub description: String,
    pub location: Location,
    pub effective_until: Option<Timestamp>,
    pub channel_groups: Vec<ChannelGroup>,
    /// Every channel reachable through `channel_groups`, each version once.
    pub all_raw_channels: Vec<Channel>,
}

impl StationData {
    /// Flatten the channels of `channel_groups`, deduplicated by version.
    pub fn flatten_channels(channel_groups: &[ChannelGroup]) -> Vec<Channel> {
        let channels = channel_groups
            .iter()
            .filter_map(Versioned::data)
            .flat_map(|group| group.channels.iter().cloned())
            .collect();
        distinct_versions(channels)
    }
}

/// Payload of a [`ChannelGroup`] version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelGroupData {
    pub description: String,
    pub location: Option<Location>,
    pub group_type: ChannelGroupType,
    pub effective_until: Option<Timestamp>,
    pub channels: Vec<Channel>,
}

/// Payload of a [`Channel`] version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelData {
    pub description: String,
    /// Name of the owning station.
    pub station: String,
    pub nominal_sample_rate_hz: f64,
    pub effective_until: Option<Timestamp>,
    pub response: Option<Response>,
}

/// Payload of a [`Response`] version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    pub calibration: Calibration,
    pub effective_until: Option<Timestamp>,
}

pub type StationGroup = Versioned<StationGroupData>;
pub type Station = Versioned<StationData>;
pub type ChannelGroup = Versioned<ChannelGroupData>;
pub type Channel = Versioned<ChannelData>;
pub type Response = Versioned<ResponseData>;

// ============================================================================
// KIND-ERASED OBJECT
// ============================================================================

/// Any station definition entity, used where caches hold mixed kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StationDefinitionObject {
    StationGroup(StationGroup),
    Station(Station),
    ChannelGroup(ChannelGroup),
    Channel(Channel),
    Response(Response),
}

impl StationDefinitionObject {
    pub fn kind(&self) -> EntityKind {
        match self {
            StationDefinitionObject::StationGroup(_) => EntityKind::StationGroup,
            StationDefinitionObject::Station(_) => EntityKind::Station,
            StationDefinitionObject::ChannelGroup(_) => EntityKind::ChannelGroup,
            StationDefinitionObject::Channel(_) => EntityKind::Channel,
            StationDefinitionObject::Response(_) => EntityKind::Response,
        }
    }

    /// Borrow as a versioned entity of kind `D`.
    pub fn as_versioned<D: EntityData>(&self) -> Option<&Versioned<D>> {
        D::from_object(self)
    }
}

macro_rules! entity_data_impl {
    ($data:ty, $id:ty, $kind:ident) => {
        impl EntityData for $data {
            type Id = $id;
            const KIND: EntityKind = EntityKind::$kind;

            fn effective_until(&self) -> Option<Timestamp> {
                self.effective_until
            }

            fn into_object(entity: Versioned<Self>) -> StationDefinitionObject {
                StationDefinitionObject::$kind(entity)
            }

            fn from_object(object: &StationDefinitionObject) -> Option<&Versioned<Self>> {
                match object {
                    StationDefinitionObject::$kind(entity) => Some(entity),
                    _ => None,
                }
            }
        }
    };
}

entity_data_impl!(StationGroupData, String, StationGroup);
entity_data_impl!(StationData, String, Station);
entity_data_impl!(ChannelGroupData, String, ChannelGroup);
entity_data_impl!(ChannelData, String, Channel);
entity_data_impl!(ResponseData, ResponseId, Response);

// =============================================================================
// TESTS
// =============================================================================
