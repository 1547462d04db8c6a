//! The accessor surface shared by every layer.
//!
//! [`StationDefinitionAccessor`] is implemented by the repository bridge, the
//! entity-caching layer and the request-caching layer, so any of them can wrap
//! any other. [`AccessorKind`] maps an entity kind onto its per-kind methods,
//! letting generic code call "find stations" or "find channels" alike.

use crate::change_time;
use crate::faceting::{facet, Facetable};
use stadef_core::{
    Channel, ChannelData, ChannelGroup, ChannelGroupData, FacetingDefinition, Response, ResponseData,
    ResponseId, StadefResult, Station, StationData, StationGroup, StationGroupData, Timestamp, Versioned,
    WaveformId,
};
use stadef_storage::WfdiscChannelQuery;

// ============================================================================
// ACCESSOR TRAIT
// ============================================================================

/// Read and write access to versioned station definitions.
pub trait StationDefinitionAccessor: Send + Sync {
    // === Station Groups ===

    fn find_station_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<StationGroup>>;

    /// Station groups at `time`, reduced according to `faceting`.
    fn find_station_groups_by_name_and_time_faceted(
        &self,
        names: &[String],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<StationGroup>> {
        find_faceted::<StationGroupData, Self>(self, names, time, faceting)
    }

    fn find_station_groups_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<StationGroup>>;

    fn store_station_groups(&self, station_groups: &[StationGroup]) -> StadefResult<()>;

    // === Stations ===

    fn find_stations_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Station>>;

    fn find_stations_by_name_and_time_faceted(
        &self,
        names: &[String],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<Station>> {
        find_faceted::<StationData, Self>(self, names, time, faceting)
    }

    fn find_stations_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Station>>;

    fn store_stations(&self, stations: &[Station]) -> StadefResult<()>;

    /// Instants at which `station` or anything it contains changed, latest first.
    fn determine_station_change_times(
        &self,
        station: &Station,
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Timestamp>> {
        change_time::determine_station_change_times(self, station, start, end)
    }

    // === Channel Groups ===

    fn find_channel_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<ChannelGroup>>;

    fn find_channel_groups_by_name_and_time_faceted(
        &self,
        names: &[String],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<ChannelGroup>> {
        find_faceted::<ChannelGroupData, Self>(self, names, time, faceting)
    }

    fn find_channel_groups_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<ChannelGroup>>;

    fn store_channel_groups(&self, channel_groups: &[ChannelGroup]) -> StadefResult<()>;

    // === Channels ===

    fn find_channels_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Channel>>;

    fn find_channels_by_name_and_time_faceted(
        &self,
        names: &[String],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<Channel>> {
        find_faceted::<ChannelData, Self>(self, names, time, faceting)
    }

    fn find_channels_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Channel>>;

    fn store_channels(&self, channels: &[Channel]) -> StadefResult<()>;

    /// Channel derived from legacy waveform records.
    fn load_channel_from_wfdisc(&self, query: &WfdiscChannelQuery) -> StadefResult<Channel>;

    // === Responses ===

    fn find_responses_by_id(&self, ids: &[ResponseId], time: Timestamp) -> StadefResult<Vec<Response>>;

    fn find_responses_by_id_faceted(
        &self,
        ids: &[ResponseId],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<Response>> {
        find_faceted::<ResponseData, Self>(self, ids, time, faceting)
    }

    fn find_responses_by_id_and_time_range(
        &self,
        ids: &[ResponseId],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Response>>;

    fn store_responses(&self, responses: &[Response]) -> StadefResult<()>;

    /// Response attached to one legacy waveform record.
    fn load_response_from_wfdisc(&self, wfid: WaveformId) -> StadefResult<Response>;

    // === Bulk ===

    /// Warm whatever caches this layer owns for `station_group_names` over `[start, end]`.
    fn cache(&self, station_group_names: &[String], start: Timestamp, end: Timestamp) -> StadefResult<()>;
}

/// Find entities at `time`, then facet each of them.
pub fn find_faceted<D, A>(
    accessor: &A,
    ids: &[D::Id],
    time: Timestamp,
    faceting: &FacetingDefinition,
) -> StadefResult<Vec<Versioned<D>>>
where
    D: AccessorKind,
    A: StationDefinitionAccessor + ?Sized,
{
    faceting.check_class(D::KIND)?;
    D::find_at(accessor, ids, time)?
        .iter()
        .map(|entity| facet(entity, faceting).map_err(Into::into))
        .collect()
}

// ============================================================================
// PER-KIND DISPATCH
// ============================================================================

/// Routes generic calls to the accessor method for one entity kind.
pub trait AccessorKind: Facetable {
    fn find_at<A: StationDefinitionAccessor + ?Sized>(
        accessor: &A,
        ids: &[Self::Id],
        time: Timestamp,
    ) -> StadefResult<Vec<Versioned<Self>>>;

    fn find_between<A: StationDefinitionAccessor + ?Sized>(
        accessor: &A,
        ids: &[Self::Id],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Versioned<Self>>>;

    fn find_faceted<A: StationDefinitionAccessor + ?Sized>(
        accessor: &A,
        ids: &[Self::Id],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<Versioned<Self>>>;

    fn store<A: StationDefinitionAccessor + ?Sized>(accessor: &A, entities: &[Versioned<Self>]) -> StadefResult<()>;
}

macro_rules! accessor_kind_impl {
    ($data:ty, $find:ident, $faceted:ident, $range:ident, $store:ident) => {
        impl AccessorKind for $data {
            fn find_at<A: StationDefinitionAccessor + ?Sized>(
                accessor: &A,
                ids: &[Self::Id],
                time: Timestamp,
            ) -> StadefResult<Vec<Versioned<Self>>> {
                accessor.$find(ids, time)
            }

            fn find_between<A: StationDefinitionAccessor + ?Sized>(
                accessor: &A,
                ids: &[Self::Id],
                start: Timestamp,
                end: Timestamp,
            ) -> StadefResult<Vec<Versioned<Self>>> {
                accessor.$range(ids, start, end)
            }

            fn find_faceted<A: StationDefinitionAccessor + ?Sized>(
                accessor: &A,
                ids: &[Self::Id],
                time: Timestamp,
                faceting: &FacetingDefinition,
            ) -> StadefResult<Vec<Versioned<Self>>> {
                accessor.$faceted(ids, time, faceting)
            }

            fn store<A: StationDefinitionAccessor + ?Sized>(
                accessor: &A,
                entities: &[Versioned<Self>],
            ) -> StadefResult<()> {
                accessor.$store(entities)
            }
        }
    };
}

accessor_kind_impl!(
    StationGroupData,
    find_station_groups_by_name_and_time,
    find_station_groups_by_name_and_time_faceted,
    find_station_groups_by_name_and_time_range,
    store_station_groups
);
accessor_kind_impl!(
    StationData,
    find_stations_by_name_and_time,
    find_stations_by_name_and_time_faceted,
    find_stations_by_name_and_time_range,
    store_stations
);
accessor_kind_impl!(
    ChannelGroupData,
    find_channel_groups_by_name_and_time,
    find_channel_groups_by_name_and_time_faceted,
    find_channel_groups_by_name_and_time_range,
    store_channel_groups
);
accessor_kind_impl!(
    ChannelData,
    find_channels_by_name_and_time,
    find_channels_by_name_and_time_faceted,
    find_channels_by_name_and_time_range,
    store_channels
);
accessor_kind_impl!(
    ResponseData,
    find_responses_by_id,
    find_responses_by_id_faceted,
    find_responses_by_id_and_time_range,
    store_responses
);
