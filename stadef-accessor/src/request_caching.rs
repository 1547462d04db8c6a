//! Request-caching accessor
//!
//! Memoizes whole read calls of a wrapped accessor, keyed by a
//! [`RequestDescriptor`]. The faceting definition is part of the descriptor,
//! so each facet gets its own entry. Writes, bulk caching and the waveform-id
//! loaders pass straight through and never invalidate memoized results.

use crate::accessor::{AccessorKind, StationDefinitionAccessor};
use stadef_core::{
    Channel, ChannelData, ChannelGroup, ChannelGroupData, EntityData, FacetingDefinition, RequestDescriptor,
    Response, ResponseData, ResponseId, StadefResult, Station, StationData, StationDefinitionConfig,
    StationDefinitionObject, StationGroup, StationGroupData, Timestamp, Versioned, WaveformId,
};
use stadef_storage::{CacheStats, RequestCache, WfdiscChannelQuery};
use std::sync::Arc;

/// One memoized result value.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Object(StationDefinitionObject),
    Instant(Timestamp),
}

pub struct RequestCachingStationDefinitionAccessor {
    inner: Arc<dyn StationDefinitionAccessor>,
    request_cache: RequestCache<RequestDescriptor, CachedValue>,
}

impl RequestCachingStationDefinitionAccessor {
    pub fn new(inner: Arc<dyn StationDefinitionAccessor>, config: &StationDefinitionConfig) -> StadefResult<Self> {
        config.validate()?;
        Ok(Self::with_capacity(inner, config.request_cache_capacity))
    }

    pub fn with_capacity(inner: Arc<dyn StationDefinitionAccessor>, capacity: usize) -> Self {
        Self {
            inner,
            request_cache: RequestCache::new(capacity),
        }
    }

    pub fn stats(&self) -> StadefResult<CacheStats> {
        self.request_cache.stats()
    }

    /// Drop every memoized result.
    pub fn clear(&self) -> StadefResult<()> {
        self.request_cache.clear()
    }

    fn memoize<D, F>(&self, descriptor: RequestDescriptor, compute: F) -> StadefResult<Vec<Versioned<D>>>
    where
        D: EntityData,
        F: FnOnce(&dyn StationDefinitionAccessor) -> StadefResult<Vec<Versioned<D>>>,
    {
        let cached = self.request_cache.retrieve(&descriptor)?;
        if !cached.is_empty() {
            let entities: Vec<Versioned<D>> = cached
                .iter()
                .filter_map(|value| match value {
                    CachedValue::Object(object) => D::from_object(object).cloned(),
                    CachedValue::Instant(_) => None,
                })
                .collect();
            if entities.len() == cached.len() {
                tracing::debug!(operation = ?descriptor.operation, results = entities.len(), "Request cache hit");
                return Ok(entities);
            }
            tracing::warn!(operation = ?descriptor.operation, "Request cache entry holds unexpected kinds");
        }

        let results = compute(self.inner.as_ref())?;
        let values = results
            .iter()
            .cloned()
            .map(|entity| CachedValue::Object(entity.into_object()))
            .collect();
        self.request_cache.put(descriptor, values)?;
        Ok(results)
    }

    fn find_at<D: AccessorKind>(&self, ids: &[D::Id], time: Timestamp) -> StadefResult<Vec<Versioned<D>>> {
        let descriptor = RequestDescriptor::at(D::KIND, keys(ids), time);
        self.memoize(descriptor, |inner| D::find_at(inner, ids, time))
    }

    fn find_faceted<D: AccessorKind>(
        &self,
        ids: &[D::Id],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<Versioned<D>>> {
        let descriptor = RequestDescriptor::at(D::KIND, keys(ids), time).with_faceting(faceting.clone());
        self.memoize(descriptor, |inner| D::find_faceted(inner, ids, time, faceting))
    }

    fn find_between<D: AccessorKind>(
        &self,
        ids: &[D::Id],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Versioned<D>>> {
        let descriptor = RequestDescriptor::between(D::KIND, keys(ids), start, end);
        self.memoize(descriptor, |inner| D::find_between(inner, ids, start, end))
    }
}

fn keys<I: ToString>(ids: &[I]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

impl StationDefinitionAccessor for RequestCachingStationDefinitionAccessor {
    fn find_station_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<StationGroup>> {
        self.find_at::<StationGroupData>(names, time)
    }

    fn find_station_groups_by_name_and_time_faceted(
        &self,
        names: &[String],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<StationGroup>> {
        self.find_faceted::<StationGroupData>(names, time, faceting)
    }

    fn find_station_groups_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<StationGroup>> {
        self.find_between::<StationGroupData>(names, start, end)
    }

    fn store_station_groups(&self, station_groups: &[StationGroup]) -> StadefResult<()> {
        self.inner.store_station_groups(station_groups)
    }

    fn find_stations_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Station>> {
        self.find_at::<StationData>(names, time)
    }

    fn find_stations_by_name_and_time_faceted(
        &self,
        names: &[String],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<Station>> {
        self.find_faceted::<StationData>(names, time, faceting)
    }

    fn find_stations_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Station>> {
        self.find_between::<StationData>(names, start, end)
    }

    fn store_stations(&self, stations: &[Station]) -> StadefResult<()> {
        self.inner.store_stations(stations)
    }

    fn determine_station_change_times(
        &self,
        station: &Station,
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Timestamp>> {
        let descriptor = RequestDescriptor::change_times(station.id.clone(), start, end);

        let cached = self.request_cache.retrieve(&descriptor)?;
        let instants: Vec<Timestamp> = cached
            .iter()
            .filter_map(|value| match value {
                CachedValue::Instant(instant) => Some(*instant),
                CachedValue::Object(_) => None,
            })
            .collect();
        if !cached.is_empty() && instants.len() == cached.len() {
            tracing::debug!(station = %station.id, "Request cache hit for change times");
            return Ok(instants);
        }

        let change_times = self.inner.determine_station_change_times(station, start, end)?;
        self.request_cache.put(
            descriptor,
            change_times.iter().copied().map(CachedValue::Instant).collect(),
        )?;
        Ok(change_times)
    }

    fn find_channel_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<ChannelGroup>> {
        self.find_at::<ChannelGroupData>(names, time)
    }

    fn find_channel_groups_by_name_and_time_faceted(
        &self,
        names: &[String],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<ChannelGroup>> {
        self.find_faceted::<ChannelGroupData>(names, time, faceting)
    }

    fn find_channel_groups_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<ChannelGroup>> {
        self.find_between::<ChannelGroupData>(names, start, end)
    }

    fn store_channel_groups(&self, channel_groups: &[ChannelGroup]) -> StadefResult<()> {
        self.inner.store_channel_groups(channel_groups)
    }

    fn find_channels_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Channel>> {
        self.find_at::<ChannelData>(names, time)
    }

    fn find_channels_by_name_and_time_faceted(
        &self,
        names: &[String],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<Channel>> {
        self.find_faceted::<ChannelData>(names, time, faceting)
    }

    fn find_channels_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Channel>> {
        self.find_between::<ChannelData>(names, start, end)
    }

    fn store_channels(&self, channels: &[Channel]) -> StadefResult<()> {
        self.inner.store_channels(channels)
    }

    fn load_channel_from_wfdisc(&self, query: &WfdiscChannelQuery) -> StadefResult<Channel> {
        self.inner.load_channel_from_wfdisc(query)
    }

    fn find_responses_by_id(&self, ids: &[ResponseId], time: Timestamp) -> StadefResult<Vec<Response>> {
        self.find_at::<ResponseData>(ids, time)
    }

    fn find_responses_by_id_faceted(
        &self,
        ids: &[ResponseId],
        time: Timestamp,
        faceting: &FacetingDefinition,
    ) -> StadefResult<Vec<Response>> {
        self.find_faceted::<ResponseData>(ids, time, faceting)
    }

    fn find_responses_by_id_and_time_range(
        &self,
        ids: &[ResponseId],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Response>> {
        self.find_between::<ResponseData>(ids, start, end)
    }

    fn store_responses(&self, responses: &[Response]) -> StadefResult<()> {
        self.inner.store_responses(responses)
    }

    fn load_response_from_wfdisc(&self, wfid: WaveformId) -> StadefResult<Response> {
        self.inner.load_response_from_wfdisc(wfid)
    }

    fn cache(&self, station_group_names: &[String], start: Timestamp, end: Timestamp) -> StadefResult<()> {
        self.inner.cache(station_group_names, start, end)
    }
}
