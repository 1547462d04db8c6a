//! Repository-bridged accessor
//!
//! The delegate of last resort: answers every call straight from the backing
//! repositories. It owns no cache, so `cache` only validates its arguments.

use crate::accessor::StationDefinitionAccessor;
use stadef_core::{
    distinct_versions, require_name, require_ordered, Channel, ChannelGroup, ChannelGroupData, Response,
    ResponseId, StadefError, StadefResult, Station, StationData, StationGroup, StationGroupData, Timestamp,
    WaveformId,
};
use stadef_storage::{ChannelRepository, ResponseRepository, VersionedRepository, WfdiscChannelQuery};
use std::sync::Arc;

/// Repositories backing a [`BridgedStationDefinitionAccessor`].
#[derive(Clone)]
pub struct StationDefinitionRepositories {
    pub station_groups: Arc<dyn VersionedRepository<StationGroupData>>,
    pub stations: Arc<dyn VersionedRepository<StationData>>,
    pub channel_groups: Arc<dyn VersionedRepository<ChannelGroupData>>,
    pub channels: Arc<dyn ChannelRepository>,
    pub responses: Arc<dyn ResponseRepository>,
}

pub struct BridgedStationDefinitionAccessor {
    repositories: StationDefinitionRepositories,
}

impl BridgedStationDefinitionAccessor {
    pub fn new(repositories: StationDefinitionRepositories) -> Self {
        Self { repositories }
    }
}

impl StationDefinitionAccessor for BridgedStationDefinitionAccessor {
    fn find_station_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<StationGroup>> {
        Ok(distinct_versions(
            self.repositories.station_groups.find_by_id_and_time(names, time)?,
        ))
    }

    fn find_station_groups_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<StationGroup>> {
        require_ordered(start, end)?;
        self.repositories.station_groups.find_by_id_and_time_range(names, start, end)
    }

    fn store_station_groups(&self, station_groups: &[StationGroup]) -> StadefResult<()> {
        self.repositories.station_groups.store(station_groups)
    }

    fn find_stations_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Station>> {
        Ok(distinct_versions(self.repositories.stations.find_by_id_and_time(names, time)?))
    }

    fn find_stations_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Station>> {
        require_ordered(start, end)?;
        self.repositories.stations.find_by_id_and_time_range(names, start, end)
    }

    fn store_stations(&self, stations: &[Station]) -> StadefResult<()> {
        self.repositories.stations.store(stations)
    }

    fn find_channel_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<ChannelGroup>> {
        Ok(distinct_versions(
            self.repositories.channel_groups.find_by_id_and_time(names, time)?,
        ))
    }

    fn find_channel_groups_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<ChannelGroup>> {
        require_ordered(start, end)?;
        self.repositories.channel_groups.find_by_id_and_time_range(names, start, end)
    }

    fn store_channel_groups(&self, channel_groups: &[ChannelGroup]) -> StadefResult<()> {
        self.repositories.channel_groups.store(channel_groups)
    }

    fn find_channels_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Channel>> {
        Ok(distinct_versions(self.repositories.channels.find_by_id_and_time(names, time)?))
    }

    fn find_channels_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Channel>> {
        require_ordered(start, end)?;
        self.repositories.channels.find_by_id_and_time_range(names, start, end)
    }

    fn store_channels(&self, channels: &[Channel]) -> StadefResult<()> {
        self.repositories.channels.store(channels)
    }

    fn load_channel_from_wfdisc(&self, query: &WfdiscChannelQuery) -> StadefResult<Channel> {
        self.repositories.channels.load_channel_from_wfdisc(query)
    }

    fn find_responses_by_id(&self, ids: &[ResponseId], time: Timestamp) -> StadefResult<Vec<Response>> {
        self.repositories.responses.find_by_id_and_time(ids, time)
    }

    fn find_responses_by_id_and_time_range(
        &self,
        ids: &[ResponseId],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Response>> {
        require_ordered(start, end)?;
        self.repositories.responses.find_by_id_and_time_range(ids, start, end)
    }

    fn store_responses(&self, responses: &[Response]) -> StadefResult<()> {
        self.repositories.responses.store(responses)
    }

    fn load_response_from_wfdisc(&self, wfid: WaveformId) -> StadefResult<Response> {
        self.repositories.responses.load_response_from_wfdisc(wfid)
    }

    fn cache(&self, station_group_names: &[String], start: Timestamp, end: Timestamp) -> StadefResult<()> {
        if station_group_names.is_empty() {
            return Err(StadefError::missing("station_group_names"));
        }
        for name in station_group_names {
            require_name("station_group_names", name)?;
        }
        require_ordered(start, end)?;
        tracing::debug!(station_groups = station_group_names.len(), "Bridged accessor has no cache to populate");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
