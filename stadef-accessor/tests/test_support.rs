#![allow(dead_code)]

use stadef_accessor::{
    BridgedStationDefinitionAccessor, EntityCachingStationDefinitionAccessor, StationDefinitionAccessor,
    StationDefinitionRepositories,
};
use stadef_core::{
    Channel, ChannelGroup, EntityKind, OperationalWindow, Response, ResponseId, StadefError, StadefResult,
    Station, StationGroup, StorageError, Timestamp, WaveformId,
};
use stadef_storage::WfdiscChannelQuery;
use stadef_test_utils::network::TestNetwork;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One call that reached a [`CountingAccessor`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FindAt {
        kind: EntityKind,
        ids: Vec<String>,
        time: Timestamp,
    },
    FindBetween {
        kind: EntityKind,
        ids: Vec<String>,
        start: Timestamp,
        end: Timestamp,
    },
    Store {
        kind: EntityKind,
        count: usize,
    },
    ChangeTimes {
        station: String,
    },
    LoadChannel,
    LoadResponse(WaveformId),
    Cache,
}

impl Call {
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Call::FindAt { kind, .. } | Call::FindBetween { kind, .. } | Call::Store { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Records every call before forwarding it to the wrapped accessor.
///
/// While failing, every call returns a repository failure instead.
pub struct CountingAccessor {
    inner: Arc<dyn StationDefinitionAccessor>,
    calls: Mutex<Vec<Call>>,
    failing: AtomicBool,
}

impl CountingAccessor {
    pub fn new(inner: Arc<dyn StationDefinitionAccessor>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls that targeted entities of `kind`.
    pub fn calls_for(&self, kind: EntityKind) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind() == Some(kind))
            .collect()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn record(&self, call: Call) -> StadefResult<()> {
        let kind = call.kind().unwrap_or(EntityKind::Station);
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StadefError::Storage(StorageError::RepositoryFailure {
                kind,
                reason: "repository unavailable".to_string(),
            }));
        }
        Ok(())
    }

    fn find_at(&self, kind: EntityKind, ids: &[impl ToString], time: Timestamp) -> StadefResult<()> {
        self.record(Call::FindAt {
            kind,
            ids: ids.iter().map(ToString::to_string).collect(),
            time,
        })
    }

    fn find_between(
        &self,
        kind: EntityKind,
        ids: &[impl ToString],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<()> {
        self.record(Call::FindBetween {
            kind,
            ids: ids.iter().map(ToString::to_string).collect(),
            start,
            end,
        })
    }
}

impl StationDefinitionAccessor for CountingAccessor {
    fn find_station_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<StationGroup>> {
        self.find_at(EntityKind::StationGroup, names, time)?;
        self.inner.find_station_groups_by_name_and_time(names, time)
    }

    fn find_station_groups_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<StationGroup>> {
        self.find_between(EntityKind::StationGroup, names, start, end)?;
        self.inner.find_station_groups_by_name_and_time_range(names, start, end)
    }

    fn store_station_groups(&self, station_groups: &[StationGroup]) -> StadefResult<()> {
        self.record(Call::Store {
            kind: EntityKind::StationGroup,
            count: station_groups.len(),
        })?;
        self.inner.store_station_groups(station_groups)
    }

    fn find_stations_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Station>> {
        self.find_at(EntityKind::Station, names, time)?;
        self.inner.find_stations_by_name_and_time(names, time)
    }

    fn find_stations_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Station>> {
        self.find_between(EntityKind::Station, names, start, end)?;
        self.inner.find_stations_by_name_and_time_range(names, start, end)
    }

    fn store_stations(&self, stations: &[Station]) -> StadefResult<()> {
        self.record(Call::Store {
            kind: EntityKind::Station,
            count: stations.len(),
        })?;
        self.inner.store_stations(stations)
    }

    fn determine_station_change_times(
        &self,
        station: &Station,
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Timestamp>> {
        self.record(Call::ChangeTimes {
            station: station.id.clone(),
        })?;
        self.inner.determine_station_change_times(station, start, end)
    }

    fn find_channel_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<ChannelGroup>> {
        self.find_at(EntityKind::ChannelGroup, names, time)?;
        self.inner.find_channel_groups_by_name_and_time(names, time)
    }

    fn find_channel_groups_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<ChannelGroup>> {
        self.find_between(EntityKind::ChannelGroup, names, start, end)?;
        self.inner.find_channel_groups_by_name_and_time_range(names, start, end)
    }

    fn store_channel_groups(&self, channel_groups: &[ChannelGroup]) -> StadefResult<()> {
        self.record(Call::Store {
            kind: EntityKind::ChannelGroup,
            count: channel_groups.len(),
        })?;
        self.inner.store_channel_groups(channel_groups)
    }

    fn find_channels_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Channel>> {
        self.find_at(EntityKind::Channel, names, time)?;
        self.inner.find_channels_by_name_and_time(names, time)
    }

    fn find_channels_by_name_and_time_range(
        &self,
        names: &[String],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Channel>> {
        self.find_between(EntityKind::Channel, names, start, end)?;
        self.inner.find_channels_by_name_and_time_range(names, start, end)
    }

    fn store_channels(&self, channels: &[Channel]) -> StadefResult<()> {
        self.record(Call::Store {
            kind: EntityKind::Channel,
            count: channels.len(),
        })?;
        self.inner.store_channels(channels)
    }

    fn load_channel_from_wfdisc(&self, query: &WfdiscChannelQuery) -> StadefResult<Channel> {
        self.record(Call::LoadChannel)?;
        self.inner.load_channel_from_wfdisc(query)
    }

    fn find_responses_by_id(&self, ids: &[ResponseId], time: Timestamp) -> StadefResult<Vec<Response>> {
        self.find_at(EntityKind::Response, ids, time)?;
        self.inner.find_responses_by_id(ids, time)
    }

    fn find_responses_by_id_and_time_range(
        &self,
        ids: &[ResponseId],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Response>> {
        self.find_between(EntityKind::Response, ids, start, end)?;
        self.inner.find_responses_by_id_and_time_range(ids, start, end)
    }

    fn store_responses(&self, responses: &[Response]) -> StadefResult<()> {
        self.record(Call::Store {
            kind: EntityKind::Response,
            count: responses.len(),
        })?;
        self.inner.store_responses(responses)
    }

    fn load_response_from_wfdisc(&self, wfid: WaveformId) -> StadefResult<Response> {
        self.record(Call::LoadResponse(wfid))?;
        self.inner.load_response_from_wfdisc(wfid)
    }

    fn cache(&self, station_group_names: &[String], start: Timestamp, end: Timestamp) -> StadefResult<()> {
        self.record(Call::Cache)?;
        self.inner.cache(station_group_names, start, end)
    }
}

// ============================================================================
// STACK BUILDERS
// ============================================================================

pub fn bridged(network: &TestNetwork) -> Arc<BridgedStationDefinitionAccessor> {
    Arc::new(BridgedStationDefinitionAccessor::new(StationDefinitionRepositories {
        station_groups: network.station_groups.clone(),
        stations: network.stations.clone(),
        channel_groups: network.channel_groups.clone(),
        channels: network.channels.clone(),
        responses: network.responses.clone(),
    }))
}

/// Counting wrapper over the bridged accessor of `network`.
pub fn counting(network: &TestNetwork) -> Arc<CountingAccessor> {
    Arc::new(CountingAccessor::new(bridged(network)))
}

/// Entity-caching accessor with an unbounded window over `delegate`.
pub fn entity_caching(
    network: &TestNetwork,
    delegate: Arc<CountingAccessor>,
) -> EntityCachingStationDefinitionAccessor {
    entity_caching_with_window(network, delegate, OperationalWindow::unbounded())
}

pub fn entity_caching_with_window(
    network: &TestNetwork,
    delegate: Arc<CountingAccessor>,
    window: OperationalWindow,
) -> EntityCachingStationDefinitionAccessor {
    EntityCachingStationDefinitionAccessor::with_window(delegate, network.waveform_ids.clone(), window)
}
