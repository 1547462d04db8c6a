//! Change-time resolver
//!
//! Computes the instants at which a station or anything reachable from it
//! (channel groups, channels, responses) began a new version.

use crate::accessor::StationDefinitionAccessor;
use stadef_core::{
    require_name, require_ordered, Channel, ChannelGroup, EntityData, Response, StadefResult, Station,
    Timestamp, Versioned,
};
use std::collections::BTreeSet;

/// Every version of a station's sub-graph relevant to one query window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationHistory {
    pub stations: Vec<Station>,
    pub channel_groups: Vec<ChannelGroup>,
    pub channels: Vec<Channel>,
    pub responses: Vec<Response>,
}

impl StationHistory {
    /// History made of one materialized station.
    pub fn from_station(station: &Station) -> Self {
        Self {
            stations: vec![station.clone()],
            ..Default::default()
        }
    }

    /// Range-fetch the station named `station_name` and its descendants through `accessor`.
    pub fn collect<A>(accessor: &A, station_name: &str, start: Timestamp, end: Timestamp) -> StadefResult<Self>
    where
        A: StationDefinitionAccessor + ?Sized,
    {
        let stations = accessor.find_stations_by_name_and_time_range(&[station_name.to_string()], start, end)?;

        let group_names = ids(stations
            .iter()
            .filter_map(Versioned::data)
            .flat_map(|station| station.channel_groups.iter()));
        let channel_groups = if group_names.is_empty() {
            Vec::new()
        } else {
            accessor.find_channel_groups_by_name_and_time_range(&group_names, start, end)?
        };

        let channel_names = ids(stations
            .iter()
            .filter_map(Versioned::data)
            .flat_map(|station| station.all_raw_channels.iter())
            .chain(
                channel_groups
                    .iter()
                    .filter_map(Versioned::data)
                    .flat_map(|group| group.channels.iter()),
            ));
        let channels = if channel_names.is_empty() {
            Vec::new()
        } else {
            accessor.find_channels_by_name_and_time_range(&channel_names, start, end)?
        };

        let response_ids = ids(channels
            .iter()
            .filter_map(Versioned::data)
            .filter_map(|channel| channel.response.as_ref()));
        let responses = if response_ids.is_empty() {
            Vec::new()
        } else {
            accessor.find_responses_by_id_and_time_range(&response_ids, start, end)?
        };

        Ok(Self {
            stations,
            channel_groups,
            channels,
            responses,
        })
    }

    /// Distinct version start times no later than `end`, latest first.
    ///
    /// Nested children of every collected entity are walked as well.
    pub fn change_times(&self, end: Timestamp) -> Vec<Timestamp> {
        let mut walker = Walker::default();
        for station in &self.stations {
            walker.station(station);
        }
        for group in &self.channel_groups {
            walker.channel_group(group);
        }
        for channel in &self.channels {
            walker.channel(channel);
        }
        for response in &self.responses {
            walker.response(response);
        }

        walker
            .instants
            .into_iter()
            .rev()
            .filter(|instant| *instant <= end)
            .collect()
    }
}

/// Validate arguments, collect the station's history and resolve its change times.
pub fn determine_station_change_times<A>(
    accessor: &A,
    station: &Station,
    start: Timestamp,
    end: Timestamp,
) -> StadefResult<Vec<Timestamp>>
where
    A: StationDefinitionAccessor + ?Sized,
{
    require_name("station", &station.id)?;
    require_ordered(start, end)?;

    let history = StationHistory::collect(accessor, &station.id, start, end)?;
    let change_times = history.change_times(end);
    tracing::debug!(
        station = %station.id,
        versions = history.stations.len(),
        change_times = change_times.len(),
        "Determined station change times"
    );
    Ok(change_times)
}

fn ids<'a, D: EntityData>(entities: impl Iterator<Item = &'a Versioned<D>>) -> Vec<D::Id> {
    entities
        .map(|entity| entity.id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Default)]
struct Walker {
    instants: BTreeSet<Timestamp>,
}

impl Walker {
    fn record<D: EntityData>(&mut self, entity: &Versioned<D>) {
        if let Some(at) = entity.effective_at {
            self.instants.insert(at);
        }
    }

    fn station(&mut self, station: &Station) {
        self.record(station);
        if let Some(data) = station.data() {
            for group in &data.channel_groups {
                self.channel_group(group);
            }
            for channel in &data.all_raw_channels {
                self.channel(channel);
            }
        }
    }

    fn channel_group(&mut self, group: &ChannelGroup) {
        self.record(group);
        if let Some(data) = group.data() {
            for channel in &data.channels {
                self.channel(channel);
            }
        }
    }

    fn channel(&mut self, channel: &Channel) {
        self.record(channel);
        if let Some(response) = channel.data().and_then(|data| data.response.as_ref()) {
            self.response(response);
        }
    }

    fn response(&mut self, response: &Response) {
        self.record(response);
    }
}

// =============================================================================
// TESTS
// =============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
