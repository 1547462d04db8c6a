//! stadef Test Utilities
//!
//! Shared test infrastructure for the stadef workspace:
//! - Fixtures for one small, fully hydrated station network
//! - An in-memory network of repositories loaded with those fixtures
//! - Proptest generators for versioned entities

pub use stadef_core::{
    Calibration, Channel, ChannelData, ChannelGroup, ChannelGroupData, ChannelGroupType, Location, Response,
    ResponseData, ResponseId, StadefResult, Station, StationData, StationGroup, StationGroupData, StationType,
    TagName, Timestamp, WaveformId,
};
pub use stadef_storage::{InMemoryRepository, InMemoryWaveformIdLookup};

use chrono::{DateTime, Utc};
use uuid::Uuid;

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built station network used across the accessor tests.
    //!
    //! Every fixture version takes effect at [`t`]`(0)` unless stated
    //! otherwise, and children are present (fully hydrated).

    use super::*;

    pub const STATION_GROUP: &str = "primary";
    pub const STATION: &str = "ASAR";
    pub const CHANNEL_GROUP: &str = "AS01";
    pub const CHANNEL: &str = "ASAR.AS01.SHZ";
    pub const RESPONSE_ID: ResponseId = Uuid::from_u128(0x5f0c_7a1e_0000_4000_8000_0000_0000_0001);

    /// Waveform id registered for the fixture channel and response.
    pub const WFID: WaveformId = 1001;
    /// Arrival id the fixture channel is derived for.
    pub const ARID: i64 = 42;

    /// Instant `secs` seconds after a fixed epoch.
    pub fn t(secs: i64) -> Timestamp {
        DateTime::<Utc>::from_timestamp(1_600_000_000 + secs, 0).unwrap_or_default()
    }

    pub fn location() -> Location {
        Location {
            latitude_degrees: -23.665,
            longitude_degrees: 133.905,
            depth_km: 0.0,
            elevation_km: 0.6273,
        }
    }

    pub fn response_at(at: Timestamp, calibration_factor: f64) -> Response {
        Response::new(
            RESPONSE_ID,
            at,
            ResponseData {
                calibration: Calibration {
                    calibration_period_sec: 1.0,
                    calibration_factor,
                },
                effective_until: None,
            },
        )
    }

    pub fn response() -> Response {
        response_at(t(0), 0.25)
    }

    pub fn channel_at(at: Timestamp, response: Option<Response>) -> Channel {
        Channel::new(
            CHANNEL.to_string(),
            at,
            ChannelData {
                description: "vertical short period".to_string(),
                station: STATION.to_string(),
                nominal_sample_rate_hz: 40.0,
                effective_until: None,
                response,
            },
        )
    }

    pub fn channel() -> Channel {
        channel_at(t(0), Some(response()))
    }

    pub fn channel_group_at(at: Timestamp, channels: Vec<Channel>) -> ChannelGroup {
        ChannelGroup::new(
            CHANNEL_GROUP.to_string(),
            at,
            ChannelGroupData {
                description: "array element".to_string(),
                location: Some(location()),
                group_type: ChannelGroupType::PhysicalSite,
                effective_until: None,
                channels,
            },
        )
    }

    pub fn channel_group() -> ChannelGroup {
        channel_group_at(t(0), vec![channel()])
    }

    pub fn station_at(at: Timestamp, channel_groups: Vec<ChannelGroup>) -> Station {
        let all_raw_channels = StationData::flatten_channels(&channel_groups);
        Station::new(
            STATION.to_string(),
            at,
            StationData {
                station_type: StationType::SeismicArray,
                description: "Alice Springs array".to_string(),
                location: location(),
                effective_until: None,
                channel_groups,
                all_raw_channels,
            },
        )
    }

    pub fn station() -> Station {
        station_at(t(0), vec![channel_group()])
    }

    pub fn station_group() -> StationGroup {
        StationGroup::new(
            STATION_GROUP.to_string(),
            t(0),
            StationGroupData {
                description: "primary seismic network".to_string(),
                effective_until: None,
                stations: vec![station()],
            },
        )
    }

    /// A station whose sub-graph changes at four distinct instants.
    ///
    /// The station takes effect at the first instant, its channel group at
    /// the second, the channel at the third and the response at the fourth.
    pub fn changing_station() -> (Station, [Timestamp; 4]) {
        let times = [t(0), t(100), t(200), t(300)];
        let [t0, t1, t2, t3] = times;
        let response = response_at(t3, 0.5);
        let channel = channel_at(t2, Some(response));
        let group = channel_group_at(t1, vec![channel]);
        (station_at(t0, vec![group]), times)
    }
}

// ============================================================================
// IN-MEMORY NETWORK
// ============================================================================

pub mod network {
    //! Repositories and a waveform-id lookup loaded with a station network.

    use super::fixtures::{self, ARID, WFID};
    use super::*;
    use stadef_storage::VersionedRepository;
    use std::sync::Arc;

    /// One in-memory repository per kind plus the waveform-id lookup.
    #[derive(Debug, Clone, Default)]
    pub struct TestNetwork {
        pub station_groups: Arc<InMemoryRepository<StationGroupData>>,
        pub stations: Arc<InMemoryRepository<StationData>>,
        pub channel_groups: Arc<InMemoryRepository<ChannelGroupData>>,
        pub channels: Arc<InMemoryRepository<ChannelData>>,
        pub responses: Arc<InMemoryRepository<ResponseData>>,
        pub waveform_ids: Arc<InMemoryWaveformIdLookup>,
    }

    impl TestNetwork {
        /// Empty repositories.
        pub fn empty() -> Self {
            Self::default()
        }

        /// The fixture station group and everything below it, with waveform
        /// [`WFID`] mapped to the fixture channel and response.
        pub fn standard() -> StadefResult<Self> {
            let network = Self::empty();
            network.load_station_group(&fixtures::station_group())?;

            let channel = fixtures::channel();
            let response = fixtures::response();
            network.channels.register_waveform(WFID, channel.id.clone())?;
            network.responses.register_waveform(WFID, response.id)?;
            network.waveform_ids.register_response(WFID, &response)?;
            network
                .waveform_ids
                .register_derived_channel(TagName::Arid, ARID, WFID, &channel)?;
            Ok(network)
        }

        /// The station from [`fixtures::changing_station`] and its sub-graph.
        pub fn changing() -> StadefResult<(Self, [Timestamp; 4])> {
            let network = Self::empty();
            let (station, times) = fixtures::changing_station();
            network.load_station(&station)?;
            Ok((network, times))
        }

        /// Store `group` and every present entity below it.
        pub fn load_station_group(&self, group: &StationGroup) -> StadefResult<()> {
            self.station_groups.store(std::slice::from_ref(group))?;
            for station in group.data().iter().flat_map(|data| &data.stations) {
                self.load_station(station)?;
            }
            Ok(())
        }

        /// Store `station` and every present entity below it.
        pub fn load_station(&self, station: &Station) -> StadefResult<()> {
            if !station.is_present() {
                return Ok(());
            }
            self.stations.store(std::slice::from_ref(station))?;
            let Some(data) = station.data() else {
                return Ok(());
            };
            for group in &data.channel_groups {
                self.load_channel_group(group)?;
            }
            for channel in &data.all_raw_channels {
                self.load_channel(channel)?;
            }
            Ok(())
        }

        pub fn load_channel_group(&self, group: &ChannelGroup) -> StadefResult<()> {
            if !group.is_present() {
                return Ok(());
            }
            self.channel_groups.store(std::slice::from_ref(group))?;
            for channel in group.data().iter().flat_map(|data| &data.channels) {
                self.load_channel(channel)?;
            }
            Ok(())
        }

        pub fn load_channel(&self, channel: &Channel) -> StadefResult<()> {
            if !channel.is_present() {
                return Ok(());
            }
            self.channels.store(std::slice::from_ref(channel))?;
            match channel.data().and_then(|data| data.response.as_ref()) {
                Some(response) if response.is_present() => self.responses.store(std::slice::from_ref(response)),
                _ => Ok(()),
            }
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for versioned station definition entities.
    //!
    //! Every generated version is present and has an `effective_at` within
    //! a million seconds of the fixture epoch.

    use super::fixtures::t;
    use super::*;
    use proptest::prelude::*;

    /// Generate a Timestamp within the fixture range.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (0i64..1_000_000).prop_map(t)
    }

    pub fn arb_response() -> impl Strategy<Value = Response> {
        (any::<u128>(), arb_timestamp(), 0.01f64..10.0).prop_map(|(id, at, calibration_factor)| {
            Response::new(
                Uuid::from_u128(id),
                at,
                ResponseData {
                    calibration: Calibration {
                        calibration_period_sec: 1.0,
                        calibration_factor,
                    },
                    effective_until: None,
                },
            )
        })
    }

    pub fn arb_channel() -> impl Strategy<Value = Channel> {
        (
            "[A-Z]{3,5}\\.[A-Z0-9]{4}\\.[BHS]H[ZNE]",
            arb_timestamp(),
            prop::option::of(arb_response()),
        )
            .prop_map(|(name, at, response)| {
                let station = name.split('.').next().unwrap_or_default().to_string();
                Channel::new(
                    name,
                    at,
                    ChannelData {
                        description: "generated".to_string(),
                        station,
                        nominal_sample_rate_hz: 40.0,
                        effective_until: None,
                        response,
                    },
                )
            })
    }

    pub fn arb_channel_group() -> impl Strategy<Value = ChannelGroup> {
        (
            "[A-Z]{2}[0-9]{2}",
            arb_timestamp(),
            prop::collection::vec(arb_channel(), 0..4),
        )
            .prop_map(|(name, at, channels)| {
                ChannelGroup::new(
                    name,
                    at,
                    ChannelGroupData {
                        description: "generated".to_string(),
                        location: None,
                        group_type: ChannelGroupType::ProcessingGroup,
                        effective_until: None,
                        channels,
                    },
                )
            })
    }

    /// Generate a fully hydrated Station.
    pub fn arb_station() -> impl Strategy<Value = Station> {
        (
            "[A-Z]{3,5}",
            arb_timestamp(),
            prop::collection::vec(arb_channel_group(), 0..3),
        )
            .prop_map(|(name, at, channel_groups)| {
                let all_raw_channels = StationData::flatten_channels(&channel_groups);
                Station::new(
                    name,
                    at,
                    StationData {
                        station_type: StationType::Seismic1Component,
                        description: "generated".to_string(),
                        location: fixtures::location(),
                        effective_until: None,
                        channel_groups,
                        all_raw_channels,
                    },
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::network::TestNetwork;
    use super::*;
    use stadef_storage::VersionedRepository;

    #[test]
    fn test_standard_network_loads_every_kind() {
        let network = TestNetwork::standard().unwrap();
        assert_eq!(network.station_groups.version_count().unwrap(), 1);
        assert_eq!(network.stations.version_count().unwrap(), 1);
        assert_eq!(network.channel_groups.version_count().unwrap(), 1);
        assert_eq!(network.channels.version_count().unwrap(), 1);
        assert_eq!(network.responses.version_count().unwrap(), 1);
    }

    #[test]
    fn test_changing_network_versions() {
        let (network, [_, t1, t2, t3]) = TestNetwork::changing().unwrap();
        let groups = network
            .channel_groups
            .find_by_id_and_time(&[fixtures::CHANNEL_GROUP.to_string()], t1)
            .unwrap();
        assert_eq!(groups[0].effective_at, Some(t1));
        assert!(network
            .channels
            .find_by_id_and_time(&[fixtures::CHANNEL.to_string()], t1)
            .unwrap()
            .is_empty());
        assert_eq!(
            network.responses.find_by_id_and_time(&[fixtures::RESPONSE_ID], t3).unwrap()[0].effective_at,
            Some(t3)
        );
        assert_eq!(
            network.channels.find_by_id_and_time(&[fixtures::CHANNEL.to_string()], t2).unwrap()[0].effective_at,
            Some(t2)
        );
    }
}
