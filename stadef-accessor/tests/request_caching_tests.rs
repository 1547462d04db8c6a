//! Request-caching accessor behaviour.

mod test_support;

use stadef_accessor::{RequestCachingStationDefinitionAccessor, StationDefinitionAccessor};
use stadef_core::{
    EntityKind, FacetingDefinition, StadefError, Station, StationDefinitionConfig, CHANNEL_GROUPS_KEY,
};
use stadef_test_utils::fixtures::{self, t};
use stadef_test_utils::network::TestNetwork;
use std::sync::Arc;
use test_support::{counting, entity_caching, Call, CountingAccessor};

fn request_caching(network: &TestNetwork) -> (Arc<CountingAccessor>, RequestCachingStationDefinitionAccessor) {
    let inner = counting(network);
    let accessor = RequestCachingStationDefinitionAccessor::new(inner.clone(), &StationDefinitionConfig::default())
        .unwrap();
    (inner, accessor)
}

fn station_names() -> Vec<String> {
    vec![fixtures::STATION.to_string()]
}

#[test]
fn test_repeated_request_served_from_cache() {
    let network = TestNetwork::standard().unwrap();
    let (inner, accessor) = request_caching(&network);

    let first = accessor.find_stations_by_name_and_time(&station_names(), t(100)).unwrap();
    let second = accessor.find_stations_by_name_and_time(&station_names(), t(100)).unwrap();
    assert_eq!(first, vec![fixtures::station()]);
    assert_eq!(second, first);
    assert_eq!(inner.call_count(), 1);

    let stats = accessor.stats().unwrap();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entry_count, 1);
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_different_time_is_a_different_request() {
    let network = TestNetwork::standard().unwrap();
    let (inner, accessor) = request_caching(&network);

    accessor.find_stations_by_name_and_time(&station_names(), t(100)).unwrap();
    accessor.find_stations_by_name_and_time(&station_names(), t(101)).unwrap();
    accessor
        .find_stations_by_name_and_time_range(&station_names(), t(0), t(100))
        .unwrap();
    assert_eq!(inner.call_count(), 3);
}

#[test]
fn test_facet_is_part_of_the_request() {
    let network = TestNetwork::standard().unwrap();
    let (inner, accessor) = request_caching(&network);
    let full = FacetingDefinition::populated(EntityKind::Station);
    let shallow = FacetingDefinition::populated(EntityKind::Station)
        .with_field(CHANNEL_GROUPS_KEY, FacetingDefinition::reference(EntityKind::ChannelGroup));

    let populated = accessor
        .find_stations_by_name_and_time_faceted(&station_names(), t(100), &full)
        .unwrap();
    let reduced = accessor
        .find_stations_by_name_and_time_faceted(&station_names(), t(100), &shallow)
        .unwrap();
    assert_eq!(inner.call_count(), 2);
    assert_ne!(populated, reduced);

    let reduced_again = accessor
        .find_stations_by_name_and_time_faceted(&station_names(), t(100), &shallow)
        .unwrap();
    assert_eq!(reduced_again, reduced);
    assert_eq!(inner.call_count(), 2);
}

#[test]
fn test_empty_results_are_not_served() {
    let network = TestNetwork::standard().unwrap();
    let (inner, accessor) = request_caching(&network);

    for _ in 0..2 {
        assert!(accessor
            .find_stations_by_name_and_time(&["NOPE".to_string()], t(100))
            .unwrap()
            .is_empty());
    }
    assert_eq!(inner.call_count(), 2);
}

#[test]
fn test_change_times_memoized() {
    let (network, [t0, t1, t2, t3]) = TestNetwork::changing().unwrap();
    let (inner, accessor) = request_caching(&network);
    let station = Station::entity_reference(fixtures::STATION.to_string());

    for _ in 0..2 {
        assert_eq!(
            accessor.determine_station_change_times(&station, t0, t3).unwrap(),
            vec![t3, t2, t1, t0]
        );
    }
    assert_eq!(
        inner.calls(),
        vec![Call::ChangeTimes {
            station: fixtures::STATION.to_string(),
        }]
    );
}

#[test]
fn test_failure_is_not_cached() {
    let network = TestNetwork::standard().unwrap();
    let (inner, accessor) = request_caching(&network);

    inner.set_failing(true);
    assert!(matches!(
        accessor.find_stations_by_name_and_time(&station_names(), t(100)),
        Err(StadefError::Storage(_))
    ));
    assert_eq!(accessor.stats().unwrap().entry_count, 0);

    inner.set_failing(false);
    assert_eq!(
        accessor.find_stations_by_name_and_time(&station_names(), t(100)).unwrap(),
        vec![fixtures::station()]
    );
}

#[test]
fn test_writes_pass_through_without_invalidation() {
    let network = TestNetwork::standard().unwrap();
    let (inner, accessor) = request_caching(&network);

    let before = accessor.find_stations_by_name_and_time(&station_names(), t(100)).unwrap();
    let renamed = fixtures::station().map_data(|data| stadef_core::StationData {
        description: "renamed".to_string(),
        ..data
    });
    accessor.store_stations(&[renamed]).unwrap();
    assert!(inner.calls().contains(&Call::Store {
        kind: EntityKind::Station,
        count: 1,
    }));

    let after = accessor.find_stations_by_name_and_time(&station_names(), t(100)).unwrap();
    assert_eq!(after, before);

    accessor.clear().unwrap();
    let refreshed = accessor.find_stations_by_name_and_time(&station_names(), t(100)).unwrap();
    assert_eq!(refreshed[0].data().unwrap().description, "renamed");
}

#[test]
fn test_capacity_evicts_oldest_request() {
    let network = TestNetwork::standard().unwrap();
    let inner = counting(&network);
    let accessor = RequestCachingStationDefinitionAccessor::with_capacity(inner.clone(), 1);

    accessor.find_stations_by_name_and_time(&station_names(), t(1)).unwrap();
    accessor.find_stations_by_name_and_time(&station_names(), t(2)).unwrap();
    accessor.find_stations_by_name_and_time(&station_names(), t(1)).unwrap();
    assert_eq!(inner.call_count(), 3);
    assert_eq!(accessor.stats().unwrap().evictions, 2);
}

#[test]
fn test_zero_capacity_config_rejected() {
    let network = TestNetwork::standard().unwrap();
    let config = StationDefinitionConfig {
        request_cache_capacity: 0,
        ..Default::default()
    };
    assert!(matches!(
        RequestCachingStationDefinitionAccessor::new(counting(&network), &config),
        Err(StadefError::Config(_))
    ));
}

#[test]
fn test_full_stack_matches_repositories() {
    let network = TestNetwork::standard().unwrap();
    let bottom = counting(&network);
    let entity_cache = Arc::new(entity_caching(&network, bottom.clone()));
    let accessor = RequestCachingStationDefinitionAccessor::with_capacity(entity_cache, 16);

    let group = accessor
        .find_station_groups_by_name_and_time(&[fixtures::STATION_GROUP.to_string()], t(100))
        .unwrap();
    assert_eq!(group, vec![fixtures::station_group()]);

    let stations = accessor.find_stations_by_name_and_time(&station_names(), t(100)).unwrap();
    assert_eq!(stations, vec![fixtures::station()]);
    assert_eq!(bottom.calls_for(EntityKind::Station).len(), 0);
    assert_eq!(bottom.call_count(), 1);
}
