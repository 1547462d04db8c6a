//! Entity-caching accessor
//!
//! Serves lookups from a [`VersionCache`] of individual entity versions and
//! falls back to a delegate accessor on a miss. One generic engine handles
//! every kind; the per-kind differences (which children a payload holds) live
//! in the [`Hierarchy`] impls at the bottom of this file.
//!
//! Versions are cached with their children reduced to entity references, and
//! the children are cached under their own kinds in the same pass. Reads
//! re-hydrate children through this accessor at the query time, so cached
//! parents never hold faceted-down or stale copies of their children.
//!
//! Only versions whose validity touches the operational window are cached,
//! and point lookups outside the window always go to the delegate.

use crate::accessor::{AccessorKind, StationDefinitionAccessor};
use stadef_core::{
    cache_key, distinct_versions, require_name, require_ordered, sort_versions, version_in_effect, Channel,
    ChannelData, ChannelGroup, ChannelGroupData, EntityData, OperationalWindow, Response, ResponseData,
    ResponseId, StadefError, StadefResult, Station, StationData, StationDefinitionConfig,
    StationDefinitionObject, StationGroup, StationGroupData, StorageError, Timestamp, Versioned,
    WaveformId,
};
use stadef_storage::{VersionCache, WaveformIdLookup, WfdiscChannelQuery};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

pub struct EntityCachingStationDefinitionAccessor {
    delegate: Arc<dyn StationDefinitionAccessor>,
    waveform_ids: Arc<dyn WaveformIdLookup>,
    version_cache: VersionCache<StationDefinitionObject>,
    operational_window: RwLock<OperationalWindow>,
}

impl EntityCachingStationDefinitionAccessor {
    /// Create an accessor whose operational window is resolved from `config` against the current time.
    pub fn new(
        delegate: Arc<dyn StationDefinitionAccessor>,
        waveform_ids: Arc<dyn WaveformIdLookup>,
        config: &StationDefinitionConfig,
    ) -> StadefResult<Self> {
        config.validate()?;
        let window = config.operational_window(chrono::Utc::now())?;
        Ok(Self::with_window(delegate, waveform_ids, window))
    }

    pub fn with_window(
        delegate: Arc<dyn StationDefinitionAccessor>,
        waveform_ids: Arc<dyn WaveformIdLookup>,
        window: OperationalWindow,
    ) -> Self {
        tracing::info!(start = ?window.start, end = ?window.end, "Entity caching accessor created");
        Self {
            delegate,
            waveform_ids,
            version_cache: VersionCache::new(),
            operational_window: RwLock::new(window),
        }
    }

    pub fn operational_window(&self) -> StadefResult<OperationalWindow> {
        self.operational_window
            .read()
            .map(|window| *window)
            .map_err(|_| StadefError::Storage(StorageError::LockPoisoned))
    }

    fn set_operational_window(&self, window: OperationalWindow) -> StadefResult<()> {
        let mut current = self
            .operational_window
            .write()
            .map_err(|_| StadefError::Storage(StorageError::LockPoisoned))?;
        *current = window;
        Ok(())
    }

    /// The underlying version cache.
    pub fn version_cache(&self) -> &VersionCache<StationDefinitionObject> {
        &self.version_cache
    }

    // ========================================================================
    // GENERIC ENGINE
    // ========================================================================

    fn cached_at<D: Hierarchy>(&self, id: &D::Id, time: Timestamp, window: &OperationalWindow) -> Option<Versioned<D>> {
        if !window.contains(time) {
            return None;
        }
        let key = cache_key(D::KIND, id);
        if !self.version_cache.has_key(&key) {
            return None;
        }
        let object = self.version_cache.get(&key, time)?;
        downcast::<D>(&key, &object)
    }

    /// Versions of `ids` in effect at `time`, hydrated at `time`.
    fn find_at<D: Hierarchy>(&self, ids: &[D::Id], time: Timestamp) -> StadefResult<Vec<Versioned<D>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let window = self.operational_window()?;

        let mut cached = Vec::new();
        let mut misses = Vec::new();
        for id in unique(ids) {
            match self.cached_at::<D>(&id, time, &window) {
                Some(entity) => cached.push(entity),
                None => misses.push(id),
            }
        }
        tracing::debug!(kind = %D::KIND, hits = cached.len(), misses = misses.len(), "Point lookup");

        let mut uncached = Vec::new();
        if !misses.is_empty() {
            let fetched = D::find_at(self.delegate.as_ref(), &misses, time)?;
            self.absorb(fetched, &window, &mut cached, &mut uncached);
        }

        let mut found = D::hydrate_at(self, cached, time)?;
        found.extend(uncached);
        Ok(found)
    }

    /// Versions of `ids` intersecting `[start, end]`, each hydrated at its own start (or `start`).
    fn find_between<D: Hierarchy>(
        &self,
        ids: &[D::Id],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Versioned<D>>> {
        require_ordered(start, end)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let window = self.operational_window()?;

        let mut cached = Vec::new();
        let mut uncached = Vec::new();
        let mut misses = Vec::new();

        if !(window.contains(start) && window.contains(end)) {
            misses = unique(ids);
        } else {
            for id in unique(ids) {
                let key = cache_key(D::KIND, &id);
                let Some(range_map) = self.version_cache.get_range_map(&key).filter(|map| !map.is_empty()) else {
                    misses.push(id);
                    continue;
                };

                cached.extend(
                    range_map
                        .overlapping(start, end)
                        .iter()
                        .filter_map(|entry| downcast::<D>(&key, &entry.value)),
                );

                for (gap_start, gap_end) in range_map.gaps(start, end) {
                    tracing::debug!(kind = %D::KIND, key = %key, %gap_start, %gap_end, "Fetching range gap");
                    let fetched = D::find_between(self.delegate.as_ref(), &[id.clone()], gap_start, gap_end)?;
                    self.absorb(fetched, &window, &mut cached, &mut uncached);
                }
            }
        }

        tracing::debug!(kind = %D::KIND, cached = cached.len(), misses = misses.len(), "Range lookup");
        if !misses.is_empty() {
            let fetched = D::find_between(self.delegate.as_ref(), &misses, start, end)?;
            self.absorb(fetched, &window, &mut cached, &mut uncached);
        }

        let mut found = self.hydrate_versions(distinct_versions(cached), start)?;
        found.extend(uncached);
        let mut found = distinct_versions(found);
        sort_versions(&mut found);
        Ok(found)
    }

    /// Hydrate versions in batches sharing a hydration time.
    fn hydrate_versions<D: Hierarchy>(
        &self,
        entities: Vec<Versioned<D>>,
        start: Timestamp,
    ) -> StadefResult<Vec<Versioned<D>>> {
        let mut batches: BTreeMap<Timestamp, Vec<Versioned<D>>> = BTreeMap::new();
        for entity in entities {
            let at = entity.effective_at.map_or(start, |at| at.max(start));
            batches.entry(at).or_default().push(entity);
        }

        let mut hydrated = Vec::new();
        for (at, batch) in batches {
            hydrated.extend(D::hydrate_at(self, batch, at)?);
        }
        Ok(hydrated)
    }

    /// Cache freshly fetched versions, sorting them into cached (normalized) and uncached.
    fn absorb<D: Hierarchy>(
        &self,
        fetched: Vec<Versioned<D>>,
        window: &OperationalWindow,
        cached: &mut Vec<Versioned<D>>,
        uncached: &mut Vec<Versioned<D>>,
    ) {
        for entity in fetched {
            if self.cache_entity(&entity, window) {
                cached.push(D::normalize(&entity));
            } else {
                uncached.push(entity);
            }
        }
    }

    /// Cache a present version and its present children. Returns false if nothing was cached.
    fn cache_entity<D: Hierarchy>(&self, entity: &Versioned<D>, window: &OperationalWindow) -> bool {
        let Some((start, end)) = entity.validity() else {
            tracing::warn!(kind = %D::KIND, id = %entity.id, "Entity reference cannot be cached");
            return false;
        };
        if !entity.is_present() || !window.is_connected(start, end) {
            return false;
        }

        D::cache_children(self, entity, window);
        self.version_cache
            .put(&entity.cache_key(), start, end, D::normalize(entity).into_object());
        true
    }

    /// Write through to the delegate, then cache what was stored.
    fn store<D: Hierarchy>(&self, entities: &[Versioned<D>]) -> StadefResult<()> {
        D::store(self.delegate.as_ref(), entities)?;
        let window = self.operational_window()?;
        let mut cached = 0;
        for entity in entities {
            if self.cache_entity(entity, &window) {
                cached += 1;
            }
        }
        tracing::debug!(kind = %D::KIND, stored = entities.len(), cached, "Stored versions");
        Ok(())
    }
}

fn downcast<D: EntityData>(key: &str, object: &StationDefinitionObject) -> Option<Versioned<D>> {
    let entity = D::from_object(object).cloned();
    if entity.is_none() {
        tracing::warn!(key, expected = %D::KIND, actual = %object.kind(), "Cached value has unexpected kind");
    }
    entity
}

fn unique<I: Clone + Ord>(ids: &[I]) -> Vec<I> {
    ids.iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ============================================================================
// ACCESSOR IMPLEMENTATION
// ============================================================================

impl StationDefinitionAccessor for EntityCachingStationDefinitionAccessor {
    fn find_station_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<StationGroup>> {
        self.find_at::<StationGroupData>(names, time)
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
        self.store(station_groups)
    }

    fn find_stations_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Station>> {
        self.find_at::<StationData>(names, time)
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
        self.store(stations)
    }

    fn find_channel_groups_by_name_and_time(
        &self,
        names: &[String],
        time: Timestamp,
    ) -> StadefResult<Vec<ChannelGroup>> {
        self.find_at::<ChannelGroupData>(names, time)
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
        self.store(channel_groups)
    }

    fn find_channels_by_name_and_time(&self, names: &[String], time: Timestamp) -> StadefResult<Vec<Channel>> {
        self.find_at::<ChannelData>(names, time)
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
        self.store(channels)
    }

    fn load_channel_from_wfdisc(&self, query: &WfdiscChannelQuery) -> StadefResult<Channel> {
        query.validate()?;
        let (Some(record_type), Some(record_id)) = (query.record_type, query.record_id) else {
            return Err(StadefError::missing("record_type"));
        };

        let mapped = self
            .waveform_ids
            .derived_channel_for_record(record_type, record_id, query.wfids[0])?;
        if let Some(mapped) = mapped {
            match mapped.effective_at {
                Some(at) => {
                    let key = cache_key(ChannelData::KIND, &mapped.id);
                    if let Some(channel) = self
                        .version_cache
                        .get(&key, at)
                        .and_then(|object| downcast::<ChannelData>(&key, &object))
                    {
                        let mut hydrated = ChannelData::hydrate_at(self, vec![channel], at)?;
                        if let Some(channel) = hydrated.pop() {
                            return Ok(channel);
                        }
                    }
                }
                None => {
                    tracing::warn!(channel = %mapped.id, "Mapped derived channel is an entity reference");
                }
            }
        }

        let channel = self.delegate.load_channel_from_wfdisc(&WfdiscChannelQuery {
            filter_id: None,
            ..query.clone()
        })?;
        let window = self.operational_window()?;
        self.cache_entity(&channel, &window);
        Ok(channel)
    }

    fn find_responses_by_id(&self, ids: &[ResponseId], time: Timestamp) -> StadefResult<Vec<Response>> {
        self.find_at::<ResponseData>(ids, time)
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
        self.store(responses)
    }

    fn load_response_from_wfdisc(&self, wfid: WaveformId) -> StadefResult<Response> {
        if let Some(mapped) = self.waveform_ids.response_for_wfid(wfid)? {
            let key = cache_key(ResponseData::KIND, &mapped.id);
            let cached = match mapped.effective_at {
                Some(at) => self.version_cache.get(&key, at),
                None => self.version_cache.get_latest(&key),
            };
            if let Some(response) = cached.and_then(|object| downcast::<ResponseData>(&key, &object)) {
                return Ok(response);
            }
        }

        let response = self.delegate.load_response_from_wfdisc(wfid)?;
        let window = self.operational_window()?;
        self.cache_entity(&response, &window);
        Ok(response)
    }

    fn cache(&self, station_group_names: &[String], start: Timestamp, end: Timestamp) -> StadefResult<()> {
        if station_group_names.is_empty() {
            return Err(StadefError::missing("station_group_names"));
        }
        for name in station_group_names {
            require_name("station_group_names", name)?;
        }
        require_ordered(start, end)?;

        tracing::info!(station_groups = station_group_names.len(), %start, %end, "Populating cache");
        self.set_operational_window(OperationalWindow::between(start, end))?;
        self.version_cache.clear();

        tracing::info!("Caching station groups");
        let station_groups = self.find_between::<StationGroupData>(station_group_names, start, end)?;

        let station_names = child_ids(station_groups.iter().filter_map(Versioned::data).flat_map(|d| &d.stations));
        tracing::info!(count = station_names.len(), "Caching stations");
        let stations = self.find_between::<StationData>(&station_names, start, end)?;

        let group_names = child_ids(stations.iter().filter_map(Versioned::data).flat_map(|d| &d.channel_groups));
        tracing::info!(count = group_names.len(), "Caching channel groups");
        let channel_groups = self.find_between::<ChannelGroupData>(&group_names, start, end)?;

        let channel_names = child_ids(
            channel_groups
                .iter()
                .filter_map(Versioned::data)
                .flat_map(|d| &d.channels)
                .chain(stations.iter().filter_map(Versioned::data).flat_map(|d| &d.all_raw_channels)),
        );
        tracing::info!(count = channel_names.len(), "Caching channels");
        let channels = self.find_between::<ChannelData>(&channel_names, start, end)?;

        let response_ids = child_ids(
            channels
                .iter()
                .filter_map(Versioned::data)
                .filter_map(|d| d.response.as_ref()),
        );
        tracing::info!(count = response_ids.len(), "Caching responses");
        self.find_between::<ResponseData>(&response_ids, start, end)?;

        tracing::info!(keys = self.version_cache.len(), "Cache populated");
        Ok(())
    }
}

// ============================================================================
// PER-KIND HIERARCHY
// ============================================================================

/// How one kind's payload holds its children.
trait Hierarchy: AccessorKind {
    /// Copy with every child reduced to an entity reference.
    fn normalize(entity: &Versioned<Self>) -> Versioned<Self>;

    /// Cache the present children of `entity` under their own kinds.
    fn cache_children(
        accessor: &EntityCachingStationDefinitionAccessor,
        entity: &Versioned<Self>,
        window: &OperationalWindow,
    );

    /// Replace child references with the child versions in effect at `time`.
    fn hydrate_at(
        accessor: &EntityCachingStationDefinitionAccessor,
        entities: Vec<Versioned<Self>>,
        time: Timestamp,
    ) -> StadefResult<Vec<Versioned<Self>>>;
}

fn references<D: EntityData>(children: &[Versioned<D>]) -> Vec<Versioned<D>> {
    children.iter().map(Versioned::to_entity_reference).collect()
}

fn child_ids<'a, D: EntityData>(children: impl Iterator<Item = &'a Versioned<D>>) -> Vec<D::Id> {
    children
        .map(|child| child.id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Swap each child for its fetched version, keeping the reference when none was found.
fn resolve<D: EntityData>(children: &[Versioned<D>], fetched: &[Versioned<D>], time: Timestamp) -> Vec<Versioned<D>> {
    children
        .iter()
        .map(|child| {
            version_in_effect(fetched, &child.id, time)
                .or_else(|| fetched.iter().find(|candidate| candidate.id == child.id))
                .cloned()
                .unwrap_or_else(|| child.clone())
        })
        .collect()
}

fn cache_present<D: Hierarchy>(
    accessor: &EntityCachingStationDefinitionAccessor,
    children: &[Versioned<D>],
    window: &OperationalWindow,
) {
    for child in children.iter().filter(|child| child.is_present()) {
        accessor.cache_entity(child, window);
    }
}

impl Hierarchy for StationGroupData {
    fn normalize(entity: &Versioned<Self>) -> Versioned<Self> {
        entity.clone().map_data(|data| StationGroupData {
            stations: references(&data.stations),
            ..data
        })
    }

    fn cache_children(
        accessor: &EntityCachingStationDefinitionAccessor,
        entity: &Versioned<Self>,
        window: &OperationalWindow,
    ) {
        if let Some(data) = entity.data() {
            cache_present(accessor, &data.stations, window);
        }
    }

    fn hydrate_at(
        accessor: &EntityCachingStationDefinitionAccessor,
        entities: Vec<Versioned<Self>>,
        time: Timestamp,
    ) -> StadefResult<Vec<Versioned<Self>>> {
        let ids = child_ids(entities.iter().filter_map(Versioned::data).flat_map(|d| &d.stations));
        let stations = accessor.find_at::<StationData>(&ids, time)?;
        Ok(entities
            .into_iter()
            .map(|group| {
                group.map_data(|data| StationGroupData {
                    stations: resolve(&data.stations, &stations, time),
                    ..data
                })
            })
            .collect())
    }
}

impl Hierarchy for StationData {
    fn normalize(entity: &Versioned<Self>) -> Versioned<Self> {
        entity.clone().map_data(|data| StationData {
            channel_groups: references(&data.channel_groups),
            all_raw_channels: references(&data.all_raw_channels),
            ..data
        })
    }

    fn cache_children(
        accessor: &EntityCachingStationDefinitionAccessor,
        entity: &Versioned<Self>,
        window: &OperationalWindow,
    ) {
        if let Some(data) = entity.data() {
            cache_present(accessor, &data.channel_groups, window);
            cache_present(accessor, &data.all_raw_channels, window);
        }
    }

    fn hydrate_at(
        accessor: &EntityCachingStationDefinitionAccessor,
        entities: Vec<Versioned<Self>>,
        time: Timestamp,
    ) -> StadefResult<Vec<Versioned<Self>>> {
        let group_ids = child_ids(entities.iter().filter_map(Versioned::data).flat_map(|d| &d.channel_groups));
        let channel_ids = child_ids(entities.iter().filter_map(Versioned::data).flat_map(|d| &d.all_raw_channels));
        let groups = accessor.find_at::<ChannelGroupData>(&group_ids, time)?;
        let channels = accessor.find_at::<ChannelData>(&channel_ids, time)?;
        Ok(entities
            .into_iter()
            .map(|station| {
                station.map_data(|data| StationData {
                    channel_groups: resolve(&data.channel_groups, &groups, time),
                    all_raw_channels: resolve(&data.all_raw_channels, &channels, time),
                    ..data
                })
            })
            .collect())
    }
}

impl Hierarchy for ChannelGroupData {
    fn normalize(entity: &Versioned<Self>) -> Versioned<Self> {
        entity.clone().map_data(|data| ChannelGroupData {
            channels: references(&data.channels),
            ..data
        })
    }

    fn cache_children(
        accessor: &EntityCachingStationDefinitionAccessor,
        entity: &Versioned<Self>,
        window: &OperationalWindow,
    ) {
        if let Some(data) = entity.data() {
            cache_present(accessor, &data.channels, window);
        }
    }

    fn hydrate_at(
        accessor: &EntityCachingStationDefinitionAccessor,
        entities: Vec<Versioned<Self>>,
        time: Timestamp,
    ) -> StadefResult<Vec<Versioned<Self>>> {
        let ids = child_ids(entities.iter().filter_map(Versioned::data).flat_map(|d| &d.channels));
        let channels = accessor.find_at::<ChannelData>(&ids, time)?;
        Ok(entities
            .into_iter()
            .map(|group| {
                group.map_data(|data| ChannelGroupData {
                    channels: resolve(&data.channels, &channels, time),
                    ..data
                })
            })
            .collect())
    }
}

impl Hierarchy for ChannelData {
    fn normalize(entity: &Versioned<Self>) -> Versioned<Self> {
        entity.clone().map_data(|data| ChannelData {
            response: data.response.as_ref().map(Versioned::to_entity_reference),
            ..data
        })
    }

    fn cache_children(
        accessor: &EntityCachingStationDefinitionAccessor,
        entity: &Versioned<Self>,
        window: &OperationalWindow,
    ) {
        if let Some(response) = entity.data().and_then(|data| data.response.as_ref()) {
            cache_present(accessor, std::slice::from_ref(response), window);
        }
    }

    fn hydrate_at(
        accessor: &EntityCachingStationDefinitionAccessor,
        entities: Vec<Versioned<Self>>,
        time: Timestamp,
    ) -> StadefResult<Vec<Versioned<Self>>> {
        let ids = child_ids(
            entities
                .iter()
                .filter_map(Versioned::data)
                .filter_map(|d| d.response.as_ref()),
        );
        let responses = accessor.find_at::<ResponseData>(&ids, time)?;
        Ok(entities
            .into_iter()
            .map(|channel| {
                channel.map_data(|data| ChannelData {
                    response: data
                        .response
                        .as_ref()
                        .and_then(|response| resolve(std::slice::from_ref(response), &responses, time).pop()),
                    ..data
                })
            })
            .collect())
    }
}

impl Hierarchy for ResponseData {
    fn normalize(entity: &Versioned<Self>) -> Versioned<Self> {
        entity.clone()
    }

    fn cache_children(_: &EntityCachingStationDefinitionAccessor, _: &Versioned<Self>, _: &OperationalWindow) {}

    fn hydrate_at(
        _: &EntityCachingStationDefinitionAccessor,
        entities: Vec<Versioned<Self>>,
        _: Timestamp,
    ) -> StadefResult<Vec<Versioned<Self>>> {
        Ok(entities)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stadef_test_utils::fixtures::{self, t};

    #[test]
    fn test_normalize_reduces_children_to_entity_references() {
        let station = StationData::normalize(&fixtures::station());
        let data = station.data().unwrap();
        assert!(data
            .channel_groups
            .iter()
            .all(|group| group.effective_at.is_none() && !group.is_present()));
        assert!(data.all_raw_channels.iter().all(|channel| channel.effective_at.is_none()));

        let channel = ChannelData::normalize(&fixtures::channel());
        let response = channel.data().unwrap().response.as_ref().unwrap();
        assert_eq!(response, &fixtures::response().to_entity_reference());
    }

    #[test]
    fn test_resolve_prefers_version_in_effect() {
        let early = fixtures::channel_at(t(0), None);
        let late = fixtures::channel_at(t(100), None);
        let references = vec![early.to_entity_reference()];

        let resolved = resolve(&references, &[early.clone(), late.clone()], t(150));
        assert_eq!(resolved, vec![late]);

        let resolved = resolve(&references, &[early.clone()], t(50));
        assert_eq!(resolved, vec![early]);

        assert_eq!(resolve(&references, &[], t(50)), references);
    }

    #[test]
    fn test_unique_sorts_and_dedups() {
        let ids = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(unique(&ids), vec!["a".to_string(), "b".to_string()]);
    }
}
