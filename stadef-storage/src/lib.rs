//! stadef Storage - Repository Traits, In-Memory Repositories and Caches
//!
//! Defines the repository abstraction the accessors fall back to, the
//! waveform-id lookup collaborator, an in-memory repository implementation,
//! and the version and request caches.

pub mod cache;

pub use cache::{CacheStats, RangeEntry, RangeMap, RequestCache, VersionCache};

use stadef_core::{
    require_ordered, version_in_effect, Channel, ChannelData, EntityData, Response, ResponseData,
    StadefError, StadefResult, StorageError, TagName, Timestamp, ValidationError, Versioned,
    WaveformId,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// ============================================================================
// REPOSITORY TRAITS
// ============================================================================

/// Backing store for one entity kind.
///
/// Repositories return fully constructed entities. Failures propagate
/// unchanged through every accessor layer.
pub trait VersionedRepository<D: EntityData>: Send + Sync {
    /// Versions of `ids` in effect at `time`. Unknown ids are skipped.
    fn find_by_id_and_time(&self, ids: &[D::Id], time: Timestamp) -> StadefResult<Vec<Versioned<D>>>;

    /// Versions of `ids` whose validity intersects `[start, end]`.
    fn find_by_id_and_time_range(
        &self,
        ids: &[D::Id],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Versioned<D>>>;

    /// Persist versions.
    fn store(&self, entities: &[Versioned<D>]) -> StadefResult<()>;
}

/// Channel lookup for a set of legacy waveform records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WfdiscChannelQuery {
    pub wfids: Vec<WaveformId>,
    pub record_type: Option<TagName>,
    pub record_id: Option<i64>,
    pub filter_id: Option<i64>,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl WfdiscChannelQuery {
    /// Reject queries missing waveform ids, a record type or a record id.
    pub fn validate(&self) -> StadefResult<()> {
        if self.wfids.is_empty() {
            return Err(StadefError::missing("wfids"));
        }
        if self.record_type.is_none() {
            return Err(StadefError::missing("record_type"));
        }
        if self.record_id.is_none() {
            return Err(StadefError::missing("record_id"));
        }
        require_ordered(self.start, self.end)
    }
}

pub trait ChannelRepository: VersionedRepository<ChannelData> {
    /// Channel derived from legacy waveform records.
    fn load_channel_from_wfdisc(&self, query: &WfdiscChannelQuery) -> StadefResult<Channel>;
}

pub trait ResponseRepository: VersionedRepository<ResponseData> {
    /// Response attached to one legacy waveform record.
    fn load_response_from_wfdisc(&self, wfid: WaveformId) -> StadefResult<Response>;
}

/// Maps legacy waveform identifiers to entity identities.
pub trait WaveformIdLookup: Send + Sync {
    /// Response reference recorded for `wfid`.
    fn response_for_wfid(&self, wfid: WaveformId) -> StadefResult<Option<Response>>;

    /// Derived channel reference recorded for a record and waveform.
    fn derived_channel_for_record(
        &self,
        record_type: TagName,
        record_id: i64,
        wfid: WaveformId,
    ) -> StadefResult<Option<Channel>>;
}

fn poisoned<T>(_: T) -> StadefError {
    StadefError::Storage(StorageError::LockPoisoned)
}

// ============================================================================
// IN-MEMORY REPOSITORY
// ============================================================================

/// In-memory repository for one entity kind.
#[derive(Debug)]
pub struct InMemoryRepository<D: EntityData> {
    versions: Arc<RwLock<HashMap<D::Id, Vec<Versioned<D>>>>>,
    waveforms: Arc<RwLock<HashMap<WaveformId, D::Id>>>,
}

impl<D: EntityData> Default for InMemoryRepository<D> {
    fn default() -> Self {
        Self {
            versions: Arc::new(RwLock::new(HashMap::new())),
            waveforms: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<D: EntityData> InMemoryRepository<D> {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `entities`.
    pub fn with_entities(entities: &[Versioned<D>]) -> StadefResult<Self> {
        let repository = Self::new();
        repository.store(entities)?;
        Ok(repository)
    }

    /// Record that waveform `wfid` belongs to entity `id`.
    pub fn register_waveform(&self, wfid: WaveformId, id: D::Id) -> StadefResult<()> {
        self.waveforms.write().map_err(poisoned)?.insert(wfid, id);
        Ok(())
    }

    /// Total number of stored versions.
    pub fn version_count(&self) -> StadefResult<usize> {
        Ok(self.versions.read().map_err(poisoned)?.values().map(Vec::len).sum())
    }

    /// Clear all stored data.
    pub fn clear(&self) -> StadefResult<()> {
        self.versions.write().map_err(poisoned)?.clear();
        self.waveforms.write().map_err(poisoned)?.clear();
        Ok(())
    }

    fn id_for_wfid(&self, wfid: WaveformId) -> StadefResult<D::Id> {
        self.waveforms
            .read()
            .map_err(poisoned)?
            .get(&wfid)
            .cloned()
            .ok_or_else(|| {
                StadefError::Storage(StorageError::NotFound {
                    kind: D::KIND,
                    id: format!("wfid {}", wfid),
                })
            })
    }

    fn latest(&self, id: &D::Id) -> StadefResult<Option<Versioned<D>>> {
        let versions = self.versions.read().map_err(poisoned)?;
        Ok(versions
            .get(id)
            .and_then(|versions| versions.iter().max_by_key(|version| version.effective_at))
            .cloned())
    }

    fn in_effect(&self, id: &D::Id, time: Timestamp) -> StadefResult<Option<Versioned<D>>> {
        let versions = self.versions.read().map_err(poisoned)?;
        Ok(versions
            .get(id)
            .and_then(|versions| version_in_effect(versions, id, time))
            .cloned())
    }
}

/// End of a version's validity, bounded by the start of the next version.
fn effective_end<D: EntityData>(versions: &[Versioned<D>], index: usize) -> Option<Timestamp> {
    let next_start = versions.get(index + 1).and_then(|next| next.effective_at);
    match (versions[index].effective_until(), next_start) {
        (Some(until), Some(next)) => Some(until.min(next)),
        (until, next) => until.or(next),
    }
}

impl<D: EntityData> VersionedRepository<D> for InMemoryRepository<D> {
    fn find_by_id_and_time(&self, ids: &[D::Id], time: Timestamp) -> StadefResult<Vec<Versioned<D>>> {
        let versions = self.versions.read().map_err(poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                let history = versions.get(id)?;
                (0..history.len())
                    .rev()
                    .find(|&index| {
                        history[index].effective_at.is_some_and(|start| start <= time)
                            && effective_end(history, index).map_or(true, |end| time < end)
                    })
                    .map(|index| history[index].clone())
            })
            .collect())
    }

    fn find_by_id_and_time_range(
        &self,
        ids: &[D::Id],
        start: Timestamp,
        end: Timestamp,
    ) -> StadefResult<Vec<Versioned<D>>> {
        require_ordered(start, end)?;
        let versions = self.versions.read().map_err(poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| versions.get(id))
            .flat_map(|history| {
                (0..history.len())
                    .filter(|&index| {
                        history[index].effective_at.is_some_and(|at| at <= end)
                            && effective_end(history, index).map_or(true, |until| until > start)
                    })
                    .map(|index| history[index].clone())
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    fn store(&self, entities: &[Versioned<D>]) -> StadefResult<()> {
        let mut versions = self.versions.write().map_err(poisoned)?;
        for entity in entities {
            if entity.effective_at.is_none() {
                return Err(StadefError::Validation(ValidationError::RequiredFieldMissing {
                    field: format!("{} {} effective_at", D::KIND, entity.id),
                }));
            }
            let history = versions.entry(entity.id.clone()).or_default();
            history.retain(|existing| existing.effective_at != entity.effective_at);
            history.push(entity.clone());
            history.sort_by_key(|version| version.effective_at);
        }
        tracing::debug!(kind = %D::KIND, count = entities.len(), "Stored versions");
        Ok(())
    }
}

impl ChannelRepository for InMemoryRepository<ChannelData> {
    fn load_channel_from_wfdisc(&self, query: &WfdiscChannelQuery) -> StadefResult<Channel> {
        query.validate()?;
        let id = self.id_for_wfid(query.wfids[0])?;
        self.in_effect(&id, query.start)?.ok_or_else(|| {
            StadefError::Storage(StorageError::NotFound {
                kind: ChannelData::KIND,
                id,
            })
        })
    }
}

impl ResponseRepository for InMemoryRepository<ResponseData> {
    fn load_response_from_wfdisc(&self, wfid: WaveformId) -> StadefResult<Response> {
        let id = self.id_for_wfid(wfid)?;
        self.latest(&id)?.ok_or_else(|| {
            StadefError::Storage(StorageError::NotFound {
                kind: ResponseData::KIND,
                id: id.to_string(),
            })
        })
    }
}

// ============================================================================
// IN-MEMORY WAVEFORM ID LOOKUP
// ============================================================================

/// In-memory waveform-id lookup.
#[derive(Debug, Default)]
pub struct InMemoryWaveformIdLookup {
    responses: RwLock<HashMap<WaveformId, Response>>,
    derived_channels: RwLock<HashMap<(TagName, i64, WaveformId), Channel>>,
}

impl InMemoryWaveformIdLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the response for `wfid`, stored as a reference.
    pub fn register_response(&self, wfid: WaveformId, response: &Response) -> StadefResult<()> {
        self.responses
            .write()
            .map_err(poisoned)?
            .insert(wfid, response.to_version_reference());
        Ok(())
    }

    /// Record the derived channel for a record and waveform, stored as a reference.
    pub fn register_derived_channel(
        &self,
        record_type: TagName,
        record_id: i64,
        wfid: WaveformId,
        channel: &Channel,
    ) -> StadefResult<()> {
        self.derived_channels
            .write()
            .map_err(poisoned)?
            .insert((record_type, record_id, wfid), channel.to_version_reference());
        Ok(())
    }
}

impl WaveformIdLookup for InMemoryWaveformIdLookup {
    fn response_for_wfid(&self, wfid: WaveformId) -> StadefResult<Option<Response>> {
        Ok(self.responses.read().map_err(poisoned)?.get(&wfid).cloned())
    }

    fn derived_channel_for_record(
        &self,
        record_type: TagName,
        record_id: i64,
        wfid: WaveformId,
    ) -> StadefResult<Option<Channel>> {
        Ok(self
            .derived_channels
            .read()
            .map_err(poisoned)?
            .get(&(record_type, record_id, wfid))
            .cloned())
    }
}

// =============================================================================
// TESTS
// =============================================================================
