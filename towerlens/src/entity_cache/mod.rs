//! Bounded, insertion-ordered working set of fetched entities.
//!
//! The map view renders whatever this cache holds. Each remote fetch is
//! merged in: entities are keyed by identity, a re-fetched entity replaces
//! the old one and moves to the newest position, and once the cache grows
//! past its capacity the oldest-inserted entities are evicted.
//!
//! # Eviction policy
//!
//! Strict insertion order. Reads do not refresh an entity and there is no
//! size weighting. Entities fetched longest ago tend to lie furthest from
//! the current viewport, which is what makes this policy adequate.
//!
//! # Concurrency
//!
//! Writers (`merge`, `clear`) are serialised on a mutex. After every write
//! an immutable snapshot is published, so [`SpatialEntityCache::snapshot`]
//! only clones an `Arc` and never observes a partially merged state.

pub mod ordered;

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::debug;

use ordered::InsertionOrderedMap;

/// Default maximum number of entities held in memory.
pub const DEFAULT_ENTITY_CAPACITY: usize = 7_500;

/// An entity with a stable identity used for deduplication.
pub trait Identified {
    type Id: Eq + Hash + Clone + fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Errors constructing an entity cache.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityCacheError {
    /// A cache that can hold nothing would discard every fetch.
    #[error("entity cache capacity must be at least 1")]
    ZeroCapacity,
}

/// Summary of one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Entities that were not present before.
    pub inserted: usize,
    /// Entities that replaced an existing entry with the same identity.
    pub refreshed: usize,
    /// Entities evicted to get back to capacity.
    pub evicted: usize,
    /// Cache size after the merge.
    pub size: usize,
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "merged {} new, {} refreshed, {} evicted, {} total",
            self.inserted, self.refreshed, self.evicted, self.size
        )
    }
}

/// Thread-safe bounded entity cache.
pub struct SpatialEntityCache<T: Identified> {
    capacity: usize,
    entries: Mutex<InsertionOrderedMap<T::Id, T>>,
    published: RwLock<Arc<[T]>>,
}

impl<T: Identified> fmt::Debug for SpatialEntityCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialEntityCache")
            .field("capacity", &self.capacity)
            .field("len", &self.published.read().len())
            .finish_non_exhaustive()
    }
}

impl<T> SpatialEntityCache<T>
where
    T: Identified + Clone,
{
    /// Create an empty cache holding at most `capacity` entities.
    pub fn new(capacity: usize) -> Result<Self, EntityCacheError> {
        if capacity == 0 {
            return Err(EntityCacheError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            entries: Mutex::new(InsertionOrderedMap::with_capacity(capacity)),
            published: RwLock::new(Arc::from(Vec::new())),
        })
    }

    /// Create an empty cache with [`DEFAULT_ENTITY_CAPACITY`].
    pub fn with_default_capacity() -> Self {
        Self {
            capacity: DEFAULT_ENTITY_CAPACITY,
            entries: Mutex::new(InsertionOrderedMap::with_capacity(DEFAULT_ENTITY_CAPACITY)),
            published: RwLock::new(Arc::from(Vec::new())),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Merge a fetch result.
    ///
    /// Every fetched entity becomes the newest entry, replacing any entity
    /// with the same identity. Afterwards the oldest entries are evicted
    /// until the cache is back at capacity.
    pub fn merge<I>(&self, fetched: I) -> MergeReport
    where
        I: IntoIterator<Item = T>,
    {
        let mut entries = self.entries.lock();
        let mut report = MergeReport::default();

        for entity in fetched {
            let id = entity.id().clone();
            match entries.insert_latest(id, entity) {
                Some(_) => report.refreshed += 1,
                None => report.inserted += 1,
            }
        }

        while entries.len() > self.capacity {
            if entries.pop_oldest().is_none() {
                break;
            }
            report.evicted += 1;
        }
        report.size = entries.len();

        self.publish(&entries);
        drop(entries);

        debug!(
            inserted = report.inserted,
            refreshed = report.refreshed,
            evicted = report.evicted,
            size = report.size,
            "Entity cache merge"
        );
        report
    }

    /// Remove every entity.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        self.publish(&entries);
        drop(entries);

        debug!(removed, "Entity cache cleared");
    }

    /// Entities in insertion order, oldest first.
    pub fn snapshot(&self) -> Arc<[T]> {
        Arc::clone(&self.published.read())
    }

    pub fn len(&self) -> usize {
        self.published.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an entity by identity.
    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.entries.lock().get(id).cloned()
    }

    /// Publish while still holding the writer lock so snapshots are
    /// published in the same order the writes happened.
    fn publish(&self, entries: &InsertionOrderedMap<T::Id, T>) {
        let snapshot: Arc<[T]> = entries.values().cloned().collect();
        *self.published.write() = snapshot;
    }
}
