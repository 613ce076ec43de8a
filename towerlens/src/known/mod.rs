//! Persisted cache of towers this device has already observed.
//!
//! Maps a [`TowerKey`] to the time it was last seen. The classifier
//! consults it before asking the backend whether a tower is new, so a
//! tower is checked remotely at most once per retention window.
//!
//! Entries older than the retention window (48 hours by default) are
//! removed by [`TowerKnownCache::prune_older_than`].

mod error;
mod store;

pub use error::KnownCacheError;
pub use store::{FileKnownStore, KnownTowerEntry, KnownTowerStore, MemoryKnownStore};

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::tower::TowerKey;

/// Default retention window in hours.
pub const DEFAULT_RETENTION_HOURS: i64 = 48;

/// Default retention window.
pub fn default_retention() -> Duration {
    Duration::hours(DEFAULT_RETENTION_HOURS)
}

/// Async front-end over a [`KnownTowerStore`].
///
/// Every store call runs on tokio's blocking pool, so the cache is safe to
/// use from any async task regardless of how slow the storage is.
#[derive(Clone)]
pub struct TowerKnownCache {
    store: Arc<dyn KnownTowerStore>,
}

impl std::fmt::Debug for TowerKnownCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TowerKnownCache").finish_non_exhaustive()
    }
}

impl TowerKnownCache {
    pub fn new(store: Arc<dyn KnownTowerStore>) -> Self {
        Self { store }
    }

    /// Cache backed by a [`MemoryKnownStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKnownStore::new()))
    }

    /// Last-seen time of `key`, if known.
    pub async fn lookup(&self, key: TowerKey) -> Result<Option<DateTime<Utc>>, KnownCacheError> {
        self.run(move |store| store.get(&key)).await
    }

    /// Record `key` as seen at `seen_at`, replacing any earlier time.
    pub async fn insert(&self, key: TowerKey, seen_at: DateTime<Utc>) -> Result<(), KnownCacheError> {
        self.run(move |store| store.put(key, seen_at)).await
    }

    /// Remove `key`. Returns whether it was present.
    pub async fn remove(&self, key: TowerKey) -> Result<bool, KnownCacheError> {
        self.run(move |store| store.delete(&key)).await
    }

    /// Delete every entry last seen before `cutoff`, returning how many went.
    pub async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, KnownCacheError> {
        let removed = self.run(move |store| store.prune_older_than(cutoff)).await?;
        if removed > 0 {
            debug!(removed, cutoff = %cutoff, "Pruned known towers");
        }
        Ok(removed)
    }

    /// Delete every entry.
    pub async fn clear_all(&self) -> Result<(), KnownCacheError> {
        self.run(|store| store.clear()).await?;
        debug!("Cleared known towers");
        Ok(())
    }

    pub async fn len(&self) -> Result<usize, KnownCacheError> {
        self.run(|store| store.len()).await
    }

    /// All entries, most recently seen first.
    pub async fn entries(&self) -> Result<Vec<KnownTowerEntry>, KnownCacheError> {
        self.run(|store| store.entries()).await
    }

    async fn run<T, F>(&self, op: F) -> Result<T, KnownCacheError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn KnownTowerStore) -> Result<T, KnownCacheError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| KnownCacheError::TaskFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tower::RadioTech;
    use chrono::TimeZone;

    fn key(cell_id: u64) -> TowerKey {
        TowerKey::new(RadioTech::Nr, 262, 1, 77, cell_id)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_miss_then_hit() {
        let cache = TowerKnownCache::in_memory();
        assert_eq!(cache.lookup(key(1)).await.unwrap(), None);

        cache.insert(key(1), now()).await.unwrap();
        assert_eq!(cache.lookup(key(1)).await.unwrap(), Some(now()));
    }

    #[tokio::test]
    async fn test_insert_is_upsert() {
        let cache = TowerKnownCache::in_memory();
        cache.insert(key(1), now()).await.unwrap();
        let later = now() + Duration::hours(1);
        cache.insert(key(1), later).await.unwrap();

        assert_eq!(cache.lookup(key(1)).await.unwrap(), Some(later));
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_prune_retention_window() {
        let cache = TowerKnownCache::in_memory();
        let cutoff = now() - default_retention();

        cache.insert(key(1), cutoff - Duration::seconds(1)).await.unwrap();
        cache.insert(key(2), cutoff).await.unwrap();
        cache.insert(key(3), now()).await.unwrap();

        assert_eq!(cache.prune_older_than(cutoff).await.unwrap(), 1);
        assert_eq!(cache.lookup(key(1)).await.unwrap(), None);
        assert!(cache.lookup(key(2)).await.unwrap().is_some());
        assert!(cache.lookup(key(3)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_all_and_remove() {
        let cache = TowerKnownCache::in_memory();
        cache.insert(key(1), now()).await.unwrap();
        cache.insert(key(2), now()).await.unwrap();

        assert!(cache.remove(key(1)).await.unwrap());
        assert_eq!(cache.len().await.unwrap(), 1);

        cache.clear_all().await.unwrap();
        assert!(cache.entries().await.unwrap().is_empty());
    }

    #[test]
    fn test_default_retention_is_48_hours() {
        assert_eq!(default_retention(), Duration::hours(48));
    }
}
