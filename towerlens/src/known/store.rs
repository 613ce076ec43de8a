//! Durable storage backends for the known-tower cache.
//!
//! Stores are synchronous and may block on I/O. [`TowerKnownCache`] moves
//! every call onto the blocking thread pool, so implementations never need
//! to care about the async runtime.
//!
//! [`TowerKnownCache`]: super::TowerKnownCache

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::KnownCacheError;
use crate::tower::TowerKey;

/// Version tag written into persisted snapshots.
const STORE_FORMAT_VERSION: u32 = 1;

/// One known tower and when it was last seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownTowerEntry {
    pub key: TowerKey,
    pub last_seen: DateTime<Utc>,
}

/// Key-value storage of tower keys to last-seen timestamps.
pub trait KnownTowerStore: Send + Sync {
    /// Last-seen time of `key`, if stored.
    fn get(&self, key: &TowerKey) -> Result<Option<DateTime<Utc>>, KnownCacheError>;

    /// Insert or replace the last-seen time of `key`.
    fn put(&self, key: TowerKey, last_seen: DateTime<Utc>) -> Result<(), KnownCacheError>;

    /// Remove `key`. Returns whether it was present.
    fn delete(&self, key: &TowerKey) -> Result<bool, KnownCacheError>;

    /// Remove every entry last seen strictly before `cutoff`.
    /// Returns the number of entries removed.
    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, KnownCacheError>;

    /// Remove every entry.
    fn clear(&self) -> Result<(), KnownCacheError>;

    fn len(&self) -> Result<usize, KnownCacheError>;

    /// All entries, most recently seen first.
    fn entries(&self) -> Result<Vec<KnownTowerEntry>, KnownCacheError>;
}

fn sorted_newest_first(mut entries: Vec<KnownTowerEntry>) -> Vec<KnownTowerEntry> {
    entries.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then(a.key.cmp(&b.key)));
    entries
}

/// Non-persistent store, for tests and sessions without a data directory.
#[derive(Debug, Default)]
pub struct MemoryKnownStore {
    entries: DashMap<TowerKey, DateTime<Utc>>,
}

impl MemoryKnownStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KnownTowerStore for MemoryKnownStore {
    fn get(&self, key: &TowerKey) -> Result<Option<DateTime<Utc>>, KnownCacheError> {
        Ok(self.entries.get(key).map(|entry| *entry.value()))
    }

    fn put(&self, key: TowerKey, last_seen: DateTime<Utc>) -> Result<(), KnownCacheError> {
        self.entries.insert(key, last_seen);
        Ok(())
    }

    fn delete(&self, key: &TowerKey) -> Result<bool, KnownCacheError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, KnownCacheError> {
        let before = self.entries.len();
        self.entries.retain(|_, last_seen| *last_seen >= cutoff);
        Ok(before.saturating_sub(self.entries.len()))
    }

    fn clear(&self) -> Result<(), KnownCacheError> {
        self.entries.clear();
        Ok(())
    }

    fn len(&self) -> Result<usize, KnownCacheError> {
        Ok(self.entries.len())
    }

    fn entries(&self) -> Result<Vec<KnownTowerEntry>, KnownCacheError> {
        let entries = self
            .entries
            .iter()
            .map(|e| KnownTowerEntry {
                key: *e.key(),
                last_seen: *e.value(),
            })
            .collect();
        Ok(sorted_newest_first(entries))
    }
}

/// On-disk snapshot layout.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedKnownTowers {
    version: u32,
    /// Tower keys with last-seen time in milliseconds since the Unix epoch.
    entries: Vec<(TowerKey, i64)>,
}

/// Store persisted as a single bincode file.
///
/// The whole table is kept in memory and rewritten after every mutation,
/// first to a temporary sibling file which is then renamed over the
/// original. A crash mid-write leaves the previous snapshot intact.
#[derive(Debug)]
pub struct FileKnownStore {
    path: PathBuf,
    entries: Mutex<HashMap<TowerKey, DateTime<Utc>>>,
}

impl FileKnownStore {
    /// Open the store at `path`, creating an empty one if the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, KnownCacheError> {
        let path = path.into();
        let entries = match fs::File::open(&path) {
            Ok(file) => load_snapshot(&path, file)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No known-tower file yet, starting empty");
                HashMap::new()
            }
            Err(source) => return Err(KnownCacheError::Io { path, source }),
        };

        info!(
            path = %path.display(),
            entries = entries.len(),
            "Opened known-tower store"
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the table while the caller holds the lock, so writes reach
    /// disk in the order they were applied.
    fn persist(&self, entries: &HashMap<TowerKey, DateTime<Utc>>) -> Result<(), KnownCacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| KnownCacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let snapshot = PersistedKnownTowers {
            version: STORE_FORMAT_VERSION,
            entries: entries
                .iter()
                .map(|(key, seen)| (*key, seen.timestamp_millis()))
                .collect(),
        };

        let temp_path = self.path.with_extension("tmp");
        let io_err = |source| KnownCacheError::Io {
            path: temp_path.clone(),
            source,
        };
        let file = fs::File::create(&temp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &snapshot)
            .map_err(|e| KnownCacheError::Encode(e.to_string()))?;
        writer.flush().map_err(io_err)?;

        fs::rename(&temp_path, &self.path).map_err(|source| KnownCacheError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn load_snapshot(
    path: &Path,
    file: fs::File,
) -> Result<HashMap<TowerKey, DateTime<Utc>>, KnownCacheError> {
    let corrupt = |reason: String| KnownCacheError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let snapshot: PersistedKnownTowers =
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| corrupt(e.to_string()))?;
    if snapshot.version != STORE_FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported format version {}",
            snapshot.version
        )));
    }

    snapshot
        .entries
        .into_iter()
        .map(|(key, millis)| {
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|seen| (key, seen))
                .ok_or_else(|| corrupt(format!("timestamp {} out of range", millis)))
        })
        .collect()
}

impl KnownTowerStore for FileKnownStore {
    fn get(&self, key: &TowerKey) -> Result<Option<DateTime<Utc>>, KnownCacheError> {
        Ok(self.entries.lock().get(key).copied())
    }

    fn put(&self, key: TowerKey, last_seen: DateTime<Utc>) -> Result<(), KnownCacheError> {
        let mut entries = self.entries.lock();
        entries.insert(key, last_seen);
        self.persist(&entries)
    }

    fn delete(&self, key: &TowerKey) -> Result<bool, KnownCacheError> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&entries)?;
        Ok(true)
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, KnownCacheError> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, last_seen| *last_seen >= cutoff);
        let removed = before - entries.len();
        if removed > 0 {
            self.persist(&entries)?;
        }
        Ok(removed)
    }

    fn clear(&self) -> Result<(), KnownCacheError> {
        let mut entries = self.entries.lock();
        entries.clear();
        self.persist(&entries)
    }

    fn len(&self) -> Result<usize, KnownCacheError> {
        Ok(self.entries.lock().len())
    }

    fn entries(&self) -> Result<Vec<KnownTowerEntry>, KnownCacheError> {
        let entries = self
            .entries
            .lock()
            .iter()
            .map(|(key, last_seen)| KnownTowerEntry {
                key: *key,
                last_seen: *last_seen,
            })
            .collect();
        Ok(sorted_newest_first(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tower::RadioTech;
    use chrono::Duration;
    use tempfile::TempDir;

    fn key(cell_id: u64) -> TowerKey {
        TowerKey::new(RadioTech::Lte, 310, 260, 4242, cell_id)
    }

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    /// Behaviour every store must share.
    fn exercise_store(store: &dyn KnownTowerStore) {
        assert_eq!(store.get(&key(1)).unwrap(), None);

        store.put(key(1), at(1_000)).unwrap();
        store.put(key(2), at(2_000)).unwrap();
        store.put(key(3), at(3_000)).unwrap();
        assert_eq!(store.get(&key(1)).unwrap(), Some(at(1_000)));
        assert_eq!(store.len().unwrap(), 3);

        // Upsert
        store.put(key(1), at(5_000)).unwrap();
        assert_eq!(store.get(&key(1)).unwrap(), Some(at(5_000)));
        assert_eq!(store.len().unwrap(), 3);

        let order: Vec<u64> = store
            .entries()
            .unwrap()
            .iter()
            .map(|e| e.key.identity.cell_id)
            .collect();
        assert_eq!(order, vec![1, 3, 2]);

        // Strictly older than the cutoff is removed; equal is kept
        assert_eq!(store.prune_older_than(at(3_000)).unwrap(), 1);
        assert_eq!(store.get(&key(2)).unwrap(), None);
        assert_eq!(store.get(&key(3)).unwrap(), Some(at(3_000)));

        assert!(store.delete(&key(3)).unwrap());
        assert!(!store.delete(&key(3)).unwrap());

        store.clear().unwrap();
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn test_memory_store_contract() {
        exercise_store(&MemoryKnownStore::new());
    }

    #[test]
    fn test_file_store_contract() {
        let dir = TempDir::new().unwrap();
        let store = FileKnownStore::open(dir.path().join("known.bin")).unwrap();
        exercise_store(&store);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("known.bin");

        {
            let store = FileKnownStore::open(&path).unwrap();
            store.put(key(1), at(1_000)).unwrap();
            store.put(key(2), at(2_000)).unwrap();
            store.delete(&key(2)).unwrap();
        }

        let reopened = FileKnownStore::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
        assert_eq!(reopened.get(&key(1)).unwrap(), Some(at(1_000)));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileKnownStore::open(dir.path().join("absent.bin")).unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("known.bin");
        fs::write(&path, b"definitely not bincode").unwrap();

        let err = FileKnownStore::open(&path).unwrap_err();
        assert!(matches!(err, KnownCacheError::Corrupt { .. }), "got {:?}", err);
    }

    #[test]
    fn test_prune_with_retention_window() {
        let store = MemoryKnownStore::new();
        let now = at(10 * 24 * 3_600_000);
        let retention = Duration::hours(48);

        store.put(key(1), now - Duration::hours(72)).unwrap();
        store.put(key(2), now - Duration::hours(49)).unwrap();
        store.put(key(3), now - Duration::hours(47)).unwrap();
        store.put(key(4), now).unwrap();

        let removed = store.prune_older_than(now - retention).unwrap();
        assert_eq!(removed, 2);
        let remaining: Vec<u64> = store
            .entries()
            .unwrap()
            .iter()
            .map(|e| e.key.identity.cell_id)
            .collect();
        assert_eq!(remaining, vec![4, 3]);
    }
}
