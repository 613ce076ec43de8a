//! Decides whether an observed tower is new to the remote dataset.
//!
//! ```text
//! CHECK_LOCAL ──hit──────────────────────────────────────────► KNOWN
//!     │
//!    miss
//!     ▼
//! CHECK_REMOTE ──► NEW | KNOWN | UNKNOWN_ASSUME_KNOWN ──► CACHE_WRITE ──► PRUNE
//! ```
//!
//! Every observed tower is written to the known cache whatever the remote
//! answered, so the same tower is checked remotely at most once per
//! retention window. Ambiguous answers and failures degrade to
//! [`Classification::Known`]: a missed "new tower" alert is preferable to a
//! false one.
//!
//! Concurrent classifications of the same key are not deduplicated. Both
//! may reach the remote; the cache converges either way.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::backend::{Existence, TowerBackend};
use crate::known::{default_retention, TowerKnownCache};
use crate::tower::TowerKey;

/// Result of classifying one observed tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Neither this device nor the remote has seen the tower.
    New,
    Known,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::New => f.write_str("new"),
            Classification::Known => f.write_str("known"),
        }
    }
}

/// Path a classification took, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationTrace {
    /// Placeholder identity reported by the modem; never checked.
    Implausible,
    /// Served from the known cache.
    LocalHit,
    RemoteNotFound,
    RemoteFound,
    /// The remote answered with an unexpected status.
    RemoteAmbiguous(u16),
    /// The existence check failed.
    RemoteFailed,
}

impl ClassificationTrace {
    pub fn classification(&self) -> Classification {
        match self {
            ClassificationTrace::RemoteNotFound => Classification::New,
            _ => Classification::Known,
        }
    }
}

/// Classifies observed towers as new or known.
pub struct NewTowerClassifier {
    known: TowerKnownCache,
    backend: Arc<dyn TowerBackend>,
    retention: Duration,
}

impl NewTowerClassifier {
    pub fn new(known: TowerKnownCache, backend: Arc<dyn TowerBackend>) -> Self {
        Self {
            known,
            backend,
            retention: default_retention(),
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn known_cache(&self) -> &TowerKnownCache {
        &self.known
    }

    /// Classify `key` observed at `now`. Never fails.
    pub async fn classify(&self, key: TowerKey, now: DateTime<Utc>) -> Classification {
        self.classify_traced(key, now).await.classification()
    }

    /// Like [`classify`](Self::classify), returning the path taken.
    pub async fn classify_traced(&self, key: TowerKey, now: DateTime<Utc>) -> ClassificationTrace {
        if !key.is_plausible() {
            debug!(tower = %key, "Skipping implausible tower identity");
            return ClassificationTrace::Implausible;
        }

        match self.known.lookup(key).await {
            Ok(Some(last_seen)) => {
                debug!(tower = %key, last_seen = %last_seen, "Tower already known locally");
                return ClassificationTrace::LocalHit;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(tower = %key, error = %e, "Known-tower lookup failed, checking remote");
            }
        }

        let trace = match self.backend.check_tower_exists(&key).await {
            Ok(Existence::NotFound) => ClassificationTrace::RemoteNotFound,
            Ok(Existence::Found) => ClassificationTrace::RemoteFound,
            Ok(Existence::Unexpected(status)) => {
                warn!(tower = %key, status, "Unexpected existence response, assuming known");
                ClassificationTrace::RemoteAmbiguous(status)
            }
            Err(e) => {
                warn!(tower = %key, error = %e, "Existence check failed, assuming known");
                ClassificationTrace::RemoteFailed
            }
        };

        if let Err(e) = self.known.insert(key, now).await {
            warn!(tower = %key, error = %e, "Failed to record known tower");
        }

        match now.checked_sub_signed(self.retention) {
            Some(cutoff) => {
                if let Err(e) = self.known.prune_older_than(cutoff).await {
                    warn!(error = %e, "Failed to prune known towers");
                }
            }
            None => debug!(retention = %self.retention, "Retention window exceeds time range, skipping prune"),
        }

        debug!(tower = %key, trace = ?trace, result = %trace.classification(), "Classified tower");
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockTowerBackend;
    use crate::known::{KnownCacheError, KnownTowerEntry, KnownTowerStore};
    use crate::tower::RadioTech;
    use chrono::TimeZone;

    fn key(cell_id: u64) -> TowerKey {
        TowerKey::new(RadioTech::Lte, 310, 260, 12345, cell_id)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (Arc<MockTowerBackend>, NewTowerClassifier) {
        let backend = Arc::new(MockTowerBackend::new());
        let classifier = NewTowerClassifier::new(TowerKnownCache::in_memory(), backend.clone());
        (backend, classifier)
    }

    #[tokio::test]
    async fn test_known_locally_makes_no_remote_call() {
        let (backend, classifier) = setup();
        backend.set_existence(Existence::NotFound);
        classifier.known_cache().insert(key(1), now()).await.unwrap();

        let trace = classifier.classify_traced(key(1), now()).await;

        assert_eq!(trace, ClassificationTrace::LocalHit);
        assert_eq!(backend.exists_calls(), 0);
    }

    #[tokio::test]
    async fn test_new_then_known() {
        let (backend, classifier) = setup();
        backend.set_existence(Existence::NotFound);

        assert_eq!(classifier.classify(key(1), now()).await, Classification::New);
        assert_eq!(
            classifier.classify(key(1), now() + Duration::minutes(5)).await,
            Classification::Known
        );
        assert_eq!(backend.exists_calls(), 1);
    }

    #[tokio::test]
    async fn test_remote_found_is_known_and_recorded() {
        let (backend, classifier) = setup();
        backend.set_existence(Existence::Found);

        assert_eq!(classifier.classify(key(1), now()).await, Classification::Known);
        assert_eq!(
            classifier.known_cache().lookup(key(1)).await.unwrap(),
            Some(now())
        );
    }

    #[tokio::test]
    async fn test_unexpected_status_fails_safe() {
        let (backend, classifier) = setup();
        backend.set_existence(Existence::Unexpected(503));

        let trace = classifier.classify_traced(key(1), now()).await;
        assert_eq!(trace, ClassificationTrace::RemoteAmbiguous(503));
        assert_eq!(trace.classification(), Classification::Known);
    }

    #[tokio::test]
    async fn test_remote_failure_fails_safe_and_records() {
        let (backend, classifier) = setup();
        backend.fail_existence("connection refused");

        let trace = classifier.classify_traced(key(1), now()).await;
        assert_eq!(trace, ClassificationTrace::RemoteFailed);
        assert!(classifier.known_cache().lookup(key(1)).await.unwrap().is_some());

        // Second observation is served locally
        assert_eq!(
            classifier.classify_traced(key(1), now()).await,
            ClassificationTrace::LocalHit
        );
        assert_eq!(backend.exists_calls(), 1);
    }

    #[tokio::test]
    async fn test_implausible_key_skips_everything() {
        let (backend, classifier) = setup();
        backend.set_existence(Existence::NotFound);
        let placeholder = TowerKey::new(RadioTech::Lte, 0, 0, 0, 0);

        let trace = classifier.classify_traced(placeholder, now()).await;
        assert_eq!(trace, ClassificationTrace::Implausible);
        assert_eq!(backend.exists_calls(), 0);
        assert_eq!(classifier.known_cache().len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_classification_prunes_expired_entries() {
        let (backend, classifier) = setup();
        backend.set_existence(Existence::Found);
        let stale = now() - Duration::hours(49);
        let fresh = now() - Duration::hours(47);
        classifier.known_cache().insert(key(1), stale).await.unwrap();
        classifier.known_cache().insert(key(2), fresh).await.unwrap();

        classifier.classify(key(3), now()).await;

        let known = classifier.known_cache();
        assert_eq!(known.lookup(key(1)).await.unwrap(), None);
        assert_eq!(known.lookup(key(2)).await.unwrap(), Some(fresh));
        assert_eq!(known.lookup(key(3)).await.unwrap(), Some(now()));
    }

    #[tokio::test]
    async fn test_custom_retention() {
        let (backend, classifier) = setup();
        let classifier = classifier.with_retention(Duration::hours(1));
        backend.set_existence(Existence::Found);
        classifier
            .known_cache()
            .insert(key(1), now() - Duration::hours(2))
            .await
            .unwrap();

        classifier.classify(key(2), now()).await;
        assert_eq!(classifier.known_cache().lookup(key(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_retention_beyond_time_range_skips_prune() {
        let (backend, classifier) = setup();
        let classifier = classifier.with_retention(Duration::MAX);
        backend.set_existence(Existence::NotFound);
        classifier
            .known_cache()
            .insert(key(1), now() - Duration::days(365))
            .await
            .unwrap();

        assert_eq!(classifier.classify(key(2), now()).await, Classification::New);
        assert!(classifier.known_cache().lookup(key(1)).await.unwrap().is_some());
        assert!(classifier.known_cache().lookup(key(2)).await.unwrap().is_some());
    }

    /// Store whose every operation fails.
    struct BrokenStore;

    impl KnownTowerStore for BrokenStore {
        fn get(&self, _: &TowerKey) -> Result<Option<DateTime<Utc>>, KnownCacheError> {
            Err(KnownCacheError::Encode("disk gone".into()))
        }
        fn put(&self, _: TowerKey, _: DateTime<Utc>) -> Result<(), KnownCacheError> {
            Err(KnownCacheError::Encode("disk gone".into()))
        }
        fn delete(&self, _: &TowerKey) -> Result<bool, KnownCacheError> {
            Err(KnownCacheError::Encode("disk gone".into()))
        }
        fn prune_older_than(&self, _: DateTime<Utc>) -> Result<usize, KnownCacheError> {
            Err(KnownCacheError::Encode("disk gone".into()))
        }
        fn clear(&self) -> Result<(), KnownCacheError> {
            Err(KnownCacheError::Encode("disk gone".into()))
        }
        fn len(&self) -> Result<usize, KnownCacheError> {
            Err(KnownCacheError::Encode("disk gone".into()))
        }
        fn entries(&self) -> Result<Vec<KnownTowerEntry>, KnownCacheError> {
            Err(KnownCacheError::Encode("disk gone".into()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_falls_through_to_remote() {
        let backend = Arc::new(MockTowerBackend::new());
        backend.set_existence(Existence::NotFound);
        let classifier = NewTowerClassifier::new(
            TowerKnownCache::new(Arc::new(BrokenStore)),
            backend.clone(),
        );

        assert_eq!(classifier.classify(key(1), now()).await, Classification::New);
        assert_eq!(backend.exists_calls(), 1);
    }
}
