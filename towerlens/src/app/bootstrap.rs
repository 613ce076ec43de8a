//! Application assembly.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::info;

use super::config::{AppConfig, KnownStorage};
use super::error::AppError;
use crate::backend::{HttpTowerBackend, TowerBackend};
use crate::classifier::{Classification, NewTowerClassifier};
use crate::coordinator::{FetchOutcome, ViewportCoordinator};
use crate::entity_cache::SpatialEntityCache;
use crate::known::{FileKnownStore, KnownCacheError, KnownTowerStore, MemoryKnownStore, TowerKnownCache};
use crate::scheduler::{CameraPosition, QueryScheduler};
use crate::tower::TowerKey;

/// Maximum classifications run concurrently by [`TowerLensApp::classify_all`].
pub const MAX_CONCURRENT_CLASSIFICATIONS: usize = 8;

/// One map session: a viewport coordinator and a new-tower classifier
/// sharing a backend.
///
/// ```ignore
/// let app = TowerLensApp::start(AppConfig::default()).await?;
/// let outcome = app.on_camera_idle(camera).await;
/// let towers = app.coordinator().current_entities();
/// app.shutdown();
/// ```
pub struct TowerLensApp {
    coordinator: ViewportCoordinator,
    classifier: NewTowerClassifier,
}

impl TowerLensApp {
    /// Build the HTTP backend and open the known-tower store described by
    /// `config`.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let backend = HttpTowerBackend::with_timeout(&config.backend_url, config.backend_timeout)?;
        let store = open_store(&config.known_storage).await?;
        info!(
            backend = %backend.base_url(),
            known = ?config.known_storage,
            "TowerLens started"
        );
        Self::with_parts(config, Arc::new(backend), store)
    }

    /// Assemble from explicit collaborators.
    pub fn with_parts(
        config: AppConfig,
        backend: Arc<dyn TowerBackend>,
        store: Arc<dyn KnownTowerStore>,
    ) -> Result<Self, AppError> {
        let cache = SpatialEntityCache::new(config.entity_capacity)?;
        let coordinator = ViewportCoordinator::new(
            Arc::clone(&backend),
            QueryScheduler::new(config.scheduler.clone()),
            cache,
            config.query_params.clone(),
        );
        let classifier = NewTowerClassifier::new(TowerKnownCache::new(store), backend)
            .with_retention(config.retention);

        Ok(Self {
            coordinator,
            classifier,
        })
    }

    pub fn coordinator(&self) -> &ViewportCoordinator {
        &self.coordinator
    }

    pub fn classifier(&self) -> &NewTowerClassifier {
        &self.classifier
    }

    pub fn known_cache(&self) -> &TowerKnownCache {
        self.classifier.known_cache()
    }

    /// Feed a camera-idle event observed now.
    pub async fn on_camera_idle(&self, camera: CameraPosition) -> FetchOutcome {
        self.coordinator.on_camera_idle(camera, Instant::now()).await
    }

    /// Classify a tower observed now.
    pub async fn classify_tower(&self, key: TowerKey) -> Classification {
        self.classifier.classify(key, Utc::now()).await
    }

    /// Classify a batch of observations, preserving input order.
    pub async fn classify_all(&self, keys: Vec<TowerKey>) -> Vec<(TowerKey, Classification)> {
        let now = Utc::now();
        stream::iter(keys)
            .map(|key| async move { (key, self.classifier.classify(key, now).await) })
            .buffered(MAX_CONCURRENT_CLASSIFICATIONS)
            .collect()
            .await
    }

    /// End the session.
    pub fn shutdown(&self) {
        self.coordinator.dispose();
    }
}

async fn open_store(storage: &KnownStorage) -> Result<Arc<dyn KnownTowerStore>, AppError> {
    match storage {
        KnownStorage::Memory => Ok(Arc::new(MemoryKnownStore::new())),
        KnownStorage::File(path) => {
            let path = path.clone();
            let store = tokio::task::spawn_blocking(move || FileKnownStore::open(path))
                .await
                .map_err(|e| KnownCacheError::TaskFailed(e.to_string()))??;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockTowerBackend;
    use crate::backend::Existence;
    use crate::geo::{LatLon, ViewportBounds};
    use crate::tower::{CellIdentity, RadioTech, TowerRecord};
    use tempfile::TempDir;

    fn memory_app(backend: Arc<MockTowerBackend>) -> TowerLensApp {
        TowerLensApp::with_parts(
            AppConfig::default().with_known_storage(KnownStorage::Memory),
            backend,
            Arc::new(MemoryKnownStore::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_camera_idle_and_classify_share_backend() {
        let backend = Arc::new(MockTowerBackend::new());
        backend.set_towers(vec![TowerRecord::new(
            CellIdentity::new(262, 1, 5, 9),
            RadioTech::Gsm,
            LatLon::new(52.51, 13.39),
        )]);
        backend.set_existence(Existence::NotFound);
        let app = memory_app(backend.clone());

        let camera = CameraPosition::new(ViewportBounds::new(52.55, 52.45, 13.45, 13.35), 13.0);
        assert!(app.on_camera_idle(camera).await.is_fetched());

        let key = app.coordinator().current_entities()[0].key();
        assert_eq!(app.classify_tower(key).await, Classification::New);
        assert_eq!(app.classify_tower(key).await, Classification::Known);
        assert_eq!(backend.exists_calls(), 1);
    }

    #[tokio::test]
    async fn test_classify_all_preserves_order() {
        let backend = Arc::new(MockTowerBackend::new());
        backend.set_existence(Existence::NotFound);
        let app = memory_app(backend);

        let keys: Vec<TowerKey> = (1..=20)
            .map(|cell| TowerKey::new(RadioTech::Lte, 310, 260, 1, cell))
            .collect();
        let results = app.classify_all(keys.clone()).await;

        let returned: Vec<TowerKey> = results.iter().map(|(k, _)| *k).collect();
        assert_eq!(returned, keys);
        assert!(results.iter().all(|(_, c)| *c == Classification::New));
    }

    #[tokio::test]
    async fn test_zero_capacity_rejected() {
        let mut config = AppConfig::default();
        config.entity_capacity = 0;
        let result = TowerLensApp::with_parts(
            config,
            Arc::new(MockTowerBackend::new()),
            Arc::new(MemoryKnownStore::new()),
        );
        assert!(matches!(result, Err(AppError::EntityCache(_))));
    }

    #[tokio::test]
    async fn test_start_with_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::default()
            .with_known_storage(KnownStorage::File(temp_dir.path().join("known.bin")));

        let app = TowerLensApp::start(config).await.unwrap();
        assert_eq!(app.known_cache().len().await.unwrap(), 0);

        app.shutdown();
        assert!(app.coordinator().is_disposed());
    }
}
