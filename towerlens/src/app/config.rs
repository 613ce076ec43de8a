//! Configuration consumed by [`TowerLensApp`](super::TowerLensApp).

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigFile;
use crate::scheduler::SchedulerConfig;
use crate::tower::QueryParams;

/// Where the known-tower cache lives.
#[derive(Clone, Debug, PartialEq)]
pub enum KnownStorage {
    /// Persisted to a bincode file.
    File(PathBuf),
    /// Held in memory for the life of the process.
    Memory,
}

/// Everything needed to assemble the coordinator and classifier.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend_url: String,
    pub backend_timeout: Duration,
    pub query_params: QueryParams,
    pub scheduler: SchedulerConfig,
    pub entity_capacity: usize,
    pub known_storage: KnownStorage,
    pub retention: chrono::Duration,
}

impl AppConfig {
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            backend_url: config.backend.url.clone(),
            backend_timeout: config.backend.timeout(),
            query_params: QueryParams::default().with_source(config.backend.source.clone()),
            scheduler: config.viewport.scheduler_config(),
            entity_capacity: config.viewport.capacity,
            known_storage: KnownStorage::File(config.known.path.clone()),
            retention: config.known.retention(),
        }
    }

    pub fn with_query_params(mut self, params: QueryParams) -> Self {
        self.query_params = params;
        self
    }

    pub fn with_known_storage(mut self, storage: KnownStorage) -> Self {
        self.known_storage = storage;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_config_file(&ConfigFile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.backend.source = "survey".to_string();
        file.viewport.capacity = 10;
        file.known.retention_hours = 6;

        let config = AppConfig::from_config_file(&file);
        assert_eq!(config.query_params.source, "survey");
        assert_eq!(config.entity_capacity, 10);
        assert_eq!(config.retention, chrono::Duration::hours(6));
        assert_eq!(config.known_storage, KnownStorage::File(file.known.path.clone()));
    }

    #[test]
    fn test_oversized_retention_saturates() {
        let mut file = ConfigFile::default();
        file.known.retention_hours = 9_999_999_999_999;

        let config = AppConfig::from_config_file(&file);
        assert_eq!(config.retention, chrono::Duration::MAX);
    }
}
