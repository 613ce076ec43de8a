//! Settings structs, one per `[section]` of config.ini.

use std::path::PathBuf;
use std::time::Duration;

use crate::backend::{DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS};
use crate::entity_cache::DEFAULT_ENTITY_CAPACITY;
use crate::known::DEFAULT_RETENTION_HOURS;
use crate::scheduler::{
    SchedulerConfig, DEFAULT_CHANGE_THRESHOLD, DEFAULT_MAX_AREA_SQ_M, DEFAULT_MIN_INTERVAL,
    DEFAULT_MIN_ZOOM, DEFAULT_ZOOM_THRESHOLD,
};
use crate::tower::DEFAULT_SOURCE;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub backend: BackendSettings,
    pub viewport: ViewportSettings,
    pub known: KnownSettings,
    pub logging: LoggingSettings,
}

/// `[backend]`
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    /// Base URL of the tower service.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Dataset label sent with every query.
    pub source: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[viewport]`
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSettings {
    /// Maximum number of cached towers.
    pub capacity: usize,
    pub change_threshold: f64,
    pub zoom_threshold: f64,
    pub min_interval_ms: u64,
    pub min_zoom: f64,
    pub max_area_sq_m: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ENTITY_CAPACITY,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            zoom_threshold: DEFAULT_ZOOM_THRESHOLD,
            min_interval_ms: DEFAULT_MIN_INTERVAL.as_millis() as u64,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_area_sq_m: DEFAULT_MAX_AREA_SQ_M,
        }
    }
}

impl ViewportSettings {
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_change_threshold(self.change_threshold)
            .with_zoom_threshold(self.zoom_threshold)
            .with_min_interval(Duration::from_millis(self.min_interval_ms))
            .with_min_zoom(self.min_zoom)
            .with_max_area_sq_m(self.max_area_sq_m)
    }
}

/// `[known]`
#[derive(Debug, Clone, PartialEq)]
pub struct KnownSettings {
    /// Known-tower database file.
    pub path: PathBuf,
    pub retention_hours: i64,
}

impl Default for KnownSettings {
    fn default() -> Self {
        Self {
            path: super::config_directory().join("known_towers.bin"),
            retention_hours: DEFAULT_RETENTION_HOURS,
        }
    }
}

impl KnownSettings {
    /// Retention window. Saturates for values `parse_ini` would reject.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.retention_hours).unwrap_or(chrono::Duration::MAX)
    }
}

/// `[logging]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggingSettings {
    /// Directory for daily log files. Logs go to stderr only when unset.
    pub directory: Option<PathBuf>,
}
