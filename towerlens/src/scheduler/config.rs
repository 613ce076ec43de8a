//! Scheduler thresholds.

use std::time::Duration;

use crate::geo::DEFAULT_BOUNDS_TOLERANCE_DEG;

/// Default relative viewport change (fraction of the old span) that
/// warrants a new query.
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.20;

/// Default zoom delta that warrants a new query regardless of bounds change.
pub const DEFAULT_ZOOM_THRESHOLD: f64 = 0.5;

/// Default minimum time between two dispatched queries.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Default lowest zoom level at which towers are queried.
pub const DEFAULT_MIN_ZOOM: f64 = 10.0;

/// Default largest approximate viewport area (square meters) to query.
///
/// With the squared-diagonal approximation this is a viewport whose
/// diagonal is about 100 km.
pub const DEFAULT_MAX_AREA_SQ_M: f64 = 1.0e10;

/// Thresholds used by [`QueryScheduler`](super::QueryScheduler).
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Relative bounds change required to re-query (0.2 == 20%).
    pub change_threshold: f64,

    /// Absolute zoom delta required to re-query.
    pub zoom_threshold: f64,

    /// Hard floor between dispatched queries.
    pub min_interval: Duration,

    /// Below this zoom level the viewport is "too zoomed out".
    pub min_zoom: f64,

    /// Above this approximate area the viewport is "too zoomed out".
    pub max_area_sq_m: f64,

    /// Edge tolerance for treating two viewports as the same, in degrees.
    pub bounds_tolerance_deg: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            zoom_threshold: DEFAULT_ZOOM_THRESHOLD,
            min_interval: DEFAULT_MIN_INTERVAL,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_area_sq_m: DEFAULT_MAX_AREA_SQ_M,
            bounds_tolerance_deg: DEFAULT_BOUNDS_TOLERANCE_DEG,
        }
    }
}

impl SchedulerConfig {
    pub fn with_change_threshold(mut self, threshold: f64) -> Self {
        self.change_threshold = threshold;
        self
    }

    pub fn with_zoom_threshold(mut self, threshold: f64) -> Self {
        self.zoom_threshold = threshold;
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn with_min_zoom(mut self, zoom: f64) -> Self {
        self.min_zoom = zoom;
        self
    }

    pub fn with_max_area_sq_m(mut self, area: f64) -> Self {
        self.max_area_sq_m = area;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.change_threshold, 0.20);
        assert_eq!(config.zoom_threshold, 0.5);
        assert_eq!(config.min_interval, Duration::from_millis(1000));
        assert_eq!(config.bounds_tolerance_deg, 1e-4);
    }

    #[test]
    fn test_builder() {
        let config = SchedulerConfig::default()
            .with_change_threshold(0.5)
            .with_min_interval(Duration::ZERO)
            .with_min_zoom(3.0);
        assert_eq!(config.change_threshold, 0.5);
        assert_eq!(config.min_interval, Duration::ZERO);
        assert_eq!(config.min_zoom, 3.0);
        assert_eq!(config.zoom_threshold, DEFAULT_ZOOM_THRESHOLD);
    }
}
