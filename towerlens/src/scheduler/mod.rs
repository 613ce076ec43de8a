//! Query hysteresis for camera movement.
//!
//! The map reports a camera-idle event after every pan or zoom gesture,
//! including tiny corrections. Re-querying the remote dataset for each of
//! them would hammer a rate-limited backend for no visible gain, so the
//! scheduler only approves a fetch when the viewport moved far enough since
//! the last dispatched query.
//!
//! # Decision pipeline
//!
//! ```text
//! no previous query ───────────────────────────────┐
//! bounds ≈ last query ──────────────> Suppress(Unchanged)
//! change < 20% and zoom delta < 0.5 ─> Suppress(BelowThreshold)
//! < 1000 ms since last dispatch ─────> Suppress(RateLimited)
//!                                                  v
//! zoom < min zoom or area > max area ─> TooZoomedOut
//! otherwise ─────────────────────────> Fetch (state recorded)
//! ```
//!
//! The state is recorded when the fetch is approved, before it runs, so
//! concurrent idle events arriving while the fetch is in flight compare
//! against the dispatched viewport instead of approving duplicates.

mod config;

pub use config::{
    SchedulerConfig, DEFAULT_CHANGE_THRESHOLD, DEFAULT_MAX_AREA_SQ_M, DEFAULT_MIN_INTERVAL,
    DEFAULT_MIN_ZOOM, DEFAULT_ZOOM_THRESHOLD,
};

use std::fmt;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::geo::{approx_area_sq_m, bounds_approx_equal, bounds_change_percent, ViewportBounds};

/// Viewport and zoom reported by the map camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPosition {
    pub bounds: ViewportBounds,
    pub zoom: f64,
}

impl CameraPosition {
    pub fn new(bounds: ViewportBounds, zoom: f64) -> Self {
        Self { bounds, zoom }
    }
}

/// The viewport of the last dispatched query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportQueryState {
    pub bounds: ViewportBounds,
    pub zoom: f64,
    pub dispatched_at: Instant,
}

/// Why a camera movement did not trigger a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// The viewport is the same as the last query within tolerance.
    Unchanged,
    /// The viewport moved, but less than the change and zoom thresholds.
    BelowThreshold,
    /// The movement qualifies but the previous query was too recent.
    RateLimited,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SuppressReason::Unchanged => "unchanged",
            SuppressReason::BelowThreshold => "below threshold",
            SuppressReason::RateLimited => "rate limited",
        };
        f.write_str(s)
    }
}

/// Outcome of evaluating a camera movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    Fetch,
    Suppress(SuppressReason),
    /// The viewport is too large to query; collaborators show a hint.
    TooZoomedOut,
}

/// Hysteresis engine deciding when a camera movement warrants a fetch.
#[derive(Debug)]
pub struct QueryScheduler {
    config: SchedulerConfig,
    last_query: Mutex<Option<ViewportQueryState>>,
}

impl QueryScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            last_query: Mutex::new(None),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SchedulerConfig::default())
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Evaluate a camera-idle event at time `now`.
    ///
    /// When the result is [`FetchDecision::Fetch`] the camera position has
    /// already been recorded as the last dispatched query.
    ///
    /// The first event bypasses the change thresholds and the rate limit
    /// but not the zoom/area check: a zoomed-out first view yields
    /// [`FetchDecision::TooZoomedOut`] and records nothing, so the next
    /// acceptable view still bootstraps.
    pub fn evaluate(&self, camera: &CameraPosition, now: Instant) -> FetchDecision {
        let mut last_query = self.last_query.lock();

        if let Some(last) = last_query.as_ref() {
            if let Some(reason) = self.suppress_reason(last, camera, now) {
                trace!(reason = %reason, bounds = %camera.bounds, "Query suppressed");
                return FetchDecision::Suppress(reason);
            }
        }

        if self.is_too_zoomed_out(camera) {
            debug!(
                zoom = camera.zoom,
                min_zoom = self.config.min_zoom,
                "Viewport too large to query"
            );
            return FetchDecision::TooZoomedOut;
        }

        *last_query = Some(ViewportQueryState {
            bounds: camera.bounds,
            zoom: camera.zoom,
            dispatched_at: now,
        });
        debug!(bounds = %camera.bounds, zoom = camera.zoom, "Query approved");
        FetchDecision::Fetch
    }

    /// Forget the last query so the next evaluation is a bootstrap.
    pub fn reset(&self) {
        *self.last_query.lock() = None;
    }

    /// The last dispatched query, if any.
    pub fn last_query(&self) -> Option<ViewportQueryState> {
        *self.last_query.lock()
    }

    fn suppress_reason(
        &self,
        last: &ViewportQueryState,
        camera: &CameraPosition,
        now: Instant,
    ) -> Option<SuppressReason> {
        if bounds_approx_equal(&last.bounds, &camera.bounds, self.config.bounds_tolerance_deg) {
            return Some(SuppressReason::Unchanged);
        }

        let change = bounds_change_percent(&last.bounds, &camera.bounds);
        let zoom_delta = (camera.zoom - last.zoom).abs();
        if change < self.config.change_threshold && zoom_delta < self.config.zoom_threshold {
            return Some(SuppressReason::BelowThreshold);
        }

        if now.saturating_duration_since(last.dispatched_at) < self.config.min_interval {
            return Some(SuppressReason::RateLimited);
        }

        None
    }

    fn is_too_zoomed_out(&self, camera: &CameraPosition) -> bool {
        camera.zoom < self.config.min_zoom
            || approx_area_sq_m(&camera.bounds) > self.config.max_area_sq_m
    }
}

impl Default for QueryScheduler {
    fn default() -> Self {
        Self::with_defaults()
    }
}
