//! Viewport coordinator.
//!
//! Reacts to camera-idle events from the map:
//!
//! 1. [`QueryScheduler`] decides whether the movement warrants a fetch.
//! 2. Approved fetches run through the [`SingleFlightGate`] so at most one
//!    request is in flight against the rate-limited backend.
//! 3. The result is merged into the [`SpatialEntityCache`] and the
//!    observable [`CoordinatorStatus`] is republished.
//!
//! # Lifecycle
//!
//! The host calls [`ViewportCoordinator::dispose`] when the map session
//! ends. A fetch already inside the gate is allowed to finish, but its
//! result is dropped instead of merged. A result fetched under query
//! parameters that have since changed is dropped the same way.

mod status;

pub use status::{CoordinatorStatus, FetchOutcome};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{TowerBackend, TowerQuery};
use crate::entity_cache::SpatialEntityCache;
use crate::gate::SingleFlightGate;
use crate::scheduler::{CameraPosition, FetchDecision, QueryScheduler};
use crate::tower::{CellIdentity, QueryParams, TowerRecord};

/// Owns the tower working set of one map session.
pub struct ViewportCoordinator {
    backend: Arc<dyn TowerBackend>,
    scheduler: QueryScheduler,
    gate: SingleFlightGate,
    cache: SpatialEntityCache<TowerRecord>,
    params: RwLock<QueryParams>,
    /// Bumped whenever `params` changes; fetches remember the value they
    /// were dispatched under.
    params_generation: AtomicU64,
    status: watch::Sender<CoordinatorStatus>,
    shutdown: CancellationToken,
}

impl ViewportCoordinator {
    pub fn new(
        backend: Arc<dyn TowerBackend>,
        scheduler: QueryScheduler,
        cache: SpatialEntityCache<TowerRecord>,
        params: QueryParams,
    ) -> Self {
        let (status, _) = watch::channel(CoordinatorStatus::default());
        Self {
            backend,
            scheduler,
            gate: SingleFlightGate::new(),
            cache,
            params: RwLock::new(params),
            params_generation: AtomicU64::new(0),
            status,
            shutdown: CancellationToken::new(),
        }
    }

    /// Coordinator with default scheduler thresholds, default capacity and
    /// unfiltered queries.
    pub fn with_defaults(backend: Arc<dyn TowerBackend>) -> Self {
        Self::new(
            backend,
            QueryScheduler::with_defaults(),
            SpatialEntityCache::with_default_capacity(),
            QueryParams::default(),
        )
    }

    /// Handle a camera-idle event observed at `now`.
    ///
    /// Never fails: backend errors are logged and reported as
    /// [`FetchOutcome::Failed`].
    pub async fn on_camera_idle(&self, camera: CameraPosition, now: Instant) -> FetchOutcome {
        if self.is_disposed() {
            return FetchOutcome::Discarded;
        }

        match self.scheduler.evaluate(&camera, now) {
            FetchDecision::Suppress(reason) => FetchOutcome::Suppressed(reason),
            FetchDecision::TooZoomedOut => {
                self.status.send_modify(|s| s.too_zoomed_out = true);
                FetchOutcome::TooZoomedOut
            }
            FetchDecision::Fetch => {
                self.status.send_modify(|s| s.too_zoomed_out = false);
                self.fetch_and_merge(camera).await
            }
        }
    }

    async fn fetch_and_merge(&self, camera: CameraPosition) -> FetchOutcome {
        let (generation, query) = {
            let params = self.params.read();
            let generation = self.params_generation.load(Ordering::Acquire);
            (generation, TowerQuery::new(camera.bounds, params.clone()))
        };

        let result = self
            .gate
            .run_exclusive(|| self.backend.fetch_towers(&query))
            .await;

        let towers = match result {
            Ok(towers) => towers,
            Err(e) => {
                warn!(error = %e, bounds = %camera.bounds, "Tower fetch failed");
                return FetchOutcome::Failed;
            }
        };

        // Held across the merge. Parameter changes and dispose both take
        // the write lock, so neither can land between these checks and the
        // merge.
        let _params = self.params.read();
        if self.is_disposed() {
            debug!(count = towers.len(), "Discarding fetch completed after dispose");
            return FetchOutcome::Discarded;
        }
        if self.params_generation.load(Ordering::Acquire) != generation {
            debug!(count = towers.len(), "Discarding fetch made under stale parameters");
            return FetchOutcome::Discarded;
        }

        let merged = self.cache.merge(towers);
        self.status.send_modify(|s| {
            s.no_results = merged.size == 0;
            s.entity_count = merged.size;
        });
        FetchOutcome::Fetched { merged }
    }

    /// Replace the query parameters.
    ///
    /// When they differ from the current ones the cache is cleared, the
    /// scheduler forgets the last query and both flags are reset, so the
    /// next camera-idle event bootstraps a fresh working set. Returns
    /// whether anything changed.
    pub fn set_query_params(&self, params: QueryParams) -> bool {
        let mut current = self.params.write();
        if *current == params {
            return false;
        }
        info!(radio = %params.radio, source = %params.source, "Query parameters changed");
        *current = params;
        self.params_generation.fetch_add(1, Ordering::AcqRel);

        self.cache.clear();
        self.scheduler.reset();
        self.status.send_replace(CoordinatorStatus::default());
        true
    }

    pub fn query_params(&self) -> QueryParams {
        self.params.read().clone()
    }

    /// Cached towers, oldest fetched first.
    pub fn current_entities(&self) -> Arc<[TowerRecord]> {
        self.cache.snapshot()
    }

    pub fn entity(&self, id: &CellIdentity) -> Option<TowerRecord> {
        self.cache.get(id)
    }

    pub fn no_results(&self) -> bool {
        self.status.borrow().no_results
    }

    pub fn too_zoomed_out(&self) -> bool {
        self.status.borrow().too_zoomed_out
    }

    pub fn status(&self) -> CoordinatorStatus {
        *self.status.borrow()
    }

    /// Receiver notified whenever the status changes.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorStatus> {
        self.status.subscribe()
    }

    /// Whether a fetch is currently in flight.
    pub fn is_fetching(&self) -> bool {
        self.gate.is_busy()
    }

    /// End the session. In-flight fetches complete but are not merged.
    pub fn dispose(&self) {
        let _params = self.params.write();
        if !self.shutdown.is_cancelled() {
            info!(entities = self.cache.len(), "Viewport coordinator disposed");
        }
        self.shutdown.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Token cancelled on [`dispose`](Self::dispose), for tasks tied to
    /// this session.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
