//! Scriptable in-process backend for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::{BackendError, BoxFuture, Existence, TowerBackend, TowerQuery};
use crate::tower::{TowerKey, TowerRecord};

pub(crate) struct MockTowerBackend {
    towers: Mutex<Result<Vec<TowerRecord>, String>>,
    existence: Mutex<Result<Existence, String>>,
    fetch_delay: Mutex<Option<Duration>>,
    queries: Mutex<Vec<TowerQuery>>,
    fetch_calls: AtomicUsize,
    exists_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTowerBackend {
    pub(crate) fn new() -> Self {
        Self {
            towers: Mutex::new(Ok(Vec::new())),
            existence: Mutex::new(Ok(Existence::Found)),
            fetch_delay: Mutex::new(None),
            queries: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
            exists_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_towers(&self, towers: Vec<TowerRecord>) {
        *self.towers.lock() = Ok(towers);
    }

    pub(crate) fn fail_fetches(&self, reason: &str) {
        *self.towers.lock() = Err(reason.to_string());
    }

    pub(crate) fn set_existence(&self, existence: Existence) {
        *self.existence.lock() = Ok(existence);
    }

    pub(crate) fn fail_existence(&self, reason: &str) {
        *self.existence.lock() = Err(reason.to_string());
    }

    pub(crate) fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock() = Some(delay);
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<TowerQuery> {
        self.queries.lock().clone()
    }
}

impl TowerBackend for MockTowerBackend {
    fn fetch_towers<'a>(
        &'a self,
        query: &'a TowerQuery,
    ) -> BoxFuture<'a, Result<Vec<TowerRecord>, BackendError>> {
        Box::pin(async move {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push(query.clone());
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);

            let delay = *self.fetch_delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.towers
                .lock()
                .clone()
                .map_err(|reason| BackendError::Transport {
                    url: "mock://towers".to_string(),
                    reason,
                })
        })
    }

    fn check_tower_exists<'a>(
        &'a self,
        _key: &'a TowerKey,
    ) -> BoxFuture<'a, Result<Existence, BackendError>> {
        Box::pin(async move {
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            self.existence
                .lock()
                .clone()
                .map_err(|reason| BackendError::Transport {
                    url: "mock://exists".to_string(),
                    reason,
                })
        })
    }
}
