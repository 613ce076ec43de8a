//! Single-flight guard for remote queries.
//!
//! The tower backend is rate limited and a moving camera can approve
//! several fetches in quick succession. The gate serialises them: at most
//! one `work` future runs at a time, and a caller arriving while another
//! is in flight waits for it to finish before running its own work.
//! Results are not shared between callers.
//!
//! The gate is held through an RAII guard, so it is released on every exit
//! path, including a caller's future being dropped mid-flight.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::trace;

/// Serialises executions of remote work.
#[derive(Debug, Default)]
pub struct SingleFlightGate {
    lock: Mutex<()>,
    busy: AtomicBool,
    executions: AtomicU64,
}

impl SingleFlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` once no other execution is in flight.
    ///
    /// The result of `work` is returned unchanged, errors included.
    pub async fn run_exclusive<F, Fut, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let _guard = self.lock.lock().await;
        let _busy = BusyFlag::raise(&self.busy);
        let execution = self.executions.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(execution, "Single-flight work started");

        work().await
    }

    /// Whether an execution is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Number of executions started since creation.
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::Relaxed)
    }
}

/// Clears the busy flag when dropped.
struct BusyFlag<'a>(&'a AtomicBool);

impl<'a> BusyFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
