//! Outcomes and observable state of the viewport coordinator.

use std::fmt;

use crate::entity_cache::MergeReport;
use crate::scheduler::SuppressReason;

/// What happened in response to one camera-idle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A fetch ran and its result was merged into the cache.
    Fetched { merged: MergeReport },
    /// The scheduler decided the movement was not worth a fetch.
    Suppressed(SuppressReason),
    /// The viewport is too large to query.
    TooZoomedOut,
    /// The fetch failed. The cache is unchanged.
    Failed,
    /// The fetch completed after disposal or a parameter change and its
    /// result was dropped.
    Discarded,
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched { .. })
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Fetched { merged } => write!(f, "fetched ({})", merged),
            FetchOutcome::Suppressed(reason) => write!(f, "suppressed ({})", reason),
            FetchOutcome::TooZoomedOut => f.write_str("too zoomed out"),
            FetchOutcome::Failed => f.write_str("failed"),
            FetchOutcome::Discarded => f.write_str("discarded"),
        }
    }
}

/// State read by UI collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoordinatorStatus {
    /// The cache is empty after the most recent successful fetch.
    pub no_results: bool,
    /// The most recent evaluated viewport was too large to query.
    pub too_zoomed_out: bool,
    /// Entities currently cached.
    pub entity_count: usize,
}
