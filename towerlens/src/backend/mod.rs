//! Remote tower service.
//!
//! The coordinator and classifier talk to the remote through the
//! [`TowerBackend`] trait so both can be driven by in-process fakes in
//! tests. [`HttpTowerBackend`] is the production implementation.
//!
//! # Design
//!
//! Methods return boxed futures rather than using `async fn` so the trait
//! stays dyn-compatible and can be shared as `Arc<dyn TowerBackend>`.

mod http;
mod wire;

#[cfg(test)]
pub(crate) mod mock;

pub use http::{HttpTowerBackend, DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS};
pub use wire::WireTower;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::geo::ViewportBounds;
use crate::tower::{QueryParams, TowerKey, TowerRecord};

/// Boxed future returned by [`TowerBackend`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A viewport query against the remote.
#[derive(Debug, Clone, PartialEq)]
pub struct TowerQuery {
    pub bounds: ViewportBounds,
    pub params: QueryParams,
}

impl TowerQuery {
    pub fn new(bounds: ViewportBounds, params: QueryParams) -> Self {
        Self { bounds, params }
    }
}

/// Answer of the remote existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    /// The remote already has this tower.
    Found,
    /// The remote has never seen this tower.
    NotFound,
    /// Any other HTTP status. Treated as "exists" by the classifier.
    Unexpected(u16),
}

/// Errors from the remote tower service.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Remote collaborator of the coordinator and classifier.
pub trait TowerBackend: Send + Sync {
    /// Fetch every tower inside `query.bounds` matching `query.params`.
    fn fetch_towers<'a>(
        &'a self,
        query: &'a TowerQuery,
    ) -> BoxFuture<'a, Result<Vec<TowerRecord>, BackendError>>;

    /// Ask whether the remote already knows `key`.
    fn check_tower_exists<'a>(
        &'a self,
        key: &'a TowerKey,
    ) -> BoxFuture<'a, Result<Existence, BackendError>>;
}
