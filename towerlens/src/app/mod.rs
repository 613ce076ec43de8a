//! Host-facing assembly of the coordinator and classifier.
//!
//! [`TowerLensApp`] wires a [`ViewportCoordinator`](crate::coordinator::ViewportCoordinator)
//! and a [`NewTowerClassifier`](crate::classifier::NewTowerClassifier) to one
//! backend and one known-tower store, built from [`AppConfig`].
//!
//! ```text
//! ConfigFile ──► AppConfig ──► TowerLensApp
//!                                ├── ViewportCoordinator ──┐
//!                                │                         ├── HttpTowerBackend
//!                                └── NewTowerClassifier ───┘
//!                                        └── TowerKnownCache ── FileKnownStore
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::{TowerLensApp, MAX_CONCURRENT_CLASSIFICATIONS};
pub use config::{AppConfig, KnownStorage};
pub use error::AppError;
