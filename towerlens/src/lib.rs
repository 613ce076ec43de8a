//! TowerLens - viewport-driven cell tower cache and new-tower classifier
//!
//! The library keeps the set of surveyed cell towers visible on a map in
//! step with the camera without flooding a rate-limited backend, and
//! decides whether towers observed by the device are new to the remote
//! dataset.
//!
//! - [`coordinator`] reacts to camera-idle events using [`scheduler`],
//!   [`gate`] and [`entity_cache`].
//! - [`classifier`] answers "new or known" backed by the persisted
//!   [`known`] cache.
//! - [`app`] assembles both from [`config`].

pub mod app;
pub mod backend;
pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod entity_cache;
pub mod gate;
pub mod geo;
pub mod known;
pub mod logging;
pub mod scheduler;
pub mod tower;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
