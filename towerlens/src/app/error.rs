//! Application error types.

use std::fmt;

use crate::backend::BackendError;
use crate::entity_cache::EntityCacheError;
use crate::known::KnownCacheError;

/// Errors assembling the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create the HTTP backend.
    Backend(BackendError),

    /// Failed to open the known-tower store.
    KnownStore(KnownCacheError),

    /// Invalid entity cache settings.
    EntityCache(EntityCacheError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Backend(e) => write!(f, "Failed to create tower backend: {}", e),
            AppError::KnownStore(e) => write!(f, "Failed to open known-tower store: {}", e),
            AppError::EntityCache(e) => write!(f, "Invalid entity cache settings: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Backend(e) => Some(e),
            AppError::KnownStore(e) => Some(e),
            AppError::EntityCache(e) => Some(e),
        }
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        AppError::Backend(e)
    }
}

impl From<KnownCacheError> for AppError {
    fn from(e: KnownCacheError) -> Self {
        AppError::KnownStore(e)
    }
}

impl From<EntityCacheError> for AppError {
    fn from(e: EntityCacheError) -> Self {
        AppError::EntityCache(e)
    }
}
