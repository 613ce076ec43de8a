//! Known-tower cache errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from the known-tower cache and its stores.
#[derive(Debug, Error)]
pub enum KnownCacheError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file exists but cannot be decoded.
    #[error("known-tower file {} is corrupt: {}", .path.display(), .reason)]
    Corrupt { path: PathBuf, reason: String },

    /// Serialising the table failed.
    #[error("failed to encode known-tower table: {0}")]
    Encode(String),

    /// The blocking task running a store call panicked or was cancelled.
    #[error("known-tower store task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_path() {
        let err = KnownCacheError::Io {
            path: PathBuf::from("/data/known.bin"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let text = err.to_string();
        assert!(text.contains("/data/known.bin"));
        assert!(text.contains("denied"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_corrupt_display() {
        let err = KnownCacheError::Corrupt {
            path: PathBuf::from("known.bin"),
            reason: "truncated".to_string(),
        };
        assert_eq!(err.to_string(), "known-tower file known.bin is corrupt: truncated");
    }
}
