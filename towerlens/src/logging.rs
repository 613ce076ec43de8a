//! Global `tracing` subscriber setup.
//!
//! Events go to stderr and, when a log directory is configured, to a daily
//! rolling file `towerlens.log.YYYY-MM-DD` in that directory. The filter
//! defaults to `info` and can be overridden with `RUST_LOG`.

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Prefix of rolling log files.
pub const LOG_FILE_PREFIX: &str = "towerlens.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {}: {}", .path.display(), .source)]
    Directory {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Options for [`init`].
#[derive(Debug, Clone, Default)]
pub struct LogOptions<'a> {
    /// Directory for the rolling log file.
    pub directory: Option<&'a Path>,
    /// Filter directive used when `RUST_LOG` is unset. Defaults to `info`.
    pub default_filter: Option<&'a str>,
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when file logging is enabled. Keep it
/// alive for the life of the process; dropping it flushes and stops the
/// background writer.
pub fn init(options: LogOptions<'_>) -> Result<Option<WorkerGuard>, LoggingError> {
    let default_filter = options.default_filter.unwrap_or(DEFAULT_LOG_FILTER);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match options.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::Directory {
                path: dir.to_path_buf(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LoggingError::Install(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| LoggingError::Install(e.to_string()))?;
            Ok(None)
        }
    }
}
