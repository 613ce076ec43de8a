//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use towerlens::app::AppError;
use towerlens::config::ConfigError;
use towerlens::known::KnownCacheError;
use towerlens::logging::LoggingError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(LoggingError),
    /// Failed to load configuration
    Config(ConfigError),
    /// Failed to create the Tokio runtime
    Runtime(std::io::Error),
    /// Failed to assemble the application
    Startup(AppError),
    /// Known-tower cache operation failed
    KnownCache(KnownCacheError),
    /// Invalid command-line arguments
    InvalidArgument(String),
    /// The tower fetch did not succeed
    QueryFailed(String),
}

impl CliError {
    /// Exit the process with an error message and code 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Check the configuration file; 'towerlens config path' shows its location.");
            }
            CliError::QueryFailed(_) => {
                eprintln!();
                eprintln!("Run with RUST_LOG=debug for details of the backend request.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to create Tokio runtime: {}", e),
            CliError::Startup(e) => write!(f, "{}", e),
            CliError::KnownCache(e) => write!(f, "Known-tower cache error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::QueryFailed(msg) => write!(f, "Query failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Startup(e) => Some(e),
            CliError::KnownCache(e) => Some(e),
            CliError::InvalidArgument(_) | CliError::QueryFailed(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::Startup(e)
    }
}

impl From<KnownCacheError> for CliError {
    fn from(e: KnownCacheError) -> Self {
        CliError::KnownCache(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::LoggingInit(e)
    }
}
