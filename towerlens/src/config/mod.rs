//! User configuration in `~/.towerlens/config.ini`.
//!
//! ```ini
//! [backend]
//! url = https://towers.example.org/api
//! timeout_secs = 30
//! source = default
//!
//! [viewport]
//! capacity = 7500
//! change_threshold = 0.2
//! zoom_threshold = 0.5
//! min_interval_ms = 1000
//! min_zoom = 10
//! max_area_sq_m = 10000000000
//!
//! [known]
//! path = ~/.towerlens/known_towers.bin
//! retention_hours = 48
//!
//! [logging]
//! directory = ~/.towerlens/logs
//! ```

mod file;
mod parser;
mod settings;
mod writer;

pub use file::ConfigError;
pub use settings::{BackendSettings, ConfigFile, KnownSettings, LoggingSettings, ViewportSettings};
pub use writer::to_config_string;

use std::path::PathBuf;

/// `~/.towerlens`
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".towerlens")
}

/// `~/.towerlens/config.ini`
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
