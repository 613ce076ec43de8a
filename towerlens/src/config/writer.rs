//! Renders a [`ConfigFile`] as INI text.

use std::fmt::Write;

use super::settings::ConfigFile;

/// INI text that [`ConfigFile::load_from`] reads back to an equal value.
pub fn to_config_string(config: &ConfigFile) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "[backend]");
    let _ = writeln!(out, "url = {}", config.backend.url);
    let _ = writeln!(out, "timeout_secs = {}", config.backend.timeout_secs);
    let _ = writeln!(out, "source = {}", config.backend.source);
    let _ = writeln!(out);

    let v = &config.viewport;
    let _ = writeln!(out, "[viewport]");
    let _ = writeln!(out, "capacity = {}", v.capacity);
    let _ = writeln!(out, "change_threshold = {}", v.change_threshold);
    let _ = writeln!(out, "zoom_threshold = {}", v.zoom_threshold);
    let _ = writeln!(out, "min_interval_ms = {}", v.min_interval_ms);
    let _ = writeln!(out, "min_zoom = {}", v.min_zoom);
    let _ = writeln!(out, "max_area_sq_m = {}", v.max_area_sq_m);
    let _ = writeln!(out);

    let _ = writeln!(out, "[known]");
    let _ = writeln!(out, "path = {}", config.known.path.display());
    let _ = writeln!(out, "retention_hours = {}", config.known.retention_hours);
    let _ = writeln!(out);

    let _ = writeln!(out, "[logging]");
    match &config.logging.directory {
        Some(dir) => {
            let _ = writeln!(out, "directory = {}", dir.display());
        }
        None => {
            let _ = writeln!(out, "; directory = ~/.towerlens/logs");
        }
    }

    out
}
