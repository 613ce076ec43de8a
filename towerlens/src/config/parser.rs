//! Maps INI keys onto [`ConfigFile`] fields.
//!
//! Starts from defaults and overlays every recognised key. Unknown sections
//! and keys are ignored.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigError;
use super::settings::ConfigFile;

/// Ten years.
const MAX_RETENTION_HOURS: i64 = 87_600;

pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some("backend")) {
        if let Some(v) = non_empty(section, "url") {
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid("backend", "url", v, "must be an http:// or https:// URL"));
            }
            config.backend.url = v.to_string();
        }
        if let Some(v) = section.get("timeout_secs") {
            let secs: u64 = parse("backend", "timeout_secs", v, "must be a positive integer (seconds)")?;
            if secs == 0 {
                return Err(invalid("backend", "timeout_secs", v, "must be a positive integer (seconds)"));
            }
            config.backend.timeout_secs = secs;
        }
        if let Some(v) = non_empty(section, "source") {
            config.backend.source = v.to_string();
        }
    }

    if let Some(section) = ini.section(Some("viewport")) {
        if let Some(v) = section.get("capacity") {
            let capacity: usize = parse("viewport", "capacity", v, "must be a positive integer")?;
            if capacity == 0 {
                return Err(invalid("viewport", "capacity", v, "must be a positive integer"));
            }
            config.viewport.capacity = capacity;
        }
        if let Some(v) = section.get("change_threshold") {
            config.viewport.change_threshold =
                parse_non_negative("viewport", "change_threshold", v)?;
        }
        if let Some(v) = section.get("zoom_threshold") {
            config.viewport.zoom_threshold = parse_non_negative("viewport", "zoom_threshold", v)?;
        }
        if let Some(v) = section.get("min_interval_ms") {
            config.viewport.min_interval_ms =
                parse("viewport", "min_interval_ms", v, "must be an integer (milliseconds)")?;
        }
        if let Some(v) = section.get("min_zoom") {
            config.viewport.min_zoom = parse_non_negative("viewport", "min_zoom", v)?;
        }
        if let Some(v) = section.get("max_area_sq_m") {
            config.viewport.max_area_sq_m = parse_non_negative("viewport", "max_area_sq_m", v)?;
        }
    }

    if let Some(section) = ini.section(Some("known")) {
        if let Some(v) = non_empty(section, "path") {
            config.known.path = expand_tilde(v);
        }
        if let Some(v) = section.get("retention_hours") {
            let reason = "must be a positive integer (hours), at most 87600";
            let hours: i64 = parse("known", "retention_hours", v, reason)?;
            if hours <= 0 || hours > MAX_RETENTION_HOURS {
                return Err(invalid("known", "retention_hours", v, reason));
            }
            config.known.retention_hours = hours;
        }
    }

    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = Some(expand_tilde(v));
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse<T: FromStr>(section: &str, key: &str, value: &str, reason: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_non_negative(section: &str, key: &str, value: &str) -> Result<f64, ConfigError> {
    const REASON: &str = "must be a non-negative number";
    let parsed: f64 = parse(section, key, value, REASON)?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(invalid(section, key, value, REASON));
    }
    Ok(parsed)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
