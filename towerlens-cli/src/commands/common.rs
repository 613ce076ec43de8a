//! Types shared across CLI commands.

use std::path::Path;

use clap::ValueEnum;
use towerlens::config::ConfigFile;
use towerlens::tower::RadioTech;

use crate::error::CliError;

/// Radio technology selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RadioArg {
    /// 2G GSM
    Gsm,
    /// 2G/3G CDMA
    Cdma,
    /// 3G UMTS / WCDMA
    Umts,
    /// 4G LTE
    Lte,
    /// 5G NR
    Nr,
}

impl From<RadioArg> for RadioTech {
    fn from(radio: RadioArg) -> Self {
        match radio {
            RadioArg::Gsm => RadioTech::Gsm,
            RadioArg::Cdma => RadioTech::Cdma,
            RadioArg::Umts => RadioTech::Umts,
            RadioArg::Lte => RadioTech::Lte,
            RadioArg::Nr => RadioTech::Nr,
        }
    }
}

/// Load `path`, or the default config file when none is given.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}
