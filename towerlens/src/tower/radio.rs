//! Radio access technologies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Radio access technology of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RadioTech {
    Gsm,
    Cdma,
    #[serde(alias = "WCDMA")]
    Umts,
    Lte,
    Nr,
}

impl RadioTech {
    /// All technologies, oldest first.
    pub const ALL: [RadioTech; 5] = [
        RadioTech::Gsm,
        RadioTech::Cdma,
        RadioTech::Umts,
        RadioTech::Lte,
        RadioTech::Nr,
    ];

    /// Upper-case label used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RadioTech::Gsm => "GSM",
            RadioTech::Cdma => "CDMA",
            RadioTech::Umts => "UMTS",
            RadioTech::Lte => "LTE",
            RadioTech::Nr => "NR",
        }
    }
}

impl fmt::Display for RadioTech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a radio label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown radio technology '{0}'")]
pub struct ParseRadioError(pub String);

impl FromStr for RadioTech {
    type Err = ParseRadioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GSM" => Ok(RadioTech::Gsm),
            "CDMA" => Ok(RadioTech::Cdma),
            "UMTS" | "WCDMA" => Ok(RadioTech::Umts),
            "LTE" => Ok(RadioTech::Lte),
            "NR" | "5G" => Ok(RadioTech::Nr),
            _ => Err(ParseRadioError(s.to_string())),
        }
    }
}
