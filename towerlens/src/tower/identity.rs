//! Tower identities.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::radio::RadioTech;

/// Sentinel modems report for an unavailable 32-bit field.
const UNAVAILABLE_I32: u64 = i32::MAX as u64;

/// Sentinel for an unavailable unsigned 32-bit field.
const UNAVAILABLE_U32: u64 = u32::MAX as u64;

/// Operator codes, area code and cell id of a cell.
///
/// `area` is the LAC for GSM/UMTS and the TAC for LTE/NR. `cell_id` is wide
/// enough for 36-bit NR cell identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIdentity {
    pub mcc: u16,
    pub mnc: u16,
    pub area: u32,
    pub cell_id: u64,
}

impl CellIdentity {
    pub fn new(mcc: u16, mnc: u16, area: u32, cell_id: u64) -> Self {
        Self {
            mcc,
            mnc,
            area,
            cell_id,
        }
    }
}

impl fmt::Display for CellIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.mcc, self.mnc, self.area, self.cell_id
        )
    }
}

/// Key of the known-tower cache: a cell identity observed on a radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerKey {
    pub radio: RadioTech,
    pub identity: CellIdentity,
}

impl TowerKey {
    pub fn new(radio: RadioTech, mcc: u16, mnc: u16, area: u32, cell_id: u64) -> Self {
        Self {
            radio,
            identity: CellIdentity::new(mcc, mnc, area, cell_id),
        }
    }

    /// Whether this key describes a real cell rather than a placeholder.
    ///
    /// Serving-cell reports sometimes carry zeroed operator codes or the
    /// "unavailable" sentinels while the modem is still registering.
    pub fn is_plausible(&self) -> bool {
        let id = &self.identity;
        if id.mcc == 0 || id.cell_id == 0 {
            return false;
        }
        let area = u64::from(id.area);
        let sentinel = |v: u64| v == UNAVAILABLE_I32 || v == UNAVAILABLE_U32;
        !(sentinel(area) || sentinel(id.cell_id))
    }
}

impl fmt::Display for TowerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.radio, self.identity)
    }
}
