//! Cell tower data model.
//!
//! A tower has two identities: [`CellIdentity`] (operator codes, area and
//! cell id) identifies a surveyed record on the map, while [`TowerKey`]
//! adds the radio technology and identifies an observation for the
//! known-tower cache.

mod filter;
mod identity;
mod radio;
mod record;

pub use filter::{OperatorFilter, QueryParams, RadioFilter, DEFAULT_SOURCE};
pub use identity::{CellIdentity, TowerKey};
pub use radio::{ParseRadioError, RadioTech};
pub use record::{TowerAttributes, TowerRecord};
