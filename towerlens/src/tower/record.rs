//! Surveyed tower records.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::{CellIdentity, TowerKey};
use super::radio::RadioTech;
use crate::entity_cache::Identified;
use crate::geo::LatLon;

/// Attributes carried for display but never interpreted by the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TowerAttributes {
    /// Number of signal samples the dataset aggregated for this cell.
    pub samples: Option<u32>,
    /// Label of the dataset the record came from.
    pub source: Option<String>,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

/// One cell tower from the remote spatial dataset.
///
/// Equality and hashing consider only [`CellIdentity`], so a re-fetched
/// record with fresher attributes compares equal to the stale one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerRecord {
    pub identity: CellIdentity,
    pub radio: RadioTech,
    pub position: LatLon,
    /// Estimated coverage radius in meters.
    pub range_m: Option<f64>,
    pub attributes: TowerAttributes,
}

impl TowerRecord {
    pub fn new(identity: CellIdentity, radio: RadioTech, position: LatLon) -> Self {
        Self {
            identity,
            radio,
            position,
            range_m: None,
            attributes: TowerAttributes::default(),
        }
    }

    pub fn with_range(mut self, range_m: f64) -> Self {
        self.range_m = Some(range_m);
        self
    }

    pub fn with_attributes(mut self, attributes: TowerAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Known-cache key for this record.
    pub fn key(&self) -> TowerKey {
        TowerKey {
            radio: self.radio,
            identity: self.identity,
        }
    }
}

impl PartialEq for TowerRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for TowerRecord {}

impl Hash for TowerRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl Identified for TowerRecord {
    type Id = CellIdentity;

    fn id(&self) -> &CellIdentity {
        &self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn record(cell_id: u64, samples: u32) -> TowerRecord {
        TowerRecord::new(
            CellIdentity::new(310, 260, 100, cell_id),
            RadioTech::Lte,
            LatLon::new(47.6, -122.3),
        )
        .with_attributes(TowerAttributes {
            samples: Some(samples),
            ..Default::default()
        })
    }

    #[test]
    fn test_equality_ignores_attributes() {
        assert_eq!(record(1, 5), record(1, 500));
        assert_ne!(record(1, 5), record(2, 5));
    }

    #[test]
    fn test_hash_set_deduplicates_by_identity() {
        let mut set = HashSet::new();
        set.insert(record(1, 5));
        set.insert(record(1, 9));
        set.insert(record(2, 5));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_key_carries_radio() {
        let key = record(7, 1).key();
        assert_eq!(key.radio, RadioTech::Lte);
        assert_eq!(key.identity.cell_id, 7);
    }
}
