//! JSON representation of towers returned by the remote.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::LatLon;
use crate::tower::{CellIdentity, RadioTech, TowerAttributes, TowerRecord};

/// One tower as serialised by the remote.
///
/// Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTower {
    pub radio: RadioTech,
    pub mcc: u16,
    pub net: u16,
    pub area: u32,
    pub cell: u64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub range: Option<f64>,
    #[serde(default)]
    pub samples: Option<u32>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub updated: Option<i64>,
}

impl From<WireTower> for TowerRecord {
    fn from(wire: WireTower) -> Self {
        let attributes = TowerAttributes {
            samples: wire.samples,
            source: wire.source,
            first_seen: wire.created.and_then(from_unix),
            last_seen: wire.updated.and_then(from_unix),
        };
        let record = TowerRecord::new(
            CellIdentity::new(wire.mcc, wire.net, wire.area, wire.cell),
            wire.radio,
            LatLon::new(wire.lat, wire.lon),
        )
        .with_attributes(attributes);

        match wire.range {
            Some(range) => record.with_range(range),
            None => record,
        }
    }
}

fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Decode a response body into tower records.
pub(super) fn decode_towers(body: &[u8]) -> Result<Vec<TowerRecord>, serde_json::Error> {
    let towers: Vec<WireTower> = serde_json::from_slice(body)?;
    Ok(towers.into_iter().map(TowerRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_record() {
        let body = br#"[{
            "radio": "LTE", "mcc": 310, "net": 260, "area": 12345, "cell": 678901,
            "lat": 47.6, "lon": -122.3, "range": 850.0, "samples": 12,
            "source": "survey", "created": 1700000000, "updated": 1710000000
        }]"#;

        let towers = decode_towers(body).unwrap();
        assert_eq!(towers.len(), 1);
        let t = &towers[0];
        assert_eq!(t.radio, RadioTech::Lte);
        assert_eq!(t.identity, CellIdentity::new(310, 260, 12345, 678901));
        assert_eq!(t.range_m, Some(850.0));
        assert_eq!(t.attributes.samples, Some(12));
        assert_eq!(t.attributes.source.as_deref(), Some("survey"));
        assert_eq!(
            t.attributes.first_seen.map(|d| d.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_decode_minimal_record() {
        let body = br#"[{"radio":"WCDMA","mcc":262,"net":2,"area":1,"cell":99,"lat":52.5,"lon":13.4}]"#;
        let towers = decode_towers(body).unwrap();
        assert_eq!(towers[0].radio, RadioTech::Umts);
        assert_eq!(towers[0].range_m, None);
        assert_eq!(towers[0].attributes, TowerAttributes::default());
    }

    #[test]
    fn test_decode_empty_array() {
        assert!(decode_towers(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_towers(b"<html>").is_err());
        assert!(decode_towers(br#"[{"radio":"LTE"}]"#).is_err());
    }
}
