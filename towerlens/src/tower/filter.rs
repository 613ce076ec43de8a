//! Parameters that define a tower query.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::radio::RadioTech;

/// Default dataset label sent with tower queries.
pub const DEFAULT_SOURCE: &str = "default";

/// Radio technology restriction of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RadioFilter {
    #[default]
    Any,
    Only(RadioTech),
}

impl RadioFilter {
    pub fn matches(&self, radio: RadioTech) -> bool {
        match self {
            RadioFilter::Any => true,
            RadioFilter::Only(r) => *r == radio,
        }
    }
}

impl fmt::Display for RadioFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioFilter::Any => f.write_str("any"),
            RadioFilter::Only(r) => write!(f, "{}", r),
        }
    }
}

/// Restricts a query to a single mobile operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorFilter {
    pub mcc: u16,
    pub mnc: u16,
}

/// Everything besides the viewport that shapes a tower query.
///
/// Records fetched under different parameters are not comparable, so a
/// change here invalidates the whole working set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryParams {
    pub radio: RadioFilter,
    pub operator: Option<OperatorFilter>,
    pub source: String,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            radio: RadioFilter::Any,
            operator: None,
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl QueryParams {
    pub fn with_radio(mut self, radio: RadioFilter) -> Self {
        self.radio = radio;
        self
    }

    pub fn with_operator(mut self, mcc: u16, mnc: u16) -> Self {
        self.operator = Some(OperatorFilter { mcc, mnc });
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}
