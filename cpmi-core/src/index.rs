//! Current index reading and per-category breakdown

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Headline CPMI reading as published by the index API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexReading {
    /// Index value, 100 = neutral
    pub value: f64,

    /// Upstream interpretation label (e.g. "Bullish")
    pub interpretation: String,

    /// When the upstream service last recomputed the index
    pub last_update: DateTime<Utc>,
}

/// Sub-index of a single market category.
///
/// Every key must be present; `index`, `interpretation` and `deviation`
/// may be `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReading {
    /// Category sub-index. `None` while the category has no data;
    /// such categories are not rendered.
    #[serde(deserialize_with = "required_nullable")]
    pub index: Option<f64>,

    /// Contribution weight in [0, 1]. Not validated to sum to 1.
    pub weight: f64,

    #[serde(deserialize_with = "required_nullable")]
    pub interpretation: Option<String>,

    /// Deviation from neutral as reported upstream
    #[serde(deserialize_with = "required_nullable")]
    pub deviation: Option<f64>,
}

/// Accepts `null` but, unlike a plain `Option` field, rejects a missing key
fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Category key (hyphenated, e.g. `bitcoin-markets`) to reading.
///
/// Keeps the order the categories were received in.
pub type CategoryBreakdown = IndexMap<String, CategoryReading>;

/// Payload of the current-index call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSnapshot {
    pub index: IndexReading,
    pub categories: CategoryBreakdown,
}

impl CurrentSnapshot {
    /// Categories with a known sub-index, in received order
    pub fn rendered_categories(&self) -> impl Iterator<Item = (&str, &CategoryReading, f64)> {
        self.categories
            .iter()
            .filter_map(|(key, reading)| reading.index.map(|index| (key.as_str(), reading, index)))
    }
}
