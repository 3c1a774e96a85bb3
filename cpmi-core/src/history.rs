//! Historical index readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single past index reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub index: f64,
}

/// Summary statistics computed upstream over the history window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatistics {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub volatility: f64,
    pub data_points: u64,
}

/// Payload of the history call.
///
/// Points are kept exactly as delivered: no sorting, no de-duplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub history: Vec<HistoryPoint>,
    pub statistics: HistoryStatistics,
}

impl HistorySnapshot {
    /// Fewest points needed before a trend line means anything
    pub const MIN_TREND_POINTS: usize = 2;

    /// Whether enough points exist to draw a trend line
    pub fn has_trend(&self) -> bool {
        self.history.len() >= Self::MIN_TREND_POINTS
    }
}
