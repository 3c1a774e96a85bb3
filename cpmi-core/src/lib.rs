//! Core types for the CPMI dashboard
//!
//! This crate defines the shared data structures used across the dashboard:
//! index readings, history snapshots, the sentiment classifier and the
//! static category catalog.

pub mod category;
pub mod error;
pub mod history;
pub mod index;
pub mod sentiment;

pub use category::{describe_category, display_label, CategoryInfo, CATEGORY_CATALOG};
pub use error::{CpmiError, CpmiResult};
pub use history::{HistoryPoint, HistorySnapshot, HistoryStatistics};
pub use index::{CategoryBreakdown, CategoryReading, CurrentSnapshot, IndexReading};
pub use sentiment::{Sentiment, NEUTRAL_INDEX};
