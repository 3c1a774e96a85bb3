//! HTTP client for the CPMI API
//!
//! Talks to the three upstream endpoints of the index service:
//! - `GET {base}/api/cpmi/current` - current index and category breakdown
//! - `GET {base}/api/cpmi/history` - past readings and summary statistics
//! - `GET {base}/health` - liveness check
//!
//! Every call is attempted once. Retrying is left to the next refresh cycle.

pub mod client;
pub mod source;
pub mod types;

pub use client::CpmiClient;
pub use source::IndexSource;
pub use types::{normalize_base_url, ApiEnvelope, DEFAULT_API_BASE};
