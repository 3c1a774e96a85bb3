//! Data source abstraction consumed by the cache and the scheduler

use async_trait::async_trait;
use cpmi_core::{CpmiResult, CurrentSnapshot, HistorySnapshot};

use crate::client::CpmiClient;

/// Anything that can answer the three CPMI calls for a given base URL
#[async_trait]
pub trait IndexSource: Send + Sync {
    async fn fetch_current(&self, base_url: &str) -> CpmiResult<CurrentSnapshot>;

    async fn fetch_history(&self, base_url: &str) -> CpmiResult<HistorySnapshot>;

    /// Liveness check; must not fail
    async fn check_health(&self, base_url: &str) -> bool;
}

#[async_trait]
impl IndexSource for CpmiClient {
    async fn fetch_current(&self, base_url: &str) -> CpmiResult<CurrentSnapshot> {
        CpmiClient::fetch_current(self, base_url).await
    }

    async fn fetch_history(&self, base_url: &str) -> CpmiResult<HistorySnapshot> {
        CpmiClient::fetch_history(self, base_url).await
    }

    async fn check_health(&self, base_url: &str) -> bool {
        CpmiClient::check_health(self, base_url).await
    }
}
