//! CPMI API client
//!
//! Thin reqwest wrapper around the index service. Transport failures,
//! non-200 statuses and malformed bodies are each mapped onto their own
//! [`CpmiError`] variant; nothing is retried here.

use crate::types::{
    endpoint_url, ApiEnvelope, CURRENT_PATH, DATA_TIMEOUT, HEALTH_PATH, HEALTH_TIMEOUT,
    HISTORY_PATH,
};
use cpmi_core::{CpmiError, CpmiResult, CurrentSnapshot, HistorySnapshot};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// CPMI API client
///
/// The base URL is passed per call because it is live session state that
/// the user can change at any time.
#[derive(Clone)]
pub struct CpmiClient {
    client: Client,
    data_timeout: Duration,
    health_timeout: Duration,
}

impl CpmiClient {
    /// Create a client with the standard timeouts (10s data, 5s health)
    pub fn new() -> CpmiResult<Self> {
        Self::with_timeouts(DATA_TIMEOUT, HEALTH_TIMEOUT)
    }

    /// Create a client with explicit timeouts
    pub fn with_timeouts(data_timeout: Duration, health_timeout: Duration) -> CpmiResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| CpmiError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            data_timeout,
            health_timeout,
        })
    }

    pub fn data_timeout(&self) -> Duration {
        self.data_timeout
    }

    pub fn health_timeout(&self) -> Duration {
        self.health_timeout
    }

    /// Fetch the current index reading and category breakdown
    #[instrument(skip(self))]
    pub async fn fetch_current(&self, base_url: &str) -> CpmiResult<CurrentSnapshot> {
        self.get_envelope(base_url, CURRENT_PATH).await
    }

    /// Fetch the index history and its summary statistics
    #[instrument(skip(self))]
    pub async fn fetch_history(&self, base_url: &str) -> CpmiResult<HistorySnapshot> {
        self.get_envelope(base_url, HISTORY_PATH).await
    }

    /// Check the API host. Never fails: anything but a 200 is `false`.
    #[instrument(skip(self))]
    pub async fn check_health(&self, base_url: &str) -> bool {
        let url = endpoint_url(base_url, HEALTH_PATH);

        match self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => {
                let healthy = response.status() == StatusCode::OK;
                debug!("Health check {} -> {}", url, response.status());
                healthy
            }
            Err(e) => {
                debug!("Health check {} failed: {}", url, e);
                false
            }
        }
    }

    /// GET an endpoint and unwrap its `{ success, data }` envelope
    async fn get_envelope<T: DeserializeOwned>(&self, base_url: &str, path: &str) -> CpmiResult<T> {
        let url = endpoint_url(base_url, path);
        debug!("Fetching CPMI data from: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.data_timeout)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", url, e);
                CpmiError::connection(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Request to {} returned status {}", url, status);
            return Err(CpmiError::api_status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            warn!("Reading body from {} failed: {}", url, e);
            CpmiError::connection(e.to_string())
        })?;

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            warn!("Malformed response from {}: {}", url, e);
            CpmiError::payload(format!("Failed to parse response from {}: {}", path, e))
        })?;

        envelope.into_result()
    }
}
