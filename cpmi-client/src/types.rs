//! Wire types and endpoint constants for the CPMI API

use cpmi_core::{CpmiError, CpmiResult};
use serde::Deserialize;
use std::time::Duration;

/// API host the dashboard points at until the user edits it
pub const DEFAULT_API_BASE: &str = "http://35.203.43.14:3000";

pub const CURRENT_PATH: &str = "/api/cpmi/current";
pub const HISTORY_PATH: &str = "/api/cpmi/history";
pub const HEALTH_PATH: &str = "/health";

/// Timeout for the index and history endpoints
pub const DATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the health check
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// `{ success, data }` envelope wrapped around every data response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, treating `success: false` or a missing `data`
    /// block as a malformed response
    pub fn into_result(self) -> CpmiResult<T> {
        if !self.success {
            let reason = self
                .error
                .unwrap_or_else(|| "response reported success=false".to_string());
            return Err(CpmiError::payload(reason));
        }

        self.data
            .ok_or_else(|| CpmiError::payload("response is missing the data block"))
    }
}

/// Canonical form of a user-supplied base URL: surrounding whitespace and
/// trailing slashes removed
pub fn normalize_base_url(base_url: &str) -> &str {
    base_url.trim().trim_end_matches('/')
}

/// Join a user-supplied base URL and an endpoint path
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", normalize_base_url(base_url), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_trims_trailing_slash() {
        assert_eq!(
            endpoint_url("http://localhost:3000/", CURRENT_PATH),
            "http://localhost:3000/api/cpmi/current"
        );
        assert_eq!(
            endpoint_url(" http://localhost:3000 ", HEALTH_PATH),
            "http://localhost:3000/health"
        );
    }

    #[test]
    fn test_envelope_success() {
        let envelope: ApiEnvelope<u32> =
            serde_json::from_str(r#"{"success": true, "data": 7}"#).unwrap();
        assert_eq!(envelope.into_result().unwrap(), 7);
    }

    #[test]
    fn test_envelope_failure_flag() {
        let envelope: ApiEnvelope<u32> =
            serde_json::from_str(r#"{"success": false, "error": "index not ready"}"#).unwrap();
        assert_eq!(
            envelope.into_result().unwrap_err(),
            CpmiError::payload("index not ready")
        );
    }

    #[test]
    fn test_envelope_missing_data() {
        let envelope: ApiEnvelope<u32> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(
            envelope.into_result(),
            Err(CpmiError::Payload { .. })
        ));
    }
}
