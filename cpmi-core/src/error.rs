//! Error types for the dashboard

use thiserror::Error;

/// Dashboard-wide error type
///
/// Outcomes are memoised by the freshness cache, failures included, so the
/// error has to be cheap to clone and carries messages rather than sources.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CpmiError {
    /// Transport-level failure: DNS, connection refused, timeout
    #[error("Connection Error: {message}")]
    Connection { message: String },

    /// The API answered with a non-200 status
    #[error("API Error: {code}")]
    ApiStatus { code: u16 },

    /// The API answered 200 but the body is not the expected envelope
    #[error("Payload Error: {message}")]
    Payload { message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CpmiError {
    pub fn connection(msg: impl Into<String>) -> Self {
        CpmiError::Connection {
            message: msg.into(),
        }
    }

    pub fn api_status(code: u16) -> Self {
        CpmiError::ApiStatus { code }
    }

    pub fn payload(msg: impl Into<String>) -> Self {
        CpmiError::Payload {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        CpmiError::Config(msg.into())
    }

    /// Short machine-readable tag, used in JSON responses and logs
    pub fn kind(&self) -> &'static str {
        match self {
            CpmiError::Connection { .. } => "connection",
            CpmiError::ApiStatus { .. } => "api_status",
            CpmiError::Payload { .. } => "payload",
            CpmiError::Config(_) => "config",
        }
    }
}

/// Result type alias for dashboard operations
pub type CpmiResult<T> = Result<T, CpmiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text_matches_dashboard_wording() {
        assert_eq!(CpmiError::api_status(500).to_string(), "API Error: 500");
        assert_eq!(
            CpmiError::connection("connection refused").to_string(),
            "Connection Error: connection refused"
        );
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(CpmiError::payload("missing data").kind(), "payload");
        assert_eq!(CpmiError::config("bad url").kind(), "config");
    }
}
