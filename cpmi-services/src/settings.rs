//! Live session settings: API base URL and auto-refresh toggle

use cpmi_client::normalize_base_url;
use cpmi_core::{CpmiError, CpmiResult};
use serde::{Deserialize, Serialize};
use url::Url;

/// User-editable dashboard settings. Held in memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSettings {
    pub base_url: String,
    pub auto_refresh: bool,
}

/// Partial update sent by the settings form / JSON endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub base_url: Option<String>,
    pub auto_refresh: Option<bool>,
}

impl DashboardSettings {
    pub fn new(base_url: &str, auto_refresh: bool) -> CpmiResult<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            auto_refresh,
        })
    }

    /// Apply an update, returning whether anything changed.
    ///
    /// The update is validated first; on error the settings are untouched.
    pub fn apply(&mut self, update: &SettingsUpdate) -> CpmiResult<bool> {
        let base_url = update
            .base_url
            .as_deref()
            .map(validate_base_url)
            .transpose()?;

        let mut changed = false;
        if let Some(base_url) = base_url {
            if base_url != self.base_url {
                self.base_url = base_url;
                changed = true;
            }
        }
        if let Some(auto_refresh) = update.auto_refresh {
            if auto_refresh != self.auto_refresh {
                self.auto_refresh = auto_refresh;
                changed = true;
            }
        }

        Ok(changed)
    }
}

/// Check that a base URL is an absolute http(s) URL and return its
/// canonical form (no trailing slash)
pub fn validate_base_url(raw: &str) -> CpmiResult<String> {
    let trimmed = normalize_base_url(raw);
    if trimmed.is_empty() {
        return Err(CpmiError::config("API URL must not be empty"));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| CpmiError::config(format!("Invalid API URL '{}': {}", trimmed, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CpmiError::config(format!(
            "API URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(CpmiError::config(format!("API URL '{}' has no host", trimmed)));
    }

    Ok(trimmed.to_string())
}
