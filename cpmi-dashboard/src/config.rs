//! Dashboard configuration loaded from the environment

use cpmi_client::DEFAULT_API_BASE;
use cpmi_services::{CacheTtls, DashboardSettings, SchedulerConfig};
use std::env;
use std::time::Duration;

const DEFAULT_SERVER_PORT: u16 = 8501;

/// Start-up configuration for the dashboard binary
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Initial session settings (API base URL + auto-refresh toggle)
    pub settings: DashboardSettings,
    /// Time between auto-refresh cycles
    pub refresh_interval: Duration,
    pub ttls: CacheTtls,
    pub server_port: u16,
}

impl DashboardConfig {
    /// Load configuration from environment variables
    ///
    /// Reads:
    /// - CPMI_API_URL: upstream base URL (default `http://35.203.43.14:3000`)
    /// - CPMI_AUTO_REFRESH: start with auto-refresh on (default true)
    /// - CPMI_REFRESH_INTERVAL_SECS: auto-refresh interval (default 30)
    /// - CPMI_CURRENT_TTL_SECS / CPMI_HISTORY_TTL_SECS / CPMI_HEALTH_TTL_SECS
    /// - SERVER_PORT: listen port (default 8501)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("CPMI_API_URL").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let auto_refresh = match lookup("CPMI_AUTO_REFRESH") {
            Some(raw) => parse_bool("CPMI_AUTO_REFRESH", &raw)?,
            None => true,
        };

        let settings = DashboardSettings::new(&base_url, auto_refresh).map_err(|e| {
            ConfigError::InvalidUrl {
                field: "CPMI_API_URL".to_string(),
                error: e.to_string(),
            }
        })?;

        let defaults = CacheTtls::default();
        let ttls = CacheTtls {
            current: secs_or(&lookup, "CPMI_CURRENT_TTL_SECS", defaults.current)?,
            history: secs_or(&lookup, "CPMI_HISTORY_TTL_SECS", defaults.history)?,
            health: secs_or(&lookup, "CPMI_HEALTH_TTL_SECS", defaults.health)?,
        };

        let refresh_interval = secs_or(
            &lookup,
            "CPMI_REFRESH_INTERVAL_SECS",
            SchedulerConfig::default().refresh_interval,
        )?;

        let server_port = match lookup("SERVER_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                field: "SERVER_PORT".to_string(),
                value: raw.clone(),
            })?,
            None => DEFAULT_SERVER_PORT,
        };

        Ok(Self {
            settings,
            refresh_interval,
            ttls,
            server_port,
        })
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            refresh_interval: self.refresh_interval,
        }
    }
}

fn secs_or<F>(lookup: &F, field: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(field) else {
        return Ok(default);
    };

    let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        field: field.to_string(),
        value: raw.clone(),
    })?;

    if secs == 0 {
        return Err(ConfigError::ZeroDuration {
            field: field.to_string(),
        });
    }

    Ok(Duration::from_secs(secs))
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid URL in {field}: {error}")]
    InvalidUrl { field: String, error: String },

    #[error("Invalid number in {field}: '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("Invalid boolean in {field}: '{value}'")]
    InvalidBool { field: String, value: String },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: String },
}
