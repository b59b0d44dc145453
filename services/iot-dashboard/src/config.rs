//! Configuration types for the IoT dashboard service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides the backend base URL
pub const API_URL_ENV: &str = "IOT_API_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

impl Config {
    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_api_url(std::env::var(API_URL_ENV).ok());
    }

    /// Replace the backend base URL if an override is present and non-empty
    pub fn apply_api_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!("Overriding API base URL with {}", url);
            self.api.base_url = url;
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> crate::Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(crate::DashboardError::Config(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.polling.interval.is_zero() {
            return Err(crate::DashboardError::Config(
                "polling.interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Backend endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_time_range_seconds")]
    pub time_range_seconds: u64,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            time_range_seconds: default_time_range_seconds(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Refresh timer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_polling_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_polling_interval(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_server_port(),
        }
    }
}

/// Presentation options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Keep showing the last good readings under a stale banner when a poll fails
    #[serde(default)]
    pub retain_on_error: bool,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_time_range_seconds() -> u64 {
    crate::client::DEFAULT_TIME_RANGE_SECONDS
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_polling_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_true() -> bool {
    true
}

fn default_server_port() -> u16 {
    3000
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::DashboardError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content).map_err(|e| {
        crate::DashboardError::Config(format!("Failed to parse config file {:?}: {}", path, e))
    })?;
    Ok(config)
}
