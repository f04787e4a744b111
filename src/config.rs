//! Configuration management.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::enrichment::EnrichmentConfig;

/// Main library configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Route provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Enrichment pipeline configuration
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Directions API key
    pub api_key: Option<String>,

    /// Directions API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout for provider calls
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}
fn default_json_logging() -> bool {
    true
}
fn default_base_url() -> String {
    "https://maps.googleapis.com".to_string()
}
fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SIGNPOST").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with environment overrides.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SIGNPOST").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.provider.base_url, "https://maps.googleapis.com");
        assert_eq!(config.provider.request_timeout, Duration::from_secs(10));
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.enrichment.max_attempts, 1);
    }

    #[test]
    fn test_provider_config_deserializes_durations() {
        let json = serde_json::json!({
            "api_key": "test-key",
            "base_url": "http://localhost:9000",
            "request_timeout": "2s"
        });

        let config: ProviderConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
    }
}
