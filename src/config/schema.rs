//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mock API
//! server, the request manager and the CLI. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Mock API server settings (bind address, base path).
    pub server: ServerConfig,

    /// Request manager settings (de-duplication, retries, transport).
    pub requests: RequestConfig,

    /// In-memory mock backend settings.
    pub mock: MockConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Path prefix every mock route is mounted under.
    pub base_path: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            base_path: "/mock-api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Request manager configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Base URL the HTTP transport prefixes request paths with.
    pub base_url: String,

    /// Transport-level timeout in seconds.
    pub timeout_secs: u64,

    /// Share one in-flight call between identical concurrent requests.
    pub enable_dedupe: bool,

    /// Accepted for compatibility with existing configs; not enforced.
    pub dedupe_window_ms: u64,

    /// Enable retries of transient failures.
    pub enable_retry: bool,

    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,

    /// Base delay between retries in milliseconds.
    pub retry_delay_ms: u64,

    /// Double the delay on every retry.
    pub use_exponential_backoff: bool,

    /// Upper bound for any computed delay in milliseconds.
    pub max_delay_ms: u64,

    /// Upper bound of the random jitter added to exponential delays.
    pub jitter_ms: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/mock-api".to_string(),
            timeout_secs: 10,
            enable_dedupe: true,
            dedupe_window_ms: 0,
            enable_retry: true,
            max_retries: 3,
            retry_delay_ms: 1000,
            use_exponential_backoff: true,
            max_delay_ms: 30_000,
            jitter_ms: 1000,
        }
    }
}

/// Mock backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MockConfig {
    /// Serve the mock API.
    pub enabled: bool,

    /// Populate collections with fixture data at startup.
    pub seed: bool,

    /// Simulated latency added to every mock response, in milliseconds.
    pub delay_ms: u64,

    /// Message of the envelope returned for unmatched routes.
    pub not_found_message: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: true,
            delay_ms: 0,
            not_found_message: "接口不存在".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [requests]
            max_retries = 5
            enable_dedupe = false
            "#,
        )
        .unwrap();

        assert_eq!(config.requests.max_retries, 5);
        assert!(!config.requests.enable_dedupe);
        assert_eq!(config.requests.retry_delay_ms, 1000);
        assert_eq!(config.server.base_path, "/mock-api");
        assert_eq!(config.mock.not_found_message, "接口不存在");
    }
}
