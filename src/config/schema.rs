//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! telemetry layer. All types derive Serde traits for deserialization from
//! config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TelemetryConfig {
    /// HTTP server settings (demo binary).
    pub server: ServerConfig,

    /// Aggregation window and queue settings.
    pub aggregation: AggregationConfig,

    /// Per-request attribute extraction and record rendering.
    pub request: RequestConfig,

    /// Bot detection settings.
    pub bot_detection: BotDetectionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Aggregation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Aggregate observations into windows instead of logging each request.
    pub enabled: bool,

    /// Window length in milliseconds.
    pub interval_ms: u64,

    /// Ingestion queue capacity.
    pub queue_size: usize,
}

impl AggregationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 10_000,
            queue_size: 100,
        }
    }
}

/// Request attribute extraction and log rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Message attached to every emitted record.
    pub message: String,

    /// Paths that are never observed (exact match).
    pub excluded_paths: Vec<String>,

    /// Headers holding the client IP, checked in order.
    /// Empty = use the transport peer address.
    pub client_ip_headers: Vec<String>,

    /// Headers holding the user agent, checked in order.
    /// Empty = use the standard `user-agent` header.
    pub user_agent_headers: Vec<String>,

    /// Include filtered request headers in per-request records.
    pub log_headers: bool,

    /// Include the query string in per-request records.
    pub log_query_string: bool,

    /// Extra fields: field name → candidate headers (first non-empty wins).
    pub header_fields: BTreeMap<String, Vec<String>>,

    /// Fixed fields added to every record.
    pub static_fields: BTreeMap<String, String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            message: "api_logger v1".to_string(),
            excluded_paths: Vec::new(),
            client_ip_headers: Vec::new(),
            user_agent_headers: Vec::new(),
            log_headers: false,
            log_query_string: false,
            header_fields: BTreeMap::new(),
            static_fields: BTreeMap::new(),
        }
    }
}

/// Bot detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BotDetectionConfig {
    /// Enable the keyword detector.
    pub enabled: bool,

    /// Case-insensitive user-agent substrings that mark a bot.
    pub patterns: Vec<String>,
}

impl Default for BotDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            patterns: [
                "bot",
                "crawler",
                "spider",
                "slurp",
                "curl",
                "wget",
                "python-requests",
                "headless",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
