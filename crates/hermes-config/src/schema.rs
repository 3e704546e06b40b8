//! Configuration schema types.
//!
//! Every section rejects unknown fields and fills missing ones with defaults.

use serde::{Deserialize, Serialize};

/// Server configuration section.
///
/// # Example
///
/// ```
/// use hermes_config::ServerConfig;
///
/// let config = ServerConfig {
///     http_addr: "127.0.0.1:3000".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.client_ip_header, "fly-client-ip");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown drain timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum time to collect a request body, in milliseconds.
    #[serde(default = "default_body_timeout")]
    pub body_timeout_ms: u64,

    /// Header whose value replaces the socket peer as client IP.
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,

    /// Header carrying an upstream request ID.
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            body_timeout_ms: default_body_timeout(),
            client_ip_header: default_client_ip_header(),
            request_id_header: default_request_id_header(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_body_timeout() -> u64 {
    30_000
}

fn default_client_ip_header() -> String {
    "fly-client-ip".to_string()
}

fn default_request_id_header() -> String {
    "fly-request-id".to_string()
}

/// Schema table locations and request ID tagging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Path to the routes table (JSON).
    #[serde(default = "default_routes_path")]
    pub routes_path: String,

    /// Path to the codes table (JSON).
    #[serde(default = "default_codes_path")]
    pub codes_path: String,

    /// Host tags prefixed to request IDs. Empty keeps IDs as supplied.
    #[serde(default)]
    pub host_tags: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            routes_path: default_routes_path(),
            codes_path: default_codes_path(),
            host_tags: Vec::new(),
        }
    }
}

fn default_routes_path() -> String {
    "routes.json".to_string()
}

fn default_codes_path() -> String {
    "codes.json".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable the Prometheus exporter.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prometheus scrape endpoint address.
    #[serde(default = "default_metrics_addr")]
    pub addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: default_metrics_addr(),
        }
    }
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or `EnvFilter` directive (e.g. `info,hermes_pipeline=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name attached to logs and metrics.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_service_name() -> String {
    "hermes".to_string()
}

fn default_true() -> bool {
    true
}
