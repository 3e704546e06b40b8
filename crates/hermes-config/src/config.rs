//! Top-level runtime configuration.

use std::net::SocketAddr;

use hermes_telemetry::logging::create_env_filter;
use serde::{Deserialize, Serialize};

use crate::{ApiConfig, ConfigError, LogFormat, ServerConfig, TelemetryConfigSection};

/// Complete Hermes runtime configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer defaults, a file and
/// environment variables.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.api.routes_path, "routes.json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Schema tables and request ID tagging.
    #[serde(default)]
    pub api: ApiConfig,

    /// Telemetry configuration (metrics, logging).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl HermesConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> HermesConfigBuilder {
        HermesConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - an address does not parse as a socket address
    /// - a timeout is zero
    /// - a header name is empty
    /// - a table path is empty
    /// - the log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_addr("server.http_addr", &self.server.http_addr)?;

        if self.telemetry.metrics.enabled {
            parse_addr("telemetry.metrics.addr", &self.telemetry.metrics.addr)?;
        }

        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.shutdown_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.server.body_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.body_timeout_ms",
                "must be greater than zero",
            ));
        }

        for (field, value) in [
            ("server.client_ip_header", &self.server.client_ip_header),
            ("server.request_id_header", &self.server.request_id_header),
            ("api.routes_path", &self.api.routes_path),
            ("api.codes_path", &self.api.codes_path),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid_value(field, "must not be empty"));
            }
        }

        if self.telemetry.logging.enabled {
            create_env_filter(&self.telemetry.logging.level).map_err(|e| {
                ConfigError::invalid_value("telemetry.logging.level", e.to_string())
            })?;
        }

        Ok(())
    }

    /// Development preset: debug level, pretty logs, no metrics exporter.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::{HermesConfig, LogFormat};
    ///
    /// let config = HermesConfig::development();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    /// assert!(!config.telemetry.metrics.enabled);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "127.0.0.1:8080".to_string();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.metrics.enabled = false;
        config
    }

    /// Production preset: info level, JSON logs, metrics exporter on.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.metrics.enabled = true;
        config
    }

    /// Returns the parsed server address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the address does not parse.
    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_addr("server.http_addr", &self.server.http_addr)
    }
}

fn parse_addr(field: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::invalid_value(field, format!("invalid socket address: {value}")))
}

/// Builder for [`HermesConfig`].
#[derive(Debug, Default)]
pub struct HermesConfigBuilder {
    server: Option<ServerConfig>,
    api: Option<ApiConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl HermesConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server configuration.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the API configuration.
    #[must_use]
    pub fn api(mut self, api: ApiConfig) -> Self {
        self.api = Some(api);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> HermesConfig {
        HermesConfig {
            server: self.server.unwrap_or_default(),
            api: self.api.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<HermesConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoggingConfig, MetricsConfig};

    #[test]
    fn test_default_config_is_valid() {
        let config = HermesConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.telemetry.service_name, "hermes");
    }

    #[test]
    fn test_builder_sections() {
        let config = HermesConfig::builder()
            .server(ServerConfig {
                http_addr: "127.0.0.1:3000".to_string(),
                ..Default::default()
            })
            .api(ApiConfig {
                host_tags: vec!["gru".to_string()],
                ..Default::default()
            })
            .build();

        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
        assert_eq!(config.api.host_tags, vec!["gru"]);
        assert_eq!(config.telemetry.service_name, "hermes");
    }

    #[test]
    fn test_validate_invalid_server_addr() {
        let result = HermesConfig::builder()
            .server(ServerConfig {
                http_addr: "not-an-address".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("http_addr"));
    }

    #[test]
    fn test_metrics_addr_checked_only_when_enabled() {
        let mut config = HermesConfig::default();
        config.telemetry.metrics = MetricsConfig {
            enabled: true,
            addr: "invalid".to_string(),
        };
        assert!(config.validate().unwrap_err().to_string().contains("metrics.addr"));

        config.telemetry.metrics.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = HermesConfig::default();
        config.server.body_timeout_ms = 0;
        assert!(config.validate().unwrap_err().to_string().contains("body_timeout_ms"));

        let mut config = HermesConfig::default();
        config.server.shutdown_timeout_secs = 0;
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("shutdown_timeout_secs"));
    }

    #[test]
    fn test_empty_header_rejected() {
        let mut config = HermesConfig::default();
        config.server.request_id_header = "  ".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("request_id_header"));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let config = HermesConfig::builder()
            .telemetry(TelemetryConfigSection {
                logging: LoggingConfig {
                    level: "hermes_pipeline=loud".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .build();

        assert!(config.validate().unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn test_presets() {
        let dev = HermesConfig::development();
        assert_eq!(dev.telemetry.logging.level, "debug");
        assert!(dev.validate().is_ok());

        let prod = HermesConfig::production();
        assert_eq!(prod.telemetry.logging.format, LogFormat::Json);
        assert!(prod.telemetry.metrics.enabled);
    }

    #[test]
    fn test_http_addr_parsed() {
        let addr = HermesConfig::default().http_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_toml_round_trip_sections() {
        let toml_str = toml::to_string_pretty(&HermesConfig::default()).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[telemetry.logging]"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<HermesConfig, _> = toml::from_str("[authorization]\nenabled = true");
        assert!(result.is_err());
    }
}
