//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{ConfigError, HermesConfig, LogFormat};

/// Configuration loader with a layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (or a preset)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables named `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use hermes_config::ConfigLoader;
///
/// # fn main() -> Result<(), hermes_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("hermes.toml")?
///     .with_env_prefix("HERMES")
///     .with_dotenv()?
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: HermesConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HermesConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HermesConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HermesConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`. The file
    /// replaces the current configuration; sections and fields it omits take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist, cannot be read, has
    /// an unsupported extension, or does not parse (unknown fields included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.config = Self::parse_file(&content, path)?;
        debug!(path = %path.display(), "configuration file loaded");

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `"toml"` or `"json"` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unsupported or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [api]
    ///     host_tags = ["gru", "vm-1"]
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.api.host_tags, vec!["gru", "vm-1"]);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// With prefix `HERMES`:
    /// - `HERMES__SERVER__HTTP_ADDR=0.0.0.0:9000`
    /// - `HERMES__API__HOST_TAGS=gru,vm-1`
    /// - `HERMES__TELEMETRY__LOGGING__LEVEL=debug`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory into the process
    /// environment. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), ".env loaded"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::validation_error(format!("invalid .env file: {e}"))),
        }
        Ok(self)
    }

    /// Apply environment overrides, validate, and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable does not parse or
    /// validation fails.
    pub fn load(mut self) -> Result<HermesConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HermesConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<HermesConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            // HERMESX__... or a bare HERMES variable; not ours.
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_int(key, value)?;
            }
            ["SERVER", "BODY_TIMEOUT_MS"] => config.server.body_timeout_ms = parse_int(key, value)?,
            ["SERVER", "CLIENT_IP_HEADER"] => {
                config.server.client_ip_header = value.to_ascii_lowercase();
            }
            ["SERVER", "REQUEST_ID_HEADER"] => {
                config.server.request_id_header = value.to_ascii_lowercase();
            }

            ["API", "ROUTES_PATH"] => config.api.routes_path = value.to_string(),
            ["API", "CODES_PATH"] => config.api.codes_path = value.to_string(),
            ["API", "HOST_TAGS"] => {
                config.api.host_tags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect();
            }

            ["TELEMETRY", "SERVICE_NAME"] => config.telemetry.service_name = value.to_string(),
            ["TELEMETRY", "METRICS", "ENABLED"] => {
                config.telemetry.metrics.enabled = parse_bool_var(key, value)?;
            }
            ["TELEMETRY", "METRICS", "ADDR"] => config.telemetry.metrics.addr = value.to_string(),
            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                config.telemetry.logging.enabled = parse_bool_var(key, value)?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => config.telemetry.logging.level = value.to_string(),
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                config.telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }

            _ => debug!(var = key, "ignoring unknown configuration variable"),
        }

        Ok(())
    }
}

fn parse_int(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().with_defaults().load().unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_toml_file() {
        let file = temp_file(
            ".toml",
            r#"
                [server]
                http_addr = "127.0.0.1:3000"
                body_timeout_ms = 500

                [api]
                routes_path = "/etc/hermes/routes.json"

                [telemetry.logging]
                format = "pretty"
            "#,
        );

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
        assert_eq!(config.server.body_timeout_ms, 500);
        assert_eq!(config.server.shutdown_timeout_secs, 30);
        assert_eq!(config.api.routes_path, "/etc/hermes/routes.json");
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_json_file() {
        let file = temp_file(".json", r#"{"api": {"host_tags": ["gru"]}}"#);
        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.api.host_tags, vec!["gru"]);
    }

    #[test]
    fn test_loader_rejects_unknown_field_in_file() {
        let file = temp_file(".toml", "[server]\nmax_connections = 5\n");
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_loader_rejects_unknown_extension() {
        let file = temp_file(".yaml", "server: {}");
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_loader_file_not_found() {
        let err = ConfigLoader::new().with_file("/nonexistent/hermes.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_loader_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/hermes.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"server": {"http_addr": "127.0.0.1:3000"}}"#;
        let config = ConfigLoader::new().with_string(json, "json").unwrap().load().unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_loader_validates() {
        let err = ConfigLoader::new()
            .with_string("[server]\nhttp_addr = \"nope\"", "toml")
            .unwrap()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_apply_env_var_server() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__HTTP_ADDR", "192.168.1.1:9000", "TEST").unwrap();
        loader.apply_env_var("TEST__SERVER__BODY_TIMEOUT_MS", "250", "TEST").unwrap();
        loader.apply_env_var("TEST__SERVER__CLIENT_IP_HEADER", "X-Real-IP", "TEST").unwrap();
        assert_eq!(loader.config.server.http_addr, "192.168.1.1:9000");
        assert_eq!(loader.config.server.body_timeout_ms, 250);
        assert_eq!(loader.config.server.client_ip_header, "x-real-ip");
    }

    #[test]
    fn test_apply_env_var_host_tags() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__API__HOST_TAGS", "gru, vm-1,,", "TEST").unwrap();
        assert_eq!(loader.config.api.host_tags, vec!["gru", "vm-1"]);
    }

    #[test]
    fn test_apply_env_var_telemetry() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__TELEMETRY__SERVICE_NAME", "users-api", "TEST").unwrap();
        loader.apply_env_var("TEST__TELEMETRY__LOGGING__LEVEL", "debug", "TEST").unwrap();
        loader.apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "PRETTY", "TEST").unwrap();
        loader.apply_env_var("TEST__TELEMETRY__METRICS__ENABLED", "off", "TEST").unwrap();
        assert_eq!(loader.config.telemetry.service_name, "users-api");
        assert_eq!(loader.config.telemetry.logging.level, "debug");
        assert_eq!(loader.config.telemetry.logging.format, LogFormat::Pretty);
        assert!(!loader.config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_apply_env_var_parse_errors() {
        let mut loader = ConfigLoader::new();
        assert!(loader.apply_env_var("TEST__SERVER__BODY_TIMEOUT_MS", "soon", "TEST").is_err());
        assert!(loader.apply_env_var("TEST__TELEMETRY__METRICS__ENABLED", "maybe", "TEST").is_err());
        assert!(loader.apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "xml", "TEST").is_err());
    }

    #[test]
    fn test_apply_env_var_ignores_unknown_and_foreign() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__HTTP2", "true", "TEST").unwrap();
        loader.apply_env_var("TESTING__SERVER__HTTP_ADDR", "1.2.3.4:1", "TEST").unwrap();
        assert_eq!(loader.config, HermesConfig::default());
    }

    #[test]
    fn test_parse_bool() {
        for value in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["false", "False", "0", "no", "off"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }
}
