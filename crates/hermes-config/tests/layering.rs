//! Defaults, file and environment layers applied together.

use std::env;
use std::io::Write;

use hermes_config::{ConfigError, ConfigLoader, LogFormat};

#[test]
fn environment_overrides_file_and_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
        [server]
        http_addr = "127.0.0.1:3000"
        body_timeout_ms = 1000

        [telemetry.logging]
        level = "warn"
        "#
    )
    .unwrap();

    env::set_var("LAYERTEST__SERVER__BODY_TIMEOUT_MS", "2500");
    env::set_var("LAYERTEST__API__HOST_TAGS", "gru,vm-3");
    env::set_var("LAYERTEST__TELEMETRY__LOGGING__FORMAT", "pretty");

    let config = ConfigLoader::new()
        .with_defaults()
        .with_file(file.path())
        .unwrap()
        .with_env_prefix("layertest")
        .load()
        .unwrap();

    // file
    assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    assert_eq!(config.telemetry.logging.level, "warn");
    // env over file
    assert_eq!(config.server.body_timeout_ms, 2500);
    assert_eq!(config.api.host_tags, vec!["gru", "vm-3"]);
    assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    // defaults
    assert_eq!(config.server.request_id_header, "fly-request-id");
}

#[test]
fn invalid_environment_value_fails_load() {
    env::set_var("BADENVTEST__SERVER__SHUTDOWN_TIMEOUT_SECS", "forever");

    let err = ConfigLoader::new()
        .with_env_prefix("BADENVTEST")
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::EnvParseError { .. }));
    assert!(err.to_string().contains("BADENVTEST__SERVER__SHUTDOWN_TIMEOUT_SECS"));
}

#[test]
fn environment_value_is_validated() {
    env::set_var("VALIDENVTEST__SERVER__HTTP_ADDR", "localhost");

    let err = ConfigLoader::new()
        .with_env_prefix("VALIDENVTEST")
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}
