//! Bootstrap errors.

use hermes_config::ConfigError;
use hermes_core::SchemaError;
use hermes_server::ServerError;
use hermes_telemetry::TelemetryError;
use thiserror::Error;

/// Errors raised while building or starting an [`Api`](crate::Api).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Settings or tables could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The tables failed validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Logging or metrics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The HTTP server failed to start.
    #[error(transparent)]
    Server(#[from] ServerError),
}
