//! # Hermes Telemetry
//!
//! Observability for Hermes services:
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter` and JSON or pretty output
//! - **Metrics**: the `metrics` facade with a Prometheus exporter
//!
//! The pipeline calls the recording functions in [`metrics`] on every run.
//! They cost nothing until [`init_telemetry`] (or [`init_metrics`]) installs a
//! recorder.
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::{init_telemetry, LogConfig, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = TelemetryConfig::builder()
//!         .service_name("users-api")
//!         .logging(LogConfig::development())
//!         .build();
//!     init_telemetry(&config)?;
//!     Ok(())
//! }
//! ```
//!
//! # Metrics Endpoint
//!
//! ```text
//! # TYPE hermes_requests_total counter
//! hermes_requests_total{service="users-api",route="users",code="OK",status="200"} 1234
//! hermes_requests_total{service="users-api",route="users",code="G005",status="400"} 56
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use crate::config::{TelemetryConfig, TelemetryConfigBuilder};
pub use crate::error::TelemetryError;
pub use crate::logging::{init_logging, LogConfig};
pub use crate::metrics::{init_metrics, render_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// Metrics initialization needs a Tokio runtime; logging does not.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_everything_disabled() {
        let mut config = TelemetryConfig::builder().without_metrics().build();
        config.logging.enabled = false;
        assert!(init_telemetry(&config).is_ok());
    }
}
