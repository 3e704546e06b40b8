//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while initializing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize metrics.
    #[error("failed to initialize metrics: {0}")]
    MetricsInit(String),

    /// Failed to initialize logging.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Invalid configuration.
    #[error("invalid telemetry configuration: {0}")]
    InvalidConfig(String),

    /// Failed to parse an address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::MetricsInit("failed".to_string());
        assert_eq!(err.to_string(), "failed to initialize metrics: failed");
    }

    #[test]
    fn test_invalid_address_display() {
        let err = TelemetryError::InvalidAddress("nope:99999".to_string());
        assert!(err.to_string().contains("nope:99999"));
    }

    #[test]
    fn test_io_from() {
        let err: TelemetryError = std::io::Error::other("disk").into();
        assert!(matches!(err, TelemetryError::Io(_)));
    }
}
