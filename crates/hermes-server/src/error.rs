//! Server error types.

use thiserror::Error;

/// Errors returned while starting or running a server.
///
/// Per-request failures never surface here; they travel as result codes in
/// the response.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The configured address does not parse.
    #[error("invalid address '{addr}': {reason}")]
    InvalidAddress {
        /// The rejected address.
        addr: String,
        /// Parser message.
        reason: String,
    },

    /// Binding the listener failed.
    #[error("failed to bind to {addr}")]
    Bind {
        /// The address that could not be bound.
        addr: std::net::SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServerError::InvalidAddress {
            addr: "nope".to_string(),
            reason: "invalid socket address syntax".to_string(),
        };
        assert!(err.to_string().contains("nope"));

        let err = ServerError::Bind {
            addr: "127.0.0.1:80".parse().unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().contains("127.0.0.1:80"));
    }
}
