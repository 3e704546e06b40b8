//! Server configuration types.
//!
//! # Example
//!
//! ```rust
//! use hermes_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("0.0.0.0:8080")
//!     .shutdown_timeout(Duration::from_secs(30))
//!     .client_ip_header("x-real-ip")
//!     .build();
//!
//! assert_eq!(config.http_addr(), "0.0.0.0:8080");
//! assert_eq!(config.client_ip_header(), "x-real-ip");
//! ```

use std::net::SocketAddr;
use std::time::Duration;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default body collection timeout in milliseconds.
pub const DEFAULT_BODY_TIMEOUT_MS: u64 = 30_000;

/// Default header overriding the socket peer as client IP.
pub const DEFAULT_CLIENT_IP_HEADER: &str = "fly-client-ip";

/// Default header carrying an upstream request ID.
pub const DEFAULT_REQUEST_ID_HEADER: &str = "fly-request-id";

/// HTTP adapter configuration.
///
/// Use [`ServerConfig::builder()`] to construct instances.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    http_addr: String,
    shutdown_timeout: Duration,
    body_timeout: Duration,
    client_ip_header: String,
    request_id_header: String,
}

impl ServerConfig {
    /// Creates a new server configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses and returns the HTTP address as a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// Returns how long shutdown waits for open connections.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Returns the body collection timeout.
    #[must_use]
    pub fn body_timeout(&self) -> Duration {
        self.body_timeout
    }

    /// Returns the lower-cased client IP header name.
    #[must_use]
    pub fn client_ip_header(&self) -> &str {
        &self.client_ip_header
    }

    /// Returns the lower-cased request ID header name.
    #[must_use]
    pub fn request_id_header(&self) -> &str {
        &self.request_id_header
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    http_addr: String,
    shutdown_timeout: Duration,
    body_timeout: Duration,
    client_ip_header: String,
    request_id_header: String,
}

impl ServerConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            body_timeout: Duration::from_millis(DEFAULT_BODY_TIMEOUT_MS),
            client_ip_header: DEFAULT_CLIENT_IP_HEADER.to_string(),
            request_id_header: DEFAULT_REQUEST_ID_HEADER.to_string(),
        }
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the body collection timeout.
    #[must_use]
    pub fn body_timeout(mut self, timeout: Duration) -> Self {
        self.body_timeout = timeout;
        self
    }

    /// Sets the client IP header. Stored lower-cased.
    #[must_use]
    pub fn client_ip_header(mut self, name: impl AsRef<str>) -> Self {
        self.client_ip_header = name.as_ref().to_ascii_lowercase();
        self
    }

    /// Sets the request ID header. Stored lower-cased.
    #[must_use]
    pub fn request_id_header(mut self, name: impl AsRef<str>) -> Self {
        self.request_id_header = name.as_ref().to_ascii_lowercase();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr,
            shutdown_timeout: self.shutdown_timeout,
            body_timeout: self.body_timeout,
            client_ip_header: self.client_ip_header,
            request_id_header: self.request_id_header,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
