//! HTTP/1.1 adapter.
//!
//! Each accepted connection is served by hyper on its own task; each request
//! is turned into a [`RequestContext`], run through the [`Pipeline`], and the
//! resulting [`ApiResponse`](hermes_pipeline::ApiResponse) is written back
//! with an `x-request-id` header.
//!
//! # Example
//!
//! ```rust,no_run
//! use hermes_core::fixtures;
//! use hermes_pipeline::Pipeline;
//! use hermes_server::{HttpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::builder(fixtures::sample_registry()?, fixtures::sample_handlers()).build();
//! let config = ServerConfig::builder().http_addr("127.0.0.1:8080").build();
//!
//! HttpServer::new(config, pipeline).run().await?;
//! # Ok(())
//! # }
//! ```

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use bytes::Bytes;
use hermes_core::RequestContext;
use hermes_pipeline::Pipeline;
use http::request::Parts;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Type alias for the HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// The Hermes HTTP server.
#[derive(Debug)]
pub struct HttpServer {
    config: ServerConfig,
    pipeline: Pipeline,
}

impl HttpServer {
    /// Creates a server that runs every request through `pipeline`.
    #[must_use]
    pub fn new(config: ServerConfig, pipeline: Pipeline) -> Self {
        Self { config, pipeline }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                reason: e.to_string(),
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// triggers, then waits up to the shutdown timeout for open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        info!(addr = %listener.local_addr()?, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => match result {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                debug!(peer = %remote_addr, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                },

                () = shutdown.recv() => {
                    info!("shutdown signal received, stopping accept loop");
                    break;
                }
            }
        }

        let timeout = server.config.shutdown_timeout();
        info!(
            timeout_ms = timeout.as_millis(),
            connections = tracker.active_connections(),
            "draining connections"
        );

        tokio::select! {
            () = tracker.wait_for_shutdown() => info!("all connections closed"),
            () = tokio::time::sleep(timeout) => warn!(
                connections = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            ),
        }

        info!("server stopped");
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(peer = %remote_addr))]
    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req, remote_addr).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                debug!("finishing in-flight request before closing");
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(
        &self,
        req: Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Result<Response<ResponseBody>, Infallible> {
        let (parts, body) = req.into_parts();

        let body = match tokio::time::timeout(self.config.body_timeout(), body.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => {
                warn!(error = %e, "failed to read request body, continuing with an empty body");
                Bytes::new()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.body_timeout().as_millis(),
                    "request body collection timed out, continuing with an empty body"
                );
                Bytes::new()
            }
        };

        let ctx = request_context(&parts, remote_addr, body, &self.config);
        let response = self.pipeline.run(ctx).await;

        Ok(response.with_request_id_header().into_http().map(Full::new))
    }
}

/// Builds the pipeline input for one HTTP request.
///
/// - client IP: the configured client IP header when present, otherwise the
///   socket peer with IPv6 loopback reported as `127.0.0.1`
/// - request ID: the configured request ID header when present, otherwise a
///   generated UUID v7
/// - headers and query: first value per name
#[must_use]
pub fn request_context(
    parts: &Parts,
    remote_addr: SocketAddr,
    body: Bytes,
    config: &ServerConfig,
) -> RequestContext {
    let headers = parts.headers.iter().map(|(name, value)| {
        (
            name.as_str(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        )
    });

    let mut ctx = RequestContext::new(parts.method.clone(), parts.uri.path())
        .with_headers(headers)
        .with_query(parse_query(parts.uri.query()))
        .with_body(body);

    let client_ip = match ctx.header(config.client_ip_header()) {
        Some(ip) if !ip.trim().is_empty() => ip.trim().to_string(),
        _ => peer_ip(remote_addr),
    };
    ctx = ctx.with_client_ip(client_ip);

    if let Some(id) = ctx.header(config.request_id_header()) {
        if !id.trim().is_empty() {
            let id = id.trim().to_string();
            ctx.set_request_id(id);
        }
    }

    ctx
}

/// Returns the peer's IP as text, with IPv6 loopback mapped to `127.0.0.1`.
#[must_use]
pub fn peer_ip(remote_addr: SocketAddr) -> String {
    match remote_addr.ip() {
        IpAddr::V6(ip) if ip.is_loopback() => Ipv4Addr::LOCALHOST.to_string(),
        ip => ip.to_string(),
    }
}

fn parse_query(query: Option<&str>) -> Vec<(String, String)> {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Vec::new();
    };
    serde_urlencoded::from_str(query).unwrap_or_else(|e| {
        debug!(error = %e, "ignoring malformed query string");
        Vec::new()
    })
}
