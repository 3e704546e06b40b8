//! # Hermes Server
//!
//! Transport adapters for the Hermes pipeline.
//!
//! - [`HttpServer`] - hyper HTTP/1.1 server with graceful shutdown
//! - [`handle_gateway_event`] - API-gateway proxy-integration adapter
//!
//! Both adapters only translate: they build a
//! [`RequestContext`](hermes_core::RequestContext), hand it to
//! [`Pipeline::run`](hermes_pipeline::Pipeline::run) and write the response
//! back with an `x-request-id` header. Request failures never surface as
//! [`ServerError`]; they are result codes in the response body.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hermes_core::fixtures;
//! use hermes_pipeline::Pipeline;
//! use hermes_server::{HttpServer, ServerConfig, ShutdownSignal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::builder(fixtures::sample_registry()?, fixtures::sample_handlers()).build();
//!     let server = HttpServer::new(ServerConfig::default(), pipeline);
//!
//!     let shutdown = ShutdownSignal::with_os_signals();
//!     server.run_with_shutdown(shutdown).await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod gateway;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_BODY_TIMEOUT_MS, DEFAULT_CLIENT_IP_HEADER,
    DEFAULT_HTTP_ADDR, DEFAULT_REQUEST_ID_HEADER, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use error::ServerError;
pub use gateway::{
    handle_gateway_event, GatewayIdentity, GatewayProxyRequest, GatewayProxyResponse,
    GatewayRequestContext,
};
pub use server::{peer_ip, request_context, HttpServer, ResponseBody};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
