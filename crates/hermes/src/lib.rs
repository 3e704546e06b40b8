//! # Hermes
//!
//! **Schema-driven JSON API pipeline**
//!
//! Hermes serves a JSON API described by two tables instead of code:
//!
//! - a **routes table** naming, for each route and HTTP verb, the handler
//!   function, whether a bearer token is required, and the typed body
//!   parameters
//! - a **codes table** mapping each result code to an HTTP status and
//!   localized messages
//!
//! Every request goes through the same fixed pipeline and every response,
//! success or failure, is the same JSON envelope
//! `{ id, code, time, message, data }`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hermes::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_defaults()
//!         .with_optional_file("hermes.toml")?
//!         .with_env_prefix("HERMES")
//!         .load()?;
//!
//!     let api = Api::builder()
//!         .config(config)
//!         .handler_fn("index", |_ctx| HandlerOutput::ok(json!({ "hello": "world" })))
//!         .build()?;
//!
//!     api.init_telemetry()?;
//!     api.serve().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! resolve → authenticate → validate → pre-hook → dispatch → post-hook → respond
//! ```
//!
//! A failing stage sets its result code and skips dispatch; both hooks still
//! run. Handler and hook panics become `I001`.

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod error;

pub use api::{request_id_policy, server_config, telemetry_config, Api, ApiBuilder};
pub use error::ApiError;

// Re-export the member crates
pub use hermes_config as config;
pub use hermes_core as core;
pub use hermes_pipeline as pipeline;
pub use hermes_server as server;
pub use hermes_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Api, ApiBuilder, ApiError};

    pub use hermes_config::{load_registry, registry_from_str, ConfigLoader, HermesConfig};

    pub use hermes_core::{
        BoxFuture, Handler, HandlerOutput, HandlerRegistry, RequestContext, ResultCode,
        SchemaRegistry,
    };

    pub use hermes_pipeline::{ApiResponse, Hook, Pipeline, RequestIdPolicy};

    pub use hermes_server::{
        GatewayProxyRequest, GatewayProxyResponse, HttpServer, ServerConfig, ShutdownSignal,
    };
}
