//! Typed configuration for Hermes.
//!
//! Two kinds of startup data live here:
//!
//! - **Runtime settings** ([`HermesConfig`]): server address and timeouts,
//!   transport headers, request ID host tags, table locations, logging and
//!   metrics. Loaded in layers by [`ConfigLoader`]: defaults → TOML/JSON
//!   file → `PREFIX__SECTION__KEY` environment variables.
//! - **Schema tables**: the routes and codes JSON files, turned into a
//!   validated [`SchemaRegistry`](hermes_core::SchemaRegistry) by
//!   [`load_registry`] or [`registry_from_str`].
//!
//! Unknown fields are rejected in both.
//!
//! # Example
//!
//! ```no_run
//! use hermes_config::{load_registry, ConfigLoader};
//!
//! # fn main() -> Result<(), hermes_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//!
//! let registry = load_registry(&config.api.routes_path, &config.api.codes_path)?;
//! println!("{} routes on {}", registry.route_count(), config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! body_timeout_ms = 30000
//! client_ip_header = "fly-client-ip"
//! request_id_header = "fly-request-id"
//!
//! [api]
//! routes_path = "routes.json"
//! codes_path = "codes.json"
//! host_tags = ["gru", "vm-1"]
//!
//! [telemetry]
//! service_name = "hermes"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;
mod tables;

pub use config::{HermesConfig, HermesConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    ApiConfig, LogFormat, LoggingConfig, MetricsConfig, ServerConfig, TelemetryConfigSection,
};
pub use tables::{load_registry, registry_from_str};
