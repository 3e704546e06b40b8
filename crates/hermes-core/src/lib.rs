//! # Hermes Core
//!
//! Core types for the Hermes request pipeline.
//!
//! This crate holds everything the pipeline reads or mutates while serving a
//! request:
//!
//! - [`SchemaRegistry`] - immutable route/method → [`Resource`] and
//!   [`ResultCode`] → [`CodeDefinition`] tables, validated at build time
//! - [`HandlerRegistry`] - function key → [`Handler`] lookup supplied by the
//!   embedding application
//! - [`RequestContext`] - per-request state threaded through every stage
//!
//! Registries are built once at startup and shared behind `Arc`; nothing in
//! this crate holds global state.

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod code;
mod context;
mod error;
pub mod fixtures;
mod handler;
mod registry;
mod resource;

pub use code::{CodeDefinition, ResultCode};
pub use context::{route_name, RequestContext, RequestId, INDEX_ROUTE};
pub use error::{SchemaError, SchemaResult};
pub use handler::{AsyncFnHandler, BoxFuture, FnHandler, Handler, HandlerOutput, HandlerRegistry};
pub use registry::{CodesTable, Lookup, RoutesTable, SchemaRegistry, SchemaRegistryBuilder};
pub use resource::{ParameterKind, ParameterSpec, Resource, ValueKind};
