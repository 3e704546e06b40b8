//! # Hermes Pipeline
//!
//! The fixed-order request pipeline every Hermes request flows through.
//!
//! ```text
//! Request → Resolve → Authenticate → Validate → PreHook → Dispatch → PostHook → Respond
//!              └──────────┴─────────────┴── first failure skips to PreHook ──┘
//! ```
//!
//! | Stage | Purpose | Failure codes |
//! |-------|---------|---------------|
//! | 1 | Resolve route and method | `G001`, `G002`, `G003` |
//! | 2 | Extract the bearer token | `G006`, `G007` |
//! | 3 | Parse and validate the payload | `G004`, `G005` |
//! | 4 | Pre-dispatch hook | - |
//! | 5 | Invoke the handler | `I001`, `I002`, `I003` |
//! | 6 | Post-dispatch hook | - |
//! | 7 | Assemble the JSON envelope | - |
//!
//! A run never fails. Whatever happens, [`Pipeline::run`] returns an
//! [`ApiResponse`] whose status and message come from the codes table.
//!
//! ## Example
//!
//! ```
//! use hermes_core::{fixtures, RequestContext};
//! use hermes_pipeline::{Pipeline, Stage};
//! use http::Method;
//!
//! assert_eq!(Stage::all()[0].name(), "resolve");
//!
//! # tokio_test::block_on(async {
//! let pipeline = Pipeline::builder(
//!     fixtures::sample_registry().unwrap(),
//!     fixtures::sample_handlers(),
//! )
//! .pre_hook_fn(|ctx| ctx.set_extension(42_u32))
//! .build();
//!
//! let response = pipeline
//!     .run(RequestContext::new(Method::POST, "/users").with_body("{}"))
//!     .await;
//! assert_eq!(response.status.as_u16(), 400);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod hooks;
mod pipeline;
mod request_id;
mod response;
mod stage;
pub mod stages;

pub use hooks::{FnHook, Hook, NoopHook};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use request_id::RequestIdPolicy;
pub use response::{ApiResponse, ResponseAssembler, REQUEST_ID_HEADER};
pub use stage::{Outcome, Stage, StageResult};
pub use stages::{validate_parameters, ValidationReport};
