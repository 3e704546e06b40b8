//! The short-circuiting stages and dispatch.
//!
//! 1. [`resolve`] - route and method lookup
//! 2. [`authenticate`] - bearer token extraction
//! 3. [`validation`] - payload parsing and parameter checks
//! 4. [`dispatch`] - handler invocation behind a panic boundary
//!
//! Each stage returns [`StageResult`](crate::StageResult); the driver stops
//! at the first `Err` and skips dispatch.

pub mod authenticate;
pub mod dispatch;
pub mod resolve;
pub mod validation;

pub use validation::{validate_parameters, ValidationReport};
