//! Stage identifiers and the short-circuit result type.

use std::any::Any;

use hermes_core::{RequestContext, ResultCode};
use serde_json::Value;

/// Pipeline stages, in execution order.
///
/// The order is fixed. Hooks are the only extension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Route and method lookup.
    Resolve = 1,
    /// Bearer token extraction.
    Authenticate = 2,
    /// Payload parsing and parameter checks.
    ValidatePayload = 3,
    /// Pre-dispatch hook.
    PreHook = 4,
    /// Handler invocation.
    Dispatch = 5,
    /// Post-dispatch hook.
    PostHook = 6,
    /// Response assembly.
    Respond = 7,
}

impl Stage {
    /// Returns true for the stages that can short-circuit the run.
    #[must_use]
    pub const fn is_check(self) -> bool {
        (self as u8) <= 3
    }

    /// Returns true for the stages that always run, regardless of prior
    /// failures.
    #[must_use]
    pub const fn always_runs(self) -> bool {
        matches!(self, Self::PreHook | Self::PostHook | Self::Respond)
    }

    /// Returns the stage name used in log events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Authenticate => "authenticate",
            Self::ValidatePayload => "validate_payload",
            Self::PreHook => "pre_hook",
            Self::Dispatch => "dispatch",
            Self::PostHook => "post_hook",
            Self::Respond => "respond",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 7] {
        [
            Self::Resolve,
            Self::Authenticate,
            Self::ValidatePayload,
            Self::PreHook,
            Self::Dispatch,
            Self::PostHook,
            Self::Respond,
        ]
    }
}

/// A stage's decision to stop the run with a non-`OK` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Result code to report.
    pub code: ResultCode,
    /// Payload to report. `None` keeps whatever payload the context holds.
    pub data: Option<Value>,
}

impl Outcome {
    /// Creates an outcome that keeps the current payload.
    #[must_use]
    pub const fn new(code: ResultCode) -> Self {
        Self { code, data: None }
    }

    /// Creates an outcome with a payload.
    #[must_use]
    pub const fn with_data(code: ResultCode, data: Value) -> Self {
        Self {
            code,
            data: Some(data),
        }
    }

    /// Writes the outcome into the context.
    pub fn apply(self, ctx: &mut RequestContext) {
        match self.data {
            Some(data) => ctx.set_result(self.code, data),
            None => ctx.fail(self.code),
        }
    }
}

/// Result of a short-circuiting stage.
pub type StageResult = Result<(), Outcome>;

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
