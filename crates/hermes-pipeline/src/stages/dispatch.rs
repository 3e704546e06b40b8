//! Handler invocation.

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use hermes_core::{HandlerRegistry, RequestContext, ResultCode};
use hermes_telemetry::metrics::{record_handler, record_panic};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::stage::{panic_message, Outcome, Stage, StageResult};

/// Invokes the handler for the resolved resource.
///
/// - no resource on the context → `I002`
/// - function key not registered → `I003`, with the key as payload
/// - handler panics → `I001`, with the panic message as payload
/// - otherwise the handler's payload and code (empty code → `OK`) become the
///   result
pub async fn run(handlers: &HandlerRegistry, ctx: &mut RequestContext) -> StageResult {
    let stage = Stage::Dispatch.name();

    let Some(resource) = ctx.resource().cloned() else {
        warn!(stage, "dispatch without a resolved resource");
        return Err(Outcome::new(ResultCode::INTERNAL_UNEXPECTED));
    };
    let function = resource.function.as_str();

    let Some(handler) = handlers.get(function) else {
        warn!(stage, function, "no handler registered");
        return Err(Outcome::with_data(
            ResultCode::UNKNOWN_HANDLER,
            Value::String(function.to_owned()),
        ));
    };

    let started = Instant::now();
    let result = AssertUnwindSafe(handler.call(ctx)).catch_unwind().await;
    let elapsed = started.elapsed();
    record_handler(function, elapsed);

    match result {
        Ok(output) => {
            let output = output.normalized();
            debug!(
                stage,
                function,
                code = %output.code,
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                "handler returned"
            );
            ctx.set_result(output.code, output.data);
            Ok(())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(stage, function, panic = %message, "handler panicked");
            record_panic(function);
            Err(Outcome::with_data(
                ResultCode::INTERNAL_PANIC,
                Value::String(message),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{fixtures, HandlerOutput, Resource};
    use http::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx_for(function: &str) -> RequestContext {
        let mut ctx = RequestContext::new(Method::GET, "/");
        ctx.set_resource(Arc::new(Resource::new(function)));
        ctx
    }

    #[tokio::test]
    async fn test_handler_output_becomes_result() {
        let handlers = fixtures::sample_handlers();
        let mut ctx = ctx_for("index");

        assert!(run(&handlers, &mut ctx).await.is_ok());
        assert_eq!(ctx.result_code(), &ResultCode::OK);
        assert_eq!(ctx.result_data(), &json!({"hello": "world"}));
    }

    #[tokio::test]
    async fn test_unknown_handler() {
        let handlers = fixtures::sample_handlers();
        let mut ctx = ctx_for("does_not_exist");

        let outcome = run(&handlers, &mut ctx).await.unwrap_err();
        assert_eq!(
            outcome,
            Outcome::with_data(ResultCode::UNKNOWN_HANDLER, json!("does_not_exist"))
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let handlers = fixtures::sample_handlers();
        let mut ctx = ctx_for("explode");

        let outcome = run(&handlers, &mut ctx).await.unwrap_err();
        assert_eq!(
            outcome,
            Outcome::with_data(ResultCode::INTERNAL_PANIC, json!("boom"))
        );
    }

    #[tokio::test]
    async fn test_formatted_panic_message() {
        let mut handlers = HandlerRegistry::new();
        handlers.register_fn("fmt", |ctx| panic!("bad route {}", ctx.route()));
        let mut ctx = ctx_for("fmt");

        let outcome = run(&handlers, &mut ctx).await.unwrap_err();
        assert_eq!(outcome.data, Some(json!("bad route index")));
    }

    #[tokio::test]
    async fn test_empty_code_normalized() {
        let mut handlers = HandlerRegistry::new();
        handlers.register_fn("empty", |_| HandlerOutput::new(json!({"x": 1}), ""));
        let mut ctx = ctx_for("empty");

        assert!(run(&handlers, &mut ctx).await.is_ok());
        assert_eq!(ctx.result_code(), &ResultCode::OK);
    }

    #[tokio::test]
    async fn test_custom_code_passes_through() {
        let mut handlers = HandlerRegistry::new();
        handlers.register_fn("custom", |_| HandlerOutput::new(json!(null), "X042"));
        let mut ctx = ctx_for("custom");

        assert!(run(&handlers, &mut ctx).await.is_ok());
        assert_eq!(ctx.result_code().as_str(), "X042");
        assert_eq!(ctx.result_data(), &Value::Null);
    }

    #[tokio::test]
    async fn test_missing_resource() {
        let handlers = fixtures::sample_handlers();
        let mut ctx = RequestContext::new(Method::GET, "/");

        let outcome = run(&handlers, &mut ctx).await.unwrap_err();
        assert_eq!(outcome.code, ResultCode::INTERNAL_UNEXPECTED);
    }
}
