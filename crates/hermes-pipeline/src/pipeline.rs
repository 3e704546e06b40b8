//! The fixed-order request pipeline.
//!
//! Every request flows through the same seven stages:
//!
//! 1. **Resolve** - route and method lookup
//! 2. **Authenticate** - bearer token extraction, for resources that ask for it
//! 3. **Validate payload** - JSON object parsing and parameter checks
//! 4. **Pre-hook** - always runs
//! 5. **Dispatch** - only when the result is still `OK`
//! 6. **Post-hook** - always runs
//! 7. **Respond** - always runs
//!
//! The first failing check short-circuits stages 2 and 3 and dispatch. The
//! order cannot be changed; hooks are the only extension points. A panic
//! anywhere in stages 1 to 6 is contained and reported as `I001`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use hermes_core::{HandlerRegistry, RequestContext, ResultCode, SchemaRegistry};
use hermes_telemetry::metrics::{record_panic, record_request, InFlightGuard};
use serde_json::Value;
use tracing::{debug, error, info, info_span, Instrument};

use crate::hooks::{FnHook, Hook, NoopHook};
use crate::request_id::RequestIdPolicy;
use crate::response::{ApiResponse, ResponseAssembler};
use crate::stage::{panic_message, Outcome, Stage, StageResult};
use crate::stages::{authenticate, dispatch, resolve, validation};

const UNMATCHED_ROUTE: &str = "unmatched";

/// The request pipeline.
///
/// Cheap to clone; every component is shared behind an `Arc`.
///
/// # Example
///
/// ```
/// use hermes_core::{fixtures, RequestContext};
/// use hermes_pipeline::Pipeline;
/// use http::{Method, StatusCode};
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::builder(
///     fixtures::sample_registry().unwrap(),
///     fixtures::sample_handlers(),
/// )
/// .build();
///
/// let response = pipeline.run(RequestContext::new(Method::GET, "/")).await;
/// assert_eq!(response.status, StatusCode::OK);
/// # });
/// ```
#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<SchemaRegistry>,
    handlers: Arc<HandlerRegistry>,
    pre_hook: Arc<dyn Hook>,
    post_hook: Arc<dyn Hook>,
    request_ids: RequestIdPolicy,
    assembler: ResponseAssembler,
}

impl Pipeline {
    /// Creates a pipeline builder.
    #[must_use]
    pub fn builder(registry: SchemaRegistry, handlers: HandlerRegistry) -> PipelineBuilder {
        PipelineBuilder::new(registry, handlers)
    }

    /// Returns the schema registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Returns the handler registry.
    #[must_use]
    pub fn handlers(&self) -> &Arc<HandlerRegistry> {
        &self.handlers
    }

    /// Returns the request ID policy.
    #[must_use]
    pub fn request_id_policy(&self) -> &RequestIdPolicy {
        &self.request_ids
    }

    /// Runs one request to completion.
    ///
    /// Never fails: every outcome, including panics in handlers or hooks, is
    /// expressed as a result code in the returned response.
    pub async fn run(&self, mut ctx: RequestContext) -> ApiResponse {
        let _in_flight = InFlightGuard::new();

        let request_id = self.request_ids.apply(ctx.request_id());
        ctx.set_request_id(request_id);

        let span = info_span!(
            "request",
            request_id = %ctx.request_id(),
            route = ctx.route(),
            method = %ctx.method(),
        );

        async move {
            let processed = AssertUnwindSafe(self.process(&mut ctx)).catch_unwind().await;
            if let Err(panic) = processed {
                let message = panic_message(panic.as_ref());
                error!(panic = %message, "request panicked outside the handler");
                record_panic("");
                ctx.set_result(ResultCode::INTERNAL_PANIC, Value::String(message));
            }

            let response = self.assembler.assemble(&ctx);
            let elapsed = ctx.elapsed();
            let route = if ctx.resource().is_some() {
                ctx.route()
            } else {
                UNMATCHED_ROUTE
            };
            record_request(
                route,
                ctx.result_code().as_str(),
                response.status.as_u16(),
                elapsed,
            );

            info!(
                code = %ctx.result_code(),
                status = response.status.as_u16(),
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                "request completed"
            );
            response
        }
        .instrument(span)
        .await
    }

    async fn process(&self, ctx: &mut RequestContext) {
        if let Err(outcome) = self.check(ctx) {
            debug!(code = %outcome.code, "request rejected before dispatch");
            outcome.apply(ctx);
        }

        debug!(stage = Stage::PreHook.name(), "running hook");
        self.pre_hook.call(ctx).await;

        if ctx.is_ok() {
            if let Err(outcome) = dispatch::run(&self.handlers, ctx).await {
                outcome.apply(ctx);
            }
        } else {
            debug!(stage = Stage::Dispatch.name(), code = %ctx.result_code(), "dispatch skipped");
        }

        debug!(stage = Stage::PostHook.name(), "running hook");
        self.post_hook.call(ctx).await;
    }

    fn check(&self, ctx: &mut RequestContext) -> StageResult {
        resolve::run(&self.registry, ctx)?;
        authenticate::run(ctx)?;
        validation::run(ctx)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("routes", &self.registry.route_count())
            .field("codes", &self.registry.code_count())
            .field("handlers", &self.handlers.len())
            .field("request_ids", &self.request_ids)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Pipeline`].
pub struct PipelineBuilder {
    registry: Arc<SchemaRegistry>,
    handlers: Arc<HandlerRegistry>,
    pre_hook: Arc<dyn Hook>,
    post_hook: Arc<dyn Hook>,
    request_ids: RequestIdPolicy,
}

impl PipelineBuilder {
    /// Creates a builder with no-op hooks and pass-through request IDs.
    #[must_use]
    pub fn new(registry: SchemaRegistry, handlers: HandlerRegistry) -> Self {
        Self::with_arcs(Arc::new(registry), Arc::new(handlers))
    }

    /// Creates a builder from already shared registries.
    #[must_use]
    pub fn with_arcs(registry: Arc<SchemaRegistry>, handlers: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            handlers,
            pre_hook: Arc::new(NoopHook),
            post_hook: Arc::new(NoopHook),
            request_ids: RequestIdPolicy::default(),
        }
    }

    /// Sets the hook run before dispatch.
    #[must_use]
    pub fn pre_hook(mut self, hook: impl Hook) -> Self {
        self.pre_hook = Arc::new(hook);
        self
    }

    /// Sets a closure as the hook run before dispatch.
    #[must_use]
    pub fn pre_hook_fn<F>(self, hook: F) -> Self
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.pre_hook(FnHook::new(hook))
    }

    /// Sets the hook run after dispatch.
    #[must_use]
    pub fn post_hook(mut self, hook: impl Hook) -> Self {
        self.post_hook = Arc::new(hook);
        self
    }

    /// Sets a closure as the hook run after dispatch.
    #[must_use]
    pub fn post_hook_fn<F>(self, hook: F) -> Self
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.post_hook(FnHook::new(hook))
    }

    /// Sets the request ID policy.
    #[must_use]
    pub fn request_id_policy(mut self, policy: RequestIdPolicy) -> Self {
        self.request_ids = policy;
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        let assembler = ResponseAssembler::new(Arc::clone(&self.registry));
        Pipeline {
            registry: self.registry,
            handlers: self.handlers,
            pre_hook: self.pre_hook,
            post_hook: self.post_hook,
            request_ids: self.request_ids,
            assembler,
        }
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("request_ids", &self.request_ids)
            .finish_non_exhaustive()
    }
}
