//! Handlers and the handler registry.
//!
//! A [`Handler`] is the application code a [`Resource`](crate::Resource)
//! points at through its `function` key. The pipeline looks the key up in a
//! [`HandlerRegistry`] at dispatch time and runs the handler behind a panic
//! boundary.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::code::ResultCode;
use crate::context::RequestContext;

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler returns: a payload and a result code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutput {
    /// Payload placed in the response `data` field.
    pub data: Value,
    /// Result code. An empty code is treated as `OK`.
    pub code: ResultCode,
}

impl HandlerOutput {
    /// Creates an output with an explicit code.
    #[must_use]
    pub fn new(data: Value, code: impl Into<ResultCode>) -> Self {
        Self {
            data,
            code: code.into(),
        }
    }

    /// Creates an `OK` output.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::new(data, ResultCode::OK)
    }

    /// Creates an output with an empty object payload.
    #[must_use]
    pub fn code(code: impl Into<ResultCode>) -> Self {
        Self::new(Value::Object(Map::new()), code)
    }

    /// Replaces an empty code with `OK`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.code.is_empty() {
            self.code = ResultCode::OK;
        }
        self
    }
}

impl From<(Value, ResultCode)> for HandlerOutput {
    fn from((data, code): (Value, ResultCode)) -> Self {
        Self { data, code }
    }
}

/// Application code invoked at dispatch.
///
/// The handler receives the mutable request context, with the validated
/// parameters and bearer token already in place, and returns a
/// [`HandlerOutput`].
///
/// # Example
///
/// ```
/// use hermes_core::{BoxFuture, Handler, HandlerOutput, RequestContext};
/// use serde_json::json;
///
/// struct Whoami;
///
/// impl Handler for Whoami {
///     fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerOutput> {
///         Box::pin(async move { HandlerOutput::ok(json!({ "ip": ctx.client_ip() })) })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Runs the handler.
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerOutput>;
}

/// Adapts a synchronous closure into a [`Handler`].
///
/// The closure runs when the returned future is first polled, so a panic in
/// it is caught by the same boundary as an async handler's.
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&mut RequestContext) -> HandlerOutput + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut RequestContext) -> HandlerOutput + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerOutput> {
        Box::pin(async move { (self.func)(ctx) })
    }
}

/// Adapts a closure returning a boxed future into a [`Handler`].
///
/// ```
/// use hermes_core::{AsyncFnHandler, HandlerOutput};
/// use serde_json::json;
///
/// let handler = AsyncFnHandler::new(|ctx| {
///     Box::pin(async move { HandlerOutput::ok(json!({ "route": ctx.route() })) })
/// });
/// ```
pub struct AsyncFnHandler<F> {
    func: F,
}

impl<F> AsyncFnHandler<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, HandlerOutput> + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Handler for AsyncFnHandler<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, HandlerOutput> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerOutput> {
        (self.func)(ctx)
    }
}

/// Maps function keys to handlers.
///
/// Filled by the embedding application before the pipeline is built and
/// read-only afterwards.
///
/// # Example
///
/// ```
/// use hermes_core::{HandlerOutput, HandlerRegistry};
/// use serde_json::json;
///
/// let mut handlers = HandlerRegistry::new();
/// handlers.register_fn("index", |_ctx| HandlerOutput::ok(json!({ "hello": "world" })));
///
/// assert!(handlers.contains("index"));
/// assert!(handlers.get("missing").is_none());
/// ```
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any previous one under the same key.
    pub fn register<H: Handler>(&mut self, key: impl Into<String>, handler: H) -> &mut Self {
        self.handlers.insert(key.into(), Arc::new(handler));
        self
    }

    /// Registers a synchronous closure.
    pub fn register_fn<F>(&mut self, key: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&mut RequestContext) -> HandlerOutput + Send + Sync + 'static,
    {
        self.register(key, FnHandler::new(func))
    }

    /// Registers a closure returning a boxed future.
    pub fn register_async<F>(&mut self, key: impl Into<String>, func: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, HandlerOutput>
            + Send
            + Sync
            + 'static,
    {
        self.register(key, AsyncFnHandler::new(func))
    }

    /// Looks up a handler.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(key).cloned()
    }

    /// Returns `true` if a handler is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Returns the number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the registered keys in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
