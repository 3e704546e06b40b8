//! Pre- and post-dispatch hooks.
//!
//! Hooks are the pipeline's two extension points. Both receive the full
//! mutable [`RequestContext`] and always run, whether or not an earlier stage
//! failed. A hook can therefore inspect the result, replace it, or attach
//! extensions for the handler (a transaction, a resolved user).
//!
//! A panicking hook is contained by the pipeline's outer boundary and turns
//! the response into `I001`.

use std::sync::Arc;

use hermes_core::{BoxFuture, RequestContext};

/// An extension point invoked around dispatch.
///
/// # Example
///
/// ```
/// use hermes_core::{BoxFuture, RequestContext, ResultCode};
/// use hermes_pipeline::Hook;
///
/// struct RejectBannedTokens;
///
/// impl Hook for RejectBannedTokens {
///     fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()> {
///         Box::pin(async move {
///             if ctx.token() == Some("banned") {
///                 ctx.fail(ResultCode::new("X403"));
///             }
///         })
///     }
/// }
/// ```
pub trait Hook: Send + Sync + 'static {
    /// Runs the hook.
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()>;
}

impl<H: Hook + ?Sized> Hook for Arc<H> {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()> {
        (**self).call(ctx)
    }
}

/// Hook that does nothing. The default for both extension points.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl Hook for NoopHook {
    fn call<'a>(&'a self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, ()> {
        Box::pin(async {})
    }
}

/// Adapts a synchronous closure into a [`Hook`].
pub struct FnHook<F> {
    func: F,
}

impl<F> FnHook<F>
where
    F: Fn(&mut RequestContext) + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Hook for FnHook<F>
where
    F: Fn(&mut RequestContext) + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()> {
        Box::pin(async move { (self.func)(ctx) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::ResultCode;
    use http::Method;

    #[tokio::test]
    async fn test_noop_hook_leaves_context() {
        let mut ctx = RequestContext::new(Method::GET, "/");
        NoopHook.call(&mut ctx).await;
        assert!(ctx.is_ok());
    }

    #[tokio::test]
    async fn test_fn_hook_mutates_context() {
        let hook = FnHook::new(|ctx: &mut RequestContext| {
            ctx.set_extension("tx-1".to_string());
            ctx.fail(ResultCode::new("X401"));
        });
        let mut ctx = RequestContext::new(Method::GET, "/");
        hook.call(&mut ctx).await;

        assert_eq!(ctx.get_extension::<String>().map(String::as_str), Some("tx-1"));
        assert_eq!(ctx.result_code().as_str(), "X401");
    }
}
