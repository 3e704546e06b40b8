//! Route and method lookup.

use hermes_core::{Lookup, RequestContext, ResultCode, SchemaRegistry};
use http::Method;
use tracing::{debug, info};

use crate::stage::{Outcome, Stage, StageResult};

/// Attaches the resource for the request's route and method.
///
/// - unknown route → `G001`
/// - known route, no resource for the method: `OPTIONS` → `G002`, otherwise
///   `G003`
pub fn run(registry: &SchemaRegistry, ctx: &mut RequestContext) -> StageResult {
    let stage = Stage::Resolve.name();

    match registry.lookup(ctx.route(), ctx.method()) {
        Lookup::Found(resource) => {
            debug!(stage, function = %resource.function, "resource resolved");
            ctx.set_resource(resource);
            Ok(())
        }
        Lookup::UnknownRoute => {
            info!(stage, route = %ctx.route(), "route not found");
            Err(Outcome::new(ResultCode::ROUTE_NOT_FOUND))
        }
        Lookup::UnknownMethod if *ctx.method() == Method::OPTIONS => {
            debug!(stage, "preflight on route without an OPTIONS resource");
            Err(Outcome::new(ResultCode::PREFLIGHT_OK))
        }
        Lookup::UnknownMethod => {
            info!(stage, method = %ctx.method(), "method not allowed");
            Err(Outcome::new(ResultCode::METHOD_NOT_ALLOWED))
        }
    }
}
