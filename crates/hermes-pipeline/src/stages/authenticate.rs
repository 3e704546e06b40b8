//! Bearer token extraction.
//!
//! The token is stored, never verified. Verification belongs to the
//! application, typically in the pre-hook.

use hermes_core::{RequestContext, ResultCode};
use tracing::{debug, info};

use crate::stage::{Outcome, Stage, StageResult};

/// Authorization header name (contexts store header names lower-cased).
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Extracts the bearer token when the resolved resource requires one.
///
/// - header absent → `G006`
/// - header present but not exactly two whitespace-separated tokens, blank
///   included → `G007`
/// - otherwise the second token is stored on the context
pub fn run(ctx: &mut RequestContext) -> StageResult {
    let stage = Stage::Authenticate.name();

    let required = ctx.resource().is_some_and(|resource| resource.authentication);
    if !required {
        return Ok(());
    }

    let Some(header) = ctx.header(AUTHORIZATION_HEADER) else {
        info!(stage, "authorization header missing");
        return Err(Outcome::new(ResultCode::MISSING_AUTHORIZATION));
    };

    let mut parts = header.split_whitespace();
    let token = match (parts.next(), parts.next(), parts.next()) {
        (Some(_scheme), Some(token), None) => token.to_owned(),
        _ => {
            info!(stage, "authorization header malformed");
            return Err(Outcome::new(ResultCode::MALFORMED_AUTHORIZATION));
        }
    };

    debug!(stage, token_suffix = token_suffix(&token), "bearer token extracted");
    ctx.set_token(token);
    Ok(())
}

/// Returns at most the last four characters of a token.
fn token_suffix(token: &str) -> &str {
    let start = token.char_indices().rev().nth(3).map_or(0, |(index, _)| index);
    &token[start..]
}
