//! Response assembly.
//!
//! Every run ends here, whatever happened before. The assembler maps the
//! final result code to a status and localized message, attaches the fixed
//! CORS and cache headers, and encodes the envelope:
//!
//! ```json
//! { "id": "...", "code": "G005", "time": "2024-05-01T12:00:00Z",
//!   "message": { "en": "Invalid parameters" }, "data": { ... } }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use hermes_core::{RequestContext, RequestId, SchemaRegistry};
use http::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CACHE_CONTROL, CONTENT_TYPE,
};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::stage::Stage;

/// Header carrying the final request ID, added by the transport adapters.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const FIXED_HEADERS: [(HeaderName, &str); 6] = [
    (CONTENT_TYPE, "application/json; charset=utf-8"),
    (CACHE_CONTROL, "max-age=0,private,must-revalidate,no-cache"),
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (ACCESS_CONTROL_ALLOW_METHODS, "*"),
    (ACCESS_CONTROL_ALLOW_HEADERS, "*"),
    (ACCESS_CONTROL_MAX_AGE, "86400"),
];

/// Transport-independent response produced by a pipeline run.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status mapped from the result code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Encoded JSON envelope.
    pub body: Bytes,
    /// Final request ID, as written in the envelope.
    pub request_id: RequestId,
}

impl ApiResponse {
    /// Adds the `x-request-id` header. IDs that are not valid header values
    /// are skipped.
    #[must_use]
    pub fn with_request_id_header(mut self) -> Self {
        if let Ok(value) = HeaderValue::from_str(self.request_id.as_str()) {
            self.headers.insert(REQUEST_ID_HEADER, value);
        }
        self
    }

    /// Converts into an [`http::Response`].
    #[must_use]
    pub fn into_http(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    id: &'a str,
    code: &'a str,
    time: DateTime<Utc>,
    message: &'a BTreeMap<String, String>,
    data: &'a Value,
}

/// Builds [`ApiResponse`]s from finished request contexts.
#[derive(Debug, Clone)]
pub struct ResponseAssembler {
    registry: Arc<SchemaRegistry>,
}

impl ResponseAssembler {
    /// Creates an assembler over a registry's code table.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Assembles the response for a context. Never fails.
    ///
    /// Codes the table does not define take the status and message of `I002`
    /// while the envelope keeps the original code. The envelope holds only
    /// strings, a timestamp and a JSON value, so encoding does not fail; if
    /// it ever does, the error is logged and a `500` with an empty body is
    /// returned.
    pub fn assemble(&self, ctx: &RequestContext) -> ApiResponse {
        let code = ctx.result_code();
        let definition = self.registry.code_or_fallback(code.as_str());

        let envelope = Envelope {
            id: ctx.request_id().as_str(),
            code: code.as_str(),
            time: Utc::now(),
            message: &definition.message,
            data: ctx.result_data(),
        };

        let (status, body) = match serde_json::to_vec(&envelope) {
            Ok(body) => (definition.status_code(), body),
            Err(e) => {
                error!(stage = Stage::Respond.name(), error = %e, "response payload could not be encoded");
                (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
            }
        };

        debug!(
            stage = Stage::Respond.name(),
            code = %code,
            status = status.as_u16(),
            "response assembled"
        );

        ApiResponse {
            status,
            headers: fixed_headers(),
            body: Bytes::from(body),
            request_id: ctx.request_id().clone(),
        }
    }
}

fn fixed_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(FIXED_HEADERS.len() + 1);
    for (name, value) in FIXED_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers
}
