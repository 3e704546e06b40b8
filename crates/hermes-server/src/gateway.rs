//! API-gateway proxy adapter.
//!
//! Converts a proxy-integration event into a [`RequestContext`], runs it
//! through the [`Pipeline`] and returns the proxy response. There is no
//! socket here; the serverless runtime owns the event loop and hands each
//! decoded event to [`handle_gateway_event`].
//!
//! # Example
//!
//! ```rust
//! use hermes_core::fixtures;
//! use hermes_pipeline::Pipeline;
//! use hermes_server::{handle_gateway_event, GatewayProxyRequest};
//!
//! # tokio_test::block_on(async {
//! let pipeline = Pipeline::builder(fixtures::sample_registry().unwrap(), fixtures::sample_handlers()).build();
//! let event: GatewayProxyRequest = serde_json::from_str(
//!     r#"{"path": "/", "httpMethod": "GET", "requestContext": {"requestId": "abc"}}"#,
//! ).unwrap();
//!
//! let response = handle_gateway_event(&pipeline, event).await;
//! assert_eq!(response.status_code, 200);
//! assert_eq!(response.headers["x-request-id"], "abc");
//! # });
//! ```

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use hermes_core::RequestContext;
use hermes_pipeline::Pipeline;
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A proxy-integration request event.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayProxyRequest {
    /// Raw request path.
    pub path: String,
    /// HTTP verb.
    pub http_method: String,
    /// Request headers.
    #[serde(deserialize_with = "nullable_map")]
    pub headers: HashMap<String, String>,
    /// Query parameters, first value only.
    #[serde(deserialize_with = "nullable_map")]
    pub query_string_parameters: HashMap<String, String>,
    /// Body text, base64 when `is_base64_encoded` is set.
    pub body: Option<String>,
    /// Whether `body` is base64.
    pub is_base64_encoded: bool,
    /// Gateway-side request metadata.
    pub request_context: GatewayRequestContext,
}

/// Gateway metadata attached to an event.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayRequestContext {
    /// Gateway-assigned request ID.
    pub request_id: String,
    /// Verb as seen by the gateway.
    pub http_method: String,
    /// Caller identity.
    pub identity: GatewayIdentity,
}

/// Caller identity of an event.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayIdentity {
    /// Caller IP as seen by the gateway.
    pub source_ip: String,
}

/// A proxy-integration response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayProxyResponse {
    /// HTTP status.
    pub status_code: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// JSON body text.
    pub body: String,
    /// Always `false`; bodies are JSON text.
    pub is_base64_encoded: bool,
}

fn nullable_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<HashMap<String, String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl GatewayProxyRequest {
    /// Builds the pipeline input for this event.
    #[must_use]
    pub fn into_context(self) -> RequestContext {
        let method = self.method();
        let body = self.decode_body();

        let mut ctx = RequestContext::new(method, self.path)
            .with_client_ip(self.request_context.identity.source_ip)
            .with_headers(self.headers)
            .with_query(self.query_string_parameters)
            .with_body(body);

        if !self.request_context.request_id.is_empty() {
            ctx.set_request_id(self.request_context.request_id);
        }
        ctx
    }

    fn method(&self) -> Method {
        [&self.http_method, &self.request_context.http_method]
            .into_iter()
            .filter(|m| !m.is_empty())
            .find_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
            .unwrap_or_else(|| {
                warn!(
                    http_method = %self.http_method,
                    "event carries no usable HTTP method, treating it as GET"
                );
                Method::GET
            })
    }

    fn decode_body(&self) -> Bytes {
        let Some(body) = self.body.as_deref() else {
            return Bytes::new();
        };
        if !self.is_base64_encoded {
            return Bytes::copy_from_slice(body.as_bytes());
        }
        match STANDARD.decode(body) {
            Ok(decoded) => Bytes::from(decoded),
            Err(e) => {
                warn!(error = %e, "undecodable base64 body, continuing with an empty body");
                Bytes::new()
            }
        }
    }
}

/// Runs one gateway event through the pipeline.
pub async fn handle_gateway_event(
    pipeline: &Pipeline,
    event: GatewayProxyRequest,
) -> GatewayProxyResponse {
    let response = pipeline
        .run(event.into_context())
        .await
        .with_request_id_header();

    let headers = response
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    GatewayProxyResponse {
        status_code: response.status.as_u16(),
        headers,
        body: String::from_utf8_lossy(&response.body).into_owned(),
        is_base64_encoded: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: &str) -> GatewayProxyRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_minimal_event() {
        let event = event(r#"{"path": "/users", "httpMethod": "GET"}"#);
        assert!(event.headers.is_empty());
        assert!(event.body.is_none());
        assert!(!event.is_base64_encoded);
    }

    #[test]
    fn test_null_maps_accepted() {
        let event = event(
            r#"{"path": "/", "httpMethod": "GET", "headers": null, "queryStringParameters": null}"#,
        );
        assert!(event.headers.is_empty());
        assert!(event.query_string_parameters.is_empty());
    }

    #[test]
    fn test_into_context() {
        let ctx = event(
            r#"{
                "path": "/users",
                "httpMethod": "post",
                "headers": {"Authorization": "Bearer abc123"},
                "queryStringParameters": {"page": "2"},
                "body": "{\"name\":\"ana\"}",
                "requestContext": {"requestId": "gw-1", "identity": {"sourceIp": "198.51.100.4"}}
            }"#,
        )
        .into_context();

        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.route(), "users");
        assert_eq!(ctx.header("authorization"), Some("Bearer abc123"));
        assert_eq!(ctx.query("page"), Some("2"));
        assert_eq!(ctx.body().as_ref(), br#"{"name":"ana"}"#);
        assert_eq!(ctx.request_id().as_str(), "gw-1");
        assert_eq!(ctx.client_ip(), "198.51.100.4");
    }

    #[test]
    fn test_base64_body_decoded() {
        let ctx = event(r#"{"path": "/", "httpMethod": "POST", "body": "eyJ4IjoxfQ==", "isBase64Encoded": true}"#)
            .into_context();
        assert_eq!(ctx.body().as_ref(), br#"{"x":1}"#);
    }

    #[test]
    fn test_undecodable_base64_body_is_empty() {
        let ctx = event(r#"{"path": "/", "httpMethod": "POST", "body": "%%%", "isBase64Encoded": true}"#)
            .into_context();
        assert!(ctx.body().is_empty());
    }

    #[test]
    fn test_method_fallbacks() {
        let ctx = event(r#"{"path": "/", "requestContext": {"httpMethod": "DELETE"}}"#).into_context();
        assert_eq!(ctx.method(), &Method::DELETE);

        let ctx = event(r#"{"path": "/"}"#).into_context();
        assert_eq!(ctx.method(), &Method::GET);
    }

    #[test]
    fn test_missing_request_id_generated() {
        let ctx = event(r#"{"path": "/", "httpMethod": "GET"}"#).into_context();
        assert_eq!(ctx.request_id().as_str().len(), 32);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = GatewayProxyResponse {
            status_code: 404,
            headers: HashMap::new(),
            body: "{}".to_string(),
            is_base64_encoded: false,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["isBase64Encoded"], false);
    }
}
