//! Request context types.
//!
//! The [`RequestContext`] carries all per-request state from the transport
//! adapter, through every pipeline stage and hook, into the handler, and
//! finally to the response assembler.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::code::ResultCode;
use crate::resource::Resource;

/// Route name that empty and `/` paths resolve to.
pub const INDEX_ROUTE: &str = "index";

/// Normalizes a request path into a route name.
///
/// Empty and `/` become [`INDEX_ROUTE`]; any other path loses exactly one
/// leading `/` and is otherwise used verbatim.
///
/// # Example
///
/// ```
/// use hermes_core::route_name;
///
/// assert_eq!(route_name("/"), "index");
/// assert_eq!(route_name("/users"), "users");
/// assert_eq!(route_name("//users/"), "/users/");
/// ```
#[must_use]
pub fn route_name(path: &str) -> &str {
    match path {
        "" | "/" => INDEX_ROUTE,
        _ => path.strip_prefix('/').unwrap_or(path),
    }
}

/// Identifier of one request, echoed in the response body and the
/// `x-request-id` header.
///
/// Transports may supply their own ID; otherwise one is generated from a
/// time-ordered UUID v7 in simple (unhyphenated) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generates a new request ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Per-request state threaded through the pipeline.
///
/// Transport metadata is set by the adapter with the `with_*` builders. The
/// pipeline then fills in the token, resource, validated parameters and
/// result. Once [`result_code`](Self::result_code) is anything other than
/// `OK`, the remaining stages leave the context alone and only the response
/// assembler reads it.
///
/// # Example
///
/// ```
/// use hermes_core::{RequestContext, ResultCode};
/// use http::Method;
///
/// let ctx = RequestContext::new(Method::GET, "/users")
///     .with_header("User-Agent", "curl/8.0")
///     .with_query_param("page", "2");
///
/// assert_eq!(ctx.route(), "users");
/// assert_eq!(ctx.user_agent(), Some("curl/8.0"));
/// assert_eq!(ctx.query("page"), Some("2"));
/// assert_eq!(ctx.result_code(), &ResultCode::OK);
/// ```
pub struct RequestContext {
    request_id: RequestId,
    client_ip: String,
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    method: Method,
    path: String,
    body: Bytes,

    token: Option<String>,
    resource: Option<Arc<Resource>>,
    parameters: Option<Map<String, Value>>,

    result_code: ResultCode,
    result_data: Value,

    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates a context for the given method and raw path with a freshly
    /// generated request ID.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            client_ip: String::new(),
            headers: HashMap::new(),
            query: HashMap::new(),
            method,
            path: path.into(),
            body: Bytes::new(),
            token: None,
            resource: None,
            parameters: None,
            result_code: ResultCode::OK,
            result_data: Value::Object(Map::new()),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<RequestId>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Sets the client IP.
    #[must_use]
    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = client_ip.into();
        self
    }

    /// Adds a header. Names are lower-cased; the first value for a name wins.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.as_ref().to_ascii_lowercase())
            .or_insert_with(|| value.into());
        self
    }

    /// Adds every header from an iterator, with the same rules as
    /// [`with_header`](Self::with_header).
    #[must_use]
    pub fn with_headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |ctx, (name, value)| ctx.with_header(name, value))
    }

    /// Adds a query parameter. The first value for a key wins.
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_insert_with(|| value.into());
        self
    }

    /// Adds every query parameter from an iterator.
    #[must_use]
    pub fn with_query<I, K, V>(self, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        query
            .into_iter()
            .fold(self, |ctx, (key, value)| ctx.with_query_param(key, value))
    }

    /// Sets the raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Replaces the request ID.
    pub fn set_request_id(&mut self, request_id: impl Into<RequestId>) {
        self.request_id = request_id.into();
    }

    /// Returns the client IP as reported by the transport.
    #[must_use]
    pub fn client_ip(&self) -> &str {
        &self.client_ip
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns all headers, keyed by lower-cased name.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Returns the `User-Agent` header, if sent.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }

    /// Returns a query parameter.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns the whole query map.
    #[must_use]
    pub const fn query_map(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the route name derived from the path.
    #[must_use]
    pub fn route(&self) -> &str {
        route_name(&self.path)
    }

    /// Returns the raw body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the bearer token extracted by the authenticate stage.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Stores the bearer token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Returns the resolved resource.
    #[must_use]
    pub fn resource(&self) -> Option<&Arc<Resource>> {
        self.resource.as_ref()
    }

    /// Attaches the resolved resource.
    pub fn set_resource(&mut self, resource: Arc<Resource>) {
        self.resource = Some(resource);
    }

    /// Returns the validated parameters, or `None` if validation did not run
    /// or did not succeed.
    #[must_use]
    pub const fn parameters(&self) -> Option<&Map<String, Value>> {
        self.parameters.as_ref()
    }

    /// Returns a single validated parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.as_ref().and_then(|params| params.get(name))
    }

    /// Stores the validated parameters.
    pub fn set_parameters(&mut self, parameters: Map<String, Value>) {
        self.parameters = Some(parameters);
    }

    /// Returns the current result code.
    #[must_use]
    pub const fn result_code(&self) -> &ResultCode {
        &self.result_code
    }

    /// Returns the current result payload.
    #[must_use]
    pub const fn result_data(&self) -> &Value {
        &self.result_data
    }

    /// Sets both the result code and payload.
    pub fn set_result(&mut self, code: ResultCode, data: Value) {
        self.result_code = code;
        self.result_data = data;
    }

    /// Sets the result code and leaves the payload untouched.
    pub fn fail(&mut self, code: ResultCode) {
        self.result_code = code;
    }

    /// Returns `true` while no stage has set a non-`OK` result.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result_code.is_ok()
    }

    /// Returns the time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value, replacing any previous value of the
    /// same type.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_core::RequestContext;
    /// use http::Method;
    ///
    /// struct Tenant(&'static str);
    ///
    /// let mut ctx = RequestContext::new(Method::GET, "/");
    /// ctx.set_extension(Tenant("acme"));
    /// assert_eq!(ctx.get_extension::<Tenant>().unwrap().0, "acme");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Retrieves a typed extension value mutably.
    pub fn get_extension_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }

    /// Returns `true` if an extension of type `T` is stored.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("client_ip", &self.client_ip)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body_len", &self.body.len())
            .field("has_token", &self.token.is_some())
            .field("resource", &self.resource.as_ref().map(|r| &r.function))
            .field("result_code", &self.result_code)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_route_name_normalization() {
        assert_eq!(route_name(""), "index");
        assert_eq!(route_name("/"), "index");
        assert_eq!(route_name("/users"), "users");
        assert_eq!(route_name("users"), "users");
        assert_eq!(route_name("/users/"), "users/");
        assert_eq!(route_name("//x"), "/x");
    }

    #[test]
    fn test_generated_request_id_is_simple_uuid() {
        let id = RequestId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, RequestId::generate());
    }

    #[test]
    fn test_new_context_defaults() {
        let ctx = RequestContext::new(Method::GET, "/");
        assert!(ctx.is_ok());
        assert_eq!(ctx.result_data(), &json!({}));
        assert!(ctx.token().is_none());
        assert!(ctx.resource().is_none());
        assert!(ctx.parameters().is_none());
        assert!(ctx.body().is_empty());
        assert_eq!(ctx.route(), "index");
    }

    #[test]
    fn test_headers_are_case_insensitive_and_first_wins() {
        let ctx = RequestContext::new(Method::GET, "/")
            .with_header("Authorization", "Bearer one")
            .with_header("AUTHORIZATION", "Bearer two");
        assert_eq!(ctx.header("authorization"), Some("Bearer one"));
        assert_eq!(ctx.header("Authorization"), Some("Bearer one"));
        assert_eq!(ctx.headers().len(), 1);
    }

    #[test]
    fn test_query_first_value_wins() {
        let ctx = RequestContext::new(Method::GET, "/")
            .with_query([("page", "1"), ("page", "2"), ("size", "10")]);
        assert_eq!(ctx.query("page"), Some("1"));
        assert_eq!(ctx.query("size"), Some("10"));
        assert_eq!(ctx.query_map().len(), 2);
    }

    #[test]
    fn test_fail_keeps_payload() {
        let mut ctx = RequestContext::new(Method::GET, "/");
        ctx.set_result(ResultCode::OK, json!({"x": 1}));
        ctx.fail(ResultCode::ROUTE_NOT_FOUND);
        assert!(!ctx.is_ok());
        assert_eq!(ctx.result_data(), &json!({"x": 1}));
    }

    #[test]
    fn test_parameters_accessors() {
        let mut ctx = RequestContext::new(Method::POST, "/users");
        assert!(ctx.parameter("name").is_none());

        let mut params = Map::new();
        params.insert("name".into(), json!("ana"));
        ctx.set_parameters(params);
        assert_eq!(ctx.parameter("name"), Some(&json!("ana")));
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, PartialEq)]
        struct Counter(u32);

        let mut ctx = RequestContext::new(Method::GET, "/");
        assert!(!ctx.has_extension::<Counter>());

        ctx.set_extension(Counter(1));
        if let Some(counter) = ctx.get_extension_mut::<Counter>() {
            counter.0 += 1;
        }
        assert_eq!(ctx.get_extension::<Counter>(), Some(&Counter(2)));
        assert_eq!(ctx.remove_extension::<Counter>(), Some(Counter(2)));
        assert!(!ctx.has_extension::<Counter>());
    }

    #[test]
    fn test_debug_omits_token_value() {
        let mut ctx = RequestContext::new(Method::GET, "/");
        ctx.set_token("supersecret");
        let debug = format!("{ctx:?}");
        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("has_token: true"));
    }

    proptest! {
        #[test]
        fn prop_route_name_strips_at_most_one_slash(path in "/?[a-z/]{0,16}") {
            let route = route_name(&path);
            if path.is_empty() || path == "/" {
                prop_assert_eq!(route, INDEX_ROUTE);
            } else {
                let expected = path.strip_prefix('/').unwrap_or(&path);
                prop_assert_eq!(route, expected);
            }
        }
    }
}
