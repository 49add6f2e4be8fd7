//! Per-request context.
//!
//! The [`RequestContext`] carries all mutable per-request state through the
//! pipeline: the parsed body (replaced by validation stages), matched path
//! parameters, verified credentials, and typed extension data.

use crate::credentials::Credentials;
use crate::params::Params;
use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable state that flows through one request's pipeline.
///
/// Stages enrich the context as the request advances: authentication attaches
/// [`Credentials`], validation replaces the body with its transformed form,
/// routing fills in the matched path parameters. Handlers receive a snapshot
/// of this context inside their invocation.
///
/// # Example
///
/// ```
/// use http::{Method, Uri};
/// use trellis_core::{Credentials, RequestContext};
///
/// let mut ctx = RequestContext::new(
///     Method::GET,
///     Uri::from_static("/users?limit=10"),
///     http::HeaderMap::new(),
///     serde_json::Value::Null,
/// );
/// ctx.set_credentials(Credentials::new("u1", "a@b.c"));
///
/// assert_eq!(ctx.path(), "/users");
/// assert!(ctx.credentials().is_some());
/// ```
#[derive(Debug)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Value,
    path_params: Params,
    credentials: Option<Credentials>,
    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates a context for a request with an already-parsed JSON body.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Value) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            uri,
            headers,
            body,
            path_params: Params::new(),
            credentials: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Creates a context from a raw request, parsing the body as JSON.
    ///
    /// An empty body becomes `Value::Null`. A body that is not valid JSON
    /// is reported as an error so the host can reject the request before
    /// any pipeline stage runs.
    pub fn from_request(request: http::Request<Bytes>) -> Result<Self, serde_json::Error> {
        let (parts, bytes) = request.into_parts();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(error = %err, "request body is not valid JSON");
                    return Err(err);
                }
            }
        };
        Ok(Self::new(parts.method, parts.uri, parts.headers, body))
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the raw query string, if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Parses the query string into a JSON object of string values.
    ///
    /// This is the shape handed to handlers that bind the query argument
    /// source. An absent query string yields an empty object.
    #[must_use]
    pub fn query_value(&self) -> Value {
        let pairs: Vec<(String, String)> = self
            .query_string()
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();

        let mut map = serde_json::Map::new();
        for (name, value) in pairs {
            map.insert(name, Value::String(value));
        }
        Value::Object(map)
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the current request body.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Replaces the request body.
    ///
    /// Validation stages call this to substitute the transformed instance
    /// for the raw payload.
    pub fn set_body(&mut self, body: Value) {
        self.body = body;
    }

    /// Returns the matched path parameters.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Sets the matched path parameters.
    ///
    /// Called by the router once a route pattern has matched.
    pub fn set_path_params(&mut self, params: Params) {
        self.path_params = params;
    }

    /// Returns the verified credentials, if authentication ran.
    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Attaches verified credentials.
    ///
    /// This is the well-known slot an authentication stage writes and the
    /// auth-user parameter source reads.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Stores a typed extension value.
    ///
    /// Extensions let middleware stash arbitrary data for later stages.
    ///
    /// # Example
    ///
    /// ```
    /// use http::{Method, Uri};
    /// use trellis_core::RequestContext;
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// struct Marker(&'static str);
    ///
    /// let mut ctx = RequestContext::new(
    ///     Method::GET,
    ///     Uri::from_static("/"),
    ///     http::HeaderMap::new(),
    ///     serde_json::Value::Null,
    /// );
    /// ctx.set_extension(Marker("seen"));
    /// assert_eq!(ctx.get_extension::<Marker>(), Some(&Marker("seen")));
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

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl Clone for RequestContext {
    fn clone(&self) -> Self {
        // Extensions are not cloned - they don't implement Clone.
        Self {
            request_id: self.request_id,
            method: self.method.clone(),
            uri: self.uri.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            path_params: self.path_params.clone(),
            credentials: self.credentials.clone(),
            started_at: self.started_at,
            extensions: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(uri: &'static str) -> RequestContext {
        RequestContext::new(
            Method::GET,
            Uri::from_static(uri),
            HeaderMap::new(),
            Value::Null,
        )
    }

    #[test]
    fn test_from_request_parses_json_body() {
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/items")
            .body(Bytes::from(r#"{"name":"pin"}"#))
            .unwrap();

        let ctx = RequestContext::from_request(request).unwrap();
        assert_eq!(ctx.body(), &json!({"name": "pin"}));
    }

    #[test]
    fn test_from_request_empty_body_is_null() {
        let request = http::Request::builder()
            .uri("/")
            .body(Bytes::new())
            .unwrap();

        let ctx = RequestContext::from_request(request).unwrap();
        assert!(ctx.body().is_null());
    }

    #[test]
    fn test_from_request_rejects_malformed_body() {
        let request = http::Request::builder()
            .uri("/")
            .body(Bytes::from("{not json"))
            .unwrap();

        assert!(RequestContext::from_request(request).is_err());
    }

    #[test]
    fn test_query_value() {
        let ctx = ctx("/search?q=rust&limit=10");
        let query = ctx.query_value();
        assert_eq!(query["q"], "rust");
        assert_eq!(query["limit"], "10");
    }

    #[test]
    fn test_query_value_empty() {
        assert_eq!(ctx("/search").query_value(), json!({}));
    }

    #[test]
    fn test_body_replacement() {
        let mut ctx = ctx("/");
        ctx.set_body(json!({"validated": true}));
        assert_eq!(ctx.body()["validated"], true);
    }

    #[test]
    fn test_credentials_slot() {
        let mut ctx = ctx("/");
        assert!(ctx.credentials().is_none());

        ctx.set_credentials(Credentials::new("u1", "a@b.c"));
        assert_eq!(ctx.credentials().unwrap().id, "u1");
    }

    #[test]
    fn test_clone_drops_extensions() {
        let mut ctx = ctx("/");
        ctx.set_extension(42_u32);

        let cloned = ctx.clone();
        assert!(cloned.get_extension::<u32>().is_none());
        assert_eq!(cloned.request_id(), ctx.request_id());
    }
}
