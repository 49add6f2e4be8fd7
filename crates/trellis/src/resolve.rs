//! Argument resolution.
//!
//! Turns a route's parameter bindings plus the live request context into the
//! positional argument list the handler receives.

use serde_json::Value;
use trellis_core::{Credentials, RequestContext};
use trellis_meta::{ParamBindings, ParamSource};

/// Resolves the bound argument values in declared positional order.
///
/// Absent slots contribute nothing; present slots are sorted ascending by
/// index and mapped to the live value of their source. An unauthenticated
/// request resolves the auth-user source to `null`.
///
/// # Example
///
/// ```
/// use http::{Method, Uri};
/// use trellis::resolve_arguments;
/// use trellis::{ParamBindings, RequestContext};
///
/// let ctx = RequestContext::new(
///     Method::POST,
///     Uri::from_static("/items?limit=5"),
///     http::HeaderMap::new(),
///     serde_json::json!({"name": "pin"}),
/// );
///
/// let bindings = ParamBindings {
///     query: Some(1),
///     body: Some(0),
///     ..Default::default()
/// };
///
/// let args = resolve_arguments(&bindings, &ctx);
/// assert_eq!(args[0]["name"], "pin");
/// assert_eq!(args[1]["limit"], "5");
/// ```
#[must_use]
pub fn resolve_arguments(bindings: &ParamBindings, ctx: &RequestContext) -> Vec<Value> {
    bindings
        .ordered()
        .into_iter()
        .map(|(source, _)| match source {
            ParamSource::Body => ctx.body().clone(),
            ParamSource::PathParams => ctx.path_params().to_value(),
            ParamSource::Query => ctx.query_value(),
            ParamSource::AuthUser => ctx
                .credentials()
                .map_or(Value::Null, Credentials::to_value),
        })
        .collect()
}
