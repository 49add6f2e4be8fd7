//! Shared request/response type aliases.

use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;

/// The raw request type accepted from the host framework.
pub type Request = http::Request<Bytes>;

/// The response type produced by pipelines.
pub type Response = http::Response<Bytes>;

/// Builds a JSON response with the given status.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use serde_json::json;
/// use trellis_core::json_response;
///
/// let response = json_response(StatusCode::OK, &json!({"ok": true}));
/// assert_eq!(response.status(), StatusCode::OK);
/// ```
#[must_use]
pub fn json_response(status: StatusCode, body: &Value) -> Response {
    let bytes = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Bytes::from(bytes))
        .unwrap_or_else(|_| {
            let mut fallback = http::Response::new(Bytes::new());
            *fallback.status_mut() = status;
            fallback
        })
}
