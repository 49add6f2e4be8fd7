//! Handler result type.

use crate::error::PipelineError;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// What a route handler returns.
///
/// Handlers either return a plain payload (rendered as HTTP 200) or an
/// explicit status paired with a payload. Failures travel on the error
/// channel as [`PipelineError`], never inside `Reply`.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use serde_json::json;
/// use trellis_core::Reply;
///
/// let ok = Reply::plain(json!({"message": "hello"}));
/// assert_eq!(ok.status(), StatusCode::OK);
///
/// let created = Reply::with_status(StatusCode::CREATED, json!({"id": 1}));
/// assert_eq!(created.status(), StatusCode::CREATED);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A payload rendered with the default 200 status.
    Plain(Value),
    /// A payload rendered with an explicit status.
    WithStatus(StatusCode, Value),
}

impl Reply {
    /// Wraps a payload with the default status.
    #[must_use]
    pub fn plain(payload: Value) -> Self {
        Self::Plain(payload)
    }

    /// Wraps a payload with an explicit status.
    #[must_use]
    pub fn with_status(status: StatusCode, payload: Value) -> Self {
        Self::WithStatus(status, payload)
    }

    /// Serializes a value into a plain reply.
    pub fn serialize<T: Serialize>(value: &T) -> Result<Self, PipelineError> {
        let payload = serde_json::to_value(value)
            .map_err(|e| PipelineError::internal(format!("failed to serialize reply: {e}")))?;
        Ok(Self::Plain(payload))
    }

    /// Returns the status this reply renders with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Plain(_) => StatusCode::OK,
            Self::WithStatus(status, _) => *status,
        }
    }

    /// Returns the payload.
    #[must_use]
    pub fn payload(&self) -> &Value {
        match self {
            Self::Plain(payload) | Self::WithStatus(_, payload) => payload,
        }
    }

    /// Splits the reply into its status and payload.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Value) {
        match self {
            Self::Plain(payload) => (StatusCode::OK, payload),
            Self::WithStatus(status, payload) => (status, payload),
        }
    }
}
