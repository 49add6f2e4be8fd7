//! Error taxonomy for trellis pipelines.
//!
//! Every failure inside a request pipeline is one of four kinds:
//!
//! | Variant | Raised by | Default rendering |
//! |---|---|---|
//! | [`PipelineError::Http`] | application code (`HttpError`) | declared status |
//! | [`PipelineError::Validation`] | request/response validation | 400 `{"errors": [...]}` |
//! | [`PipelineError::Authentication`] | an authentication stage | 401 `{"message": ...}` |
//! | [`PipelineError::Internal`] | anything else | host default channel |
//!
//! Errors travel down the pipeline's error chain; each error stage either
//! renders a response or passes the error along unchanged. Unrecognized
//! errors fall through to the host framework's default channel.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// An application-thrown error carrying an explicit HTTP status.
///
/// The reason phrase is derived from the status code at construction time,
/// so `HttpError::new(StatusCode::NOT_FOUND, "no such user")` renders with
/// `"message": "Not Found"` and `"error": "no such user"`.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use trellis_core::{HttpError, PipelineError};
///
/// fn lookup(id: &str) -> Result<(), PipelineError> {
///     Err(HttpError::new(StatusCode::NOT_FOUND, format!("user {id} not found")).into())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    phrase: Option<String>,
    data: Option<Value>,
}

impl HttpError {
    /// Creates an error for the given status, deriving the reason phrase.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            phrase: status.canonical_reason().map(ToString::to_string),
            data: None,
        }
    }

    /// Attaches structured data rendered alongside the error.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the application message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the reason phrase, if the status defines one.
    #[must_use]
    pub fn phrase(&self) -> Option<&str> {
        self.phrase.as_deref()
    }

    /// Returns the attached data, if any.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Builds the JSON body this error renders as.
    ///
    /// The shape is `{"message": <phrase>, "error": <message>}` with the
    /// phrase falling back to `"An error occured!"`, plus `"data"` when set.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            "message".to_string(),
            Value::String(
                self.phrase
                    .clone()
                    .unwrap_or_else(|| "An error occured!".to_string()),
            ),
        );
        body.insert("error".to_string(), Value::String(self.message.clone()));
        if let Some(data) = &self.data {
            body.insert("data".to_string(), data.clone());
        }
        Value::Object(body)
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for HttpError {}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("validation error at '{path}': {message}")]
pub struct FieldError {
    /// JSON path of the offending value (e.g. `$.email`).
    pub path: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Failures produced by authentication strategies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token could be extracted from the request.
    #[error("no authentication token was provided")]
    MissingToken,

    /// The token failed verification.
    #[error("invalid authentication token: {0}")]
    InvalidToken(String),

    /// The verified credentials lack a required role.
    #[error("caller is not of a required role")]
    InsufficientRole,

    /// A strategy-specific rejection.
    #[error("{0}")]
    Rejected(String),
}

/// Standard error type flowing through trellis pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An explicit application error with an HTTP status.
    #[error("{0}")]
    Http(HttpError),

    /// An ordered list of field-level validation failures.
    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// An authentication failure.
    #[error("authentication failed: {0}")]
    Authentication(AuthError),

    /// An unclassified internal error; passes through every taxonomy stage
    /// to the host's default channel.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PipelineError {
    /// Returns the HTTP status this error maps to by default.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Http(err) => err.status(),
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Creates an internal error from a message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(anyhow::anyhow!(message.into()))
    }
}

impl From<HttpError> for PipelineError {
    fn from(err: HttpError) -> Self {
        Self::Http(err)
    }
}

impl From<AuthError> for PipelineError {
    fn from(err: AuthError) -> Self {
        Self::Authentication(err)
    }
}
