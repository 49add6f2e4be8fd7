//! Metadata values.

use crate::descriptor::ResponseSchemaRef;
use std::sync::Arc;
use trellis_core::HandlerRef;
use trellis_pipeline::{ErrorStageRef, MiddlewareRef, RouteMethod};
use trellis_validate::{Schema, ValidationOptions};

/// A value stored under one `(subject, member, attribute)` key.
///
/// The store is opaque to its writers; extraction pattern-matches the
/// variant it expects for each attribute and treats a mismatch as malformed
/// metadata.
#[derive(Clone)]
pub enum MetaValue {
    /// A string (type tag, base URL, path, strategy name).
    Str(String),
    /// An HTTP method selector.
    HttpMethod(RouteMethod),
    /// A positional parameter index.
    Index(usize),
    /// A role list.
    Roles(Vec<String>),
    /// An ordered middleware list.
    Middlewares(Vec<MiddlewareRef>),
    /// An ordered error-middleware list.
    ErrorStages(Vec<ErrorStageRef>),
    /// A validation schema.
    Schema(Arc<Schema>),
    /// Validation options.
    Options(ValidationOptions),
    /// A response schema with its flags.
    ResponseSchema(ResponseSchemaRef),
    /// A route handler.
    Handler(HandlerRef),
}

impl MetaValue {
    /// Reads the value as a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Reads the value as a method selector.
    #[must_use]
    pub fn as_http_method(&self) -> Option<&RouteMethod> {
        match self {
            Self::HttpMethod(m) => Some(m),
            _ => None,
        }
    }

    /// Reads the value as a positional index.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// Reads the value as a role list.
    #[must_use]
    pub fn as_roles(&self) -> Option<&[String]> {
        match self {
            Self::Roles(roles) => Some(roles),
            _ => None,
        }
    }

    /// Reads the value as a middleware list.
    #[must_use]
    pub fn as_middlewares(&self) -> Option<&[MiddlewareRef]> {
        match self {
            Self::Middlewares(stages) => Some(stages),
            _ => None,
        }
    }

    /// Reads the value as an error-middleware list.
    #[must_use]
    pub fn as_error_stages(&self) -> Option<&[ErrorStageRef]> {
        match self {
            Self::ErrorStages(stages) => Some(stages),
            _ => None,
        }
    }

    /// Reads the value as a schema.
    #[must_use]
    pub fn as_schema(&self) -> Option<Arc<Schema>> {
        match self {
            Self::Schema(schema) => Some(Arc::clone(schema)),
            _ => None,
        }
    }

    /// Reads the value as validation options.
    #[must_use]
    pub fn as_options(&self) -> Option<ValidationOptions> {
        match self {
            Self::Options(options) => Some(*options),
            _ => None,
        }
    }

    /// Reads the value as a response schema.
    #[must_use]
    pub fn as_response_schema(&self) -> Option<&ResponseSchemaRef> {
        match self {
            Self::ResponseSchema(schema) => Some(schema),
            _ => None,
        }
    }

    /// Reads the value as a handler.
    #[must_use]
    pub fn as_handler(&self) -> Option<HandlerRef> {
        match self {
            Self::Handler(handler) => Some(Arc::clone(handler)),
            _ => None,
        }
    }
}
