//! The pluggable validation contract.

use crate::middleware::{RequestValidation, ValidationErrorStage};
use crate::options::ValidationOptions;
use crate::schema::Schema;
use serde_json::Value;
use std::sync::Arc;
use trellis_core::{FieldError, RequestContext, Response};
use trellis_pipeline::{ErrorStageRef, MiddlewareRef};

/// A shared validation service.
pub type ValidationServiceRef = Arc<dyn ValidationService>;

/// A replacement handler for rendering validation failures.
///
/// Receives the ordered error list and the request context, and produces the
/// response to send instead of the default 400 envelope.
pub type ValidationErrorHandlerRef =
    Arc<dyn Fn(&[FieldError], &mut RequestContext) -> Response + Send + Sync>;

/// The narrow contract the router builder consumes for validation.
///
/// Concrete validation machinery stays behind this trait so a deployment can
/// swap in its own service (the original motivation for
/// [`Server::replace_validation_service`](https://docs.rs/trellis)).
pub trait ValidationService: Send + Sync + 'static {
    /// Builds the request-validation stage for a schema.
    ///
    /// The stage transforms the raw body, validates it, and on success
    /// replaces the context body with the transformed instance; failures
    /// divert to the error chain as a validation error list.
    fn validation_middleware(
        &self,
        schema: Arc<Schema>,
        options: Option<ValidationOptions>,
    ) -> MiddlewareRef;

    /// Synchronously transforms and validates a response payload.
    ///
    /// When `options` is `None`, responses default to whitelist projection
    /// without the strict rejection flags.
    fn validate_response_object(
        &self,
        schema: &Schema,
        value: &Value,
        options: Option<ValidationOptions>,
    ) -> Result<Value, Vec<FieldError>>;

    /// Structural projection only: exposed fields are kept, nothing is
    /// validated.
    fn transform_plain(&self, schema: &Schema, value: &Value) -> Value;

    /// Builds the error stage that renders validation failures.
    ///
    /// Non-validation errors pass through untouched.
    fn validation_error_handler(&self, on_error: Option<ValidationErrorHandlerRef>)
        -> ErrorStageRef;
}

/// The bundled [`ValidationService`] over [`Schema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidationService;

impl DefaultValidationService {
    /// Creates the service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Transforms and validates a value under the given options.
    ///
    /// The transformed value is returned on success so callers can replace
    /// the raw payload with it.
    pub fn apply(
        schema: &Schema,
        value: &Value,
        options: ValidationOptions,
    ) -> Result<Value, Vec<FieldError>> {
        if options.forbid_unknown_values
            && matches!(schema, Schema::Object { .. })
            && !value.is_object()
        {
            return Err(vec![FieldError::new(
                "$",
                "an unknown value was passed to the validate function",
            )]);
        }

        let mut errors = Vec::new();
        if options.forbid_non_whitelisted {
            for path in schema.undeclared_fields(value) {
                errors.push(FieldError::new(path, "property should not exist"));
            }
        }

        let transformed = if options.whitelist {
            schema.project(value)
        } else {
            value.clone()
        };
        errors.extend(schema.check(&transformed));

        if errors.is_empty() {
            Ok(transformed)
        } else {
            Err(errors)
        }
    }
}

impl ValidationService for DefaultValidationService {
    fn validation_middleware(
        &self,
        schema: Arc<Schema>,
        options: Option<ValidationOptions>,
    ) -> MiddlewareRef {
        Arc::new(RequestValidation::new(schema, options))
    }

    fn validate_response_object(
        &self,
        schema: &Schema,
        value: &Value,
        options: Option<ValidationOptions>,
    ) -> Result<Value, Vec<FieldError>> {
        let options =
            options.unwrap_or_else(|| ValidationOptions::permissive().with_whitelist(true));
        Self::apply(schema, value, options)
    }

    fn transform_plain(&self, schema: &Schema, value: &Value) -> Value {
        schema.project(value)
    }

    fn validation_error_handler(
        &self,
        on_error: Option<ValidationErrorHandlerRef>,
    ) -> ErrorStageRef {
        Arc::new(ValidationErrorStage::new(on_error))
    }
}
