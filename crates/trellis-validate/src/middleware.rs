//! Validation pipeline stages.

use crate::options::ValidationOptions;
use crate::schema::Schema;
use crate::service::{DefaultValidationService, ValidationErrorHandlerRef};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use trellis_core::{json_response, BoxFuture, PipelineError, RequestContext, Response};
use trellis_pipeline::{ErrorStage, Middleware, Next};

/// The request-body validation stage.
///
/// Runs after any middleware placed before it in the route pipeline and
/// before the handler. On success the context body is replaced with the
/// transformed instance; on failure the request diverts to the error chain
/// with the collected field errors.
pub struct RequestValidation {
    schema: Arc<Schema>,
    options: Option<ValidationOptions>,
}

impl RequestValidation {
    /// Creates the stage.
    ///
    /// When `options` is `None` the strict defaults apply.
    #[must_use]
    pub fn new(schema: Arc<Schema>, options: Option<ValidationOptions>) -> Self {
        Self { schema, options }
    }
}

impl Middleware for RequestValidation {
    fn name(&self) -> &'static str {
        "request-validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move {
            let options = self.options.unwrap_or_default();
            match DefaultValidationService::apply(&self.schema, ctx.body(), options) {
                Ok(transformed) => {
                    ctx.set_body(transformed);
                    next.run(ctx).await
                }
                Err(errors) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        errors = errors.len(),
                        "request body failed validation"
                    );
                    Err(PipelineError::Validation(errors))
                }
            }
        })
    }
}

/// The error stage rendering validation failures.
///
/// Renders `{"errors": [...]}` at 400 unless a replacement handler is
/// registered; every other error kind passes through.
pub struct ValidationErrorStage {
    on_error: Option<ValidationErrorHandlerRef>,
}

impl ValidationErrorStage {
    /// Creates the stage with an optional replacement handler.
    #[must_use]
    pub fn new(on_error: Option<ValidationErrorHandlerRef>) -> Self {
        Self { on_error }
    }
}

impl ErrorStage for ValidationErrorStage {
    fn name(&self) -> &'static str {
        "validation-errors"
    }

    fn process<'a>(
        &'a self,
        err: PipelineError,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move {
            match err {
                PipelineError::Validation(errors) => match &self.on_error {
                    Some(handler) => Ok(handler(&errors, ctx)),
                    None => Ok(json_response(
                        StatusCode::BAD_REQUEST,
                        &json!({"errors": errors}),
                    )),
                },
                other => Err(other),
            }
        })
    }
}
