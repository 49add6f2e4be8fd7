//! The handler-invocation stage.

use crate::resolve::resolve_arguments;
use crate::respond::normalize_reply;
use trellis_core::{BoxFuture, Invocation, PipelineError, RequestContext, Response};
use trellis_meta::RouteDescriptor;
use trellis_pipeline::Endpoint;
use trellis_validate::{ValidationErrorHandlerRef, ValidationServiceRef};

/// The terminal stage of every built route: resolves the bound arguments,
/// invokes the handler, and shapes its reply into the response.
///
/// A handler error (or panic-free failure of any kind) diverts to the error
/// chain; response shaping follows the soft-fail policy of
/// [`normalize_reply`](crate::normalize_reply).
pub struct RouteEndpoint {
    route: RouteDescriptor,
    validation: ValidationServiceRef,
    response_error_handler: Option<ValidationErrorHandlerRef>,
}

impl RouteEndpoint {
    /// Creates the stage for one route.
    #[must_use]
    pub fn new(
        route: RouteDescriptor,
        validation: ValidationServiceRef,
        response_error_handler: Option<ValidationErrorHandlerRef>,
    ) -> Self {
        Self {
            route,
            validation,
            response_error_handler,
        }
    }
}

impl Endpoint for RouteEndpoint {
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move {
            let args = resolve_arguments(&self.route.bindings, ctx);
            let invocation = Invocation::new(args, ctx.clone());
            let reply = self.route.handler.invoke(invocation).await?;
            normalize_reply(
                reply,
                self.route.response_schema.as_ref(),
                self.validation.as_ref(),
                self.response_error_handler.as_ref(),
                ctx,
            )
        })
    }
}
