//! The router builder.
//!
//! Compiles a controller's descriptors into a mounted [`Router`]. The
//! assembly order is load-bearing and mirrors the annotation surface's
//! documented precedence:
//!
//! 1. controller authentication (when declared)
//! 2. controller middleware, in declared order
//! 3. controller request validation (when declared)
//! 4. per route: route authentication placed *before* route-declared
//!    middleware
//! 5. per route: route request validation placed *after* route middleware
//! 6. the handler-invocation stage, then the route's error middleware
//! 7. the validation-error handler, then controller error middleware
//! 8. the result is registered under the controller's base URL
//!
//! A missing authentication strategy fails here — at startup — with an
//! error naming the strategy, never at request time. Controllers and routes
//! that declare no policy contribute no stage at that position.

use crate::endpoint::RouteEndpoint;
use crate::errors::BuildError;
use std::sync::Arc;
use trellis_auth::{AuthErrorHandlerRef, AuthRegistry, AuthenticationMiddleware};
use trellis_meta::{AuthRequirement, ControllerDescriptor, RouteDescriptor};
use trellis_pipeline::{MiddlewareRef, Router};
use trellis_validate::{ValidationErrorHandlerRef, ValidationServiceRef};

/// Server-level replacement handlers threaded into the built stages.
#[derive(Clone, Default)]
pub struct ErrorHandlers {
    /// Replaces the default 400 rendering of request-validation failures.
    pub request_validation: Option<ValidationErrorHandlerRef>,
    /// Takes over responses whose payload fails response validation.
    pub response_validation: Option<ValidationErrorHandlerRef>,
    /// Replaces the default 401 path of authentication failures.
    pub authentication: Option<AuthErrorHandlerRef>,
}

/// A built router and the base URL to mount it under.
pub struct RouterRegistration {
    /// Mount point for the host framework.
    pub base_url: String,
    /// The assembled router.
    pub router: Router,
}

/// Builds one controller's router from its descriptors.
pub fn build_router(
    controller: &ControllerDescriptor,
    routes: &[RouteDescriptor],
    registry: &AuthRegistry,
    validation: &ValidationServiceRef,
    handlers: &ErrorHandlers,
) -> Result<RouterRegistration, BuildError> {
    let mut router = Router::new();

    if let Some(stage) = auth_stage(controller.auth.as_ref(), registry, handlers)? {
        router.use_stage(stage);
    }

    for stage in &controller.middlewares {
        router.use_stage(Arc::clone(stage));
    }

    if let Some(schema_ref) = &controller.validation {
        router.use_stage(
            validation.validation_middleware(Arc::clone(&schema_ref.schema), schema_ref.options),
        );
    }

    for route in routes {
        let mut stages: Vec<MiddlewareRef> = route.middlewares.clone();

        // Route auth runs before any route-declared middleware.
        if let Some(stage) = auth_stage(route.auth.as_ref(), registry, handlers)? {
            stages.insert(0, stage);
        }

        // Request validation runs after route middleware, before the handler.
        if let Some(schema_ref) = &route.validation {
            stages.push(
                validation
                    .validation_middleware(Arc::clone(&schema_ref.schema), schema_ref.options),
            );
        }

        let endpoint = Arc::new(RouteEndpoint::new(
            route.clone(),
            Arc::clone(validation),
            handlers.response_validation.clone(),
        ));

        router.route(
            route.method.clone(),
            &route.path,
            stages,
            endpoint,
            route.error_middlewares.clone(),
        );
    }

    router.use_error(validation.validation_error_handler(handlers.request_validation.clone()));
    for stage in &controller.error_middlewares {
        router.use_error(Arc::clone(stage));
    }

    Ok(RouterRegistration {
        base_url: controller.base_url.clone(),
        router,
    })
}

fn auth_stage(
    requirement: Option<&AuthRequirement>,
    registry: &AuthRegistry,
    handlers: &ErrorHandlers,
) -> Result<Option<MiddlewareRef>, BuildError> {
    let Some(requirement) = requirement else {
        return Ok(None);
    };
    let strategy =
        registry
            .get(&requirement.strategy)
            .ok_or_else(|| BuildError::UnknownStrategy {
                strategy: requirement.strategy.clone(),
            })?;
    Ok(Some(Arc::new(AuthenticationMiddleware::new(
        strategy,
        requirement.roles.clone(),
        handlers.authentication.clone(),
    ))))
}
