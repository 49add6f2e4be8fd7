//! Typed descriptors derived from controller metadata.
//!
//! Descriptors are built once per controller at registration time and are
//! immutable afterwards; the router builder consumes them to assemble the
//! per-route pipelines.

use std::sync::Arc;
use trellis_core::{FieldError, HandlerRef};
use trellis_pipeline::{ErrorStageRef, MiddlewareRef, RouteMethod};
use trellis_validate::{Schema, ValidationOptions};

/// Callback invoked when response validation fails and no server-level
/// handler is registered for it.
pub type ResponseErrorHandlerRef = Arc<dyn Fn(&[FieldError]) + Send + Sync>;

/// An authentication requirement: which strategy gates the pipeline and
/// which roles it demands.
///
/// An absent requirement (rather than an empty strategy name) means no
/// authentication stage is contributed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequirement {
    /// Name of the registered strategy.
    pub strategy: String,
    /// Roles the verified credentials must satisfy. Empty means any
    /// authenticated caller.
    pub roles: Vec<String>,
}

/// A request-validation schema with its options.
#[derive(Clone)]
pub struct SchemaRef {
    /// The schema to validate against.
    pub schema: Arc<Schema>,
    /// Explicit options; `None` applies the strict defaults.
    pub options: Option<ValidationOptions>,
}

/// A response schema with its flags.
///
/// The transform step is an option-free projection in this model, so unlike
/// request validation there is no separate transform-option bag.
#[derive(Clone)]
pub struct ResponseSchemaRef {
    /// The schema responses are shaped by.
    pub schema: Arc<Schema>,
    /// Whether to validate (in addition to projecting) the payload.
    pub validate: bool,
    /// Explicit validator options; `None` applies whitelist-only defaults.
    pub validator_options: Option<ValidationOptions>,
    /// Route-level callback for validation failures.
    pub on_error: Option<ResponseErrorHandlerRef>,
}

/// A semantic argument source a handler parameter can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// The (validated) request body.
    Body,
    /// The matched path parameters.
    PathParams,
    /// The parsed query parameters.
    Query,
    /// The authenticated caller's credentials.
    AuthUser,
}

/// The four independent positional binding slots of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamBindings {
    /// Index of the body argument, if bound.
    pub body: Option<usize>,
    /// Index of the path-parameters argument, if bound.
    pub params: Option<usize>,
    /// Index of the query argument, if bound.
    pub query: Option<usize>,
    /// Index of the auth-user argument, if bound.
    pub auth_user: Option<usize>,
}

impl ParamBindings {
    /// Returns the bound sources sorted ascending by positional index.
    #[must_use]
    pub fn ordered(&self) -> Vec<(ParamSource, usize)> {
        let mut entries: Vec<(ParamSource, usize)> = [
            (ParamSource::Body, self.body),
            (ParamSource::PathParams, self.params),
            (ParamSource::Query, self.query),
            (ParamSource::AuthUser, self.auth_user),
        ]
        .into_iter()
        .filter_map(|(source, index)| index.map(|i| (source, i)))
        .collect();
        entries.sort_by_key(|(_, index)| *index);
        entries
    }

    /// Returns an index two sources share, if any.
    #[must_use]
    pub fn duplicate_index(&self) -> Option<usize> {
        let mut seen = Vec::new();
        for (_, index) in self.ordered() {
            if seen.contains(&index) {
                return Some(index);
            }
            seen.push(index);
        }
        None
    }

    /// Returns whether no source is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_none()
            && self.params.is_none()
            && self.query.is_none()
            && self.auth_user.is_none()
    }
}

/// Class-level metadata of one controller.
#[derive(Clone)]
pub struct ControllerDescriptor {
    /// Base URL the controller's router mounts under.
    pub base_url: String,
    /// Controller middleware, in declared order.
    pub middlewares: Vec<MiddlewareRef>,
    /// Controller error middleware, in declared order.
    pub error_middlewares: Vec<ErrorStageRef>,
    /// Controller-level authentication requirement.
    pub auth: Option<AuthRequirement>,
    /// Controller-level request validation.
    pub validation: Option<SchemaRef>,
}

/// Metadata of one annotated route.
#[derive(Clone)]
pub struct RouteDescriptor {
    /// The member name the route was declared under.
    pub member: String,
    /// Route sub-path, appended to the controller base URL.
    pub path: String,
    /// HTTP method selector.
    pub method: RouteMethod,
    /// The bound handler.
    pub handler: HandlerRef,
    /// Route middleware, in declared order.
    pub middlewares: Vec<MiddlewareRef>,
    /// Route error middleware, in declared order.
    pub error_middlewares: Vec<ErrorStageRef>,
    /// Route-level authentication requirement.
    pub auth: Option<AuthRequirement>,
    /// Route-level request validation.
    pub validation: Option<SchemaRef>,
    /// Response schema, if declared.
    pub response_schema: Option<ResponseSchemaRef>,
    /// Parameter bindings.
    pub bindings: ParamBindings,
}
