//! The annotation API.
//!
//! Controllers describe themselves by implementing [`Controller::annotate`],
//! writing declarative entries into the metadata store through the
//! [`Annotations`] handle. This is the registration-time replacement for
//! decorator attachment: every call below corresponds to one annotation on
//! the class or on a route method.

use crate::descriptor::{ResponseErrorHandlerRef, ResponseSchemaRef};
use crate::keys::{AttributeKey, Member, CONTROLLER_TYPE_TAG};
use crate::store::{MetadataStore, SubjectId};
use crate::value::MetaValue;
use std::sync::Arc;
use trellis_core::RouteHandler;
use trellis_pipeline::{ErrorStageRef, MiddlewareRef, RouteMethod};
use trellis_validate::{Schema, ValidationOptions};

/// A class grouping related routes under a common base path.
///
/// Implementations declare everything about themselves in `annotate`;
/// handlers typically capture a clone of the `Arc<Self>` receiver so routes
/// can reach controller state.
pub trait Controller: Send + Sync + 'static {
    /// Returns a display name used in registration errors and logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Declares the controller's annotations.
    fn annotate(self: Arc<Self>, a: &mut Annotations<'_>);
}

/// Class-level annotation surface for one controller.
pub struct Annotations<'s> {
    store: &'s mut MetadataStore,
    subject: SubjectId,
}

impl<'s> Annotations<'s> {
    /// Creates the annotation handle for a registered subject.
    #[must_use]
    pub fn new(store: &'s mut MetadataStore, subject: SubjectId) -> Self {
        Self { store, subject }
    }

    fn put(&mut self, member: Member, attribute: AttributeKey, value: MetaValue) {
        self.store.insert(self.subject, member, attribute, value);
    }

    /// Marks this type as a controller mounted at `base_url`.
    ///
    /// Required: extraction rejects subjects without the controller marker.
    /// Pass `""` to mount at the root.
    pub fn controller(&mut self, base_url: &str) -> &mut Self {
        self.put(
            Member::Class,
            AttributeKey::Type,
            MetaValue::Str(CONTROLLER_TYPE_TAG.to_string()),
        );
        self.put(
            Member::Class,
            AttributeKey::BaseUrl,
            MetaValue::Str(base_url.to_string()),
        );
        self
    }

    /// Declares controller middleware, run before every route in declared
    /// order.
    pub fn middleware(&mut self, stages: Vec<MiddlewareRef>) -> &mut Self {
        self.put(
            Member::Class,
            AttributeKey::Middlewares,
            MetaValue::Middlewares(stages),
        );
        self
    }

    /// Declares controller error middleware, consulted after the
    /// validation-error handler.
    pub fn error_middleware(&mut self, stages: Vec<ErrorStageRef>) -> &mut Self {
        self.put(
            Member::Class,
            AttributeKey::ErrorMiddlewares,
            MetaValue::ErrorStages(stages),
        );
        self
    }

    /// Requires authentication via a named strategy for every route.
    pub fn authenticate(&mut self, strategy: &str, roles: &[&str]) -> &mut Self {
        self.put(
            Member::Class,
            AttributeKey::AuthStrategy,
            MetaValue::Str(strategy.to_string()),
        );
        self.put(
            Member::Class,
            AttributeKey::AuthRoles,
            MetaValue::Roles(roles.iter().map(ToString::to_string).collect()),
        );
        self
    }

    /// Declares a request-body schema validated before any route runs.
    pub fn validate(&mut self, schema: Schema) -> &mut Self {
        self.put(
            Member::Class,
            AttributeKey::RequestSchema,
            MetaValue::Schema(Arc::new(schema)),
        );
        self
    }

    /// Declares a request-body schema with explicit options.
    pub fn validate_with(&mut self, schema: Schema, options: ValidationOptions) -> &mut Self {
        self.validate(schema);
        self.put(
            Member::Class,
            AttributeKey::RequestSchemaOptions,
            MetaValue::Options(options),
        );
        self
    }

    /// Declares a route and returns its annotation surface.
    ///
    /// `name` is the member the route's metadata is keyed under; it must be
    /// unique within the controller.
    pub fn route(
        &mut self,
        name: &str,
        method: impl Into<RouteMethod>,
        path: &str,
        handler: impl RouteHandler,
    ) -> RouteAnnotations<'_> {
        let member = Member::method(name);
        self.put(
            member.clone(),
            AttributeKey::HttpMethod,
            MetaValue::HttpMethod(method.into()),
        );
        self.put(
            member.clone(),
            AttributeKey::Path,
            MetaValue::Str(path.to_string()),
        );
        self.put(
            member.clone(),
            AttributeKey::Handler,
            MetaValue::Handler(Arc::new(handler)),
        );
        RouteAnnotations {
            store: &mut *self.store,
            subject: self.subject,
            member,
        }
    }
}

/// Route-level annotation surface.
pub struct RouteAnnotations<'s> {
    store: &'s mut MetadataStore,
    subject: SubjectId,
    member: Member,
}

impl RouteAnnotations<'_> {
    fn put(&mut self, attribute: AttributeKey, value: MetaValue) {
        self.store
            .insert(self.subject, self.member.clone(), attribute, value);
    }

    /// Declares route middleware, run after controller stages and before
    /// the route's validation stage.
    pub fn middleware(&mut self, stages: Vec<MiddlewareRef>) -> &mut Self {
        self.put(AttributeKey::Middlewares, MetaValue::Middlewares(stages));
        self
    }

    /// Declares route error middleware, consulted first when this route's
    /// pipeline fails.
    pub fn error_middleware(&mut self, stages: Vec<ErrorStageRef>) -> &mut Self {
        self.put(
            AttributeKey::ErrorMiddlewares,
            MetaValue::ErrorStages(stages),
        );
        self
    }

    /// Requires authentication via a named strategy for this route.
    ///
    /// The auth stage runs before any route-declared middleware.
    pub fn authenticate(&mut self, strategy: &str, roles: &[&str]) -> &mut Self {
        self.put(
            AttributeKey::AuthStrategy,
            MetaValue::Str(strategy.to_string()),
        );
        self.put(
            AttributeKey::AuthRoles,
            MetaValue::Roles(roles.iter().map(ToString::to_string).collect()),
        );
        self
    }

    /// Declares a request-body schema validated after route middleware and
    /// before the handler.
    pub fn validate(&mut self, schema: Schema) -> &mut Self {
        self.put(AttributeKey::RequestSchema, MetaValue::Schema(Arc::new(schema)));
        self
    }

    /// Declares a request-body schema with explicit options.
    pub fn validate_with(&mut self, schema: Schema, options: ValidationOptions) -> &mut Self {
        self.validate(schema);
        self.put(AttributeKey::RequestSchemaOptions, MetaValue::Options(options));
        self
    }

    /// Declares a response schema that is projected and validated before
    /// the response is emitted.
    pub fn validate_response(&mut self, schema: Schema) -> &mut Self {
        self.put(
            AttributeKey::ResponseSchema,
            MetaValue::ResponseSchema(ResponseSchemaRef {
                schema: Arc::new(schema),
                validate: true,
                validator_options: None,
                on_error: None,
            }),
        );
        self
    }

    /// Declares a response schema with explicit options and an optional
    /// failure callback.
    pub fn validate_response_with(
        &mut self,
        schema: Schema,
        options: ValidationOptions,
        on_error: Option<ResponseErrorHandlerRef>,
    ) -> &mut Self {
        self.put(
            AttributeKey::ResponseSchema,
            MetaValue::ResponseSchema(ResponseSchemaRef {
                schema: Arc::new(schema),
                validate: true,
                validator_options: Some(options),
                on_error,
            }),
        );
        self
    }

    /// Declares a response schema used for projection only, without
    /// validation.
    pub fn transform_response(&mut self, schema: Schema) -> &mut Self {
        self.put(
            AttributeKey::ResponseSchema,
            MetaValue::ResponseSchema(ResponseSchemaRef {
                schema: Arc::new(schema),
                validate: false,
                validator_options: None,
                on_error: None,
            }),
        );
        self
    }

    /// Binds the request body to the handler argument at `index`.
    pub fn bind_body(&mut self, index: usize) -> &mut Self {
        self.put(AttributeKey::BodyIndex, MetaValue::Index(index));
        self
    }

    /// Binds the path parameters to the handler argument at `index`.
    pub fn bind_params(&mut self, index: usize) -> &mut Self {
        self.put(AttributeKey::ParamsIndex, MetaValue::Index(index));
        self
    }

    /// Binds the query parameters to the handler argument at `index`.
    pub fn bind_query(&mut self, index: usize) -> &mut Self {
        self.put(AttributeKey::QueryIndex, MetaValue::Index(index));
        self
    }

    /// Binds the authenticated credentials to the handler argument at
    /// `index`.
    pub fn bind_auth_user(&mut self, index: usize) -> &mut Self {
        self.put(AttributeKey::AuthUserIndex, MetaValue::Index(index));
        self
    }
}
