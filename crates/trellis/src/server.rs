//! Controller registration.

use crate::builder::{build_router, ErrorHandlers};
use crate::errors::{BuildError, HttpErrorHandlerRef, HttpErrorStage};
use std::sync::Arc;
use trellis_auth::{AuthErrorHandlerRef, AuthRegistry, AuthenticationErrorStage};
use trellis_meta::{
    extract_controller_descriptor, extract_route_descriptors, Annotations, Controller,
    MetadataStore,
};
use trellis_pipeline::HostApp;
use trellis_validate::{DefaultValidationService, ValidationErrorHandlerRef, ValidationServiceRef};

/// Registers controllers against a host and owns the cross-controller
/// collaborators: the finalized strategy registry, the validation service,
/// and the replaceable error handlers.
///
/// All configuration happens before [`add_controllers`](Self::add_controllers);
/// the registry and service are read-only once requests flow.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use http::Method;
/// use serde_json::json;
/// use trellis::{Annotations, Controller, Invocation, Reply, Server};
/// use trellis_auth::{AuthRegistry, JwtStrategy};
/// use trellis_pipeline::App;
///
/// struct Health;
///
/// impl Controller for Health {
///     fn annotate(self: Arc<Self>, a: &mut Annotations<'_>) {
///         a.controller("/health");
///         a.route("check", Method::GET, "/", |_inv: Invocation| async move {
///             Ok(Reply::plain(json!({"ok": true})))
///         });
///     }
/// }
///
/// let registry = AuthRegistry::builder()
///     .register("jwt", JwtStrategy::new(b"secret"))
///     .build();
///
/// let mut app = App::new();
/// let mut server = Server::new().with_auth_registry(registry);
/// server.add_controllers(&mut app, vec![Arc::new(Health)]).unwrap();
/// ```
pub struct Server {
    auth_registry: AuthRegistry,
    validation: ValidationServiceRef,
    store: MetadataStore,
    request_validation_handler: Option<ValidationErrorHandlerRef>,
    response_validation_handler: Option<ValidationErrorHandlerRef>,
    auth_error_handler: Option<AuthErrorHandlerRef>,
    http_error_handler: Option<HttpErrorHandlerRef>,
}

impl Server {
    /// Creates a server with an empty strategy registry and the bundled
    /// validation service.
    #[must_use]
    pub fn new() -> Self {
        Self {
            auth_registry: AuthRegistry::empty(),
            validation: Arc::new(DefaultValidationService::new()),
            store: MetadataStore::new(),
            request_validation_handler: None,
            response_validation_handler: None,
            auth_error_handler: None,
            http_error_handler: None,
        }
    }

    /// Supplies the finalized strategy registry.
    ///
    /// Strategies cannot be added after construction; build the complete
    /// registry first.
    #[must_use]
    pub fn with_auth_registry(mut self, registry: AuthRegistry) -> Self {
        self.auth_registry = registry;
        self
    }

    /// Replaces the bundled validation service.
    pub fn replace_validation_service(&mut self, service: ValidationServiceRef) {
        self.validation = service;
    }

    /// Replaces the default rendering of request-validation failures.
    pub fn replace_request_validation_error_handler(&mut self, handler: ValidationErrorHandlerRef) {
        self.request_validation_handler = Some(handler);
    }

    /// Replaces the soft-fail policy for response-validation failures: the
    /// handler takes over the response entirely.
    pub fn replace_response_validation_error_handler(
        &mut self,
        handler: ValidationErrorHandlerRef,
    ) {
        self.response_validation_handler = Some(handler);
    }

    /// Replaces the default 401 path of authentication failures.
    pub fn replace_auth_error_handler(&mut self, handler: AuthErrorHandlerRef) {
        self.auth_error_handler = Some(handler);
    }

    /// Replaces the default rendering of application-thrown HTTP errors.
    pub fn replace_http_error_handler(&mut self, handler: HttpErrorHandlerRef) {
        self.http_error_handler = Some(handler);
    }

    /// Registers controllers with the host.
    ///
    /// Per controller: collect annotations into the metadata store, extract
    /// descriptors, build the router, and mount it under the controller's
    /// base URL. After all controllers are mounted, the app-level HTTP-error
    /// and authentication-error renderers are appended.
    ///
    /// Any configuration error (missing controller marker, unknown strategy,
    /// duplicate parameter index, malformed metadata) aborts the whole call.
    pub fn add_controllers(
        &mut self,
        app: &mut impl HostApp,
        controllers: Vec<Arc<dyn Controller>>,
    ) -> Result<(), BuildError> {
        let result = self.add_controllers_inner(app, controllers);
        if let Err(err) = &result {
            tracing::error!(error = %err, "failed to add controllers to server");
        }
        result
    }

    fn add_controllers_inner(
        &mut self,
        app: &mut impl HostApp,
        controllers: Vec<Arc<dyn Controller>>,
    ) -> Result<(), BuildError> {
        let handlers = ErrorHandlers {
            request_validation: self.request_validation_handler.clone(),
            response_validation: self.response_validation_handler.clone(),
            authentication: self.auth_error_handler.clone(),
        };

        for controller in controllers {
            let name = controller.name();
            let subject = self.store.register_subject(name);
            controller.annotate(&mut Annotations::new(&mut self.store, subject));

            let descriptor = extract_controller_descriptor(&self.store, subject)?;
            let routes = extract_route_descriptors(&self.store, subject)?;
            let registration = build_router(
                &descriptor,
                &routes,
                &self.auth_registry,
                &self.validation,
                &handlers,
            )?;

            tracing::info!(
                controller = name,
                base_url = %registration.base_url,
                routes = routes.len(),
                "registered controller"
            );
            app.register_router(&registration.base_url, registration.router);
        }

        app.use_error_stage(Arc::new(HttpErrorStage::new(self.http_error_handler.clone())));
        app.use_error_stage(Arc::new(AuthenticationErrorStage::new()));
        Ok(())
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}
