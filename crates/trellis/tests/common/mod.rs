//! Shared fixtures for the integration suite.

#![allow(dead_code)]

use std::sync::Arc;
use trellis::{Controller, Credentials, PipelineError, RequestContext, Response, Server};
use trellis_auth::{AuthRegistry, AuthenticationStrategy, JwtStrategy};
use trellis_core::BoxFuture;
use trellis_pipeline::{App, Middleware, Next};
use trellis_test::TestClient;

pub const SECRET: &[u8] = b"trellis-integration-secret";

/// Registers controllers against a fresh app with a `jwt` strategy and
/// returns a client over it.
pub fn client_with(controllers: Vec<Arc<dyn Controller>>) -> TestClient {
    let registry = AuthRegistry::builder()
        .register("jwt", JwtStrategy::new(SECRET))
        .build();
    client_with_registry(controllers, registry)
}

/// Same, with an explicit registry.
pub fn client_with_registry(
    controllers: Vec<Arc<dyn Controller>>,
    registry: AuthRegistry,
) -> TestClient {
    let mut app = App::new();
    let mut server = Server::new().with_auth_registry(registry);
    server
        .add_controllers(&mut app, controllers)
        .expect("controllers should register");
    TestClient::new(app)
}

/// Builds a client from a pre-configured server.
pub fn client_from(mut server: Server, controllers: Vec<Arc<dyn Controller>>) -> TestClient {
    let mut app = App::new();
    server
        .add_controllers(&mut app, controllers)
        .expect("controllers should register");
    TestClient::new(app)
}

/// Signs a token for a caller with the given role.
pub async fn token_with_role(role: Option<&str>) -> String {
    let strategy = JwtStrategy::new(SECRET);
    let mut credentials = Credentials::new("user-1", "user@example.com");
    if let Some(role) = role {
        credentials = credentials.with_role(role);
    }
    strategy
        .generate_token(credentials)
        .await
        .expect("token should sign")
}

/// Request-scoped trace of which middleware ran, in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Trace(pub Vec<&'static str>);

/// A middleware appending its tag to the request [`Trace`].
pub struct Tag(pub &'static str);

impl Middleware for Tag {
    fn name(&self) -> &'static str {
        self.0
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move {
            let mut trace = ctx.remove_extension::<Trace>().unwrap_or_default();
            trace.0.push(self.0);
            ctx.set_extension(trace);
            next.run(ctx).await
        })
    }
}

/// Reads the trace accumulated so far, for handlers.
pub fn trace_of(ctx: &RequestContext) -> Vec<&'static str> {
    ctx.get_extension::<Trace>().cloned().unwrap_or_default().0
}
