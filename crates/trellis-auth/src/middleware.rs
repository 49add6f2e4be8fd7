//! Authentication pipeline stages.

use crate::strategy::StrategyRef;
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use trellis_core::{
    json_response, AuthError, BoxFuture, PipelineError, RequestContext, Response,
};
use trellis_pipeline::{ErrorStage, Middleware, Next};

/// A replacement handler for rendering authentication failures.
pub type AuthErrorHandlerRef =
    Arc<dyn Fn(&AuthError, &mut RequestContext) -> Response + Send + Sync>;

/// The authentication gate installed for controllers and routes that declare
/// an authentication requirement.
///
/// Flow: extract token (absent ⇒ immediate failure) → verify token → verify
/// credentials against the required roles → attach the verified credentials
/// to the request context → continue. Any failure either invokes the
/// configured handler or diverts to the error chain as a 401-class error.
pub struct AuthenticationMiddleware {
    strategy: StrategyRef,
    required_roles: Vec<String>,
    on_error: Option<AuthErrorHandlerRef>,
}

impl AuthenticationMiddleware {
    /// Creates the gate for a strategy and role set.
    #[must_use]
    pub fn new(
        strategy: StrategyRef,
        required_roles: Vec<String>,
        on_error: Option<AuthErrorHandlerRef>,
    ) -> Self {
        Self {
            strategy,
            required_roles,
            on_error,
        }
    }

    async fn authenticate(&self, ctx: &RequestContext) -> Result<trellis_core::Credentials, AuthError> {
        let token = self
            .strategy
            .extract_token(ctx)
            .ok_or(AuthError::MissingToken)?;
        let credentials = self.strategy.verify_token(token).await?;
        self.strategy
            .verify_credentials(credentials, self.required_roles.clone())
            .await
    }
}

impl Middleware for AuthenticationMiddleware {
    fn name(&self) -> &'static str {
        "authentication"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move {
            match self.authenticate(ctx).await {
                Ok(credentials) => {
                    ctx.set_credentials(credentials);
                    next.run(ctx).await
                }
                Err(err) => {
                    tracing::debug!(request_id = %ctx.request_id(), error = %err, "authentication failed");
                    match &self.on_error {
                        Some(handler) => Ok(handler(&err, ctx)),
                        None => Err(PipelineError::Authentication(err)),
                    }
                }
            }
        })
    }
}

/// The default renderer for authentication failures.
///
/// Renders 401 `{"message": ...}`; every other error kind passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticationErrorStage;

impl AuthenticationErrorStage {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ErrorStage for AuthenticationErrorStage {
    fn name(&self) -> &'static str {
        "authentication-errors"
    }

    fn process<'a>(
        &'a self,
        err: PipelineError,
        _ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move {
            match err {
                PipelineError::Authentication(auth) => Ok(json_response(
                    StatusCode::UNAUTHORIZED,
                    &json!({"message": auth.to_string()}),
                )),
                other => Err(other),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::AuthenticationStrategy;
    use http::{HeaderMap, Method, Uri};
    use serde_json::Value;
    use trellis_core::Credentials;
    use trellis_pipeline::{Endpoint, MiddlewareRef};

    struct Fixed;

    impl AuthenticationStrategy for Fixed {
        fn generate_token(
            &self,
            _credentials: Credentials,
        ) -> BoxFuture<'static, Result<String, AuthError>> {
            Box::pin(async { Ok("fixed".to_string()) })
        }

        fn verify_token(
            &self,
            token: String,
        ) -> BoxFuture<'static, Result<Credentials, AuthError>> {
            Box::pin(async move {
                match token.as_str() {
                    "admin-token" => Ok(Credentials::new("u1", "a@b.c").with_role("admin")),
                    "user-token" => Ok(Credentials::new("u2", "b@b.c").with_role("user")),
                    _ => Err(AuthError::InvalidToken("unknown token".to_string())),
                }
            })
        }
    }

    struct WhoAmI;

    impl Endpoint for WhoAmI {
        fn call<'a>(
            &'a self,
            ctx: &'a mut RequestContext,
        ) -> BoxFuture<'a, Result<Response, PipelineError>> {
            Box::pin(async move {
                let id = ctx.credentials().map(|c| c.id.clone());
                Ok(json_response(StatusCode::OK, &json!({"id": id})))
            })
        }
    }

    fn ctx_with_bearer(token: &str) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        RequestContext::new(Method::GET, Uri::from_static("/"), headers, Value::Null)
    }

    fn bare_ctx() -> RequestContext {
        RequestContext::new(
            Method::GET,
            Uri::from_static("/"),
            HeaderMap::new(),
            Value::Null,
        )
    }

    fn gate(roles: &[&str]) -> MiddlewareRef {
        Arc::new(AuthenticationMiddleware::new(
            Arc::new(Fixed),
            roles.iter().map(ToString::to_string).collect(),
            None,
        ))
    }

    #[tokio::test]
    async fn test_valid_token_attaches_credentials() {
        let stages = vec![gate(&[])];
        let endpoint = WhoAmI;
        let mut ctx = ctx_with_bearer("admin-token");

        let response = Next::chain(&stages, &endpoint).run(&mut ctx).await.unwrap();
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["id"], "u1");
    }

    #[tokio::test]
    async fn test_missing_token_fails() {
        let stages = vec![gate(&[])];
        let endpoint = WhoAmI;
        let mut ctx = bare_ctx();

        let result = Next::chain(&stages, &endpoint).run(&mut ctx).await;
        match result {
            Err(PipelineError::Authentication(AuthError::MissingToken)) => {}
            other => panic!("expected missing-token failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_role_fails() {
        let stages = vec![gate(&["admin"])];
        let endpoint = WhoAmI;
        let mut ctx = ctx_with_bearer("user-token");

        let result = Next::chain(&stages, &endpoint).run(&mut ctx).await;
        match result {
            Err(PipelineError::Authentication(AuthError::InsufficientRole)) => {}
            other => panic!("expected role failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_matching_role_passes() {
        let stages = vec![gate(&["admin"])];
        let endpoint = WhoAmI;
        let mut ctx = ctx_with_bearer("admin-token");

        let response = Next::chain(&stages, &endpoint).run(&mut ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_handler_short_circuits() {
        let handler: AuthErrorHandlerRef = Arc::new(|_err, _ctx| {
            json_response(StatusCode::IM_A_TEAPOT, &json!({"custom": true}))
        });
        let stage: MiddlewareRef = Arc::new(AuthenticationMiddleware::new(
            Arc::new(Fixed),
            vec![],
            Some(handler),
        ));

        let stages = vec![stage];
        let endpoint = WhoAmI;
        let mut ctx = bare_ctx();

        let response = Next::chain(&stages, &endpoint).run(&mut ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_error_stage_renders_401() {
        let stage = AuthenticationErrorStage::new();
        let mut ctx = bare_ctx();

        let response = stage
            .process(
                PipelineError::Authentication(AuthError::MissingToken),
                &mut ctx,
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
