//! The authentication capability contract.

use std::sync::Arc;
use trellis_core::{AuthError, BoxFuture, Credentials, RequestContext};

/// A shared, type-erased strategy.
pub type StrategyRef = Arc<dyn AuthenticationStrategy>;

/// The capability set an authentication strategy implements.
///
/// Token extraction and the role check have default implementations;
/// concrete strategies usually only provide `generate_token` and
/// `verify_token`.
///
/// # Role semantics
///
/// `verify_credentials` succeeds when `required_roles` is empty or when the
/// credential's role is a member of the set, and fails with
/// [`AuthError::InsufficientRole`] otherwise.
pub trait AuthenticationStrategy: Send + Sync + 'static {
    /// Signs credentials into a token.
    fn generate_token(
        &self,
        credentials: Credentials,
    ) -> BoxFuture<'static, Result<String, AuthError>>;

    /// Verifies a token and recovers the credentials it carries.
    ///
    /// Fails with [`AuthError::InvalidToken`] when the token cannot be
    /// verified.
    fn verify_token(&self, token: String) -> BoxFuture<'static, Result<Credentials, AuthError>>;

    /// Checks verified credentials against the roles a route requires.
    fn verify_credentials(
        &self,
        credentials: Credentials,
        required_roles: Vec<String>,
    ) -> BoxFuture<'static, Result<Credentials, AuthError>> {
        Box::pin(async move {
            if required_roles.is_empty() {
                return Ok(credentials);
            }
            match credentials.role.as_deref() {
                Some(role) if required_roles.iter().any(|required| required == role) => {
                    Ok(credentials)
                }
                _ => Err(AuthError::InsufficientRole),
            }
        })
    }

    /// Pulls the token off a request.
    ///
    /// Reads a bearer-scheme `Authorization` header first; when no
    /// `Authorization` header is present at all, falls back to a `token`
    /// query parameter. A malformed `Authorization` header yields no token.
    fn extract_token(&self, ctx: &RequestContext) -> Option<String> {
        if let Some(header) = ctx.header("authorization") {
            let mut parts = header.split_whitespace();
            if parts.next() == Some("Bearer") {
                return parts.next().map(ToString::to_string);
            }
            return None;
        }
        ctx.query_value()
            .get("token")
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, Uri};
    use serde_json::Value;

    struct Stub;

    impl AuthenticationStrategy for Stub {
        fn generate_token(
            &self,
            _credentials: Credentials,
        ) -> BoxFuture<'static, Result<String, AuthError>> {
            Box::pin(async { Ok("tok".to_string()) })
        }

        fn verify_token(
            &self,
            _token: String,
        ) -> BoxFuture<'static, Result<Credentials, AuthError>> {
            Box::pin(async { Ok(Credentials::new("u1", "a@b.c")) })
        }
    }

    fn ctx_with_header(name: &str, value: &str) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            value.parse().unwrap(),
        );
        RequestContext::new(Method::GET, Uri::from_static("/"), headers, Value::Null)
    }

    fn ctx_with_uri(uri: &str) -> RequestContext {
        RequestContext::new(
            Method::GET,
            uri.parse::<Uri>().unwrap(),
            HeaderMap::new(),
            Value::Null,
        )
    }

    #[test]
    fn test_extract_bearer_token() {
        let ctx = ctx_with_header("authorization", "Bearer abc.def.ghi");
        assert_eq!(Stub.extract_token(&ctx).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_malformed_authorization_yields_none() {
        let ctx = ctx_with_header("authorization", "Basic dXNlcjpwdw==");
        assert!(Stub.extract_token(&ctx).is_none());
    }

    #[test]
    fn test_query_fallback() {
        let ctx = ctx_with_uri("/protected?token=xyz");
        assert_eq!(Stub.extract_token(&ctx).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_header_takes_precedence_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, "Bearer fromheader".parse().unwrap());
        let ctx = RequestContext::new(
            Method::GET,
            "/p?token=fromquery".parse::<Uri>().unwrap(),
            headers,
            Value::Null,
        );
        assert_eq!(Stub.extract_token(&ctx).as_deref(), Some("fromheader"));
    }

    #[tokio::test]
    async fn test_role_in_required_set_is_accepted() {
        // Pins the intended role semantics: membership in the required set
        // grants access.
        let creds = Credentials::new("u1", "a@b.c").with_role("admin");
        let verified = Stub
            .verify_credentials(creds, vec!["admin".to_string()])
            .await
            .unwrap();
        assert_eq!(verified.role.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_role_outside_required_set_is_rejected() {
        let creds = Credentials::new("u1", "a@b.c").with_role("user");
        let result = Stub
            .verify_credentials(creds, vec!["admin".to_string()])
            .await;
        assert_eq!(result.unwrap_err(), AuthError::InsufficientRole);
    }

    #[tokio::test]
    async fn test_missing_role_is_rejected_when_roles_required() {
        let creds = Credentials::new("u1", "a@b.c");
        let result = Stub
            .verify_credentials(creds, vec!["admin".to_string()])
            .await;
        assert_eq!(result.unwrap_err(), AuthError::InsufficientRole);
    }

    #[tokio::test]
    async fn test_empty_required_roles_accepts_anyone() {
        let creds = Credentials::new("u1", "a@b.c");
        assert!(Stub.verify_credentials(creds, vec![]).await.is_ok());
    }
}
