//! Authentication gating through the pipeline.

mod common;

use common::{client_from, client_with, token_with_role, SECRET};
use http::{Method, StatusCode};
use serde_json::json;
use std::sync::Arc;
use trellis::{json_response, Annotations, Controller, Credentials, Invocation, Reply, Server};
use trellis_auth::{AuthErrorHandlerRef, AuthRegistry, AuthenticationStrategy, JwtStrategy};

struct AuthController;

impl Controller for AuthController {
    fn annotate(self: Arc<Self>, a: &mut Annotations<'_>) {
        a.controller("/auth");

        a.route("login", Method::POST, "/login", |inv: Invocation| async move {
            // Demo login: trust the posted identity and sign it.
            let body = inv.arg(0).cloned().unwrap_or_default();
            let credentials: Credentials = serde_json::from_value(body)
                .map_err(|e| trellis::PipelineError::internal(e.to_string()))?;
            let token = JwtStrategy::new(SECRET)
                .generate_token(credentials)
                .await
                .map_err(trellis::PipelineError::Authentication)?;
            Ok(Reply::plain(json!({"token": token})))
        })
        .bind_body(0);

        a.route("protected", Method::GET, "/protected", |inv: Invocation| async move {
            Ok(Reply::plain(json!({"user": inv.arg(0)})))
        })
        .authenticate("jwt", &[])
        .bind_auth_user(0);

        a.route("admin", Method::GET, "/admin", |_inv: Invocation| async move {
            Ok(Reply::plain(json!({"area": "admin"})))
        })
        .authenticate("jwt", &["admin"]);
    }
}

#[tokio::test]
async fn missing_token_is_401() {
    let client = client_with(vec![Arc::new(AuthController)]);

    let response = client.get("/auth/protected").send().await;
    assert_eq!(response.status_code(), 401);
    assert!(response.json()["message"].is_string());
}

#[tokio::test]
async fn garbage_token_is_401() {
    let client = client_with(vec![Arc::new(AuthController)]);

    let response = client
        .get("/auth/protected")
        .bearer("not.a.token")
        .send()
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn valid_token_reaches_handler_with_credentials() {
    let client = client_with(vec![Arc::new(AuthController)]);
    let token = token_with_role(Some("user")).await;

    let response = client.get("/auth/protected").bearer(&token).send().await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json()["user"]["id"], "user-1");
}

#[tokio::test]
async fn login_issues_tokens_the_gate_accepts() {
    let client = client_with(vec![Arc::new(AuthController)]);

    let login = client
        .post("/auth/login")
        .json(&json!({"id": "u9", "email": "nine@example.com"}))
        .send()
        .await;
    assert_eq!(login.status_code(), 200);
    let token = login.json()["token"].as_str().unwrap().to_string();

    let response = client.get("/auth/protected").bearer(&token).send().await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json()["user"]["id"], "u9");
}

#[tokio::test]
async fn role_gate_rejects_wrong_role_and_accepts_right_one() {
    let client = client_with(vec![Arc::new(AuthController)]);

    let user_token = token_with_role(Some("user")).await;
    let response = client.get("/auth/admin").bearer(&user_token).send().await;
    assert_eq!(response.status_code(), 401);

    let admin_token = token_with_role(Some("admin")).await;
    let response = client.get("/auth/admin").bearer(&admin_token).send().await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json()["area"], "admin");
}

#[tokio::test]
async fn token_query_parameter_is_accepted() {
    let client = client_with(vec![Arc::new(AuthController)]);
    let token = token_with_role(None).await;

    let response = client
        .get(&format!("/auth/protected?token={token}"))
        .send()
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn controller_level_auth_gates_every_route() {
    struct LockedController;

    impl Controller for LockedController {
        fn annotate(self: Arc<Self>, a: &mut Annotations<'_>) {
            a.controller("/locked");
            a.authenticate("jwt", &[]);
            a.route("one", Method::GET, "/one", |_inv: Invocation| async move {
                Ok(Reply::plain(json!({"route": "one"})))
            });
            a.route("two", Method::GET, "/two", |_inv: Invocation| async move {
                Ok(Reply::plain(json!({"route": "two"})))
            });
        }
    }

    let client = client_with(vec![Arc::new(LockedController)]);
    let token = token_with_role(None).await;

    for path in ["/locked/one", "/locked/two"] {
        assert_eq!(client.get(path).send().await.status_code(), 401);
        assert_eq!(
            client.get(path).bearer(&token).send().await.status_code(),
            200
        );
    }
}

#[tokio::test]
async fn replaced_auth_error_handler_takes_over() {
    let handler: AuthErrorHandlerRef = Arc::new(|err, _ctx| {
        json_response(
            StatusCode::FORBIDDEN,
            &json!({"denied": true, "reason": err.to_string()}),
        )
    });

    let registry = AuthRegistry::builder()
        .register("jwt", JwtStrategy::new(SECRET))
        .build();
    let mut server = Server::new().with_auth_registry(registry);
    server.replace_auth_error_handler(handler);
    let client = client_from(server, vec![Arc::new(AuthController)]);

    let response = client.get("/auth/protected").send().await;
    assert_eq!(response.status_code(), 403);
    assert_eq!(response.json()["denied"], true);
}
