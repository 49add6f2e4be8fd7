//! Host registration contract and the bundled in-memory host.
//!
//! The host web framework is an external collaborator: trellis only needs
//! something that can mount a [`Router`] under a base path and accept
//! app-level error stages. [`HostApp`] captures exactly that surface.
//!
//! [`App`] is the bundled implementation: a socketless host that dispatches
//! `http::Request<Bytes>` values through the mounted routers. It exists for
//! tests and for embedding trellis behind any transport that can produce
//! `http` requests; it deliberately does no listening, parsing, or TLS.

use crate::error_stage::{run_error_chain, ErrorStageRef};
use crate::router::Router;
use http::StatusCode;
use serde_json::json;
use trellis_core::{json_response, PipelineError, Request, RequestContext, Response};

/// The minimal router-registration surface consumed from a host framework.
pub trait HostApp {
    /// Mounts a router under a base path.
    ///
    /// An empty base path mounts at the root. Mounts are consulted in
    /// registration order.
    fn register_router(&mut self, base_url: &str, router: Router);

    /// Appends an app-level error stage, consulted after every mounted
    /// router's own error chain.
    fn use_error_stage(&mut self, stage: ErrorStageRef);
}

struct Mount {
    base_segments: Vec<String>,
    router: Router,
}

impl Mount {
    /// Returns the path remainder if `path` lives under this mount.
    fn strip_base(&self, path: &str) -> Option<String> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < self.base_segments.len() {
            return None;
        }
        for (expected, actual) in self.base_segments.iter().zip(segments.iter()) {
            if expected != actual {
                return None;
            }
        }
        let rest = &segments[self.base_segments.len()..];
        if rest.is_empty() {
            Some("/".to_string())
        } else {
            Some(format!("/{}", rest.join("/")))
        }
    }
}

/// The bundled in-memory host.
///
/// # Example
///
/// ```
/// use trellis_pipeline::{App, HostApp, Router};
///
/// let mut app = App::new();
/// app.register_router("/api", Router::new());
/// ```
#[derive(Default)]
pub struct App {
    mounts: Vec<Mount>,
    error_stages: Vec<ErrorStageRef>,
}

impl App {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches one request through the mounted routers.
    ///
    /// The body is parsed as JSON once, before any stage runs; a malformed
    /// body is rejected with a 400 without consulting any router. Requests
    /// matching no mounted route get the host's 404 envelope.
    pub async fn dispatch(&self, request: Request) -> Response {
        let ctx = match RequestContext::from_request(request) {
            Ok(ctx) => ctx,
            Err(err) => {
                return json_response(
                    StatusCode::BAD_REQUEST,
                    &json!({
                        "message": "An error occured!",
                        "error": format!("invalid JSON in request body: {err}"),
                    }),
                );
            }
        };
        self.dispatch_context(ctx).await
    }

    async fn dispatch_context(&self, mut ctx: RequestContext) -> Response {
        let path = ctx.path().to_string();

        for mount in &self.mounts {
            let Some(rest) = mount.strip_base(&path) else {
                continue;
            };
            let Some(result) = mount.router.dispatch(&mut ctx, &rest).await else {
                // No route in this mount; fall through to the next one.
                continue;
            };
            return match result {
                Ok(response) => response,
                Err(err) => match run_error_chain(&self.error_stages, err, &mut ctx).await {
                    Ok(response) => response,
                    Err(err) => Self::default_error_response(&err),
                },
            };
        }

        json_response(
            StatusCode::NOT_FOUND,
            &json!({"message": format!("Cannot {} {}", ctx.method(), path)}),
        )
    }

    /// The host's default error channel: anything the taxonomy stages did
    /// not recognize ends up here.
    fn default_error_response(err: &PipelineError) -> Response {
        tracing::error!(error = %err, "unhandled pipeline error reached the host default channel");
        json_response(err.status_code(), &json!({"message": err.to_string()}))
    }
}

impl HostApp for App {
    fn register_router(&mut self, base_url: &str, router: Router) {
        tracing::info!(base_url, routes = router.route_count(), "mounting router");
        self.mounts.push(Mount {
            base_segments: base_url
                .split('/')
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
            router,
        });
    }

    fn use_error_stage(&mut self, stage: ErrorStageRef) {
        self.error_stages.push(stage);
    }
}
