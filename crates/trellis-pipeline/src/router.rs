//! Per-controller router object.
//!
//! A [`Router`] is the unit the router builder produces and the host mounts
//! under a base path. It holds router-level stages (applied to every route),
//! a route table, and a router-level error chain appended after route error
//! middlewares.

use crate::error_stage::{run_error_chain, ErrorStageRef};
use crate::middleware::{EndpointRef, MiddlewareRef, Next};
use http::Method;
use trellis_core::{Params, PipelineError, RequestContext, Response};

/// The method selector of a route.
///
/// `All` matches any verb, mirroring the `all` pseudo-method of the
/// annotation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMethod {
    /// Match one HTTP method exactly.
    Verb(Method),
    /// Match every HTTP method.
    All,
}

impl RouteMethod {
    fn matches(&self, method: &Method) -> bool {
        match self {
            Self::Verb(verb) => verb == method,
            Self::All => true,
        }
    }
}

impl From<Method> for RouteMethod {
    fn from(method: Method) -> Self {
        Self::Verb(method)
    }
}

/// A path segment in a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

fn parse_segments(pattern: &str) -> Vec<PathSegment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.starts_with('{') && s.ends_with('}') {
                PathSegment::Param(s[1..s.len() - 1].to_string())
            } else {
                PathSegment::Literal(s.to_string())
            }
        })
        .collect()
}

struct Route {
    method: RouteMethod,
    pattern: String,
    segments: Vec<PathSegment>,
    stages: Vec<MiddlewareRef>,
    endpoint: EndpointRef,
    error_stages: Vec<ErrorStageRef>,
}

impl Route {
    fn match_path(&self, path: &str) -> Option<Params> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (pattern, actual) in self.segments.iter().zip(path_segments.iter()) {
            match pattern {
                PathSegment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                PathSegment::Param(name) => params.push(name.clone(), (*actual).to_string()),
            }
        }
        Some(params)
    }
}

/// A mountable route table with stage and error chains.
///
/// Routes are matched in registration order; the first route whose method
/// selector and pattern both match wins. A request whose path matches no
/// route falls through the router entirely (the host tries later mounts).
#[derive(Default)]
pub struct Router {
    stages: Vec<MiddlewareRef>,
    routes: Vec<Route>,
    error_stages: Vec<ErrorStageRef>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a router-level stage, run before every route's own stages.
    pub fn use_stage(&mut self, stage: MiddlewareRef) {
        self.stages.push(stage);
    }

    /// Registers a route.
    ///
    /// `stages` run after the router-level stages; `error_stages` form the
    /// route's own error chain, consulted before the router-level one.
    pub fn route(
        &mut self,
        method: impl Into<RouteMethod>,
        pattern: &str,
        stages: Vec<MiddlewareRef>,
        endpoint: EndpointRef,
        error_stages: Vec<ErrorStageRef>,
    ) {
        self.routes.push(Route {
            method: method.into(),
            pattern: pattern.to_string(),
            segments: parse_segments(pattern),
            stages,
            endpoint,
            error_stages,
        });
    }

    /// Appends a router-level error stage.
    pub fn use_error(&mut self, stage: ErrorStageRef) {
        self.error_stages.push(stage);
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Returns the registered route patterns in order, for logging.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.as_str())
    }

    /// Dispatches a request whose path is already relative to the mount.
    ///
    /// Returns `None` if no route matches, letting the host fall through to
    /// the next mount. Otherwise runs the full stage chain and, on failure,
    /// the route and router error chains; an error the chains do not handle
    /// is returned inside `Some(Err(..))` for the host's own error channel.
    pub async fn dispatch(
        &self,
        ctx: &mut RequestContext,
        path: &str,
    ) -> Option<Result<Response, PipelineError>> {
        let method = ctx.method().clone();
        let (route, params) = self.routes.iter().find_map(|route| {
            if route.method.matches(&method) {
                route.match_path(path).map(|params| (route, params))
            } else {
                None
            }
        })?;

        ctx.set_path_params(params);

        let mut next = Next::endpoint(route.endpoint.as_ref());
        for stage in route.stages.iter().rev() {
            next = Next::new(stage.as_ref(), next);
        }
        for stage in self.stages.iter().rev() {
            next = Next::new(stage.as_ref(), next);
        }

        match next.run(ctx).await {
            Ok(response) => Some(Ok(response)),
            Err(err) => {
                tracing::debug!(
                    pattern = %route.pattern,
                    error = %err,
                    "route pipeline diverted to error chain"
                );
                match run_error_chain(&route.error_stages, err, ctx).await {
                    Ok(response) => Some(Ok(response)),
                    Err(err) => Some(run_error_chain(&self.error_stages, err, ctx).await),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_stage::FnErrorStage;
    use crate::middleware::Endpoint;
    use http::{HeaderMap, StatusCode, Uri};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use trellis_core::{json_response, BoxFuture};

    fn test_ctx(method: Method, uri: &str) -> RequestContext {
        RequestContext::new(
            method,
            uri.parse::<Uri>().unwrap(),
            HeaderMap::new(),
            Value::Null,
        )
    }

    struct Echo(&'static str);

    impl Endpoint for Echo {
        fn call<'a>(
            &'a self,
            ctx: &'a mut RequestContext,
        ) -> BoxFuture<'a, Result<Response, PipelineError>> {
            Box::pin(async move {
                Ok(json_response(
                    StatusCode::OK,
                    &json!({"route": self.0, "params": ctx.path_params().to_value()}),
                ))
            })
        }
    }

    fn body(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn test_routes_by_method_and_path() {
        let mut router = Router::new();
        router.route(Method::GET, "/items", vec![], Arc::new(Echo("list")), vec![]);
        router.route(Method::POST, "/items", vec![], Arc::new(Echo("create")), vec![]);

        let mut ctx = test_ctx(Method::GET, "/items");
        let response = router.dispatch(&mut ctx, "/items").await.unwrap().unwrap();
        assert_eq!(body(&response)["route"], "list");

        let mut ctx = test_ctx(Method::POST, "/items");
        let response = router.dispatch(&mut ctx, "/items").await.unwrap().unwrap();
        assert_eq!(body(&response)["route"], "create");
    }

    #[tokio::test]
    async fn test_no_match_falls_through() {
        let mut router = Router::new();
        router.route(Method::GET, "/items", vec![], Arc::new(Echo("list")), vec![]);

        let mut ctx = test_ctx(Method::DELETE, "/items");
        assert!(router.dispatch(&mut ctx, "/items").await.is_none());

        let mut ctx = test_ctx(Method::GET, "/other");
        assert!(router.dispatch(&mut ctx, "/other").await.is_none());
    }

    #[tokio::test]
    async fn test_param_extraction() {
        let mut router = Router::new();
        router.route(
            Method::GET,
            "/items/{id}",
            vec![],
            Arc::new(Echo("get")),
            vec![],
        );

        let mut ctx = test_ctx(Method::GET, "/items/42");
        let response = router.dispatch(&mut ctx, "/items/42").await.unwrap().unwrap();
        assert_eq!(body(&response)["params"]["id"], "42");
    }

    #[tokio::test]
    async fn test_all_matches_any_verb() {
        let mut router = Router::new();
        router.route(RouteMethod::All, "/any", vec![], Arc::new(Echo("any")), vec![]);

        for method in [Method::GET, Method::POST, Method::PATCH, Method::DELETE] {
            let mut ctx = test_ctx(method, "/any");
            assert!(router.dispatch(&mut ctx, "/any").await.is_some());
        }
    }

    #[tokio::test]
    async fn test_root_pattern_matches_empty_remainder() {
        let mut router = Router::new();
        router.route(Method::GET, "/", vec![], Arc::new(Echo("root")), vec![]);

        let mut ctx = test_ctx(Method::GET, "/");
        assert!(router.dispatch(&mut ctx, "/").await.is_some());

        let mut ctx = test_ctx(Method::GET, "/");
        assert!(router.dispatch(&mut ctx, "").await.is_some());
    }

    #[tokio::test]
    async fn test_route_error_chain_runs_before_router_chain() {
        struct Failing;

        impl Endpoint for Failing {
            fn call<'a>(
                &'a self,
                _ctx: &'a mut RequestContext,
            ) -> BoxFuture<'a, Result<Response, PipelineError>> {
                Box::pin(async { Err(PipelineError::internal("endpoint failed")) })
            }
        }

        let route_stage: ErrorStageRef = Arc::new(FnErrorStage::new(
            "route",
            |_err: PipelineError, _ctx: &mut RequestContext| async move {
                Ok::<_, PipelineError>(json_response(StatusCode::BAD_GATEWAY, &json!({"by": "route"})))
            },
        ));

        let mut router = Router::new();
        router.route(
            Method::GET,
            "/fail",
            vec![],
            Arc::new(Failing),
            vec![route_stage],
        );
        router.use_error(Arc::new(FnErrorStage::new(
            "router",
            |_err: PipelineError, _ctx: &mut RequestContext| async move {
                Ok::<_, PipelineError>(json_response(StatusCode::BAD_GATEWAY, &json!({"by": "router"})))
            },
        )));

        let mut ctx = test_ctx(Method::GET, "/fail");
        let response = router.dispatch(&mut ctx, "/fail").await.unwrap().unwrap();
        assert_eq!(body(&response)["by"], "route");
    }

    #[tokio::test]
    async fn test_unhandled_error_surfaces() {
        struct Failing;

        impl Endpoint for Failing {
            fn call<'a>(
                &'a self,
                _ctx: &'a mut RequestContext,
            ) -> BoxFuture<'a, Result<Response, PipelineError>> {
                Box::pin(async { Err(PipelineError::internal("endpoint failed")) })
            }
        }

        let mut router = Router::new();
        router.route(Method::GET, "/fail", vec![], Arc::new(Failing), vec![]);

        let mut ctx = test_ctx(Method::GET, "/fail");
        let result = router.dispatch(&mut ctx, "/fail").await.unwrap();
        assert!(result.is_err());
    }
}
