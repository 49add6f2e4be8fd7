//! Handler trait and invocation types.
//!
//! A [`RouteHandler`] is the terminal stage of a route pipeline. It receives
//! an [`Invocation`]: the positional arguments produced by the argument
//! resolver plus a snapshot of the request context.

use crate::context::RequestContext;
use crate::error::PipelineError;
use crate::reply::Reply;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future, as produced by pipeline stages and handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A shared, type-erased handler.
pub type HandlerRef = Arc<dyn RouteHandler>;

/// Everything a handler receives for one request.
///
/// `args` holds the values selected by the route's parameter bindings
/// (body, path params, query, auth user) in declared positional order.
/// The context snapshot gives access to the raw request on top of the
/// bound arguments.
#[derive(Debug, Clone)]
pub struct Invocation {
    args: Vec<Value>,
    context: RequestContext,
}

impl Invocation {
    /// Creates an invocation from resolved arguments and a context snapshot.
    #[must_use]
    pub fn new(args: Vec<Value>, context: RequestContext) -> Self {
        Self { args, context }
    }

    /// Returns the bound arguments in declared positional order.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Returns the argument at a position, if bound.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Consumes the invocation, returning the argument list.
    #[must_use]
    pub fn into_args(self) -> Vec<Value> {
        self.args
    }

    /// Returns the request context snapshot.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

/// The terminal handler of a route.
///
/// Implemented automatically for async closures, which is how controllers
/// usually declare handlers:
///
/// ```
/// use serde_json::json;
/// use trellis_core::{Invocation, Reply, RouteHandler};
///
/// let handler = |inv: Invocation| async move {
///     Ok(Reply::plain(json!({"args": inv.args().len()})))
/// };
///
/// // `handler` satisfies the trait bound:
/// fn assert_handler<H: RouteHandler>(_: H) {}
/// assert_handler(handler);
/// ```
pub trait RouteHandler: Send + Sync + 'static {
    /// Handles one invocation, producing a reply or diverting to the
    /// error channel.
    fn invoke(&self, invocation: Invocation) -> BoxFuture<'static, Result<Reply, PipelineError>>;
}

impl<F, Fut> RouteHandler for F
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, PipelineError>> + Send + 'static,
{
    fn invoke(&self, invocation: Invocation) -> BoxFuture<'static, Result<Reply, PipelineError>> {
        Box::pin((self)(invocation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, Uri};
    use serde_json::json;

    fn snapshot() -> RequestContext {
        RequestContext::new(
            Method::GET,
            Uri::from_static("/test"),
            HeaderMap::new(),
            Value::Null,
        )
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let handler = |inv: Invocation| async move {
            let first = inv.arg(0).cloned().unwrap_or(Value::Null);
            Ok(Reply::plain(json!({"echo": first})))
        };

        let invocation = Invocation::new(vec![json!("hello")], snapshot());
        let reply = handler.invoke(invocation).await.unwrap();
        assert_eq!(reply.payload()["echo"], "hello");
    }

    #[tokio::test]
    async fn test_handler_error_channel() {
        let handler = |_inv: Invocation| async move {
            Err::<Reply, _>(PipelineError::internal("nope"))
        };

        let result = handler.invoke(Invocation::new(vec![], snapshot())).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_invocation_accessors() {
        let invocation = Invocation::new(vec![json!(1), json!(2)], snapshot());
        assert_eq!(invocation.args().len(), 2);
        assert_eq!(invocation.arg(1), Some(&json!(2)));
        assert_eq!(invocation.arg(5), None);
    }
}
