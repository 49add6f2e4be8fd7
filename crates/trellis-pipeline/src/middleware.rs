//! Core middleware trait and chaining types.
//!
//! Middleware stages receive the mutable request context and a [`Next`]
//! continuation. A stage continues by calling `next.run(ctx)`, short-circuits
//! by returning a response without calling it, or diverts to the error chain
//! by returning an `Err`.

use std::future::Future;
use std::sync::Arc;
use trellis_core::{BoxFuture, PipelineError, RequestContext, Response};

/// A shared, type-erased middleware stage.
pub type MiddlewareRef = Arc<dyn Middleware>;

/// A shared, type-erased endpoint.
pub type EndpointRef = Arc<dyn Endpoint>;

/// A request-processing stage.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once (`Next` is consumed by `run`)
/// - A stage that does not call `next.run()` halts the pipeline for this
///   request, either with its own response or with an error
///
/// # Example
///
/// ```ignore
/// struct Tagging;
///
/// impl Middleware for Tagging {
///     fn name(&self) -> &'static str {
///         "tagging"
///     }
///
///     fn process<'a>(
///         &'a self,
///         ctx: &'a mut RequestContext,
///         next: Next<'a>,
///     ) -> BoxFuture<'a, Result<Response, PipelineError>> {
///         Box::pin(async move {
///             ctx.set_extension(Tag("seen"));
///             next.run(ctx).await
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    /// Returns the stage name, used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Processes the request, continuing with `next` or halting.
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, PipelineError>>;
}

/// The terminal stage of a route pipeline.
///
/// Unlike [`Middleware`], an endpoint has no continuation: it must produce
/// a response or an error.
pub trait Endpoint: Send + Sync + 'static {
    /// Handles the request at the end of the stage chain.
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<Response, PipelineError>>;
}

impl<F> Endpoint for F
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, Result<Response, PipelineError>>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        (self)(ctx)
    }
}

/// Continuation to the rest of the stage chain.
///
/// Consumed by `run`, which guarantees a stage cannot invoke its
/// continuation twice.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Endpoint(&'a dyn Endpoint),
}

impl<'a> Next<'a> {
    /// Creates a continuation that runs `middleware` before `next`.
    #[must_use]
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal continuation.
    #[must_use]
    pub fn endpoint(endpoint: &'a dyn Endpoint) -> Self {
        Self {
            inner: NextInner::Endpoint(endpoint),
        }
    }

    /// Builds a continuation over an ordered stage slice ending in `endpoint`.
    #[must_use]
    pub fn chain(stages: &'a [MiddlewareRef], endpoint: &'a dyn Endpoint) -> Self {
        let mut next = Self::endpoint(endpoint);
        for middleware in stages.iter().rev() {
            next = Self::new(middleware.as_ref(), next);
        }
        next
    }

    /// Invokes the next stage in the chain.
    pub async fn run(self, ctx: &mut RequestContext) -> Result<Response, PipelineError> {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, *next).await,
            NextInner::Endpoint(endpoint) => endpoint.call(ctx).await,
        }
    }
}

/// A middleware built from an async function.
///
/// # Example
///
/// ```ignore
/// let timing = FnMiddleware::new("timing", |ctx, next| async move {
///     let response = next.run(ctx).await?;
///     tracing::debug!(elapsed = ?ctx.started_at().elapsed(), "request done");
///     Ok(response)
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, PipelineError>> + Send,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move { (self.func)(ctx, next).await })
    }
}
