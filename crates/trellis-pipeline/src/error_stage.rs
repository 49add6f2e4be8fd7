//! Error-handling stages.
//!
//! When a pipeline stage returns an error, the remaining normal stages are
//! skipped and the error travels through the error chain in registration
//! order. Each [`ErrorStage`] either renders a response (handling the error)
//! or returns it — possibly transformed — for the next stage. Errors no
//! stage recognizes fall through to the host framework's default channel.

use std::future::Future;
use std::sync::Arc;
use trellis_core::{BoxFuture, PipelineError, RequestContext, Response};

/// A shared, type-erased error stage.
pub type ErrorStageRef = Arc<dyn ErrorStage>;

/// An error-handling stage.
pub trait ErrorStage: Send + Sync + 'static {
    /// Returns the stage name, used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Handles or forwards an error.
    ///
    /// `Ok(response)` ends the request with that response. `Err` passes the
    /// error to the next error stage.
    fn process<'a>(
        &'a self,
        err: PipelineError,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<Response, PipelineError>>;
}

/// Runs an error through a chain of stages.
///
/// Returns the first response a stage produces, or the final error if the
/// whole chain passed it through.
pub async fn run_error_chain(
    stages: &[ErrorStageRef],
    mut err: PipelineError,
    ctx: &mut RequestContext,
) -> Result<Response, PipelineError> {
    for stage in stages {
        match stage.process(err, ctx).await {
            Ok(response) => return Ok(response),
            Err(next_err) => err = next_err,
        }
    }
    Err(err)
}

/// An error stage built from an async function.
pub struct FnErrorStage<F> {
    name: &'static str,
    func: F,
}

impl<F> FnErrorStage<F> {
    /// Creates a function-based error stage.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F, Fut> ErrorStage for FnErrorStage<F>
where
    F: for<'a> Fn(PipelineError, &'a mut RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, PipelineError>> + Send,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        err: PipelineError,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move { (self.func)(err, ctx).await })
    }
}
