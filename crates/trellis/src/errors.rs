//! Construction errors and the HTTP-error rendering stage.

use std::sync::Arc;
use thiserror::Error;
use trellis_core::{json_response, BoxFuture, HttpError, PipelineError, RequestContext, Response};
use trellis_meta::MetadataError;
use trellis_pipeline::ErrorStage;

/// A replacement handler for rendering [`HttpError`] responses.
pub type HttpErrorHandlerRef =
    Arc<dyn Fn(&HttpError, &mut RequestContext) -> Response + Send + Sync>;

/// Errors raised while building routers from controller metadata.
///
/// All of these abort server construction; none are retried.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A controller or route references a strategy the registry does not
    /// know.
    #[error(
        "authentication strategy '{strategy}' is not registered; \
         register all strategies before adding controllers"
    )]
    UnknownStrategy {
        /// The missing strategy name.
        strategy: String,
    },

    /// Controller metadata could not be extracted.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// The base renderer for application-thrown HTTP errors.
///
/// Renders the error's declared status with the standard envelope, or
/// delegates to a replacement handler; every other error kind passes
/// through.
pub struct HttpErrorStage {
    on_error: Option<HttpErrorHandlerRef>,
}

impl HttpErrorStage {
    /// Creates the stage with an optional replacement handler.
    #[must_use]
    pub fn new(on_error: Option<HttpErrorHandlerRef>) -> Self {
        Self { on_error }
    }
}

impl ErrorStage for HttpErrorStage {
    fn name(&self) -> &'static str {
        "http-errors"
    }

    fn process<'a>(
        &'a self,
        err: PipelineError,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move {
            match err {
                PipelineError::Http(http) => match &self.on_error {
                    Some(handler) => Ok(handler(&http, ctx)),
                    None => Ok(json_response(http.status(), &http.to_body())),
                },
                other => Err(other),
            }
        })
    }
}

/// Renders the standard error envelope directly; used by hosts that want
/// the default shape without going through a stage.
#[must_use]
pub fn render_http_error(err: &HttpError) -> Response {
    json_response(err.status(), &err.to_body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, StatusCode, Uri};
    use serde_json::{json, Value};

    fn ctx() -> RequestContext {
        RequestContext::new(
            Method::GET,
            Uri::from_static("/"),
            HeaderMap::new(),
            Value::Null,
        )
    }

    #[tokio::test]
    async fn test_renders_declared_status_and_envelope() {
        let stage = HttpErrorStage::new(None);
        let err = HttpError::new(StatusCode::PAYMENT_REQUIRED, "pay up")
            .with_data(json!({"amount": 5}));

        let response = stage
            .process(PipelineError::Http(err), &mut ctx())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["message"], "Payment Required");
        assert_eq!(body["error"], "pay up");
        assert_eq!(body["data"]["amount"], 5);
    }

    #[tokio::test]
    async fn test_passes_other_errors() {
        let stage = HttpErrorStage::new(None);
        let result = stage
            .process(PipelineError::internal("boom"), &mut ctx())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_custom_handler() {
        let handler: HttpErrorHandlerRef = Arc::new(|err, _ctx| {
            json_response(err.status(), &json!({"custom": err.message()}))
        });
        let stage = HttpErrorStage::new(Some(handler));

        let response = stage
            .process(
                PipelineError::Http(HttpError::new(StatusCode::GONE, "bye")),
                &mut ctx(),
            )
            .await
            .unwrap();

        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["custom"], "bye");
    }

    #[test]
    fn test_build_error_names_strategy() {
        let err = BuildError::UnknownStrategy {
            strategy: "saml".to_string(),
        };
        assert!(err.to_string().contains("'saml'"));
    }
}
