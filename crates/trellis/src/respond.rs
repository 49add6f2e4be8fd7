//! Response shaping.
//!
//! Converts a handler's [`Reply`] into the final HTTP response, applying the
//! route's response schema when one is declared.

use trellis_core::{json_response, PipelineError, Reply, RequestContext, Response};
use trellis_meta::ResponseSchemaRef;
use trellis_validate::{ValidationErrorHandlerRef, ValidationService};

/// Shapes a reply into a response.
///
/// A plain reply renders as 200; a status-carrying reply renders with its
/// status. When the route declares a response schema, the payload is
/// projected (and validated when the schema ref asks for it) first.
///
/// Response-validation failures do not abort the already-computed success
/// path: if a server-level handler is registered it takes over the response
/// entirely; otherwise the route's callback (if any) is notified, the
/// failure is logged, and the original payload is emitted. Silent data
/// inconsistency is preferred over failing a successful request, but it is
/// always observable.
pub fn normalize_reply(
    reply: Reply,
    response_schema: Option<&ResponseSchemaRef>,
    validation: &dyn ValidationService,
    response_error_handler: Option<&ValidationErrorHandlerRef>,
    ctx: &mut RequestContext,
) -> Result<Response, PipelineError> {
    let (status, mut payload) = reply.into_parts();

    if let Some(schema_ref) = response_schema {
        if schema_ref.validate {
            match validation.validate_response_object(
                &schema_ref.schema,
                &payload,
                schema_ref.validator_options,
            ) {
                Ok(transformed) => payload = transformed,
                Err(errors) => {
                    if let Some(handler) = response_error_handler {
                        return Ok(handler(&errors, ctx));
                    }
                    if let Some(on_error) = &schema_ref.on_error {
                        on_error(&errors);
                    }
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        errors = errors.len(),
                        "response failed validation; emitting unvalidated payload"
                    );
                }
            }
        } else {
            payload = validation.transform_plain(&schema_ref.schema, &payload);
        }
    }

    Ok(json_response(status, &payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, StatusCode, Uri};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use trellis_validate::{DefaultValidationService, Schema, ValidationOptions};

    fn ctx() -> RequestContext {
        RequestContext::new(
            Method::GET,
            Uri::from_static("/"),
            HeaderMap::new(),
            Value::Null,
        )
    }

    fn body(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn schema_ref(validate: bool) -> ResponseSchemaRef {
        ResponseSchemaRef {
            schema: Arc::new(Schema::object(vec![
                ("id", Schema::integer().required()),
                ("name", Schema::string()),
            ])),
            validate,
            validator_options: None,
            on_error: None,
        }
    }

    #[test]
    fn test_plain_reply_is_200() {
        let service = DefaultValidationService::new();
        let response = normalize_reply(
            Reply::plain(json!({"a": 1})),
            None,
            &service,
            None,
            &mut ctx(),
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response), json!({"a": 1}));
    }

    #[test]
    fn test_status_reply_preserved() {
        let service = DefaultValidationService::new();
        let response = normalize_reply(
            Reply::with_status(StatusCode::CREATED, json!({"id": 1})),
            None,
            &service,
            None,
            &mut ctx(),
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_response_schema_projects() {
        let service = DefaultValidationService::new();
        let response = normalize_reply(
            Reply::plain(json!({"id": 1, "name": "x", "secret": "hide"})),
            Some(&schema_ref(true)),
            &service,
            None,
            &mut ctx(),
        )
        .unwrap();

        assert_eq!(body(&response), json!({"id": 1, "name": "x"}));
    }

    #[test]
    fn test_validation_failure_soft_fails_with_original_payload() {
        let service = DefaultValidationService::new();
        // "id" is required but missing: validation fails, payload passes
        // through unchanged.
        let response = normalize_reply(
            Reply::plain(json!({"name": "x"})),
            Some(&schema_ref(true)),
            &service,
            None,
            &mut ctx(),
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response), json!({"name": "x"}));
    }

    #[test]
    fn test_validation_failure_invokes_route_callback() {
        let service = DefaultValidationService::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_cb = Arc::clone(&hits);

        let mut schema_ref = schema_ref(true);
        schema_ref.on_error = Some(Arc::new(move |errors| {
            assert!(!errors.is_empty());
            hits_in_cb.fetch_add(1, Ordering::SeqCst);
        }));

        let _ = normalize_reply(
            Reply::plain(json!({"name": "x"})),
            Some(&schema_ref),
            &service,
            None,
            &mut ctx(),
        )
        .unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_server_handler_takes_over() {
        let service = DefaultValidationService::new();
        let handler: ValidationErrorHandlerRef = Arc::new(|errors, _ctx| {
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({"response_errors": errors.len()}),
            )
        });

        let response = normalize_reply(
            Reply::plain(json!({"name": "x"})),
            Some(&schema_ref(true)),
            &service,
            Some(&handler),
            &mut ctx(),
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(&response)["response_errors"], 1);
    }

    #[test]
    fn test_transform_only_never_validates() {
        let service = DefaultValidationService::new();
        // Invalid under the schema, but validate=false only projects.
        let response = normalize_reply(
            Reply::plain(json!({"id": "wrong-type", "junk": 1})),
            Some(&schema_ref(false)),
            &service,
            None,
            &mut ctx(),
        )
        .unwrap();

        assert_eq!(body(&response), json!({"id": "wrong-type"}));
    }

    #[test]
    fn test_explicit_validator_options_respected() {
        let service = DefaultValidationService::new();
        let mut schema_ref = schema_ref(true);
        schema_ref.validator_options = Some(ValidationOptions::permissive());

        // Without whitelist the extra field survives.
        let response = normalize_reply(
            Reply::plain(json!({"id": 1, "extra": true})),
            Some(&schema_ref),
            &service,
            None,
            &mut ctx(),
        )
        .unwrap();

        assert_eq!(body(&response)["extra"], true);
    }
}
