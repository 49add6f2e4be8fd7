//! # Trellis
//!
//! **Declarative controller routing, validation and authentication atop a
//! host web framework.**
//!
//! Controllers declare routes, middleware, authentication requirements and
//! request/response schemas through an annotation API; the router builder
//! compiles that metadata into per-route request pipelines and registers
//! them with the host through a minimal mounting contract.
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use http::Method;
//! use serde_json::json;
//! use trellis::{Annotations, Controller, Invocation, Reply, Server};
//! use trellis_pipeline::App;
//!
//! struct ApiController;
//!
//! impl Controller for ApiController {
//!     fn annotate(self: Arc<Self>, a: &mut Annotations<'_>) {
//!         a.controller("/api");
//!         a.route("index", Method::GET, "/", |_inv: Invocation| async move {
//!             Ok(Reply::plain(json!({"message": "welcome", "method": "get"})))
//!         });
//!     }
//! }
//!
//! let mut app = App::new();
//! let mut server = Server::new();
//! server.add_controllers(&mut app, vec![Arc::new(ApiController)]).unwrap();
//! ```
//!
//! ## Pipeline order
//!
//! Every route's pipeline is assembled the same way:
//!
//! ```text
//! controller auth → controller middleware → controller validation
//!   → route auth → route middleware → route validation
//!   → argument resolution → handler → response shaping
//! ```
//!
//! Failures divert to the error chain: route error middleware, the
//! validation-error handler, controller error middleware, then the
//! app-level HTTP/authentication renderers, and finally the host's default
//! channel.

#![doc(html_root_url = "https://docs.rs/trellis/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod endpoint;
mod errors;
mod resolve;
mod respond;
mod server;

pub use builder::{build_router, ErrorHandlers, RouterRegistration};
pub use endpoint::RouteEndpoint;
pub use errors::{BuildError, HttpErrorHandlerRef, HttpErrorStage};
pub use resolve::resolve_arguments;
pub use respond::normalize_reply;
pub use server::Server;

// The annotation and descriptor surface.
pub use trellis_meta::{
    Annotations, AuthRequirement, Controller, ControllerDescriptor, ParamBindings, ParamSource,
    ResponseSchemaRef, RouteAnnotations, RouteDescriptor, SchemaRef,
};

// Core request/response vocabulary.
pub use trellis_core::{
    json_response, AuthError, Credentials, FieldError, HttpError, Invocation, PipelineError,
    Reply, Request, RequestContext, RequestId, Response, RouteHandler,
};

// Re-export the collaborating crates under short names.
pub use trellis_auth as auth;
pub use trellis_meta as meta;
pub use trellis_pipeline as pipeline;
pub use trellis_validate as validate;
