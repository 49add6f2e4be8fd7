//! # Trellis Pipeline
//!
//! Middleware pipeline and router objects for the trellis controller layer.
//!
//! This crate provides the request-time machinery that the router builder
//! assembles descriptors into:
//!
//! - [`Middleware`] / [`Next`] - ordered request stages with an error channel
//! - [`ErrorStage`] - handle-or-pass error middleware
//! - [`Router`] - per-controller route table with stage and error chains
//! - [`HostApp`] / [`App`] - the minimal registration contract consumed from
//!   the host framework, plus a bundled in-memory host for tests and
//!   embedding
//!
//! Stages within one request run strictly in the assembled order; a stage
//! either continues to the next, short-circuits with a response, or diverts
//! to the error chain.

#![doc(html_root_url = "https://docs.rs/trellis-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod error_stage;
mod middleware;
mod router;

pub use app::{App, HostApp};
pub use error_stage::{run_error_chain, ErrorStage, ErrorStageRef, FnErrorStage};
pub use middleware::{Endpoint, EndpointRef, FnMiddleware, Middleware, MiddlewareRef, Next};
pub use router::{RouteMethod, Router};
