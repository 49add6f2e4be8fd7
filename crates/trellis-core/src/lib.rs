//! # Trellis Core
//!
//! Core types and traits for the trellis controller layer.
//!
//! This crate provides the foundational types used throughout trellis:
//!
//! - [`RequestContext`] - Per-request state flowing through the pipeline
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Credentials`] - Verified caller credentials attached by authentication
//! - [`PipelineError`] - Standard error taxonomy
//! - [`Reply`] - Tagged handler result (plain payload or explicit status)
//! - [`RouteHandler`] - Core handler trait

#![doc(html_root_url = "https://docs.rs/trellis-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod credentials;
mod error;
mod handler;
mod params;
mod reply;
mod types;

pub use context::{RequestContext, RequestId};
pub use credentials::Credentials;
pub use error::{AuthError, FieldError, HttpError, PipelineError};
pub use handler::{BoxFuture, HandlerRef, Invocation, RouteHandler};
pub use params::Params;
pub use reply::Reply;
pub use types::{json_response, Request, Response};
