//! # Trellis Meta
//!
//! The declarative side of trellis: controllers describe themselves through
//! an annotation API, the annotations land in a [`MetadataStore`] keyed by
//! `(subject, member, attribute)`, and extraction turns the stored entries
//! into the typed descriptors the router builder consumes.
//!
//! The store is written only during controller registration — before any
//! request is served — and read thereafter, so no locking is involved.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use http::Method;
//! use serde_json::json;
//! use trellis_core::{Invocation, Reply};
//! use trellis_meta::{extract_route_descriptors, Annotations, Controller, MetadataStore};
//!
//! struct Greeter;
//!
//! impl Controller for Greeter {
//!     fn annotate(self: Arc<Self>, a: &mut Annotations<'_>) {
//!         a.controller("/greet");
//!         a.route("hello", Method::GET, "/", |_inv: Invocation| async move {
//!             Ok(Reply::plain(json!({"message": "hi"})))
//!         });
//!     }
//! }
//!
//! let mut store = MetadataStore::new();
//! let subject = store.register_subject("Greeter");
//! Arc::new(Greeter).annotate(&mut Annotations::new(&mut store, subject));
//!
//! let routes = extract_route_descriptors(&store, subject).unwrap();
//! assert_eq!(routes.len(), 1);
//! assert_eq!(routes[0].path, "/");
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-meta/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod annotate;
mod descriptor;
mod extract;
mod keys;
mod store;
mod value;

pub use annotate::{Annotations, Controller, RouteAnnotations};
pub use descriptor::{
    AuthRequirement, ControllerDescriptor, ParamBindings, ParamSource, ResponseErrorHandlerRef,
    ResponseSchemaRef, RouteDescriptor, SchemaRef,
};
pub use extract::{extract_controller_descriptor, extract_route_descriptors, MetadataError};
pub use keys::{AttributeKey, Member, CONTROLLER_TYPE_TAG};
pub use store::{MetadataStore, SubjectId};
pub use value::MetaValue;
