//! # Trellis Validate
//!
//! Schema validation for the trellis controller layer.
//!
//! Validation is reached through the narrow [`ValidationService`] contract so
//! concrete validation machinery stays pluggable. The bundled
//! [`DefaultValidationService`] works over the declarative [`Schema`] type:
//! request bodies are transformed (whitelist projection), validated, and on
//! success replace the raw body; failures become an ordered list of field
//! errors rendered as HTTP 400.

#![doc(html_root_url = "https://docs.rs/trellis-validate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod middleware;
mod options;
mod schema;
mod service;

pub use middleware::{RequestValidation, ValidationErrorStage};
pub use options::ValidationOptions;
pub use schema::Schema;
pub use service::{
    DefaultValidationService, ValidationErrorHandlerRef, ValidationService, ValidationServiceRef,
};
