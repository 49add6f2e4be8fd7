//! # Trellis Auth
//!
//! Authentication for the trellis controller layer.
//!
//! Strategies are capability objects implementing [`AuthenticationStrategy`]
//! and are registered by name in an [`AuthRegistry`]. When a controller or
//! route declares an authentication requirement, the router builder resolves
//! the named strategy from the registry (failing at startup if it is absent)
//! and installs an [`AuthenticationMiddleware`] bound to the required roles.
//!
//! The bundled [`JwtStrategy`] signs and verifies HS256 tokens.

#![doc(html_root_url = "https://docs.rs/trellis-auth/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod jwt;
mod middleware;
mod registry;
mod strategy;

pub use jwt::JwtStrategy;
pub use middleware::{AuthErrorHandlerRef, AuthenticationErrorStage, AuthenticationMiddleware};
pub use registry::{AuthRegistry, AuthRegistryBuilder};
pub use strategy::{AuthenticationStrategy, StrategyRef};
