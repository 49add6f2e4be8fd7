//! # Trellis Test
//!
//! In-memory request dispatch for testing trellis applications: build
//! requests against an [`App`](trellis_pipeline::App) without a server or a
//! port, and assert on the JSON responses.

#![doc(html_root_url = "https://docs.rs/trellis-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod response;

pub use client::{TestClient, TestRequestBuilder};
pub use response::TestResponse;
