//! # REST API Components
//!
//! axum router, handlers and the YAML codec for the credential and exporter
//! endpoints, plus the mapping from crate errors to HTTP responses.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod tenant;
pub mod yaml;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
