//! # tenant-config-api
//!
//! HTTP API for tenant-scoped configuration entities, credentials and
//! exporters, stored in a GraphQL backend.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handler → Tenant resolver → Credential/Exporter service → Repository → GraphQL
//! ```
//!
//! Request and response bodies are YAML. Writes accept a stream of documents,
//! validate all of them, then insert new names in one backend call and update
//! existing names one call each.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod graphql;
pub mod observability;
pub mod services;
pub mod storage;
pub mod validation;

pub use config::Config;
pub use errors::{Error, Result};
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
