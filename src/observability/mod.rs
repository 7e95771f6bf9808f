//! # Observability Infrastructure
//!
//! Structured logging for the configuration API. Request spans come from
//! tower-http's `TraceLayer` in [`crate::api::routes`]; everything else logs
//! through `tracing`.

pub mod logging;

pub use logging::{init_tracing, log_config_info};
