//! # Structured Logging
//!
//! Subscriber setup and span macros built on the tracing ecosystem.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true).with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| Error::internal(format!("Failed to initialize tracing: {}", e)))
}

/// Create a tracing span for a GraphQL backend operation.
///
/// ```rust,ignore
/// let span = graphql_span!("insert_credentials", tenant_id = %tenant_id);
/// ```
#[macro_export]
macro_rules! graphql_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "graphql_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "graphql_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Log configuration at startup
pub fn log_config_info(config: &Config) {
    tracing::info!(
        api_address = %config.api.socket_address(),
        tenant_header = %config.api.tenant_header,
        graphql_endpoint = %config.graphql.endpoint,
        graphql_admin_secret = config.graphql.admin_secret.is_some(),
        json_logging = config.observability.json_logging,
        "Configuration API settings"
    );
}
