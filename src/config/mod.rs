//! # Configuration Management
//!
//! Process configuration for the configuration API, read from environment
//! variables with CLI overrides applied on top by the binary.

pub mod settings;

pub use settings::{ApiServerConfig, GraphqlConfig, ObservabilityConfig, DEFAULT_GRAPHQL_ENDPOINT};

use crate::errors::{Error, Result};
use url::Url;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api: ApiServerConfig,
    pub graphql: GraphqlConfig,
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = ApiServerConfig::default();

        let port = match std::env::var("CONFIG_API_PORT") {
            Ok(value) => value
                .parse()
                .map_err(|e| Error::config(format!("Invalid CONFIG_API_PORT '{}': {}", value, e)))?,
            Err(_) => defaults.port,
        };

        let max_body_bytes = match std::env::var("CONFIG_API_MAX_BODY_BYTES") {
            Ok(value) => value.parse().map_err(|e| {
                Error::config(format!("Invalid CONFIG_API_MAX_BODY_BYTES '{}': {}", value, e))
            })?,
            Err(_) => defaults.max_body_bytes,
        };

        let api = ApiServerConfig {
            bind_address: std::env::var("CONFIG_API_BIND_ADDRESS")
                .unwrap_or(defaults.bind_address),
            port,
            tenant_header: std::env::var("CONFIG_API_TENANT_HEADER")
                .unwrap_or(defaults.tenant_header),
            max_body_bytes,
        };

        let endpoint = std::env::var("GRAPHQL_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_GRAPHQL_ENDPOINT.to_string());
        let graphql = GraphqlConfig {
            endpoint: parse_endpoint(&endpoint)?,
            admin_secret: std::env::var("HASURA_GRAPHQL_ADMIN_SECRET")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        };

        let observability = ObservabilityConfig {
            log_level: std::env::var("CONFIG_API_LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string()),
            json_logging: std::env::var("CONFIG_API_JSON_LOGGING")
                .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false),
        };

        let config = Self { api, graphql, observability };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(&self.api).map_err(Error::from)?;
        Validate::validate(&self.observability).map_err(Error::from)?;

        if !matches!(self.graphql.endpoint.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "GraphQL endpoint must use http or https: {}",
                self.graphql.endpoint
            )));
        }

        Ok(())
    }
}

/// Parse a GraphQL endpoint URL
pub fn parse_endpoint(value: &str) -> Result<Url> {
    Url::parse(value.trim())
        .map_err(|e| Error::config(format!("Invalid GraphQL endpoint '{}': {}", value, e)))
}
