//! # Configuration Settings
//!
//! Defines the configuration structures for the configuration API server.

use serde::{Deserialize, Serialize};
use url::Url;
use validator::{Validate, ValidationError};

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Bind address cannot be empty"))]
    pub bind_address: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Header carrying the tenant name for header-scoped routes
    #[validate(custom(function = "validate_header_name"))]
    pub tenant_header: String,

    /// Maximum request body size in bytes
    #[validate(range(min = 1024, message = "Max body size must be at least 1KB"))]
    pub max_body_bytes: usize,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8989,
            tenant_header: "X-Scope-OrgID".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl ApiServerConfig {
    /// Get the socket address string to bind
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn validate_header_name(value: &str) -> Result<(), ValidationError> {
    http::HeaderName::from_bytes(value.as_bytes()).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("header_name");
        err.message = Some("Tenant header must be a valid HTTP header name".into());
        err
    })
}

/// Endpoint used when GRAPHQL_ENDPOINT is unset
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://localhost:8080/v1/graphql";

/// GraphQL backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlConfig {
    /// GraphQL endpoint URL
    pub endpoint: Url,

    /// Admin secret sent with every request, if configured
    #[serde(skip_serializing)]
    pub admin_secret: Option<String>,
}

impl Default for GraphqlConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_GRAPHQL_ENDPOINT)
                .expect("DEFAULT_GRAPHQL_ENDPOINT should be a valid URL"),
            admin_secret: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_config_is_valid() {
        let config = ApiServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_address(), "0.0.0.0:8989");
    }

    #[test]
    fn test_invalid_tenant_header_rejected() {
        let config =
            ApiServerConfig { tenant_header: "not a header".to_string(), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_small_body_limit_rejected() {
        let config = ApiServerConfig { max_body_bytes: 10, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_admin_secret_not_serialized() {
        let config = GraphqlConfig {
            admin_secret: Some("hunter2".to_string()),
            ..Default::default()
        };
        let rendered = serde_json::to_string(&config).unwrap();
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_empty_log_level_rejected() {
        let config = ObservabilityConfig { log_level: String::new(), json_logging: false };
        assert!(config.validate().is_err());
    }
}
