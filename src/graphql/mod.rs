//! # GraphQL Transport
//!
//! Thin execution layer over the GraphQL backend (Hasura). Repositories build
//! requests with [`queries`] and run them through a [`GraphqlExecutor`], which
//! is shared across requests and holds no request-scoped state.

pub mod queries;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::GraphqlConfig;
use crate::errors::{Error, Result};

/// Header carrying the backend admin secret
pub const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// A GraphQL query or mutation with its variables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub variables: serde_json::Value,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'static str>,
}

impl GraphqlRequest {
    pub fn new(operation_name: &'static str, query: &'static str, variables: serde_json::Value) -> Self {
        Self { query, variables, operation_name: Some(operation_name) }
    }

    /// Operation name for logs and spans
    pub fn operation(&self) -> &'static str {
        self.operation_name.unwrap_or("anonymous")
    }
}

/// Standard GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorMessage {
    message: String,
}

/// Executes GraphQL requests against the backend
#[async_trait]
pub trait GraphqlExecutor: Send + Sync {
    /// Run a request and return its `data` payload
    async fn execute(&self, request: &GraphqlRequest) -> Result<serde_json::Value>;
}

/// Run a request and decode its `data` payload into `T`.
pub async fn execute_as<T: DeserializeOwned>(
    executor: &dyn GraphqlExecutor,
    request: &GraphqlRequest,
) -> Result<T> {
    let data = executor.execute(request).await?;
    serde_json::from_value(data).map_err(|e| {
        Error::graphql(format!("Unexpected {} response shape: {}", request.operation(), e))
    })
}

/// reqwest-backed executor posting JSON to the GraphQL endpoint
#[derive(Clone)]
pub struct GraphqlClient {
    client: Client,
    endpoint: Url,
    admin_secret: Option<String>,
}

impl GraphqlClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &GraphqlConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            admin_secret: config.admin_secret.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl std::fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[async_trait]
impl GraphqlExecutor for GraphqlClient {
    async fn execute(&self, request: &GraphqlRequest) -> Result<serde_json::Value> {
        debug!(operation = request.operation(), endpoint = %self.endpoint, "Executing GraphQL request");

        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(secret) = &self.admin_secret {
            builder = builder.header(ADMIN_SECRET_HEADER, secret);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(operation = request.operation(), error = %e, "GraphQL request failed");
            Error::transport(format!("{} request failed: {}", request.operation(), e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(operation = request.operation(), %status, "GraphQL backend returned error status");
            return Err(Error::transport(format!(
                "{} returned HTTP {}: {}",
                request.operation(),
                status,
                body
            )));
        }

        let envelope: GraphqlResponse = response.json().await.map_err(|e| {
            Error::transport(format!("Invalid {} response body: {}", request.operation(), e))
        })?;

        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            warn!(operation = request.operation(), errors = ?messages, "GraphQL request returned errors");
            return Err(Error::graphql(messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| Error::graphql(format!("{} response contained no data", request.operation())))
    }
}
