//! Extractors for the tenant a request is scoped to and the entity it names.
//!
//! Tenant-path routes carry the tenant as `{tenant}`; header-scoped routes
//! take it from a header set by an upstream proxy.

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use super::error::ApiError;
use super::routes::ApiState;

/// Where a handler finds its tenant name
pub trait TenantScope: FromRequestParts<ApiState, Rejection = ApiError> + Send {
    fn into_name(self) -> String;
}

async fn path_param(parts: &mut Parts, state: &ApiState, key: &str) -> Result<String, ApiError> {
    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?;

    params
        .get(key)
        .cloned()
        .ok_or_else(|| ApiError::bad_request(format!("Missing {} in request path", key)))
}

/// Tenant from the `{tenant}` path segment
#[derive(Debug, Clone)]
pub struct PathTenant(pub String);

impl FromRequestParts<ApiState> for PathTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        path_param(parts, state, "tenant").await.map(PathTenant)
    }
}

impl TenantScope for PathTenant {
    fn into_name(self) -> String {
        self.0
    }
}

/// Tenant from the configured tenant header
#[derive(Debug, Clone)]
pub struct HeaderTenant(pub String);

impl FromRequestParts<ApiState> for HeaderTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let header_name = &state.tenant_header;
        let value = parts
            .headers
            .get(header_name)
            .ok_or_else(|| ApiError::bad_request(format!("Missing {} header", header_name)))?;

        let tenant = value
            .to_str()
            .map_err(|_| ApiError::bad_request(format!("Invalid {} header", header_name)))?
            .trim();
        if tenant.is_empty() {
            return Err(ApiError::bad_request(format!("Missing {} header", header_name)));
        }
        Ok(HeaderTenant(tenant.to_string()))
    }
}

impl TenantScope for HeaderTenant {
    fn into_name(self) -> String {
        self.0
    }
}

/// Entity name from the `{name}` path segment
#[derive(Debug, Clone)]
pub struct EntityName(pub String);

impl FromRequestParts<ApiState> for EntityName {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        path_param(parts, state, "name").await.map(EntityName)
    }
}
