//! Credential endpoints. Handlers are generic over where the tenant name
//! comes from so path- and header-scoped routes share one implementation.

use axum::extract::State;
use bytes::Bytes;
use tracing::{debug, field, instrument};

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::api::tenant::{EntityName, TenantScope};
use crate::api::yaml::{decode_documents, DeletedEntity, Yaml};
use crate::domain::{CredentialEntry, CredentialInfo};
use crate::services::EntityKind;

#[instrument(skip(state, scope), fields(tenant = field::Empty))]
pub async fn list_credentials_handler<S: TenantScope>(
    State(state): State<ApiState>,
    scope: S,
) -> Result<Yaml<Vec<CredentialInfo>>, ApiError> {
    let tenant = scope.into_name();
    tracing::Span::current().record("tenant", tenant.as_str());

    let tenant_id = state.tenants.resolve(&tenant).await?;
    let credentials = state.credentials.list(&tenant_id).await?;
    Ok(Yaml(credentials))
}

#[instrument(skip(state, scope, body), fields(tenant = field::Empty, body_bytes = body.len()))]
pub async fn write_credentials_handler<S: TenantScope>(
    State(state): State<ApiState>,
    scope: S,
    body: Bytes,
) -> Result<(), ApiError> {
    let tenant = scope.into_name();
    tracing::Span::current().record("tenant", tenant.as_str());

    let tenant_id = state.tenants.resolve(&tenant).await?;
    let entries: Vec<CredentialEntry> = decode_documents(EntityKind::Credential, &body)?;
    let summary = state.credentials.write_batch(&tenant_id, entries).await?;
    debug!(inserted = summary.inserted, updated = summary.updated, "Wrote credentials");
    Ok(())
}

#[instrument(skip(state, scope), fields(tenant = field::Empty, credential = %name))]
pub async fn get_credential_handler<S: TenantScope>(
    State(state): State<ApiState>,
    scope: S,
    EntityName(name): EntityName,
) -> Result<Yaml<CredentialInfo>, ApiError> {
    let tenant = scope.into_name();
    tracing::Span::current().record("tenant", tenant.as_str());

    let tenant_id = state.tenants.resolve(&tenant).await?;
    let credential = state.credentials.get(&tenant_id, &name).await?;
    Ok(Yaml(credential))
}

#[instrument(skip(state, scope), fields(tenant = field::Empty, credential = %name))]
pub async fn delete_credential_handler<S: TenantScope>(
    State(state): State<ApiState>,
    scope: S,
    EntityName(name): EntityName,
) -> Result<Yaml<DeletedEntity>, ApiError> {
    let tenant = scope.into_name();
    tracing::Span::current().record("tenant", tenant.as_str());

    let tenant_id = state.tenants.resolve(&tenant).await?;
    let id = state.credentials.delete(&tenant_id, &name).await?;
    Ok(Yaml(DeletedEntity { id: id.into_string() }))
}
