//! Exporter endpoints.

use axum::extract::State;
use bytes::Bytes;
use tracing::{debug, field, instrument};

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::api::tenant::{EntityName, TenantScope};
use crate::api::yaml::{decode_documents, DeletedEntity, Yaml};
use crate::domain::{ExporterEntry, ExporterInfo};
use crate::services::EntityKind;

#[instrument(skip(state, scope), fields(tenant = field::Empty))]
pub async fn list_exporters_handler<S: TenantScope>(
    State(state): State<ApiState>,
    scope: S,
) -> Result<Yaml<Vec<ExporterInfo>>, ApiError> {
    let tenant = scope.into_name();
    tracing::Span::current().record("tenant", tenant.as_str());

    let tenant_id = state.tenants.resolve(&tenant).await?;
    let exporters = state.exporters.list(&tenant_id).await?;
    Ok(Yaml(exporters))
}

#[instrument(skip(state, scope, body), fields(tenant = field::Empty, body_bytes = body.len()))]
pub async fn write_exporters_handler<S: TenantScope>(
    State(state): State<ApiState>,
    scope: S,
    body: Bytes,
) -> Result<(), ApiError> {
    let tenant = scope.into_name();
    tracing::Span::current().record("tenant", tenant.as_str());

    let tenant_id = state.tenants.resolve(&tenant).await?;
    let entries: Vec<ExporterEntry> = decode_documents(EntityKind::Exporter, &body)?;
    let summary = state.exporters.write_batch(&tenant_id, entries).await?;
    debug!(inserted = summary.inserted, updated = summary.updated, "Wrote exporters");
    Ok(())
}

#[instrument(skip(state, scope), fields(tenant = field::Empty, exporter = %name))]
pub async fn get_exporter_handler<S: TenantScope>(
    State(state): State<ApiState>,
    scope: S,
    EntityName(name): EntityName,
) -> Result<Yaml<ExporterInfo>, ApiError> {
    let tenant = scope.into_name();
    tracing::Span::current().record("tenant", tenant.as_str());

    let tenant_id = state.tenants.resolve(&tenant).await?;
    let exporter = state.exporters.get(&tenant_id, &name).await?;
    Ok(Yaml(exporter))
}

#[instrument(skip(state, scope), fields(tenant = field::Empty, exporter = %name))]
pub async fn delete_exporter_handler<S: TenantScope>(
    State(state): State<ApiState>,
    scope: S,
    EntityName(name): EntityName,
) -> Result<Yaml<DeletedEntity>, ApiError> {
    let tenant = scope.into_name();
    tracing::Span::current().record("tenant", tenant.as_str());

    let tenant_id = state.tenants.resolve(&tenant).await?;
    let id = state.exporters.delete(&tenant_id, &name).await?;
    Ok(Yaml(DeletedEntity { id: id.into_string() }))
}
