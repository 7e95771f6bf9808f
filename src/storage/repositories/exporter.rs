//! Exporter repository
//!
//! Tenant-scoped CRUD over the `exporter` table. Exporters reference
//! credentials by ID; reads resolve the credential back to its name.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, Instrument};

use crate::domain::{
    ExporterDetail, ExporterId, ExporterRecord, ExporterUpdate, NewExporter, TenantId,
};
use crate::errors::{Error, Result};
use crate::graphql::{execute_as, queries, GraphqlExecutor};
use crate::graphql_span;

impl From<queries::ExporterRow> for ExporterDetail {
    fn from(row: queries::ExporterRow) -> Self {
        ExporterDetail {
            id: ExporterId::from_string(row.id),
            name: row.name,
            exporter_type: row.exporter_type,
            credential_name: row.credential.map(|credential| credential.name),
            config_json: row.config.unwrap_or_else(|| "{}".to_string()),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// Repository trait

#[async_trait]
pub trait ExporterRepository: Send + Sync {
    /// List all exporters of a tenant
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<ExporterDetail>>;

    /// Get one exporter by name
    async fn get_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<ExporterDetail>>;

    /// Existing exporters keyed by name, used to choose insert or update
    async fn prior_state(&self, tenant_id: &TenantId) -> Result<HashMap<String, ExporterRecord>>;

    /// Insert exporters in a single backend call
    async fn insert_batch(&self, tenant_id: &TenantId, exporters: &[NewExporter]) -> Result<()>;

    /// Update credential binding and config of an existing exporter
    async fn update(&self, tenant_id: &TenantId, update: &ExporterUpdate) -> Result<()>;

    /// Delete by name, returning the deleted ID if anything was deleted
    async fn delete_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<ExporterId>>;
}

// GraphQL implementation

#[derive(Clone)]
pub struct GraphqlExporterRepository {
    executor: Arc<dyn GraphqlExecutor>,
}

impl GraphqlExporterRepository {
    pub fn new(executor: Arc<dyn GraphqlExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ExporterRepository for GraphqlExporterRepository {
    #[instrument(skip(self), fields(tenant_id = %tenant_id), name = "gql_list_exporters")]
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<ExporterDetail>> {
        let request = queries::get_exporters(tenant_id);
        let data: queries::ExportersData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;
        Ok(data.exporter.into_iter().map(ExporterDetail::from).collect())
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, exporter = %name), name = "gql_get_exporter")]
    async fn get_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<ExporterDetail>> {
        let request = queries::get_exporter_by_name(tenant_id, name);
        let data: queries::ExportersData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;

        let mut rows = data.exporter;
        if rows.len() != 1 {
            return Ok(None);
        }
        Ok(rows.pop().map(ExporterDetail::from))
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id), name = "gql_exporter_prior_state")]
    async fn prior_state(&self, tenant_id: &TenantId) -> Result<HashMap<String, ExporterRecord>> {
        let request = queries::get_exporter_types(tenant_id);
        let data: queries::ExporterTypesData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;

        Ok(data
            .exporter
            .into_iter()
            .map(|row| {
                let record = ExporterRecord {
                    id: ExporterId::from_string(row.id),
                    exporter_type: row.exporter_type,
                };
                (row.name, record)
            })
            .collect())
    }

    #[instrument(skip(self, exporters), fields(tenant_id = %tenant_id, count = exporters.len()), name = "gql_insert_exporters")]
    async fn insert_batch(&self, tenant_id: &TenantId, exporters: &[NewExporter]) -> Result<()> {
        let request = queries::create_exporters(tenant_id, exporters);
        let data: queries::InsertExporterData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation(), count = exporters.len()))
            .await?;
        tracing::debug!(affected_rows = data.insert_exporter.affected_rows, "Inserted exporters");
        Ok(())
    }

    #[instrument(skip(self, update), fields(tenant_id = %tenant_id, exporter = %update.name), name = "gql_update_exporter")]
    async fn update(&self, tenant_id: &TenantId, update: &ExporterUpdate) -> Result<()> {
        let request = queries::update_exporter(tenant_id, update);
        let data: queries::UpdateExporterData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;

        // The name was seen during validation, so a miss means it vanished mid-batch.
        if data.update_exporter.affected_rows == 0 {
            return Err(Error::internal(format!("exporter {} matched no rows", update.name)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, exporter = %name), name = "gql_delete_exporter")]
    async fn delete_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<ExporterId>> {
        let request = queries::delete_exporter(tenant_id, name);
        let data: queries::DeleteExporterData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;

        Ok(data
            .delete_exporter
            .returning
            .into_iter()
            .next()
            .map(|row| ExporterId::from_string(row.id)))
    }
}
