//! Credential repository
//!
//! Tenant-scoped CRUD over the `credential` table. Reads never return the
//! secret value.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, Instrument};

use crate::domain::{
    CredentialId, CredentialInfo, CredentialRecord, CredentialUpdate, NewCredential, TenantId,
};
use crate::errors::{Error, Result};
use crate::graphql::{execute_as, queries, GraphqlExecutor};
use crate::graphql_span;

impl From<queries::CredentialRow> for CredentialInfo {
    fn from(row: queries::CredentialRow) -> Self {
        CredentialInfo {
            id: CredentialId::from_string(row.id),
            name: row.name,
            credential_type: row.credential_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// Repository trait

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// List all credentials of a tenant
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<CredentialInfo>>;

    /// Get one credential by name
    async fn get_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<CredentialInfo>>;

    /// Insert credentials in a single backend call
    async fn insert_batch(&self, tenant_id: &TenantId, credentials: &[NewCredential]) -> Result<()>;

    /// Update the value of an existing credential
    async fn update(&self, tenant_id: &TenantId, update: &CredentialUpdate) -> Result<()>;

    /// Delete by name, returning the deleted ID if anything was deleted
    async fn delete_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<CredentialId>>;

    /// Existing credentials keyed by name, used to choose insert or update
    async fn prior_state(&self, tenant_id: &TenantId) -> Result<HashMap<String, CredentialRecord>> {
        let credentials = self.list(tenant_id).await?;
        Ok(credentials
            .into_iter()
            .map(|info| {
                (info.name, CredentialRecord { id: info.id, credential_type: info.credential_type })
            })
            .collect())
    }
}

// GraphQL implementation

#[derive(Clone)]
pub struct GraphqlCredentialRepository {
    executor: Arc<dyn GraphqlExecutor>,
}

impl GraphqlCredentialRepository {
    pub fn new(executor: Arc<dyn GraphqlExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl CredentialRepository for GraphqlCredentialRepository {
    #[instrument(skip(self), fields(tenant_id = %tenant_id), name = "gql_list_credentials")]
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<CredentialInfo>> {
        let request = queries::get_credentials(tenant_id);
        let data: queries::CredentialsData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;
        Ok(data.credential.into_iter().map(CredentialInfo::from).collect())
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, credential = %name), name = "gql_get_credential")]
    async fn get_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<CredentialInfo>> {
        let request = queries::get_credential_by_name(tenant_id, name);
        let data: queries::CredentialsData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;

        let mut rows = data.credential;
        if rows.len() != 1 {
            return Ok(None);
        }
        Ok(rows.pop().map(CredentialInfo::from))
    }

    #[instrument(skip(self, credentials), fields(tenant_id = %tenant_id, count = credentials.len()), name = "gql_insert_credentials")]
    async fn insert_batch(&self, tenant_id: &TenantId, credentials: &[NewCredential]) -> Result<()> {
        let request = queries::create_credentials(tenant_id, credentials);
        let data: queries::InsertCredentialData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation(), count = credentials.len()))
            .await?;
        tracing::debug!(affected_rows = data.insert_credential.affected_rows, "Inserted credentials");
        Ok(())
    }

    #[instrument(skip(self, update), fields(tenant_id = %tenant_id, credential = %update.name), name = "gql_update_credential")]
    async fn update(&self, tenant_id: &TenantId, update: &CredentialUpdate) -> Result<()> {
        let request = queries::update_credential(tenant_id, update);
        let data: queries::UpdateCredentialData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;

        // The name was seen during validation, so a miss means it vanished mid-batch.
        if data.update_credential.affected_rows == 0 {
            return Err(Error::internal(format!("credential {} matched no rows", update.name)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, credential = %name), name = "gql_delete_credential")]
    async fn delete_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<CredentialId>> {
        let request = queries::delete_credential(tenant_id, name);
        let data: queries::DeleteCredentialData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;

        Ok(data
            .delete_credential
            .returning
            .into_iter()
            .next()
            .map(|row| CredentialId::from_string(row.id)))
    }
}
