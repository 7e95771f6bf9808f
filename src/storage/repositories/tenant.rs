//! Tenant repository: name to ID lookups. Tenants are never mutated here.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{instrument, Instrument};

use crate::domain::TenantId;
use crate::errors::Result;
use crate::graphql::{execute_as, queries, GraphqlExecutor};
use crate::graphql_span;

// Repository trait

#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Find the tenant with exactly this name
    async fn find_by_name(&self, name: &str) -> Result<Option<TenantId>>;
}

// GraphQL implementation

#[derive(Clone)]
pub struct GraphqlTenantRepository {
    executor: Arc<dyn GraphqlExecutor>,
}

impl GraphqlTenantRepository {
    pub fn new(executor: Arc<dyn GraphqlExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl TenantRepository for GraphqlTenantRepository {
    #[instrument(skip(self), fields(tenant = %name), name = "gql_find_tenant_by_name")]
    async fn find_by_name(&self, name: &str) -> Result<Option<TenantId>> {
        let request = queries::get_tenant_by_name(name);
        let data: queries::TenantsData = execute_as(self.executor.as_ref(), &request)
            .instrument(graphql_span!(request.operation()))
            .await?;

        // Zero or several matches both count as not found.
        let mut tenants = data.tenant;
        if tenants.len() != 1 {
            return Ok(None);
        }
        Ok(tenants.pop().map(|row| TenantId::from_string(row.id)))
    }
}
