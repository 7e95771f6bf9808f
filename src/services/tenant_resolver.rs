//! Tenant name to ID resolution, run at the start of every request.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::TenantId;
use crate::errors::{Error, Result};
use crate::storage::TenantRepository;

/// Resolves tenant names to backend IDs
#[derive(Clone)]
pub struct TenantResolver {
    repository: Arc<dyn TenantRepository>,
}

impl TenantResolver {
    pub fn new(repository: Arc<dyn TenantRepository>) -> Self {
        Self { repository }
    }

    /// Resolve a tenant name. No side effects.
    pub async fn resolve(&self, tenant_name: &str) -> Result<TenantId> {
        if tenant_name.is_empty() {
            return Err(Error::validation("Tenant name must not be empty"));
        }

        let tenant_id = self.repository.find_by_name(tenant_name).await.map_err(|e| {
            warn!(tenant = %tenant_name, error = %e, "Fetching tenant failed");
            e.context(format!("Fetching tenant {} failed", tenant_name))
        })?;

        match tenant_id {
            Some(id) => Ok(id),
            None => {
                debug!(tenant = %tenant_name, "Tenant not found");
                Err(Error::not_found("Tenant", tenant_name))
            }
        }
    }
}
