//! In-memory storage backend
//!
//! Implements every repository trait over a shared map with the same
//! constraints the GraphQL backend enforces: unique `(tenant, name)` pairs,
//! atomic batch inserts and credential references that must exist in the
//! same tenant. Used by tests and local development.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{
    CredentialId, CredentialInfo, CredentialUpdate, ExporterDetail, ExporterId, ExporterRecord,
    ExporterUpdate, NewCredential, NewExporter, TenantId,
};
use crate::errors::{Error, Result};
use crate::storage::repositories::{CredentialRepository, ExporterRepository, TenantRepository};

#[derive(Debug, Clone)]
struct StoredCredential {
    id: CredentialId,
    credential_type: String,
    value_json: String,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Clone)]
struct StoredExporter {
    id: ExporterId,
    exporter_type: String,
    credential_id: Option<CredentialId>,
    config_json: String,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    tenants: HashMap<String, TenantId>,
    credentials: HashMap<TenantId, BTreeMap<String, StoredCredential>>,
    exporters: HashMap<TenantId, BTreeMap<String, StoredExporter>>,
    #[cfg(test)]
    failing_updates: HashSet<String>,
}

impl MemoryState {
    fn credential_name(&self, tenant_id: &TenantId, id: &CredentialId) -> Option<String> {
        self.credentials
            .get(tenant_id)?
            .iter()
            .find(|(_, stored)| &stored.id == id)
            .map(|(name, _)| name.clone())
    }

    fn exporter_detail(&self, tenant_id: &TenantId, name: &str, stored: &StoredExporter) -> ExporterDetail {
        ExporterDetail {
            id: stored.id.clone(),
            name: name.to_string(),
            exporter_type: stored.exporter_type.clone(),
            credential_name: stored
                .credential_id
                .as_ref()
                .and_then(|id| self.credential_name(tenant_id, id)),
            config_json: stored.config_json.clone(),
            created_at: Some(stored.created_at.clone()),
            updated_at: Some(stored.updated_at.clone()),
        }
    }

    #[cfg(test)]
    fn check_failure(&self, name: &str) -> Result<()> {
        if self.failing_updates.contains(name) {
            return Err(Error::graphql(format!("update of {} rejected by backend", name)));
        }
        Ok(())
    }
}

/// Shared in-memory store; clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tenant and return its generated ID
    pub async fn add_tenant(&self, name: &str) -> TenantId {
        let mut state = self.state.write().await;
        state.tenants.entry(name.to_string()).or_insert_with(TenantId::new).clone()
    }

    /// Stored JSON value of a credential
    pub async fn credential_value(&self, tenant_id: &TenantId, name: &str) -> Option<String> {
        let state = self.state.read().await;
        state.credentials.get(tenant_id)?.get(name).map(|stored| stored.value_json.clone())
    }

    /// Stored credential ID an exporter points at
    pub async fn exporter_credential_id(&self, tenant_id: &TenantId, name: &str) -> Option<CredentialId> {
        let state = self.state.read().await;
        state.exporters.get(tenant_id)?.get(name)?.credential_id.clone()
    }

    /// Make every later update of `name` fail with a backend error
    #[cfg(test)]
    pub async fn fail_updates_for(&self, name: &str) {
        self.state.write().await.failing_updates.insert(name.to_string());
    }
}

#[async_trait]
impl TenantRepository for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<TenantId>> {
        Ok(self.state.read().await.tenants.get(name).cloned())
    }
}

#[async_trait]
impl CredentialRepository for InMemoryStore {
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<CredentialInfo>> {
        let state = self.state.read().await;
        Ok(state
            .credentials
            .get(tenant_id)
            .map(|credentials| {
                credentials
                    .iter()
                    .map(|(name, stored)| CredentialInfo {
                        id: stored.id.clone(),
                        name: name.clone(),
                        credential_type: stored.credential_type.clone(),
                        created_at: Some(stored.created_at.clone()),
                        updated_at: Some(stored.updated_at.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<CredentialInfo>> {
        let state = self.state.read().await;
        Ok(state.credentials.get(tenant_id).and_then(|credentials| credentials.get(name)).map(
            |stored| CredentialInfo {
                id: stored.id.clone(),
                name: name.to_string(),
                credential_type: stored.credential_type.clone(),
                created_at: Some(stored.created_at.clone()),
                updated_at: Some(stored.updated_at.clone()),
            },
        ))
    }

    async fn insert_batch(&self, tenant_id: &TenantId, credentials: &[NewCredential]) -> Result<()> {
        let mut state = self.state.write().await;
        let existing = state.credentials.entry(tenant_id.clone()).or_default();

        let mut seen = HashSet::new();
        for credential in credentials {
            if existing.contains_key(&credential.name) || !seen.insert(credential.name.as_str()) {
                return Err(Error::graphql(format!(
                    "Uniqueness violation: credential {} already exists",
                    credential.name
                )));
            }
        }

        for credential in credentials {
            existing.insert(
                credential.name.clone(),
                StoredCredential {
                    id: credential.id.clone(),
                    credential_type: credential.credential_type.clone(),
                    value_json: credential.value_json.clone(),
                    created_at: credential.created_at.clone(),
                    updated_at: credential.updated_at.clone(),
                },
            );
        }
        Ok(())
    }

    async fn update(&self, tenant_id: &TenantId, update: &CredentialUpdate) -> Result<()> {
        let mut state = self.state.write().await;
        #[cfg(test)]
        state.check_failure(&update.name)?;

        let stored = state
            .credentials
            .get_mut(tenant_id)
            .and_then(|credentials| credentials.values_mut().find(|stored| stored.id == update.id))
            .ok_or_else(|| Error::internal(format!("credential {} matched no rows", update.name)))?;
        stored.value_json = update.value_json.clone();
        stored.updated_at = update.updated_at.clone();
        Ok(())
    }

    async fn delete_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<CredentialId>> {
        let mut state = self.state.write().await;
        let Some(id) = state
            .credentials
            .get(tenant_id)
            .and_then(|credentials| credentials.get(name))
            .map(|stored| stored.id.clone())
        else {
            return Ok(None);
        };

        let referenced = state
            .exporters
            .get(tenant_id)
            .is_some_and(|exporters| exporters.values().any(|e| e.credential_id.as_ref() == Some(&id)));
        if referenced {
            return Err(Error::graphql(format!(
                "Foreign key violation: credential {} is referenced by an exporter",
                name
            )));
        }

        if let Some(credentials) = state.credentials.get_mut(tenant_id) {
            credentials.remove(name);
        }
        Ok(Some(id))
    }
}

#[async_trait]
impl ExporterRepository for InMemoryStore {
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<ExporterDetail>> {
        let state = self.state.read().await;
        Ok(state
            .exporters
            .get(tenant_id)
            .map(|exporters| {
                exporters
                    .iter()
                    .map(|(name, stored)| state.exporter_detail(tenant_id, name, stored))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<ExporterDetail>> {
        let state = self.state.read().await;
        Ok(state
            .exporters
            .get(tenant_id)
            .and_then(|exporters| exporters.get(name))
            .map(|stored| state.exporter_detail(tenant_id, name, stored)))
    }

    async fn prior_state(&self, tenant_id: &TenantId) -> Result<HashMap<String, ExporterRecord>> {
        let state = self.state.read().await;
        Ok(state
            .exporters
            .get(tenant_id)
            .map(|exporters| {
                exporters
                    .iter()
                    .map(|(name, stored)| {
                        let record = ExporterRecord {
                            id: stored.id.clone(),
                            exporter_type: stored.exporter_type.clone(),
                        };
                        (name.clone(), record)
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_batch(&self, tenant_id: &TenantId, exporters: &[NewExporter]) -> Result<()> {
        let mut state = self.state.write().await;

        let mut seen = HashSet::new();
        for exporter in exporters {
            let exists = state
                .exporters
                .get(tenant_id)
                .is_some_and(|existing| existing.contains_key(&exporter.name));
            if exists || !seen.insert(exporter.name.as_str()) {
                return Err(Error::graphql(format!(
                    "Uniqueness violation: exporter {} already exists",
                    exporter.name
                )));
            }
            if let Some(credential_id) = &exporter.credential_id {
                if state.credential_name(tenant_id, credential_id).is_none() {
                    return Err(Error::graphql(format!(
                        "Foreign key violation: credential {} does not exist",
                        credential_id
                    )));
                }
            }
        }

        let existing = state.exporters.entry(tenant_id.clone()).or_default();
        for exporter in exporters {
            existing.insert(
                exporter.name.clone(),
                StoredExporter {
                    id: exporter.id.clone(),
                    exporter_type: exporter.exporter_type.clone(),
                    credential_id: exporter.credential_id.clone(),
                    config_json: exporter.config_json.clone(),
                    created_at: exporter.created_at.clone(),
                    updated_at: exporter.updated_at.clone(),
                },
            );
        }
        Ok(())
    }

    async fn update(&self, tenant_id: &TenantId, update: &ExporterUpdate) -> Result<()> {
        let mut state = self.state.write().await;
        #[cfg(test)]
        state.check_failure(&update.name)?;

        if let Some(credential_id) = &update.credential_id {
            if state.credential_name(tenant_id, credential_id).is_none() {
                return Err(Error::graphql(format!(
                    "Foreign key violation: credential {} does not exist",
                    credential_id
                )));
            }
        }

        let stored = state
            .exporters
            .get_mut(tenant_id)
            .and_then(|exporters| exporters.values_mut().find(|stored| stored.id == update.id))
            .ok_or_else(|| Error::internal(format!("exporter {} matched no rows", update.name)))?;
        stored.credential_id = update.credential_id.clone();
        stored.config_json = update.config_json.clone();
        stored.updated_at = update.updated_at.clone();
        Ok(())
    }

    async fn delete_by_name(&self, tenant_id: &TenantId, name: &str) -> Result<Option<ExporterId>> {
        let mut state = self.state.write().await;
        Ok(state
            .exporters
            .get_mut(tenant_id)
            .and_then(|exporters| exporters.remove(name))
            .map(|stored| stored.id))
    }
}
