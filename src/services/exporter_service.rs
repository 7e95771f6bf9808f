//! Exporter business logic
//!
//! Same batch-write shape as credentials, plus credential reference
//! resolution and the exporter/credential type pairing check.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::batch::{
    check_existing_id, effective_type, new_entity_id, parse_error, BatchNames, EntityKind,
    WriteSummary,
};
use crate::domain::{
    convert_exporter_config, timestamp_now, validate_exporter_types, CredentialInfo, ExporterEntry,
    ExporterId, ExporterInfo, ExporterUpdate, NewExporter, TenantId,
};
use crate::errors::{Error, Result};
use crate::storage::{CredentialRepository, ExporterRepository};
use crate::validation::validate_name;

const KIND: EntityKind = EntityKind::Exporter;

/// Service for managing exporter business logic
#[derive(Clone)]
pub struct ExporterService {
    exporters: Arc<dyn ExporterRepository>,
    credentials: Arc<dyn CredentialRepository>,
}

impl ExporterService {
    /// Create a new exporter service
    pub fn new(
        exporters: Arc<dyn ExporterRepository>,
        credentials: Arc<dyn CredentialRepository>,
    ) -> Self {
        Self { exporters, credentials }
    }

    /// List all exporters of a tenant
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn list(&self, tenant_id: &TenantId) -> Result<Vec<ExporterInfo>> {
        let exporters = self.exporters.list(tenant_id).await.map_err(|e| {
            warn!(error = %e, "Listing exporters failed");
            e.context("Listing exporters failed")
        })?;
        debug!(count = exporters.len(), "Listing exporters");
        Ok(exporters.into_iter().map(|detail| detail.into_info()).collect())
    }

    /// Get one exporter by name, with its config decoded
    #[instrument(skip(self), fields(tenant_id = %tenant_id, exporter = %name))]
    pub async fn get(&self, tenant_id: &TenantId, name: &str) -> Result<ExporterInfo> {
        self.exporters
            .get_by_name(tenant_id, name)
            .await
            .map_err(|e| {
                warn!(error = %e, "Getting exporter failed");
                e.context("Getting exporter failed")
            })?
            .map(|detail| detail.into_info())
            .ok_or_else(|| Error::not_found("Exporter", name))
    }

    /// Delete one exporter by name, returning its ID
    #[instrument(skip(self), fields(tenant_id = %tenant_id, exporter = %name))]
    pub async fn delete(&self, tenant_id: &TenantId, name: &str) -> Result<ExporterId> {
        let deleted = self.exporters.delete_by_name(tenant_id, name).await.map_err(|e| {
            warn!(error = %e, "Deleting exporter failed");
            e.context("Deleting exporter failed")
        })?;

        match deleted {
            Some(id) => {
                info!(exporter_id = %id, "Exporter deleted");
                Ok(id)
            }
            None => {
                debug!("Exporter not found");
                Err(Error::not_found("Exporter", name))
            }
        }
    }

    /// Write a batch of decoded exporter documents.
    ///
    /// Referenced credentials must exist in the same tenant and have the
    /// type the exporter requires. Updates applied before a failing update
    /// are kept.
    #[instrument(skip(self, entries), fields(tenant_id = %tenant_id, entries = entries.len()))]
    pub async fn write_batch(
        &self,
        tenant_id: &TenantId,
        entries: Vec<ExporterEntry>,
    ) -> Result<WriteSummary> {
        if entries.is_empty() {
            debug!("Writing exporters: No data provided");
            return Err(Error::validation("Missing exporter YAML data in request body"));
        }

        let existing = self.exporters.prior_state(tenant_id).await.map_err(|e| {
            warn!(error = %e, "Listing exporters failed");
            e.context("Listing exporters failed")
        })?;

        let now = timestamp_now();
        let mut names = BatchNames::new(KIND);
        let mut credentials: HashMap<String, CredentialInfo> = HashMap::new();
        let mut inserts = Vec::new();
        let mut updates = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            validate_name(&entry.name)?;
            names.claim(&entry.name)?;

            let prior = existing.get(&entry.name);
            let exporter_type = effective_type(
                KIND,
                &entry.name,
                entry.exporter_type.as_deref(),
                prior.map(|record| record.exporter_type.as_str()),
            )?;
            if exporter_type.is_empty() {
                return Err(Error::validation(format!(
                    "Invalid exporter input {}: missing exporter type",
                    entry.name
                )));
            }

            let config_json = convert_exporter_config(entry.config.as_ref())
                .map_err(|e| parse_error(KIND, index, e))?;

            let credential = match entry.credential.as_deref().filter(|name| !name.is_empty()) {
                Some(credential_name) => Some(
                    self.referenced_credential(tenant_id, credential_name, &entry.name, &mut credentials)
                        .await?,
                ),
                None => None,
            };

            validate_exporter_types(
                &exporter_type,
                credential.as_ref().map(|credential| credential.credential_type.as_str()),
            )
            .map_err(|e| Error::validation(format!("Invalid exporter input {}: {}", entry.name, e)))?;

            let credential_id = credential.map(|credential| credential.id);
            match prior {
                Some(record) => {
                    check_existing_id(KIND, &entry.name, entry.id.as_deref(), record.id.as_str())?;
                    updates.push(ExporterUpdate {
                        id: record.id.clone(),
                        name: entry.name,
                        credential_id,
                        config_json,
                        updated_at: now.clone(),
                    });
                }
                None => {
                    let id = new_entity_id(KIND, &entry.name, entry.id.as_deref())?;
                    inserts.push(NewExporter {
                        id,
                        name: entry.name,
                        exporter_type,
                        credential_id,
                        config_json,
                        created_at: now.clone(),
                        updated_at: now.clone(),
                    });
                }
            }
        }

        debug!(inserts = inserts.len(), updates = updates.len(), "Writing exporters");

        if !inserts.is_empty() {
            self.exporters.insert_batch(tenant_id, &inserts).await.map_err(|e| {
                warn!(count = inserts.len(), error = %e, "Inserting exporters failed");
                e.context(format!("Creating {} exporters failed", inserts.len()))
            })?;
        }

        for (applied, update) in updates.iter().enumerate() {
            self.exporters.update(tenant_id, update).await.map_err(|e| {
                warn!(
                    exporter = %update.name,
                    applied_updates = applied,
                    error = %e,
                    "Updating exporter failed; earlier updates in this batch remain applied"
                );
                e.context(format!("Updating exporter {} failed", update.name))
            })?;
        }

        let summary = WriteSummary { inserted: inserts.len(), updated: updates.len() };
        info!(inserted = summary.inserted, updated = summary.updated, "Exporters written");
        Ok(summary)
    }

    /// Look up a credential named by an exporter, caching lookups for the batch.
    async fn referenced_credential(
        &self,
        tenant_id: &TenantId,
        credential_name: &str,
        exporter_name: &str,
        cache: &mut HashMap<String, CredentialInfo>,
    ) -> Result<CredentialInfo> {
        if let Some(credential) = cache.get(credential_name) {
            return Ok(credential.clone());
        }

        let credential = self
            .credentials
            .get_by_name(tenant_id, credential_name)
            .await
            .map_err(|e| {
                warn!(credential = %credential_name, exporter = %exporter_name, error = %e, "Reading referenced credential failed");
                e.context(format!(
                    "failed to read credential {} referenced in exporter {}",
                    credential_name, exporter_name
                ))
            })?
            .ok_or_else(|| {
                Error::validation(format!(
                    "missing credential {} referenced in exporter {}",
                    credential_name, exporter_name
                ))
            })?;

        cache.insert(credential_name.to_string(), credential.clone());
        Ok(credential)
    }
}
