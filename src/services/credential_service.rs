//! Credential business logic
//!
//! Validate-then-insert-or-update over a tenant's credentials. A batch is
//! fully validated before anything is written; inserts then go out as one
//! backend call and updates one call each.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::batch::{
    check_existing_id, effective_type, new_entity_id, parse_error, BatchNames, EntityKind,
    WriteSummary,
};
use crate::domain::{
    convert_credential_value, timestamp_now, CredentialEntry, CredentialId, CredentialInfo,
    CredentialUpdate, NewCredential, TenantId,
};
use crate::errors::{Error, Result};
use crate::storage::CredentialRepository;
use crate::validation::validate_name;

const KIND: EntityKind = EntityKind::Credential;

/// Service for managing credential business logic
#[derive(Clone)]
pub struct CredentialService {
    repository: Arc<dyn CredentialRepository>,
}

impl CredentialService {
    /// Create a new credential service
    pub fn new(repository: Arc<dyn CredentialRepository>) -> Self {
        Self { repository }
    }

    /// List all credentials of a tenant, without values
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn list(&self, tenant_id: &TenantId) -> Result<Vec<CredentialInfo>> {
        let credentials = self.repository.list(tenant_id).await.map_err(|e| {
            warn!(error = %e, "Listing credentials failed");
            e.context("Listing credentials failed")
        })?;
        debug!(count = credentials.len(), "Listing credentials");
        Ok(credentials)
    }

    /// Get one credential by name
    #[instrument(skip(self), fields(tenant_id = %tenant_id, credential = %name))]
    pub async fn get(&self, tenant_id: &TenantId, name: &str) -> Result<CredentialInfo> {
        self.repository
            .get_by_name(tenant_id, name)
            .await
            .map_err(|e| {
                warn!(error = %e, "Getting credential failed");
                e.context("Getting credential failed")
            })?
            .ok_or_else(|| Error::not_found("Credential", name))
    }

    /// Delete one credential by name, returning its ID
    #[instrument(skip(self), fields(tenant_id = %tenant_id, credential = %name))]
    pub async fn delete(&self, tenant_id: &TenantId, name: &str) -> Result<CredentialId> {
        let deleted = self.repository.delete_by_name(tenant_id, name).await.map_err(|e| {
            warn!(error = %e, "Deleting credential failed");
            e.context("Deleting credential failed")
        })?;

        match deleted {
            Some(id) => {
                info!(credential_id = %id, "Credential deleted");
                Ok(id)
            }
            None => {
                debug!("Credential not found");
                Err(Error::not_found("Credential", name))
            }
        }
    }

    /// Write a batch of decoded credential documents.
    ///
    /// Names already stored for the tenant are updated in place; new names
    /// are inserted. Updates applied before a failing update are kept.
    #[instrument(skip(self, entries), fields(tenant_id = %tenant_id, entries = entries.len()))]
    pub async fn write_batch(
        &self,
        tenant_id: &TenantId,
        entries: Vec<CredentialEntry>,
    ) -> Result<WriteSummary> {
        if entries.is_empty() {
            debug!("Writing credentials: No data provided");
            return Err(Error::validation("Missing credential YAML data in request body"));
        }

        let existing = self.repository.prior_state(tenant_id).await.map_err(|e| {
            warn!(error = %e, "Listing credentials failed");
            e.context("Listing credentials failed")
        })?;

        let now = timestamp_now();
        let mut names = BatchNames::new(KIND);
        let mut inserts = Vec::new();
        let mut updates = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            validate_name(&entry.name)?;
            names.claim(&entry.name)?;

            let prior = existing.get(&entry.name);
            let credential_type = effective_type(
                KIND,
                &entry.name,
                entry.credential_type.as_deref(),
                prior.map(|record| record.credential_type.as_str()),
            )?;
            let value_json = convert_credential_value(&credential_type, entry.value.as_ref())
                .map_err(|e| parse_error(KIND, index, e))?;

            match prior {
                Some(record) => {
                    check_existing_id(KIND, &entry.name, entry.id.as_deref(), record.id.as_str())?;
                    updates.push(CredentialUpdate {
                        id: record.id.clone(),
                        name: entry.name,
                        value_json,
                        updated_at: now.clone(),
                    });
                }
                None => {
                    let id = new_entity_id(KIND, &entry.name, entry.id.as_deref())?;
                    inserts.push(NewCredential {
                        id,
                        name: entry.name,
                        credential_type,
                        value_json,
                        created_at: now.clone(),
                        updated_at: now.clone(),
                    });
                }
            }
        }

        debug!(inserts = inserts.len(), updates = updates.len(), "Writing credentials");

        if !inserts.is_empty() {
            self.repository.insert_batch(tenant_id, &inserts).await.map_err(|e| {
                warn!(count = inserts.len(), error = %e, "Inserting credentials failed");
                e.context(format!("Creating {} credentials failed", inserts.len()))
            })?;
        }

        for (applied, update) in updates.iter().enumerate() {
            self.repository.update(tenant_id, update).await.map_err(|e| {
                warn!(
                    credential = %update.name,
                    applied_updates = applied,
                    error = %e,
                    "Updating credential failed; earlier updates in this batch remain applied"
                );
                e.context(format!("Updating credential {} failed", update.name))
            })?;
        }

        let summary = WriteSummary { inserted: inserts.len(), updated: updates.len() };
        info!(inserted = summary.inserted, updated = summary.updated, "Credentials written");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    fn entries(yaml: &str) -> Vec<CredentialEntry> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(|document| serde::Deserialize::deserialize(document).unwrap())
            .collect()
    }

    async fn setup() -> (CredentialService, InMemoryStore, TenantId) {
        let store = InMemoryStore::new();
        let tenant = store.add_tenant("acme").await;
        (CredentialService::new(Arc::new(store.clone())), store, tenant)
    }

    #[tokio::test]
    async fn test_write_then_get() {
        let (service, store, tenant) = setup().await;
        let summary = service
            .write_batch(&tenant, entries("name: db1\ntype: postgres\nvalue:\n  url: x\n"))
            .await
            .unwrap();
        assert_eq!(summary, WriteSummary { inserted: 1, updated: 0 });

        let info = service.get(&tenant, "db1").await.unwrap();
        assert_eq!(info.name, "db1");
        assert_eq!(info.credential_type, "postgres");
        assert_eq!(store.credential_value(&tenant, "db1").await.unwrap(), r#"{"url":"x"}"#);
    }

    #[tokio::test]
    async fn test_type_change_rejected_and_stored_type_kept() {
        let (service, store, tenant) = setup().await;
        service
            .write_batch(&tenant, entries("name: db1\ntype: postgres\nvalue:\n  url: x\n"))
            .await
            .unwrap();

        let err = service
            .write_batch(&tenant, entries("name: db1\ntype: mysql\nvalue:\n  url: y\n"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(service.get(&tenant, "db1").await.unwrap().credential_type, "postgres");
        assert_eq!(store.credential_value(&tenant, "db1").await.unwrap(), r#"{"url":"x"}"#);
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_may_omit_type() {
        let (service, store, tenant) = setup().await;
        service
            .write_batch(&tenant, entries("name: db1\ntype: postgres\nvalue: a\n"))
            .await
            .unwrap();
        let before = service.get(&tenant, "db1").await.unwrap();

        let summary = service.write_batch(&tenant, entries("name: db1\nvalue: b\n")).await.unwrap();
        assert_eq!(summary, WriteSummary { inserted: 0, updated: 1 });

        let after = service.get(&tenant, "db1").await.unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(store.credential_value(&tenant, "db1").await.unwrap(), r#""b""#);
    }

    #[tokio::test]
    async fn test_invalid_entry_rejects_whole_batch() {
        let (service, _, tenant) = setup().await;
        let err = service
            .write_batch(
                &tenant,
                entries("name: good\ntype: postgres\nvalue: a\n---\nname: bad\ntype: aws-key\nvalue: nope\n"),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Parsing credential input at index=1 failed"));
        assert!(service.list(&tenant).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_name_rejected() {
        let (service, _, tenant) = setup().await;
        let result = service.write_batch(&tenant, entries("name: Bad_Name\ntype: x\nvalue: a\n")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_name_in_batch_rejected() {
        let (service, _, tenant) = setup().await;
        let result = service
            .write_batch(&tenant, entries("name: a\ntype: x\nvalue: 1\n---\nname: a\ntype: x\nvalue: 2\n"))
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let (service, _, tenant) = setup().await;
        let err = service.write_batch(&tenant, Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing credential YAML data in request body");
    }

    #[tokio::test]
    async fn test_supplied_id_used_on_insert() {
        let (service, _, tenant) = setup().await;
        let id = "8a4e2f3c-1f0e-4c43-9f61-2a8f5a2f1c11";
        service
            .write_batch(&tenant, entries(&format!("id: {}\nname: a\ntype: x\nvalue: 1\n", id)))
            .await
            .unwrap();
        assert_eq!(service.get(&tenant, "a").await.unwrap().id.as_str(), id);
    }

    #[traced_test]
    #[tokio::test]
    async fn test_partial_update_failure_keeps_earlier_updates() {
        let (service, store, tenant) = setup().await;
        service
            .write_batch(&tenant, entries("name: a\ntype: x\nvalue: 1\n---\nname: b\ntype: x\nvalue: 1\n"))
            .await
            .unwrap();
        store.fail_updates_for("b").await;

        let err = service
            .write_batch(&tenant, entries("name: a\nvalue: 2\n---\nname: b\nvalue: 2\n"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(store.credential_value(&tenant, "a").await.unwrap(), "2");
        assert_eq!(store.credential_value(&tenant, "b").await.unwrap(), "1");
        assert!(logs_contain("earlier updates in this batch remain applied"));
        assert!(logs_contain("applied_updates=1"));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_write_logs_summary() {
        let (service, _, tenant) = setup().await;
        service.write_batch(&tenant, entries("name: a\ntype: x\nvalue: 1\n")).await.unwrap();
        assert!(logs_contain("Credentials written"));
        assert!(logs_contain("inserted=1"));
    }

    #[tokio::test]
    async fn test_delete() {
        let (service, _, tenant) = setup().await;
        service.write_batch(&tenant, entries("name: a\ntype: x\nvalue: 1\n")).await.unwrap();
        let id = service.get(&tenant, "a").await.unwrap().id;

        assert_eq!(service.delete(&tenant, "a").await.unwrap(), id);
        assert!(matches!(service.get(&tenant, "a").await, Err(Error::NotFound { .. })));
        assert!(matches!(service.delete(&tenant, "a").await, Err(Error::NotFound { .. })));
    }

    fn json_leaf() -> impl Strategy<Value = serde_json::Value> {
        prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            "[ -~]{0,12}".prop_map(serde_json::Value::from),
        ]
    }

    fn json_object() -> impl Strategy<Value = serde_json::Value> {
        let nested = json_leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
                prop::collection::btree_map("[a-z_]{1,8}", inner, 0..4)
                    .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
            ]
        });
        prop::collection::btree_map("[a-z_]{1,8}", nested, 1..5)
            .prop_map(|map| serde_json::Value::Object(map.into_iter().collect()))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_generic_credential_round_trips(
            name in "[a-z0-9]([-a-z0-9]{0,20}[a-z0-9])?",
            credential_type in "[a-z][a-z0-9]{0,10}",
            value in json_object()
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let (info, stored) = runtime.block_on(async {
                let (service, store, tenant) = setup().await;
                let entry = CredentialEntry {
                    id: None,
                    name: name.clone(),
                    credential_type: Some(credential_type.clone()),
                    value: Some(serde_yaml::to_value(&value).unwrap()),
                };
                service.write_batch(&tenant, vec![entry]).await.unwrap();
                let info = service.get(&tenant, &name).await.unwrap();
                (info, store.credential_value(&tenant, &name).await.unwrap())
            });

            prop_assert_eq!(info.name, name);
            prop_assert_eq!(info.credential_type, credential_type);
            prop_assert_eq!(serde_json::from_str::<serde_json::Value>(&stored).unwrap(), value);
        }
    }
}
