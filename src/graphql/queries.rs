//! Query and mutation builders for the tenant, credential and exporter tables,
//! plus the row shapes their responses decode into.

use serde::Deserialize;
use serde_json::json;

use super::GraphqlRequest;
use crate::domain::{CredentialUpdate, ExporterUpdate, NewCredential, NewExporter, TenantId};

const GET_TENANT_BY_NAME: &str = r#"
query GetTenantByName($name: String!) {
  tenant(where: {name: {_eq: $name}}) {
    id
    name
  }
}"#;

const GET_CREDENTIALS: &str = r#"
query GetCredentials($tenant_id: uuid!) {
  credential(where: {tenant_id: {_eq: $tenant_id}}, order_by: {name: asc}) {
    id
    name
    type
    created_at
    updated_at
  }
}"#;

const GET_CREDENTIAL_BY_NAME: &str = r#"
query GetCredentialByName($tenant_id: uuid!, $name: String!) {
  credential(where: {tenant_id: {_eq: $tenant_id}, name: {_eq: $name}}) {
    id
    name
    type
    created_at
    updated_at
  }
}"#;

const CREATE_CREDENTIALS: &str = r#"
mutation CreateCredentials($credentials: [credential_insert_input!]!) {
  insert_credential(objects: $credentials) {
    affected_rows
  }
}"#;

const UPDATE_CREDENTIAL: &str = r#"
mutation UpdateCredential($tenant_id: uuid!, $id: uuid!, $value: String!, $updated_at: timestamptz!) {
  update_credential(
    where: {tenant_id: {_eq: $tenant_id}, id: {_eq: $id}},
    _set: {value: $value, updated_at: $updated_at}
  ) {
    affected_rows
  }
}"#;

const DELETE_CREDENTIAL: &str = r#"
mutation DeleteCredential($tenant_id: uuid!, $name: String!) {
  delete_credential(where: {tenant_id: {_eq: $tenant_id}, name: {_eq: $name}}) {
    returning {
      id
    }
  }
}"#;

const GET_EXPORTERS: &str = r#"
query GetExporters($tenant_id: uuid!) {
  exporter(where: {tenant_id: {_eq: $tenant_id}}, order_by: {name: asc}) {
    id
    name
    type
    config
    created_at
    updated_at
    credential {
      name
    }
  }
}"#;

const GET_EXPORTER_BY_NAME: &str = r#"
query GetExporterByName($tenant_id: uuid!, $name: String!) {
  exporter(where: {tenant_id: {_eq: $tenant_id}, name: {_eq: $name}}) {
    id
    name
    type
    config
    created_at
    updated_at
    credential {
      name
    }
  }
}"#;

const GET_EXPORTER_TYPES: &str = r#"
query GetExporterTypes($tenant_id: uuid!) {
  exporter(where: {tenant_id: {_eq: $tenant_id}}) {
    id
    name
    type
  }
}"#;

const CREATE_EXPORTERS: &str = r#"
mutation CreateExporters($exporters: [exporter_insert_input!]!) {
  insert_exporter(objects: $exporters) {
    affected_rows
  }
}"#;

const UPDATE_EXPORTER: &str = r#"
mutation UpdateExporter($tenant_id: uuid!, $id: uuid!, $credential_id: uuid, $config: String!, $updated_at: timestamptz!) {
  update_exporter(
    where: {tenant_id: {_eq: $tenant_id}, id: {_eq: $id}},
    _set: {credential_id: $credential_id, config: $config, updated_at: $updated_at}
  ) {
    affected_rows
  }
}"#;

const DELETE_EXPORTER: &str = r#"
mutation DeleteExporter($tenant_id: uuid!, $name: String!) {
  delete_exporter(where: {tenant_id: {_eq: $tenant_id}, name: {_eq: $name}}) {
    returning {
      id
    }
  }
}"#;

// Tenants

pub fn get_tenant_by_name(name: &str) -> GraphqlRequest {
    GraphqlRequest::new("GetTenantByName", GET_TENANT_BY_NAME, json!({ "name": name }))
}

#[derive(Debug, Deserialize)]
pub struct TenantRow {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TenantsData {
    pub tenant: Vec<TenantRow>,
}

// Credentials

pub fn get_credentials(tenant_id: &TenantId) -> GraphqlRequest {
    GraphqlRequest::new("GetCredentials", GET_CREDENTIALS, json!({ "tenant_id": tenant_id }))
}

pub fn get_credential_by_name(tenant_id: &TenantId, name: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "GetCredentialByName",
        GET_CREDENTIAL_BY_NAME,
        json!({ "tenant_id": tenant_id, "name": name }),
    )
}

/// Batch insert. Every object is stamped with the tenant.
pub fn create_credentials(tenant_id: &TenantId, credentials: &[NewCredential]) -> GraphqlRequest {
    let objects: Vec<serde_json::Value> = credentials
        .iter()
        .map(|credential| {
            json!({
                "id": credential.id,
                "tenant_id": tenant_id,
                "name": credential.name,
                "type": credential.credential_type,
                "value": credential.value_json,
                "created_at": credential.created_at,
                "updated_at": credential.updated_at,
            })
        })
        .collect();
    GraphqlRequest::new("CreateCredentials", CREATE_CREDENTIALS, json!({ "credentials": objects }))
}

pub fn update_credential(tenant_id: &TenantId, update: &CredentialUpdate) -> GraphqlRequest {
    GraphqlRequest::new(
        "UpdateCredential",
        UPDATE_CREDENTIAL,
        json!({
            "tenant_id": tenant_id,
            "id": update.id,
            "value": update.value_json,
            "updated_at": update.updated_at,
        }),
    )
}

pub fn delete_credential(tenant_id: &TenantId, name: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "DeleteCredential",
        DELETE_CREDENTIAL,
        json!({ "tenant_id": tenant_id, "name": name }),
    )
}

#[derive(Debug, Deserialize)]
pub struct CredentialRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsData {
    pub credential: Vec<CredentialRow>,
}

#[derive(Debug, Deserialize)]
pub struct InsertCredentialData {
    pub insert_credential: AffectedRows,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCredentialData {
    pub update_credential: AffectedRows,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCredentialData {
    pub delete_credential: Returning,
}

// Exporters

pub fn get_exporters(tenant_id: &TenantId) -> GraphqlRequest {
    GraphqlRequest::new("GetExporters", GET_EXPORTERS, json!({ "tenant_id": tenant_id }))
}

pub fn get_exporter_by_name(tenant_id: &TenantId, name: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "GetExporterByName",
        GET_EXPORTER_BY_NAME,
        json!({ "tenant_id": tenant_id, "name": name }),
    )
}

pub fn get_exporter_types(tenant_id: &TenantId) -> GraphqlRequest {
    GraphqlRequest::new("GetExporterTypes", GET_EXPORTER_TYPES, json!({ "tenant_id": tenant_id }))
}

/// Batch insert. Every object is stamped with the tenant.
pub fn create_exporters(tenant_id: &TenantId, exporters: &[NewExporter]) -> GraphqlRequest {
    let objects: Vec<serde_json::Value> = exporters
        .iter()
        .map(|exporter| {
            json!({
                "id": exporter.id,
                "tenant_id": tenant_id,
                "name": exporter.name,
                "type": exporter.exporter_type,
                "credential_id": exporter.credential_id,
                "config": exporter.config_json,
                "created_at": exporter.created_at,
                "updated_at": exporter.updated_at,
            })
        })
        .collect();
    GraphqlRequest::new("CreateExporters", CREATE_EXPORTERS, json!({ "exporters": objects }))
}

pub fn update_exporter(tenant_id: &TenantId, update: &ExporterUpdate) -> GraphqlRequest {
    GraphqlRequest::new(
        "UpdateExporter",
        UPDATE_EXPORTER,
        json!({
            "tenant_id": tenant_id,
            "id": update.id,
            "credential_id": update.credential_id,
            "config": update.config_json,
            "updated_at": update.updated_at,
        }),
    )
}

pub fn delete_exporter(tenant_id: &TenantId, name: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "DeleteExporter",
        DELETE_EXPORTER,
        json!({ "tenant_id": tenant_id, "name": name }),
    )
}

#[derive(Debug, Deserialize)]
pub struct CredentialNameRow {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ExporterRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub exporter_type: String,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub credential: Option<CredentialNameRow>,
}

#[derive(Debug, Deserialize)]
pub struct ExporterTypeRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub exporter_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportersData {
    pub exporter: Vec<ExporterRow>,
}

#[derive(Debug, Deserialize)]
pub struct ExporterTypesData {
    pub exporter: Vec<ExporterTypeRow>,
}

#[derive(Debug, Deserialize)]
pub struct InsertExporterData {
    pub insert_exporter: AffectedRows,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExporterData {
    pub update_exporter: AffectedRows,
}

#[derive(Debug, Deserialize)]
pub struct DeleteExporterData {
    pub delete_exporter: Returning,
}

// Shared mutation payloads

#[derive(Debug, Deserialize)]
pub struct AffectedRows {
    pub affected_rows: u64,
}

#[derive(Debug, Deserialize)]
pub struct ReturningId {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Returning {
    pub returning: Vec<ReturningId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CredentialId;

    fn tenant() -> TenantId {
        TenantId::from_string("0b0e7a52-7f5d-4c3a-9d56-0a3a1f7c2b10".to_string())
    }

    #[test]
    fn test_create_credentials_stamps_tenant() {
        let credential = NewCredential {
            id: CredentialId::from_string("c-1".to_string()),
            name: "db1".to_string(),
            credential_type: "aws-key".to_string(),
            value_json: "{}".to_string(),
            created_at: "2021-01-01T00:00:00+00:00".to_string(),
            updated_at: "2021-01-01T00:00:00+00:00".to_string(),
        };
        let request = create_credentials(&tenant(), &[credential]);
        assert_eq!(request.operation(), "CreateCredentials");
        let object = &request.variables["credentials"][0];
        assert_eq!(object["tenant_id"], tenant().as_str());
        assert_eq!(object["type"], "aws-key");
        assert_eq!(object["value"], "{}");
    }

    #[test]
    fn test_update_exporter_without_credential_sends_null() {
        let update = ExporterUpdate {
            id: crate::domain::ExporterId::from_string("e-1".to_string()),
            name: "sd".to_string(),
            credential_id: None,
            config_json: "{}".to_string(),
            updated_at: "2021-01-01T00:00:00+00:00".to_string(),
        };
        let request = update_exporter(&tenant(), &update);
        assert!(request.variables["credential_id"].is_null());
        assert!(request.query.contains("update_exporter"));
    }

    #[test]
    fn test_exporter_row_without_credential() {
        let data: ExportersData = serde_json::from_value(json!({
            "exporter": [{"id": "e-1", "name": "sd", "type": "stackdriver", "config": "{}", "credential": null}]
        }))
        .unwrap();
        assert!(data.exporter[0].credential.is_none());
    }
}
