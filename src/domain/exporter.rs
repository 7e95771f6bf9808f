//! Exporter domain types and the exporter/credential type pairing table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::credential::CredentialType;
use super::id::{CredentialId, ExporterId};
use super::yaml_to_json;

/// Supported exporter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExporterType {
    /// AWS CloudWatch
    Cloudwatch,
    /// Google Cloud Monitoring (Stackdriver)
    Stackdriver,
    /// Azure Monitor
    Azure,
}

impl ExporterType {
    pub const ALL: [ExporterType; 3] = [Self::Cloudwatch, Self::Stackdriver, Self::Azure];

    /// Get the stored representation of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloudwatch => "cloudwatch",
            Self::Stackdriver => "stackdriver",
            Self::Azure => "azure",
        }
    }

    /// The only credential type this exporter can be bound to
    pub fn compatible_credential(&self) -> CredentialType {
        match self {
            Self::Cloudwatch => CredentialType::AwsKey,
            Self::Stackdriver => CredentialType::GcpServiceAccount,
            Self::Azure => CredentialType::AzureServicePrincipal,
        }
    }

    /// Whether the exporter can run without a credential (ambient identity)
    pub fn allows_no_credential(&self) -> bool {
        matches!(self, Self::Stackdriver)
    }
}

impl FromStr for ExporterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or_else(|| {
            let supported: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
            format!(
                "unsupported exporter type '{}' (expected one of: {})",
                s,
                supported.join(", ")
            )
        })
    }
}

impl fmt::Display for ExporterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check an exporter type against the type of its credential, if any.
pub fn validate_exporter_types(
    exporter_type: &str,
    credential_type: Option<&str>,
) -> Result<(), String> {
    let exporter_type = ExporterType::from_str(exporter_type)?;
    let expected = exporter_type.compatible_credential();

    match credential_type {
        None if exporter_type.allows_no_credential() => Ok(()),
        None => Err(format!(
            "{} exporter requires a credential of type {}",
            exporter_type, expected
        )),
        Some(actual) if actual == expected.as_str() => Ok(()),
        Some(actual) => Err(format!(
            "{} exporter requires a credential of type {} (got {})",
            exporter_type, expected, actual
        )),
    }
}

/// Convert a raw exporter config to the JSON string to persist. A missing
/// config is stored as an empty object.
pub fn convert_exporter_config(config: Option<&serde_yaml::Value>) -> Result<String, String> {
    let json = match config.filter(|config| !config.is_null()) {
        Some(config) => yaml_to_json(config)?,
        None => serde_json::Value::Object(serde_json::Map::new()),
    };
    serde_json::to_string(&json).map_err(|e| format!("failed to encode config: {}", e))
}

/// Decode a stored config for display. Undecodable JSON is passed through
/// under a `json` key.
pub fn decode_exporter_config(name: &str, config_json: &str) -> serde_json::Value {
    match serde_json::from_str(config_json) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                exporter = %name,
                error = %e,
                config = %config_json,
                "Failed to decode JSON config for exporter"
            );
            serde_json::json!({ "json": config_json })
        }
    }
}

/// One exporter document from a POST body, decoded strictly.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub exporter_type: Option<String>,
    /// Name of a credential in the same tenant
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub config: Option<serde_yaml::Value>,
}

/// Exporter as returned to API callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExporterInfo {
    pub id: ExporterId,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub exporter_type: String,
    /// Name of the bound credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Exporter as held by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterDetail {
    pub id: ExporterId,
    pub name: String,
    pub exporter_type: String,
    pub credential_name: Option<String>,
    pub config_json: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ExporterDetail {
    pub fn into_info(self) -> ExporterInfo {
        let config = decode_exporter_config(&self.name, &self.config_json);
        ExporterInfo {
            id: self.id,
            name: self.name,
            exporter_type: self.exporter_type,
            credential: self.credential_name,
            config: Some(config),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Prior state of an exporter name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterRecord {
    pub id: ExporterId,
    pub exporter_type: String,
}

/// An exporter to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewExporter {
    pub id: ExporterId,
    pub name: String,
    pub exporter_type: String,
    pub credential_id: Option<CredentialId>,
    pub config_json: String,
    pub created_at: String,
    pub updated_at: String,
}

/// An in-place update of an existing exporter. The type is never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterUpdate {
    pub id: ExporterId,
    pub name: String,
    pub credential_id: Option<CredentialId>,
    pub config_json: String,
    pub updated_at: String,
}
