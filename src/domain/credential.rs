//! Credential domain types and value rules.
//!
//! A credential is a named secret plus a type tag. The value is accepted as
//! YAML, checked against the shape its type requires and stored as opaque JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::CredentialId;
use super::yaml_to_json;
use crate::validation::validate_type_tag;

/// Supported credential types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialType {
    /// AWS access key pair
    AwsKey,
    /// GCP service account key file (JSON)
    GcpServiceAccount,
    /// Azure service principal
    AzureServicePrincipal,
}

impl CredentialType {
    pub const ALL: [CredentialType; 3] =
        [Self::AwsKey, Self::GcpServiceAccount, Self::AzureServicePrincipal];

    /// Get the stored representation of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwsKey => "aws-key",
            Self::GcpServiceAccount => "gcp-service-account",
            Self::AzureServicePrincipal => "azure-service-principal",
        }
    }

    /// String fields a mapping value must contain, or `None` for string-valued types
    fn required_fields(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::AwsKey => Some(&["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"]),
            Self::AzureServicePrincipal => Some(&[
                "AZURE_SUBSCRIPTION_ID",
                "AZURE_TENANT_ID",
                "AZURE_CLIENT_ID",
                "AZURE_CLIENT_SECRET",
            ]),
            Self::GcpServiceAccount => None,
        }
    }

    /// Check a YAML credential value against this type and render it as JSON.
    pub fn convert_value(&self, value: &serde_yaml::Value) -> Result<String, String> {
        match self.required_fields() {
            Some(fields) => {
                let expected = fields.join(", ");
                let mapping = value.as_mapping().ok_or_else(|| {
                    format!(
                        "expected {} value to be a mapping with string fields: {}",
                        self, expected
                    )
                })?;

                let mut object = serde_json::Map::with_capacity(fields.len());
                for (key, field_value) in mapping {
                    let key = key
                        .as_str()
                        .filter(|key| fields.contains(key))
                        .ok_or_else(|| {
                            format!(
                                "unexpected field {:?} in {} value (expected: {})",
                                key, self, expected
                            )
                        })?;
                    let field_value = field_value
                        .as_str()
                        .ok_or_else(|| format!("{} value field {} must be a string", self, key))?;
                    object.insert(key.to_string(), serde_json::Value::String(field_value.into()));
                }

                if let Some(missing) = fields.iter().find(|field| !object.contains_key(**field)) {
                    return Err(format!(
                        "missing field {} in {} value (expected: {})",
                        missing, self, expected
                    ));
                }

                serde_json::to_string(&serde_json::Value::Object(object))
                    .map_err(|e| format!("failed to encode {} value: {}", self, e))
            }
            None => {
                let raw = value.as_str().ok_or_else(|| {
                    format!("expected {} value to be a string containing JSON", self)
                })?;
                serde_json::from_str::<serde_json::Value>(raw)
                    .map_err(|e| format!("{} value is not valid JSON: {}", self, e))?;
                Ok(raw.to_string())
            }
        }
    }
}

impl FromStr for CredentialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or_else(|| {
            let supported: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
            format!(
                "unsupported credential type '{}' (expected one of: {})",
                s,
                supported.join(", ")
            )
        })
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate and convert a raw credential value for the given type name.
///
/// Known types are held to the shape they require. Any other well-formed type
/// tag is a generic credential whose value may be any JSON-compatible YAML.
/// Returns the JSON string to persist.
pub fn convert_credential_value(
    credential_type: &str,
    value: Option<&serde_yaml::Value>,
) -> Result<String, String> {
    if credential_type.is_empty() {
        return Err("missing credential type".to_string());
    }
    let value = value
        .filter(|value| !value.is_null())
        .ok_or_else(|| format!("missing {} value", credential_type))?;

    let json = match CredentialType::from_str(credential_type) {
        Ok(known) => known.convert_value(value)?,
        Err(_) => {
            validate_type_tag(credential_type).map_err(|e| e.to_string())?;
            let json = yaml_to_json(value)?;
            serde_json::to_string(&json)
                .map_err(|e| format!("failed to encode {} value: {}", credential_type, e))?
        }
    };

    // Persisted values must always parse as JSON.
    serde_json::from_str::<serde_json::Value>(&json)
        .map_err(|e| format!("{} value is not valid JSON: {}", credential_type, e))?;
    Ok(json)
}

/// One credential document from a POST body, decoded strictly.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub credential_type: Option<String>,
    #[serde(default)]
    pub value: Option<serde_yaml::Value>,
}

/// Credential metadata. Never carries the secret value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialInfo {
    pub id: CredentialId,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub credential_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Prior state of a credential name, consulted before choosing insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: CredentialId,
    pub credential_type: String,
}

/// A credential to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewCredential {
    pub id: CredentialId,
    pub name: String,
    pub credential_type: String,
    pub value_json: String,
    pub created_at: String,
    pub updated_at: String,
}

/// An in-place update of an existing credential. The type is never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialUpdate {
    pub id: CredentialId,
    pub name: String,
    pub value_json: String,
    pub updated_at: String,
}
