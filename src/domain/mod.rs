//! Domain layer
//!
//! Pure entities and value rules for tenant-scoped credentials and
//! exporters. Nothing here talks to HTTP or to the GraphQL backend.
//!
//! ## Module Organization
//!
//! - `id`: Type-safe backend identifiers with NewType pattern
//! - `credential`: Credential types and per-type value shapes
//! - `exporter`: Exporter types and the credential pairing table

pub mod credential;
pub mod exporter;
pub mod id;

pub use credential::{
    convert_credential_value, CredentialEntry, CredentialInfo, CredentialRecord, CredentialType,
    CredentialUpdate, NewCredential,
};
pub use exporter::{
    convert_exporter_config, validate_exporter_types, ExporterDetail, ExporterEntry, ExporterInfo,
    ExporterRecord, ExporterType, ExporterUpdate, NewExporter,
};
pub use id::{CredentialId, ExporterId, TenantId};

/// Convert a YAML value to its JSON equivalent.
///
/// Fails for values JSON cannot represent, such as mappings with non-string
/// keys or non-finite numbers (`.inf`, `.nan`).
pub fn yaml_to_json(value: &serde_yaml::Value) -> Result<serde_json::Value, String> {
    check_finite(value)?;
    serde_json::to_value(value).map_err(|e| format!("value cannot be represented as JSON: {}", e))
}

// serde_json turns non-finite floats into null instead of failing.
fn check_finite(value: &serde_yaml::Value) -> Result<(), String> {
    use serde_yaml::Value;

    match value {
        Value::Number(number) if !number.as_f64().is_some_and(f64::is_finite) => Err(format!(
            "value cannot be represented as JSON: non-finite number {}",
            number
        )),
        Value::Sequence(items) => items.iter().try_for_each(check_finite),
        Value::Mapping(mapping) => mapping.iter().try_for_each(|(key, value)| {
            check_finite(key)?;
            check_finite(value)
        }),
        Value::Tagged(tagged) => check_finite(&tagged.value),
        _ => Ok(()),
    }
}

/// Current time as an RFC3339 timestamp
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}
