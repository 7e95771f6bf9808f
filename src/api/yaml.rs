//! YAML request and response codec.
//!
//! Request bodies are YAML streams holding one document per entity. Each
//! document is decoded strictly: unknown or repeated fields fail the whole
//! request with the zero-based index of the offending document.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::{Error, Result};
use crate::services::EntityKind;

pub const YAML_CONTENT_TYPE: &str = "application/yaml";

/// Decode every non-empty document in a YAML stream.
pub fn decode_documents<T: DeserializeOwned>(kind: EntityKind, body: &[u8]) -> Result<Vec<T>> {
    let mut entries = Vec::new();

    for document in serde_yaml::Deserializer::from_slice(body) {
        let index = entries.len();
        let value = serde_yaml::Value::deserialize(document)
            .map_err(|e| decode_failure(kind, index, e))?;

        // `---` separators with nothing between them
        if value.is_null() {
            continue;
        }

        let entry = serde_yaml::from_value(value).map_err(|e| decode_failure(kind, index, e))?;
        entries.push(entry);
    }

    Ok(entries)
}

fn decode_failure(kind: EntityKind, index: usize, err: serde_yaml::Error) -> Error {
    let err = Error::decode(kind.noun(), index, err.to_string());
    debug!(error = %err, "Rejecting request body");
    err
}

/// YAML response body
#[derive(Debug, Clone)]
pub struct Yaml<T>(pub T);

impl<T: Serialize> IntoResponse for Yaml<T> {
    fn into_response(self) -> Response {
        match serde_yaml::to_string(&self.0) {
            Ok(body) => ([(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], body).into_response(),
            Err(e) => {
                error!(error = %e, "Failed to encode YAML response");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Encoding response failed: {}\n", e))
                    .into_response()
            }
        }
    }
}

/// Body returned by DELETE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedEntity {
    pub id: String,
}
