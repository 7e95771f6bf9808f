//! Checks shared by the credential and exporter batch writes.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

/// Entity kind, used in user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Credential,
    Exporter,
}

impl EntityKind {
    /// Lowercase noun, as used in decode and parse messages
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Credential => "credential",
            Self::Exporter => "exporter",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential => write!(f, "Credential"),
            Self::Exporter => write!(f, "Exporter"),
        }
    }
}

/// Outcome of a successful batch write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Tracks names already planned in the current batch.
#[derive(Debug)]
pub struct BatchNames {
    kind: EntityKind,
    seen: HashSet<String>,
}

impl BatchNames {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind, seen: HashSet::new() }
    }

    /// Reject a name that already appeared earlier in the batch
    pub fn claim(&mut self, name: &str) -> Result<()> {
        if !self.seen.insert(name.to_string()) {
            return Err(Error::validation(format!(
                "{} '{}' appears more than once in the request",
                self.kind, name
            )));
        }
        Ok(())
    }
}

/// Resolve the type an entry is written with.
///
/// A supplied type must match the stored one. An omitted type on an update
/// falls back to the stored type.
pub fn effective_type(
    kind: EntityKind,
    name: &str,
    supplied: Option<&str>,
    existing: Option<&str>,
) -> Result<String> {
    let supplied = supplied.filter(|t| !t.is_empty());
    match (supplied, existing) {
        (Some(updated), Some(current)) if updated != current => Err(Error::validation(format!(
            "{} '{}' type cannot be updated (current={}, updated={})",
            kind, name, current, updated
        ))),
        (Some(t), _) | (None, Some(t)) => Ok(t.to_string()),
        (None, None) => Ok(String::new()),
    }
}

/// ID for a new entity: the supplied UUID, or a freshly generated one.
pub fn new_entity_id<T>(kind: EntityKind, name: &str, supplied: Option<&str>) -> Result<T>
where
    T: FromStr<Err = uuid::Error> + Default,
{
    match supplied.filter(|id| !id.is_empty()) {
        Some(id) => T::from_str(id).map_err(|e| {
            Error::validation(format!("{} '{}' has invalid id '{}': {}", kind, name, id, e))
        }),
        None => Ok(T::default()),
    }
}

/// An update may restate the stored ID but never change it.
pub fn check_existing_id(kind: EntityKind, name: &str, supplied: Option<&str>, current: &str) -> Result<()> {
    match supplied.filter(|id| !id.is_empty()) {
        Some(id) if id != current => Err(Error::validation(format!(
            "{} '{}' id cannot be updated (current={}, updated={})",
            kind, name, current, id
        ))),
        _ => Ok(()),
    }
}

/// Wrap a per-entry conversion failure with its position in the stream.
pub fn parse_error(kind: EntityKind, index: usize, message: impl fmt::Display) -> Error {
    Error::validation(format!("Parsing {} input at index={} failed: {}", kind.noun(), index, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CredentialId;

    #[test]
    fn test_batch_names_reject_repeats() {
        let mut names = BatchNames::new(EntityKind::Exporter);
        assert!(names.claim("a").is_ok());
        assert!(names.claim("b").is_ok());
        let err = names.claim("a").unwrap_err();
        assert_eq!(err.to_string(), "Exporter 'a' appears more than once in the request");
    }

    #[test]
    fn test_effective_type() {
        let kind = EntityKind::Credential;
        assert_eq!(effective_type(kind, "db1", Some("postgres"), None).unwrap(), "postgres");
        assert_eq!(effective_type(kind, "db1", None, Some("postgres")).unwrap(), "postgres");
        assert_eq!(effective_type(kind, "db1", Some(""), Some("postgres")).unwrap(), "postgres");
        assert_eq!(effective_type(kind, "db1", Some("postgres"), Some("postgres")).unwrap(), "postgres");
        assert_eq!(effective_type(kind, "db1", None, None).unwrap(), "");

        let err = effective_type(kind, "db1", Some("mysql"), Some("postgres")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Credential 'db1' type cannot be updated (current=postgres, updated=mysql)"
        );
    }

    #[test]
    fn test_new_entity_id() {
        let generated: CredentialId = new_entity_id(EntityKind::Credential, "a", None).unwrap();
        assert!(uuid::Uuid::parse_str(generated.as_str()).is_ok());

        let supplied = "8a4e2f3c-1f0e-4c43-9f61-2a8f5a2f1c11";
        let id: CredentialId = new_entity_id(EntityKind::Credential, "a", Some(supplied)).unwrap();
        assert_eq!(id.as_str(), supplied);

        let result: Result<CredentialId> = new_entity_id(EntityKind::Credential, "a", Some("nope"));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_check_existing_id() {
        assert!(check_existing_id(EntityKind::Exporter, "e", None, "id-1").is_ok());
        assert!(check_existing_id(EntityKind::Exporter, "e", Some("id-1"), "id-1").is_ok());
        assert!(check_existing_id(EntityKind::Exporter, "e", Some("id-2"), "id-1").is_err());
    }
}
