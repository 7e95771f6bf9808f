//! # Validation Module
//!
//! Shared input checks applied to every credential and exporter write.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::{Error, Result};

/// Maximum length of an entity name (Kubernetes DNS-1123 label limit)
pub const MAX_NAME_LENGTH: usize = 63;

lazy_static! {
    /// DNS-1123 label: lowercase alphanumerics and '-', alphanumeric at both ends
    static ref NAME_REGEX: Regex = Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$")
        .expect("NAME_REGEX should be a valid regex pattern");
}

/// Check that a credential or exporter name can be used in Kubernetes object names.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("Name must not be empty"));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(Error::validation(format!(
            "Name '{}' is too long ({} > {} characters)",
            name,
            name.len(),
            MAX_NAME_LENGTH
        )));
    }

    if !NAME_REGEX.is_match(name) {
        return Err(Error::validation(format!(
            "Name '{}' must consist of lowercase alphanumeric characters or '-', \
             and must start and end with an alphanumeric character",
            name
        )));
    }

    Ok(())
}

/// Check the shape of a free-form type tag (same alphabet as names).
pub fn validate_type_tag(tag: &str) -> Result<()> {
    if tag.len() > MAX_NAME_LENGTH || !NAME_REGEX.is_match(tag) {
        return Err(Error::validation(format!(
            "Type '{}' must be 1-{} lowercase alphanumeric characters or '-'",
            tag, MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_names() {
        let longest = "x".repeat(MAX_NAME_LENGTH);
        for name in ["db1", "a", "aws-prod-key", "0abc9", longest.as_str()] {
            assert!(validate_name(name).is_ok(), "expected '{}' to be valid", name);
        }
    }

    #[test]
    fn test_invalid_names() {
        let too_long = "x".repeat(64);
        for name in ["", "-db", "db-", "DB1", "db_1", "db.1", "db 1", too_long.as_str()] {
            assert!(
                matches!(validate_name(name), Err(Error::Validation(_))),
                "expected '{}' to be rejected",
                name
            );
        }
    }

    #[test]
    fn test_type_tags() {
        assert!(validate_type_tag("postgres").is_ok());
        assert!(validate_type_tag("aws-key").is_ok());
        assert!(validate_type_tag("").is_err());
        assert!(validate_type_tag("My Type").is_err());
    }

    proptest! {
        #[test]
        fn prop_generated_labels_are_accepted(name in "[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?") {
            prop_assert!(validate_name(&name).is_ok());
        }

        #[test]
        fn prop_uppercase_is_rejected(
            prefix in "[a-z0-9]{0,10}",
            upper in "[A-Z]",
            suffix in "[a-z0-9]{0,10}"
        ) {
            let name = format!("{}{}{}", prefix, upper, suffix);
            prop_assert!(validate_name(&name).is_err());
        }
    }
}
