//! # Error Handling
//!
//! Crate-wide error type for the tenant configuration API, built with `thiserror`.
//! HTTP mapping lives in [`crate::api::error`].

/// Custom result type for configuration API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the configuration API
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A tenant or entity that does not exist
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// Input rejected by business rules
    #[error("{0}")]
    Validation(String),

    /// A document in a YAML request stream could not be decoded
    #[error("Decoding {kind} input at index={index} failed: {message}")]
    Decode { kind: &'static str, index: usize, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors talking to the GraphQL backend
    #[error("Transport error: {0}")]
    Transport(String),

    /// Errors reported by the GraphQL backend itself
    #[error("GraphQL error: {0}")]
    Graphql(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new not found error
    pub fn not_found<R: Into<String>, N: Into<String>>(resource_type: R, name: N) -> Self {
        Self::NotFound { resource_type: resource_type.into(), name: name.into() }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new decode error for the document at `index`
    pub fn decode<S: Into<String>>(kind: &'static str, index: usize, message: S) -> Self {
        Self::Decode { kind, index, message: message.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new GraphQL error
    pub fn graphql<S: Into<String>>(message: S) -> Self {
        Self::Graphql(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code that should be returned for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) | Error::Decode { .. } => 400,
            Error::Config(_)
            | Error::Transport(_)
            | Error::Graphql(_)
            | Error::Io(_)
            | Error::Internal(_) => 500,
        }
    }

    /// Prefix the message of a backend failure with request context.
    ///
    /// Client errors are returned unchanged so their messages stay exact.
    pub fn context<S: Into<String>>(self, context: S) -> Self {
        let context = context.into();
        match self {
            Error::Transport(msg) => Error::Transport(format!("{}: {}", context, msg)),
            Error::Graphql(msg) => Error::Graphql(format!("{}: {}", context, msg)),
            Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization failed: {}", error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Invalid configuration: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::not_found("tenant", "acme").status_code(), 404);
        assert_eq!(Error::validation("bad").status_code(), 400);
        assert_eq!(Error::decode("credential", 2, "oops").status_code(), 400);
        assert_eq!(Error::transport("down").status_code(), 500);
        assert_eq!(Error::graphql("constraint").status_code(), 500);
        assert_eq!(Error::internal("boom").status_code(), 500);
    }

    #[test]
    fn test_decode_message_reports_index() {
        let error = Error::decode("credential", 1, "unknown field `foo`");
        assert_eq!(
            error.to_string(),
            "Decoding credential input at index=1 failed: unknown field `foo`"
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(Error::not_found("Tenant", "acme").to_string(), "Tenant not found: acme");
    }

    #[test]
    fn test_context_only_wraps_backend_errors() {
        let wrapped = Error::transport("connection refused").context("Listing credentials failed");
        assert_eq!(
            wrapped.to_string(),
            "Transport error: Listing credentials failed: connection refused"
        );

        let untouched = Error::validation("bad name").context("ignored");
        assert_eq!(untouched.to_string(), "bad name");
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));

        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Internal(_)));
    }
}
