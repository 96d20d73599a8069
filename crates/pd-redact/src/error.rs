//! Error types for redaction and credential hashing.

use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while building a redaction policy or hashing credentials.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// The redaction policy is unusable (empty field list, bad token, bad separator).
    #[error("policy error: {0}")]
    PolicyError(String),

    /// A field name cannot be matched as a whole `name=` token.
    #[error("invalid field name {field:?}: {reason}")]
    InvalidField { field: String, reason: String },

    /// The hashing primitive rejected its parameters or input.
    #[error("hash error: {0}")]
    HashError(String),

    /// A stored credential hash could not be parsed.
    /// The digest itself is never echoed back.
    #[error("malformed credential hash")]
    MalformedHash,

    /// I/O error during policy file operations.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RedactionError {
    pub(crate) fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        RedactionError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<argon2::password_hash::Error> for RedactionError {
    fn from(err: argon2::password_hash::Error) -> Self {
        RedactionError::HashError(err.to_string())
    }
}
