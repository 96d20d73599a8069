//! Redaction policy configuration.
//!
//! Declares which fields are personal data, what replaces their values,
//! and how segments are separated. A policy is validated once and then
//! frozen inside a [`RedactionEngine`](crate::RedactionEngine).

use crate::error::{RedactionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema version for the policy file.
pub const POLICY_SCHEMA_VERSION: &str = "1.0.0";

/// Fields treated as personally identifiable information by default.
pub const PII_FIELDS: [&str; 5] = ["name", "email", "phone", "ssn", "password"];

/// Token substituted for every redacted value.
pub const DEFAULT_REDACTION: &str = "***";

/// Segment separator in `name=value` messages.
pub const DEFAULT_SEPARATOR: char = ';';

/// Redaction policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Field names whose values are replaced.
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    /// Replacement token.
    #[serde(default = "default_redaction")]
    pub redaction: String,

    /// Segment separator.
    #[serde(default = "default_separator")]
    pub separator: char,
}

fn default_schema_version() -> String {
    POLICY_SCHEMA_VERSION.to_string()
}

fn default_fields() -> Vec<String> {
    PII_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_redaction() -> String {
    DEFAULT_REDACTION.to_string()
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

impl RedactionPolicy {
    /// Create a new policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy redacting the given fields with the default token and separator.
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Load policy from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let policy: RedactionPolicy = serde_json::from_str(&content)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Save policy to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that every field can be matched as a whole `name=` token and
    /// that redacted output can be redacted again without change.
    pub fn validate(&self) -> Result<()> {
        if self.separator == '=' || self.separator.is_whitespace() {
            return Err(RedactionError::PolicyError(format!(
                "separator {:?} must not be '=' or whitespace",
                self.separator
            )));
        }

        if self.redaction.is_empty() {
            return Err(RedactionError::PolicyError(
                "redaction token must not be empty".to_string(),
            ));
        }
        if self.redaction.contains(self.separator) {
            return Err(RedactionError::PolicyError(format!(
                "redaction token must not contain the separator {:?}",
                self.separator
            )));
        }

        if self.fields.is_empty() {
            return Err(RedactionError::PolicyError(
                "at least one field is required".to_string(),
            ));
        }

        for field in &self.fields {
            if field.is_empty() {
                return Err(RedactionError::invalid_field(field, "empty name"));
            }
            if field.contains('=') {
                return Err(RedactionError::invalid_field(field, "contains '='"));
            }
            if field.contains(self.separator) {
                return Err(RedactionError::invalid_field(field, "contains the separator"));
            }
            if field.chars().any(char::is_whitespace) {
                return Err(RedactionError::invalid_field(field, "contains whitespace"));
            }
        }

        Ok(())
    }

    /// Whether `field` is redacted by this policy.
    pub fn is_sensitive(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            fields: default_fields(),
            redaction: default_redaction(),
            separator: default_separator(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RedactionPolicy::default();
        assert_eq!(policy.schema_version, POLICY_SCHEMA_VERSION);
        assert_eq!(policy.fields, vec!["name", "email", "phone", "ssn", "password"]);
        assert_eq!(policy.redaction, "***");
        assert_eq!(policy.separator, ';');
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_with_fields() {
        let policy = RedactionPolicy::with_fields(["token"]);
        assert!(policy.is_sensitive("token"));
        assert!(!policy.is_sensitive("email"));
        assert_eq!(policy.redaction, DEFAULT_REDACTION);
    }

    #[test]
    fn test_rejects_empty_fields() {
        let policy = RedactionPolicy::with_fields(Vec::<String>::new());
        assert!(matches!(policy.validate(), Err(RedactionError::PolicyError(_))));
    }

    #[test]
    fn test_rejects_bad_field_names() {
        for bad in ["", "a=b", "a;b", "first name"] {
            let policy = RedactionPolicy::with_fields([bad]);
            assert!(
                matches!(policy.validate(), Err(RedactionError::InvalidField { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_bad_separator() {
        let mut policy = RedactionPolicy::default();
        policy.separator = '=';
        assert!(policy.validate().is_err());

        policy.separator = ' ';
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_token() {
        let mut policy = RedactionPolicy::default();
        policy.redaction = String::new();
        assert!(policy.validate().is_err());

        policy.redaction = "x;y".to_string();
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let policy: RedactionPolicy = serde_json::from_str(r#"{"fields": ["iban"]}"#).unwrap();
        assert_eq!(policy.fields, vec!["iban"]);
        assert_eq!(policy.redaction, DEFAULT_REDACTION);
        assert_eq!(policy.separator, DEFAULT_SEPARATOR);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");

        let mut policy = RedactionPolicy::with_fields(["email", "iban"]);
        policy.separator = '|';
        policy.save(&path).unwrap();

        let loaded = RedactionPolicy::load(&path).unwrap();
        assert_eq!(loaded, policy);
    }

    #[test]
    fn test_load_rejects_invalid_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{"fields": []}"#).unwrap();

        assert!(RedactionPolicy::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = RedactionPolicy::load("/nonexistent/policy.json");
        assert!(matches!(result, Err(RedactionError::IoError(_))));
    }
}
