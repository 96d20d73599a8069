//! Policy-bound redaction engine.
//!
//! The engine freezes a validated [`RedactionPolicy`]; the field list it
//! redacts cannot change for the lifetime of the engine. Engines are
//! `Send + Sync` and cheap to clone.

use crate::filter::{field_names, filter_datum};
use crate::{RedactionPolicy, Result};
use std::path::Path;
use std::sync::Arc;

/// Applies a fixed redaction policy to `name=value` messages.
#[derive(Debug, Clone)]
pub struct RedactionEngine {
    policy: Arc<RedactionPolicy>,
}

impl RedactionEngine {
    /// Create an engine from a policy, rejecting policies that cannot be
    /// applied reliably.
    pub fn new(policy: RedactionPolicy) -> Result<Self> {
        policy.validate()?;
        tracing::debug!(
            fields = policy.fields.len(),
            separator = %policy.separator,
            "redaction policy loaded"
        );
        Ok(Self {
            policy: Arc::new(policy),
        })
    }

    /// Engine for the default PII field set, token and separator.
    pub fn pii() -> Self {
        Self {
            policy: Arc::new(RedactionPolicy::default()),
        }
    }

    /// Load an engine from a policy file.
    pub fn load<P: AsRef<Path>>(policy_path: P) -> Result<Self> {
        Self::new(RedactionPolicy::load(policy_path)?)
    }

    /// Redact every sensitive field in `message`.
    pub fn redact(&self, message: &str) -> String {
        filter_datum(
            &self.policy.fields,
            &self.policy.redaction,
            message,
            self.policy.separator,
        )
    }

    /// Sensitive field names present in `message`, in order of appearance.
    pub fn sensitive_fields_in<'m>(&self, message: &'m str) -> Vec<&'m str> {
        field_names(message, self.policy.separator)
            .into_iter()
            .filter(|name| self.policy.is_sensitive(name))
            .collect()
    }

    /// The redacted field names.
    pub fn fields(&self) -> &[String] {
        &self.policy.fields
    }

    /// The replacement token.
    pub fn redaction(&self) -> &str {
        &self.policy.redaction
    }

    /// The segment separator.
    pub fn separator(&self) -> char {
        self.policy.separator
    }

    /// Get a reference to the policy.
    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }
}
