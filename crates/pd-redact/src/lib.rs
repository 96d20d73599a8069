//! Redaction and credential hashing for personal data.
//!
//! This crate protects sensitive data at two boundaries:
//!
//! - **Log output**: messages built from `field=value` segments have the
//!   values of personally identifiable fields replaced with a fixed token
//!   before they are written anywhere.
//! - **Authentication**: credentials are stored only as salted Argon2id
//!   hashes and verified in constant time.
//!
//! # Key Features
//!
//! - **Segment-exact matching**: a field is matched by its whole name, never
//!   as a substring of another field or of a value.
//! - **Frozen policies**: a [`RedactionEngine`] validates its policy once and
//!   never changes it afterwards.
//! - **Fail-closed verification**: malformed or truncated hashes never verify.
//!
//! # Example
//!
//! ```
//! use pd_redact::{CredentialHasher, HashParams, RedactionEngine};
//!
//! let engine = RedactionEngine::pii();
//! let out = engine.redact("name=Bob; ssn=123-45-6789; browser=Firefox;");
//! assert_eq!(out, "name=***; ssn=***; browser=Firefox;");
//!
//! let hasher = CredentialHasher::new(HashParams::insecure_minimum()).unwrap();
//! let hash = hasher.hash("hunter2").unwrap();
//! assert!(hasher.verify(hash.as_bytes(), "hunter2"));
//! ```

pub mod credential;
pub mod engine;
pub mod error;
pub mod filter;
pub mod policy;

pub use credential::{
    hash_password, is_valid, CredentialHash, CredentialHasher, HashParams, VERIFY_CEILING,
};
pub use engine::RedactionEngine;
pub use error::{RedactionError, Result};
pub use filter::{field_names, filter_datum};
pub use policy::{
    RedactionPolicy, DEFAULT_REDACTION, DEFAULT_SEPARATOR, PII_FIELDS, POLICY_SCHEMA_VERSION,
};
