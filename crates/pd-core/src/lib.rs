//! Personal Data Core Library
//!
//! This library provides the logging side of personal data handling:
//! - Record formatting with field redaction
//! - A registry of named loggers and the `user_data` logger factory
//! - Configuration loading and validation
//! - Row sources and the row logging loop
//! - Exit codes for CLI operations
//!
//! Redaction and credential hashing live in `pd-redact`.
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod pipeline;
pub mod source;

pub use pd_redact::{filter_datum, hash_password, is_valid, PII_FIELDS};
