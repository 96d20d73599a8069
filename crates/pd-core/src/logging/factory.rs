//! The `user_data` logger.
//!
//! Rows containing personal data are logged through a dedicated logger that
//! redacts [`PII_FIELDS`](pd_redact::PII_FIELDS) before anything reaches
//! its output and never hands records to ancestor loggers.

use super::formatter::{RedactingFormatter, TemplateFormatter};
use super::handler::{Stdout, StreamHandler};
use super::registry::{Logger, LoggerBuilder, LoggerRegistry, ROOT_LOGGER};
use super::{LogError, DIAGNOSTIC_TARGETS};
use pd_redact::RedactionEngine;
use std::io;
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Name of the redacting logger.
pub const USER_DATA_LOGGER: &str = "user_data";

/// The `user_data` logger: INFO, no propagation, one stdout handler
/// redacting the default PII fields.
///
/// Repeated calls return the same logger with a single handler.
pub fn get_logger(registry: &LoggerRegistry) -> Arc<Logger> {
    get_logger_with(registry, io::stdout as Stdout)
}

/// [`get_logger`] writing to `writer` instead of stdout.
pub fn get_logger_with<W>(registry: &LoggerRegistry, writer: W) -> Arc<Logger>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    register_user_logger(
        registry,
        USER_DATA_LOGGER,
        LevelFilter::INFO,
        RedactionEngine::pii(),
        writer,
    )
}

/// A non-propagating logger named `name` with one redacting handler.
///
/// If `name` already exists the existing logger is returned and the other
/// arguments are ignored. Names that would resolve to the root logger or
/// capture pd-core's own diagnostics are rejected.
pub fn build_user_logger<W>(
    registry: &LoggerRegistry,
    name: &str,
    level: LevelFilter,
    engine: RedactionEngine,
    writer: W,
) -> Result<Arc<Logger>, LogError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    check_logger_name(name)?;
    Ok(register_user_logger(registry, name, level, engine, writer))
}

/// Whether `name` can be used for a redacting logger.
pub fn check_logger_name(name: &str) -> Result<(), LogError> {
    let reserved = |reason: &'static str| LogError::ReservedName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(reserved("name is empty"));
    }
    if name == ROOT_LOGGER {
        return Err(reserved("it is the root logger, which has no handlers"));
    }
    let captures_diagnostics = DIAGNOSTIC_TARGETS.iter().any(|target| {
        name == *target
            || name
                .strip_prefix(target)
                .is_some_and(|rest| rest.starts_with("::"))
    });
    if captures_diagnostics {
        return Err(reserved("it is a diagnostics target"));
    }
    Ok(())
}

fn register_user_logger<W>(
    registry: &LoggerRegistry,
    name: &str,
    level: LevelFilter,
    engine: RedactionEngine,
    writer: W,
) -> Arc<Logger>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    registry.get_or_create(name, move || {
        let formatter = RedactingFormatter::with_engine(TemplateFormatter::new(), engine);
        LoggerBuilder::new()
            .level(level)
            .propagate(false)
            .handler(StreamHandler::new(writer, formatter))
    })
}
