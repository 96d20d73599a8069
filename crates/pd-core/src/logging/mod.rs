//! Logging for pd-core.
//!
//! Two kinds of output share one `tracing` subscriber:
//! - diagnostics about the tool itself, on stderr (human or JSONL)
//! - records from registered loggers such as `user_data`, which carry
//!   personal data and are formatted and redacted by their own handlers
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use pd_core::logging::{get_logger, init_logging, LogConfig, LoggerRegistry};
//!
//! let registry = Arc::new(LoggerRegistry::new());
//! let logger = get_logger(&registry);
//! init_logging(&LogConfig::from_env(None, None), Arc::clone(&registry)).unwrap();
//!
//! logger.info("name=Bob; email=bob@dylan.com; plan=pro;").unwrap();
//! tracing::info!(target: "user_data", "ssn={};", "000-12-3456");
//! ```
//!
//! # Design Notes
//!
//! - Events targeted at a registered logger never reach the diagnostics
//!   layer, so unredacted rows cannot leak to stderr
//! - Register loggers before calling [`init_logging`]

pub mod config;
pub mod factory;
pub mod formatter;
pub mod handler;
pub mod layer;
pub mod record;
pub mod registry;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use factory::{
    build_user_logger, check_logger_name, get_logger, get_logger_with, USER_DATA_LOGGER,
};
pub use formatter::{
    RecordFormatter, RedactingFormatter, TemplateFormatter, PRODUCT_TAG, REDACTION, SEPARATOR,
    TIMESTAMP_FORMAT,
};
pub use handler::{Handler, MemoryWriter, Stdout, StreamHandler};
pub use layer::LoggerLayer;
pub use record::{LogRecord, RenderError};
pub use registry::{Logger, LoggerBuilder, LoggerRegistry, ROOT_LOGGER};

use std::io::{self, IsTerminal};
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::filter::{filter_fn, FilterExt};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Targets of pd-core's own diagnostics.
pub const DIAGNOSTIC_TARGETS: [&str; 2] = ["pd_core", "pd_redact"];

/// Errors raised while emitting or setting up logging.
#[derive(Debug, Error)]
pub enum LogError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to write log record: {0}")]
    Io(#[from] io::Error),

    #[error("failed to initialize logging: {0}")]
    Init(String),

    #[error("logger name {name:?} is reserved: {reason}")]
    ReservedName { name: String, reason: &'static str },
}

/// Install the global subscriber.
///
/// Diagnostics go to stderr, filtered by `RUST_LOG` when set and otherwise
/// by `config.level` for pd-core and pd-redact. Events whose target is a
/// logger in `registry` are routed to that logger instead.
pub fn init_logging(config: &LogConfig, registry: Arc<LoggerRegistry>) -> Result<(), LogError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let directives: Vec<String> = DIAGNOSTIC_TARGETS
                .iter()
                .map(|target| format!("{target}={}", config.level))
                .collect();
            EnvFilter::new(directives.join(","))
        });

    let user_targets = Arc::clone(&registry);
    let diagnostics_filter =
        env_filter.and(filter_fn(move |meta| !user_targets.contains(meta.target())));

    let diagnostics: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_ansi(io::stderr().is_terminal());
            if config.timestamps {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
        LogFormat::Jsonl => fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(diagnostics.with_filter(diagnostics_filter))
        .with(LoggerLayer::new(registry))
        .try_init()
        .map_err(|err| LogError::Init(err.to_string()))
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("run-{}", &uuid.simple().to_string()[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_run_id() {
        let id1 = generate_run_id();
        let id2 = generate_run_id();

        assert!(id1.starts_with("run-"));
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 16);
        assert!(id1[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_log_error_display() {
        let err = LogError::from(RenderError::ArgumentMismatch {
            expected: 1,
            provided: 0,
        });
        assert_eq!(
            err.to_string(),
            "message expects 1 argument(s) but 0 were provided"
        );
    }
}
