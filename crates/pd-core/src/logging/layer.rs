//! Bridge from `tracing` events to registered loggers.
//!
//! An event whose target names a logger in the [`LoggerRegistry`] is turned
//! into a [`LogRecord`] and handed to that logger, so
//! `tracing::info!(target: "user_data", "email={}", email)` goes through the
//! same redacting handler as a direct `Logger::info` call. Events for other
//! targets are ignored here and left to the diagnostics layers.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use super::record::LogRecord;
use super::registry::LoggerRegistry;

/// Collects an event's message and extra fields into one line.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        let _ = write!(self.fields, " {}={};", name, value);
    }

    fn into_message(self) -> String {
        if self.fields.is_empty() {
            return self.message;
        }
        if self.message.is_empty() {
            return self.fields.trim_start().to_string();
        }
        self.message + &self.fields
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}

/// Forwards events targeted at registered loggers.
#[derive(Debug, Clone)]
pub struct LoggerLayer {
    registry: Arc<LoggerRegistry>,
}

impl LoggerLayer {
    pub fn new(registry: Arc<LoggerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<LoggerRegistry> {
        &self.registry
    }
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let Some(logger) = self.registry.get(meta.target()) else {
            return;
        };
        if !logger.is_enabled_for(*meta.level()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let record = LogRecord::new(logger.name(), *meta.level(), visitor.into_message());
        if let Err(err) = logger.handle(&record) {
            // Never route a failure back through tracing: it would re-enter this layer.
            eprintln!("pd-core: failed to write {} record: {}", logger.name(), err);
        }
    }
}
