//! Named loggers.
//!
//! Loggers are created once per name through a [`LoggerRegistry`] and are
//! immutable afterwards: level, handlers and propagation are fixed by the
//! [`LoggerBuilder`] used when the name is first requested. Asking for the
//! same name again returns the same `Arc<Logger>`, never a second set of
//! handlers.
//!
//! Names are dotted paths. A logger's parent is the nearest registered
//! ancestor (`a.b.c` -> `a.b` -> `a`), or the root logger. Records handled
//! by a logger are passed up to its ancestors while `propagate` is set.

use super::handler::Handler;
use super::record::LogRecord;
use super::LogError;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;

/// Name of the logger at the top of every hierarchy.
pub const ROOT_LOGGER: &str = "root";

/// A named logger with a fixed level and handler set.
pub struct Logger {
    name: String,
    level: LevelFilter,
    propagate: bool,
    handlers: Vec<Box<dyn Handler>>,
    parent: Option<Arc<Logger>>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("propagate", &self.propagate)
            .field("handlers", &self.handlers.len())
            .field("parent", &self.parent.as_ref().map(|p| p.name.as_str()))
            .finish()
    }
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn propagates(&self) -> bool {
        self.propagate
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn parent(&self) -> Option<&Arc<Logger>> {
        self.parent.as_ref()
    }

    /// Whether a record at `level` passes this logger's threshold.
    pub fn is_enabled_for(&self, level: Level) -> bool {
        self.level >= level
    }

    /// Log a preformatted message.
    pub fn log(&self, level: Level, msg: impl Into<String>) -> Result<(), LogError> {
        if !self.is_enabled_for(level) {
            return Ok(());
        }
        self.handle(&LogRecord::new(self.name.clone(), level, msg))
    }

    /// Log a `{}` template with positional arguments.
    pub fn log_args<I, A>(&self, level: Level, template: &str, args: I) -> Result<(), LogError>
    where
        I: IntoIterator<Item = A>,
        A: Display,
    {
        if !self.is_enabled_for(level) {
            return Ok(());
        }
        let record = LogRecord::new(self.name.clone(), level, template).with_args(args);
        self.handle(&record)
    }

    pub fn debug(&self, msg: impl Into<String>) -> Result<(), LogError> {
        self.log(Level::DEBUG, msg)
    }

    pub fn info(&self, msg: impl Into<String>) -> Result<(), LogError> {
        self.log(Level::INFO, msg)
    }

    pub fn warn(&self, msg: impl Into<String>) -> Result<(), LogError> {
        self.log(Level::WARN, msg)
    }

    pub fn error(&self, msg: impl Into<String>) -> Result<(), LogError> {
        self.log(Level::ERROR, msg)
    }

    /// Dispatch a record to this logger's handlers and, while propagation
    /// allows, to its ancestors' handlers.
    ///
    /// Every eligible handler is tried; the first failure is returned.
    /// The record's own level is not re-checked against ancestor loggers,
    /// only against each handler.
    pub fn handle(&self, record: &LogRecord) -> Result<(), LogError> {
        let mut first_err = None;
        let mut current = Some(self);

        while let Some(logger) = current {
            for handler in &logger.handlers {
                if handler.level() < record.level {
                    continue;
                }
                if let Err(err) = handler.handle(record) {
                    first_err.get_or_insert(err);
                }
            }
            current = if logger.propagate {
                logger.parent.as_deref()
            } else {
                None
            };
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Configuration for a logger that does not exist yet.
pub struct LoggerBuilder {
    level: LevelFilter,
    propagate: bool,
    handlers: Vec<Box<dyn Handler>>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            propagate: true,
            handlers: Vec::new(),
        }
    }
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: impl Into<LevelFilter>) -> Self {
        self.level = level.into();
        self
    }

    pub fn propagate(mut self, propagate: bool) -> Self {
        self.propagate = propagate;
        self
    }

    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    fn build(self, name: &str, parent: Option<Arc<Logger>>) -> Logger {
        Logger {
            name: name.to_string(),
            level: self.level,
            propagate: self.propagate,
            handlers: self.handlers,
            parent,
        }
    }
}

/// Process-wide (or test-local) table of named loggers.
#[derive(Debug)]
pub struct LoggerRegistry {
    root: Arc<Logger>,
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerRegistry {
    /// Registry whose root logger has no handlers and a WARN threshold.
    pub fn new() -> Self {
        Self::with_root(LoggerBuilder::new().level(LevelFilter::WARN))
    }

    /// Registry with a custom root logger.
    pub fn with_root(root: LoggerBuilder) -> Self {
        Self {
            root: Arc::new(root.propagate(false).build(ROOT_LOGGER, None)),
            loggers: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> Arc<Logger> {
        Arc::clone(&self.root)
    }

    /// Look up an existing logger.
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        if name == ROOT_LOGGER {
            return Some(self.root());
        }
        self.loggers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, excluding the root.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .loggers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Return the logger called `name`, creating it with `configure` if
    /// it does not exist. `configure` runs at most once per name.
    pub fn get_or_create<F>(&self, name: &str, configure: F) -> Arc<Logger>
    where
        F: FnOnce() -> LoggerBuilder,
    {
        match self.try_get_or_create(name, || Ok::<_, std::convert::Infallible>(configure())) {
            Ok(logger) => logger,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`get_or_create`](Self::get_or_create). Nothing
    /// is registered when `configure` fails.
    pub fn try_get_or_create<F, E>(&self, name: &str, configure: F) -> Result<Arc<Logger>, E>
    where
        F: FnOnce() -> Result<LoggerBuilder, E>,
    {
        if let Some(logger) = self.get(name) {
            return Ok(logger);
        }

        let mut loggers = self.loggers.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race between the read and write locks.
        if let Some(logger) = loggers.get(name) {
            return Ok(Arc::clone(logger));
        }

        let parent = nearest_ancestor(&loggers, name).unwrap_or_else(|| Arc::clone(&self.root));
        let logger = Arc::new(configure()?.build(name, Some(parent)));
        loggers.insert(name.to_string(), Arc::clone(&logger));
        tracing::debug!(logger = name, "registered logger");
        Ok(logger)
    }
}

fn nearest_ancestor(loggers: &HashMap<String, Arc<Logger>>, name: &str) -> Option<Arc<Logger>> {
    let mut prefix = name;
    while let Some(idx) = prefix.rfind('.') {
        prefix = &prefix[..idx];
        if let Some(logger) = loggers.get(prefix) {
            return Some(Arc::clone(logger));
        }
    }
    None
}
