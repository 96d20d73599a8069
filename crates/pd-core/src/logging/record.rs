//! Log records and message interpolation.

use chrono::{DateTime, Local};
use std::fmt::Display;
use thiserror::Error;
use tracing::Level;

/// A record could not be rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The number of `{}` placeholders differs from the number of arguments.
    #[error("message expects {expected} argument(s) but {provided} were provided")]
    ArgumentMismatch { expected: usize, provided: usize },

    /// A lone `{` or `}` that is neither a placeholder nor an escape.
    #[error("unbalanced brace at byte {position} of message template")]
    UnbalancedBrace { position: usize },

    /// The timestamp layout contains an unknown specifier.
    #[error("invalid timestamp format {format:?}")]
    TimestampFormat { format: String },
}

/// A single logging event as seen by handlers and formatters.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Name of the logger that created the record.
    pub name: String,
    /// Severity.
    pub level: Level,
    /// Creation time.
    pub timestamp: DateTime<Local>,
    /// Message template; `{}` placeholders are filled from `args`.
    pub msg: String,
    /// Positional substitution arguments, already stringified.
    pub args: Vec<String>,
}

impl LogRecord {
    /// Create a record stamped with the current local time.
    pub fn new(name: impl Into<String>, level: Level, msg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level,
            timestamp: Local::now(),
            msg: msg.into(),
            args: Vec::new(),
        }
    }

    /// Attach positional arguments.
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Display,
    {
        self.args = args.into_iter().map(|a| a.to_string()).collect();
        self
    }

    /// Override the creation time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The message with arguments interpolated.
    ///
    /// A record without arguments renders its template verbatim, braces
    /// included.
    pub fn message(&self) -> Result<String, RenderError> {
        if self.args.is_empty() {
            return Ok(self.msg.clone());
        }
        interpolate(&self.msg, &self.args)
    }
}

/// Fill `{}` placeholders in order; `{{` and `}}` are literal braces.
pub fn interpolate(template: &str, args: &[String]) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
    let mut placeholders = 0;
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => match chars.peek() {
                Some((_, '{')) => {
                    chars.next();
                    out.push('{');
                }
                Some((_, '}')) => {
                    chars.next();
                    if let Some(arg) = args.get(placeholders) {
                        out.push_str(arg);
                    }
                    placeholders += 1;
                }
                _ => return Err(RenderError::UnbalancedBrace { position: pos }),
            },
            '}' => match chars.peek() {
                Some((_, '}')) => {
                    chars.next();
                    out.push('}');
                }
                _ => return Err(RenderError::UnbalancedBrace { position: pos }),
            },
            _ => out.push(c),
        }
    }

    if placeholders != args.len() {
        return Err(RenderError::ArgumentMismatch {
            expected: placeholders,
            provided: args.len(),
        });
    }

    Ok(out)
}
