//! Row sources.
//!
//! A row is an ordered list of `(column, value)` pairs, rendered for the
//! `user_data` logger as `col=value; col=value;`. Where rows come from is
//! behind [`RowSource`]; the CLI reads them from JSON lines.

use serde_json::Value;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Rendering of a missing value.
pub const NULL_VALUE: &str = "NULL";

/// Errors raised while reading rows.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read rows: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid JSON: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: expected a JSON object")]
    NotAnObject { line: usize },

    /// The column name or value would split into extra `name=value`
    /// segments. The value is never included in the message.
    #[error("column {column:?} cannot be rendered: {reason}")]
    Unrenderable { column: String, reason: &'static str },
}

/// One record from a data store, columns in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((column.into(), value.into()));
        self
    }

    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Render as `col=value{sep} col=value{sep}`.
    ///
    /// Fails if a column name contains the separator or `=`, or a value
    /// contains the separator: the redactor would read the remainder as
    /// another segment and leave it untouched.
    pub fn format(&self, separator: char) -> Result<String, SourceError> {
        let mut out = String::new();
        for (column, value) in &self.columns {
            if column.contains(separator) || column.contains('=') {
                return Err(unrenderable(column, "name contains the separator or '='"));
            }
            let rendered: Cow<'_, str> = match value {
                Value::Null => NULL_VALUE.into(),
                Value::String(s) => Cow::Borrowed(s),
                other => other.to_string().into(),
            };
            if rendered.contains(separator) {
                return Err(unrenderable(column, "value contains the separator"));
            }
            out.push_str(column);
            out.push('=');
            out.push_str(&rendered);
            out.push(separator);
            out.push(' ');
        }
        Ok(out.trim().to_string())
    }
}

fn unrenderable(column: &str, reason: &'static str) -> SourceError {
    SourceError::Unrenderable {
        column: column.to_string(),
        reason,
    }
}

impl From<serde_json::Map<String, Value>> for Row {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self {
            columns: map.into_iter().collect(),
        }
    }
}

/// Anything that yields rows.
pub trait RowSource {
    /// The next row, or `None` when exhausted.
    fn next_row(&mut self) -> Option<Result<Row, SourceError>>;
}

/// Rows as JSON objects, one per line. Blank lines are skipped.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// 1-based number of the last line read.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> RowSource for JsonLinesSource<R> {
    fn next_row(&mut self) -> Option<Result<Row, SourceError>> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(err) => return Some(Err(err.into())),
            }

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            let line = self.line;
            let parsed = serde_json::from_str::<Value>(text)
                .map_err(|source| SourceError::Parse { line, source })
                .and_then(|value| match value {
                    Value::Object(map) => Ok(Row::from(map)),
                    _ => Err(SourceError::NotAnObject { line }),
                });
            return Some(parsed);
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<Row, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row()
    }
}
