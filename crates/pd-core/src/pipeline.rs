//! Row logging loop.
//!
//! Pulls rows from a [`RowSource`], renders each one and logs it at INFO
//! through the redacting logger.

use crate::logging::{LogError, Logger};
use crate::source::{RowSource, SourceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Log(#[from] LogError),
}

/// Counts from one pass over a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub rows: usize,
    pub empty_rows: usize,
}

/// Log every row of `source` through `logger`.
///
/// Stops at the first source or logging error.
pub fn log_rows<S: RowSource + ?Sized>(
    source: &mut S,
    logger: &Logger,
    separator: char,
) -> Result<FilterSummary, PipelineError> {
    let mut summary = FilterSummary::default();

    while let Some(row) = source.next_row() {
        let row = row?;
        if row.is_empty() {
            summary.empty_rows += 1;
        }
        logger.info(row.format(separator)?)?;
        summary.rows += 1;
    }

    tracing::info!(
        rows = summary.rows,
        empty_rows = summary.empty_rows,
        logger = logger.name(),
        "rows processed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{get_logger_with, LoggerRegistry, MemoryWriter};
    use crate::source::JsonLinesSource;
    use std::io::Cursor;

    #[test]
    fn test_rows_are_logged_redacted() {
        let registry = LoggerRegistry::new();
        let out = MemoryWriter::new();
        let logger = get_logger_with(&registry, out.clone());

        let input = concat!(
            "{\"name\": \"Ann\", \"email\": \"ann@x.io\", \"phone\": \"555\", \"ssn\": \"1-2\", ",
            "\"password\": \"pw\", \"ip\": \"10.0.0.1\", \"last_login\": null}\n",
            "{\"name\": \"Bo\", \"user_agent\": \"curl\"}\n",
        );
        let mut source = JsonLinesSource::new(Cursor::new(input));
        let summary = log_rows(&mut source, &logger, ';').unwrap();

        assert_eq!(summary.rows, 2);
        let lines = out.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(
            ": name=***; email=***; phone=***; ssn=***; password=***; ip=10.0.0.1; last_login=NULL;"
        ));
        assert!(lines[1].ends_with(": name=***; user_agent=curl;"));
        for secret in ["Ann", "ann@x.io", "555", "1-2", "pw", "Bo"] {
            assert!(!out.contents().contains(&format!("={secret};")));
        }
    }

    #[test]
    fn test_value_with_separator_is_not_logged() {
        let registry = LoggerRegistry::new();
        let out = MemoryWriter::new();
        let logger = get_logger_with(&registry, out.clone());

        let input = concat!(
            "{\"name\": \"Ann\", \"plan\": \"pro\"}\n",
            "{\"password\": \"abc;leaked-secret\", \"plan\": \"pro\"}\n",
        );
        let mut source = JsonLinesSource::new(Cursor::new(input));
        let err = log_rows(&mut source, &logger, ';').unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Source(SourceError::Unrenderable { .. })
        ));
        assert_eq!(out.lines().len(), 1);
        assert!(!out.contents().contains("leaked-secret"));
    }

    #[test]
    fn test_source_error_stops() {
        let registry = LoggerRegistry::new();
        let out = MemoryWriter::new();
        let logger = get_logger_with(&registry, out.clone());

        let mut source = JsonLinesSource::new(Cursor::new("{\"a\": 1}\nbroken\n{\"b\": 2}\n"));
        let err = log_rows(&mut source, &logger, ';').unwrap_err();

        assert!(matches!(err, PipelineError::Source(SourceError::Parse { line: 2, .. })));
        assert_eq!(out.lines().len(), 1);
    }
}
