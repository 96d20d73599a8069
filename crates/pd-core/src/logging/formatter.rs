//! Record formatters.
//!
//! [`TemplateFormatter`] renders a record as
//! `[TAG] <logger> <LEVEL> <timestamp>: <message>`. [`RedactingFormatter`]
//! wraps any [`RecordFormatter`] and redacts personal data fields in the
//! rendered text before it leaves the formatter.

use super::record::{LogRecord, RenderError};
use pd_redact::{RedactionEngine, RedactionPolicy, Result as RedactResult};
use std::fmt::Write;

/// Literal tag opening every rendered line.
pub const PRODUCT_TAG: &str = "HOLBERTON";

/// Timestamp layout: `2019-11-19 18:24:25,105`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Token substituted for redacted values.
pub const REDACTION: &str = "***";

/// Separator between `field=value` segments.
pub const SEPARATOR: char = ';';

/// Renders a record into a single line of text.
pub trait RecordFormatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> Result<String, RenderError>;
}

impl<F: RecordFormatter + ?Sized> RecordFormatter for Box<F> {
    fn format(&self, record: &LogRecord) -> Result<String, RenderError> {
        (**self).format(record)
    }
}

/// The base line template.
#[derive(Debug, Clone)]
pub struct TemplateFormatter {
    tag: String,
    timestamp_format: String,
}

impl TemplateFormatter {
    pub fn new() -> Self {
        Self {
            tag: PRODUCT_TAG.to_string(),
            timestamp_format: TIMESTAMP_FORMAT.to_string(),
        }
    }

    /// Replace the product tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Replace the chrono timestamp layout.
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }
}

impl Default for TemplateFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFormatter for TemplateFormatter {
    fn format(&self, record: &LogRecord) -> Result<String, RenderError> {
        let message = record.message()?;
        let mut line = String::with_capacity(message.len() + 64);
        write!(
            line,
            "[{}] {} {} {}: {}",
            self.tag,
            record.name,
            record.level,
            record.timestamp.format(&self.timestamp_format),
            message
        )
        .map_err(|_| RenderError::TimestampFormat {
            format: self.timestamp_format.clone(),
        })?;
        Ok(line)
    }
}

/// Redacts personal data fields in whatever the inner formatter renders.
///
/// The field list is fixed at construction.
#[derive(Debug, Clone)]
pub struct RedactingFormatter<F = TemplateFormatter> {
    inner: F,
    engine: RedactionEngine,
}

impl RedactingFormatter<TemplateFormatter> {
    /// Redact `fields` in the standard template with `***` and `;`.
    pub fn new<I, S>(fields: I) -> RedactResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::wrap(TemplateFormatter::new(), fields)
    }

    /// Redact the default PII fields in the standard template.
    pub fn pii() -> Self {
        Self::with_engine(TemplateFormatter::new(), RedactionEngine::pii())
    }
}

impl<F: RecordFormatter> RedactingFormatter<F> {
    /// Wrap `inner`, redacting `fields` with `***` and `;`.
    pub fn wrap<I, S>(inner: F, fields: I) -> RedactResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let policy = RedactionPolicy {
            fields: fields.into_iter().map(Into::into).collect(),
            redaction: REDACTION.to_string(),
            separator: SEPARATOR,
            ..RedactionPolicy::default()
        };
        Ok(Self::with_engine(inner, RedactionEngine::new(policy)?))
    }

    /// Wrap `inner` with an already validated engine.
    pub fn with_engine(inner: F, engine: RedactionEngine) -> Self {
        Self { inner, engine }
    }

    /// The redacted field names.
    pub fn fields(&self) -> &[String] {
        self.engine.fields()
    }
}

impl<F: RecordFormatter> RecordFormatter for RedactingFormatter<F> {
    fn format(&self, record: &LogRecord) -> Result<String, RenderError> {
        let text = self.inner.format(record)?;
        Ok(self.engine.redact(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tracing::Level;

    fn fixed_record(msg: &str) -> LogRecord {
        let ts = chrono::Local
            .with_ymd_and_hms(2019, 11, 19, 18, 24, 25)
            .single()
            .unwrap()
            + chrono::Duration::milliseconds(105);
        LogRecord::new("my_logger", Level::INFO, msg).with_timestamp(ts)
    }

    #[test]
    fn test_template_layout() {
        let line = TemplateFormatter::new()
            .format(&fixed_record("hello"))
            .unwrap();
        assert_eq!(line, "[HOLBERTON] my_logger INFO 2019-11-19 18:24:25,105: hello");
    }

    #[test]
    fn test_template_custom_tag() {
        let line = TemplateFormatter::new()
            .with_tag("ACME")
            .with_timestamp_format("%Y")
            .format(&fixed_record("x"))
            .unwrap();
        assert_eq!(line, "[ACME] my_logger INFO 2019: x");
    }

    #[test]
    fn test_bad_timestamp_format_is_an_error() {
        let err = TemplateFormatter::new()
            .with_timestamp_format("%Q")
            .format(&fixed_record("x"))
            .unwrap_err();
        assert!(matches!(err, RenderError::TimestampFormat { .. }));
    }

    #[test]
    fn test_redacting_formatter() {
        let formatter = RedactingFormatter::new(["email", "ssn", "password"]).unwrap();
        let record = fixed_record(
            "name=Bob;email=bob@dylan.com;ssn=000-123-0000;password=bobby2019;",
        );
        assert_eq!(
            formatter.format(&record).unwrap(),
            "[HOLBERTON] my_logger INFO 2019-11-19 18:24:25,105: name=Bob;email=***;ssn=***;password=***;"
        );
    }

    #[test]
    fn test_redacting_formatter_first_field_after_prefix() {
        let formatter = RedactingFormatter::pii();
        let out = formatter.format(&fixed_record("name=Bob; browser=Chrome;")).unwrap();
        assert!(out.ends_with(": name=***; browser=Chrome;"), "{out}");
    }

    #[test]
    fn test_redacts_interpolated_args() {
        let formatter = RedactingFormatter::pii();
        let record = fixed_record("email={}; plan={};").with_args(["a@b.c", "pro"]);
        let out = formatter.format(&record).unwrap();
        assert!(out.ends_with(": email=***; plan=pro;"), "{out}");
        assert!(!out.contains("a@b.c"));
    }

    #[test]
    fn test_render_error_propagates() {
        let formatter = RedactingFormatter::pii();
        let record = fixed_record("password={}; user={};").with_args(["hunter2"]);
        assert_eq!(
            formatter.format(&record).unwrap_err(),
            RenderError::ArgumentMismatch { expected: 2, provided: 1 }
        );
    }

    #[test]
    fn test_invalid_field_rejected() {
        assert!(RedactingFormatter::new(["bad=field"]).is_err());
    }

    #[test]
    fn test_wraps_any_formatter() {
        struct Bare;
        impl RecordFormatter for Bare {
            fn format(&self, record: &LogRecord) -> Result<String, RenderError> {
                record.message()
            }
        }

        let formatter = RedactingFormatter::wrap(Bare, ["token"]).unwrap();
        let out = formatter.format(&fixed_record("token=abc;id=1;")).unwrap();
        assert_eq!(out, "token=***;id=1;");
        assert_eq!(formatter.fields(), ["token"]);
    }
}
