//! Field-level redaction of `name=value` messages.
//!
//! A message is a sequence of segments separated by a single character.
//! Each segment looks like `name=value`; the value runs up to the next
//! separator (or end of input) and may itself contain `=`. Matching is
//! done by scanning segments, never by building a pattern out of field
//! names, so field names carry no special meaning.

use std::borrow::Cow;

/// Replace the value of every segment whose field name is in `fields`.
///
/// The field name, the `=` and the trailing separator are kept verbatim;
/// segments naming any other field are copied through byte for byte.
///
/// The field name of a segment is the whitespace-free token immediately
/// before its first `=`. Text ahead of that token (a log line prefix, or
/// the space that usually follows a separator) is preserved.
///
/// ```
/// use pd_redact::filter_datum;
///
/// let out = filter_datum(&["email", "ssn"], "***", "email=a@b.com;ssn=123-45;phone=555;", ';');
/// assert_eq!(out, "email=***;ssn=***;phone=555;");
/// ```
pub fn filter_datum<S: AsRef<str>>(
    fields: &[S],
    redaction: &str,
    message: &str,
    separator: char,
) -> String {
    let mut out = String::with_capacity(message.len());

    for (i, segment) in message.split(separator).enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push_str(&redact_segment(fields, redaction, segment));
    }

    out
}

/// Redact a single segment (separator already stripped).
fn redact_segment<'a, S: AsRef<str>>(
    fields: &[S],
    redaction: &str,
    segment: &'a str,
) -> Cow<'a, str> {
    let Some(eq) = segment.find('=') else {
        return Cow::Borrowed(segment);
    };

    let name = segment_field_name(&segment[..eq]);
    if name.is_empty() || !fields.iter().any(|f| f.as_ref() == name) {
        return Cow::Borrowed(segment);
    }

    let mut redacted = String::with_capacity(eq + 1 + redaction.len());
    redacted.push_str(&segment[..=eq]);
    redacted.push_str(redaction);
    Cow::Owned(redacted)
}

/// The trailing whitespace-free token of the text before `=`.
fn segment_field_name(key: &str) -> &str {
    let start = key
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    &key[start..]
}

/// Field names found in `message`, in order of appearance (duplicates kept).
///
/// Useful for auditing which attributes a message carries without
/// looking at any value.
pub fn field_names(message: &str, separator: char) -> Vec<&str> {
    message
        .split(separator)
        .filter_map(|segment| segment.find('=').map(|eq| segment_field_name(&segment[..eq])))
        .filter(|name| !name.is_empty())
        .collect()
}
