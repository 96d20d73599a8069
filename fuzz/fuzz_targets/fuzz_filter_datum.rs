//! Fuzz target for field redaction.
//!
//! Arbitrary fields, tokens and messages must never panic, and redaction
//! must keep the number of segments.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pd_redact::filter_datum;

#[derive(Debug, Arbitrary)]
struct Input {
    fields: Vec<String>,
    redaction: String,
    message: String,
    separator: char,
}

fuzz_target!(|input: Input| {
    let out = filter_datum(&input.fields, &input.redaction, &input.message, input.separator);

    if !input.redaction.contains(input.separator) {
        assert_eq!(
            out.split(input.separator).count(),
            input.message.split(input.separator).count()
        );
    }
});
