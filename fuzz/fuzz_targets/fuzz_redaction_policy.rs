//! Fuzz target for redaction policy parsing.
//!
//! Any policy that parses and validates must be usable by the engine.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pd_redact::{RedactionEngine, RedactionPolicy};

fuzz_target!(|data: &[u8]| {
    let Ok(policy) = serde_json::from_slice::<RedactionPolicy>(data) else {
        return;
    };
    if policy.validate().is_err() {
        return;
    }
    let engine = RedactionEngine::new(policy).expect("validated policy");
    let once = engine.redact("name=a; email=b; other=c;");
    assert_eq!(engine.redact(&once), once);
});
