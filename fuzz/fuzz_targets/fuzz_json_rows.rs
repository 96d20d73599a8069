//! Fuzz target for JSONL row input.
//!
//! Arbitrary bytes must yield rows or errors, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pd_core::source::{JsonLinesSource, RowSource};

fuzz_target!(|data: &[u8]| {
    let mut source = JsonLinesSource::new(data);
    while let Some(row) = source.next_row() {
        if let Ok(row) = row {
            let _ = row.format(';');
        }
    }
});
