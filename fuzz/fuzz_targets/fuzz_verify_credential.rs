//! Fuzz target for credential verification.
//!
//! Arbitrary stored hashes must be rejected without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pd_redact::{CredentialHash, CredentialHasher, HashParams};

fuzz_target!(|data: (&[u8], &str)| {
    let (digest, password) = data;
    let hasher = CredentialHasher::new(HashParams::insecure_minimum()).expect("minimum params");

    let _ = hasher.verify(digest, password);
    let _ = hasher.needs_rehash(digest);
    if let Ok(encoded) = std::str::from_utf8(digest) {
        let _ = CredentialHash::parse(encoded);
    }
});
