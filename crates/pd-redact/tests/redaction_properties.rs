//! Property-based tests for field redaction invariants.

use pd_redact::{filter_datum, CredentialHasher, HashParams};
use proptest::prelude::*;

const FIELDS: &[&str] = &["name", "email", "phone", "ssn", "password"];

fn field_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(FIELDS).prop_map(str::to_string),
        "[a-z_]{1,10}",
    ]
}

/// Values may contain anything except the separator, including `=` and spaces.
fn value_strategy() -> impl Strategy<Value = String> {
    "[^;]{0,20}"
}

fn message_strategy() -> impl Strategy<Value = (Vec<(String, String)>, bool, bool)> {
    (
        prop::collection::vec((field_name_strategy(), value_strategy()), 0..8),
        any::<bool>(),
        any::<bool>(),
    )
}

fn render((segments, spaced, trailing): &(Vec<(String, String)>, bool, bool)) -> String {
    let joiner = if *spaced { "; " } else { ";" };
    let mut msg = segments
        .iter()
        .map(|(f, v)| format!("{f}={v}"))
        .collect::<Vec<_>>()
        .join(joiner);
    if *trailing && !segments.is_empty() {
        msg.push(';');
    }
    msg
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn redaction_is_idempotent(input in message_strategy()) {
        let msg = render(&input);
        let once = filter_datum(FIELDS, "***", &msg, ';');
        let twice = filter_datum(FIELDS, "***", &once, ';');
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn segment_count_is_preserved(input in message_strategy()) {
        let msg = render(&input);
        let out = filter_datum(FIELDS, "***", &msg, ';');
        prop_assert_eq!(msg.matches(';').count(), out.matches(';').count());
    }

    #[test]
    fn non_sensitive_segments_unchanged(input in message_strategy()) {
        let msg = render(&input);
        let out = filter_datum(FIELDS, "***", &msg, ';');

        for (before, after) in msg.split(';').zip(out.split(';')) {
            let name = before
                .split('=')
                .next()
                .map(str::trim_start)
                .unwrap_or_default();
            if before.contains('=') && FIELDS.contains(&name) {
                prop_assert_eq!(after, format!("{}***", &before[..=before.find('=').unwrap()]));
            } else {
                prop_assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn arbitrary_text_never_panics(msg in ".{0,64}", sep in prop::sample::select(vec![';', '|', ',', '&'])) {
        let out = filter_datum(FIELDS, "***", &msg, sep);
        prop_assert_eq!(msg.matches(sep).count(), out.matches(sep).count());
    }
}

proptest! {
    // Each case runs the hash primitive; keep the count low.
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn hash_verifies_only_its_own_plaintext(p in ".{0,24}", q in ".{0,24}") {
        let hasher = CredentialHasher::new(HashParams::insecure_minimum()).unwrap();
        let hash = hasher.hash(&p).unwrap();
        prop_assert!(hasher.verify(hash.as_bytes(), &p));
        if p != q {
            prop_assert!(!hasher.verify(hash.as_bytes(), &q));
        }
    }
}
