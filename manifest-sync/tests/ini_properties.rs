//! Property tests for the INI parser and serializer.
//!
//! Run with: `cargo test --test ini_properties`

use std::collections::BTreeMap;

use proptest::prelude::*;

use manifest_sync::ini::{parse, serialize, ManifestDocument, ParseErrorKind, Section};

// ============================================================================
// Strategies
// ============================================================================

fn section_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_. -]{0,10}[A-Za-z0-9]"
}

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}"
}

/// One value line: no leading/trailing whitespace, no comment marker first.
fn value_line() -> impl Strategy<Value = String> {
    "[A-Za-z0-9/._?&=:-]([A-Za-z0-9 /._?&=:-]{0,18}[A-Za-z0-9/._?&=:-])?"
}

fn value() -> impl Strategy<Value = String> {
    (
        prop::option::of(value_line()),
        prop::collection::vec(value_line(), 0..3),
    )
        .prop_map(|(first, rest)| {
            let mut lines = vec![first.unwrap_or_default()];
            lines.extend(rest);
            lines.join("\n")
        })
}

fn document() -> impl Strategy<Value = ManifestDocument> {
    prop::collection::btree_map(
        section_name(),
        prop::collection::btree_map(key(), value(), 0..5),
        0..6,
    )
    .prop_map(|sections: BTreeMap<String, BTreeMap<String, String>>| {
        sections
            .into_iter()
            .map(|(name, entries)| {
                let mut section = Section::new(name);
                for (k, v) in entries {
                    section.set(k, v);
                }
                section
            })
            .collect()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn test_serialize_then_parse_is_identity(doc in document()) {
        let text = serialize(&doc);
        let parsed = parse(&text);
        prop_assert_eq!(parsed, Ok(doc), "serialized text:\n{}", text);
    }

    #[test]
    fn test_parse_is_deterministic(doc in document()) {
        let text = serialize(&doc);
        prop_assert_eq!(parse(&text), parse(&text));
        prop_assert_eq!(serialize(&doc), text);
    }

    #[test]
    fn test_entry_before_header_is_rejected(k in key(), v in value_line(), doc in document()) {
        let text = format!("{}={}\n{}", k, v, serialize(&doc));
        let err = parse(&text).unwrap_err();
        prop_assert_eq!(err.line, 1);
        prop_assert_eq!(err.kind, ParseErrorKind::EntryOutsideSection);
    }

    #[test]
    fn test_section_order_is_preserved(doc in document()) {
        let parsed = parse(&serialize(&doc)).unwrap();
        let expected: Vec<_> = doc.section_names().collect();
        let actual: Vec<_> = parsed.section_names().collect();
        prop_assert_eq!(actual, expected);
    }
}
