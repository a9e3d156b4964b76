//! Deterministic INI serialization.

use std::fmt::Write;

use super::document::ManifestDocument;

/// Serialize a document to INI text.
///
/// Each section is written as a `[name]` header, its `key=value` lines in
/// insertion order, and a trailing blank line. Multi-line values are written
/// with tab-indented continuation lines, which [`parse`](super::parse) reads
/// back into the same value.
pub fn serialize(doc: &ManifestDocument) -> String {
    let mut out = String::new();
    for section in doc.sections() {
        // Writing to a String cannot fail
        let _ = writeln!(out, "[{}]", section.name());
        for (key, value) in section.entries() {
            let mut lines = value.split('\n');
            let _ = writeln!(out, "{}={}", key, lines.next().unwrap_or_default());
            for continuation in lines {
                let _ = writeln!(out, "\t{}", continuation);
            }
        }
        out.push('\n');
    }
    out
}
