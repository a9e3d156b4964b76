//! Parse error types.

use thiserror::Error;

/// Category of INI syntax violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A `[` header without its closing `]`, or text after the `]`.
    #[error("unbalanced section header")]
    UnbalancedHeader,

    /// `[]` or `[   ]`.
    #[error("empty section name")]
    EmptySectionName,

    /// A section name that already appeared earlier in the document.
    #[error("duplicate section '{0}'")]
    DuplicateSection(String),

    /// A key/value line before the first section header.
    #[error("key/value entry outside of any section")]
    EntryOutsideSection,

    /// A line that is neither a header, a comment, nor `key=value`.
    #[error("expected 'key=value' or 'key: value'")]
    MalformedEntry,

    /// `=value` with nothing before the delimiter.
    #[error("empty key")]
    EmptyKey,

    /// A key repeated within the same section.
    #[error("duplicate key '{key}' in section '{section}'")]
    DuplicateKey { section: String, key: String },
}

/// An INI syntax error with the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}: `{text}`")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    pub kind: ParseErrorKind,
    /// The offending line, trimmed.
    pub text: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, kind: ParseErrorKind, text: &str) -> Self {
        Self {
            line,
            kind,
            text: text.trim().to_string(),
        }
    }
}
