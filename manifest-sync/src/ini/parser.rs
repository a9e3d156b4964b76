//! Strict line-oriented INI parser.
//!
//! Accepted syntax:
//!
//! ```text
//! ; comment            # comment
//! [Section]
//! key=value
//! other: value
//! multi=first line
//!     continued line
//! ```
//!
//! Anything else is rejected with a [`ParseError`] carrying the line number;
//! a document is never returned partially parsed.

use super::document::{ManifestDocument, Section};
use super::error::{ParseError, ParseErrorKind};

/// Parse INI text into a [`ManifestDocument`].
///
/// # Example
///
/// ```
/// use manifest_sync::ini::parse;
///
/// let doc = parse("[Scenario1]\nurl=http://example/s1.json\n").unwrap();
/// assert_eq!(doc.get("Scenario1", "url"), Some("http://example/s1.json"));
///
/// assert!(parse("url=http://example/s1.json\n").is_err());
/// ```
pub fn parse(text: &str) -> Result<ManifestDocument, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut doc = ManifestDocument::new();
    let mut current: Option<Section> = None;
    // Key whose value may still be extended by indented continuation lines.
    let mut open_key: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            open_key = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if raw.starts_with(char::is_whitespace) {
            if let (Some(section), Some(key)) = (current.as_mut(), open_key.as_ref()) {
                let mut value = section.get(key).unwrap_or_default().to_string();
                value.push('\n');
                value.push_str(trimmed);
                section.set(key.clone(), value);
                continue;
            }
        }

        if trimmed.starts_with('[') {
            let name = parse_header(line, trimmed)?;
            if doc.contains_section(&name)
                || current.as_ref().is_some_and(|s| s.name() == name)
            {
                return Err(ParseError::new(
                    line,
                    ParseErrorKind::DuplicateSection(name),
                    trimmed,
                ));
            }
            if let Some(finished) = current.replace(Section::new(name)) {
                doc.insert_section(finished);
            }
            open_key = None;
            continue;
        }

        let (key, value) = parse_entry(line, trimmed)?;
        let section = current
            .as_mut()
            .ok_or_else(|| ParseError::new(line, ParseErrorKind::EntryOutsideSection, trimmed))?;
        if section.contains_key(key) {
            return Err(ParseError::new(
                line,
                ParseErrorKind::DuplicateKey {
                    section: section.name().to_string(),
                    key: key.to_string(),
                },
                trimmed,
            ));
        }
        section.set(key, value);
        open_key = Some(key.to_string());
    }

    if let Some(finished) = current {
        doc.insert_section(finished);
    }
    Ok(doc)
}

fn parse_header(line: usize, trimmed: &str) -> Result<String, ParseError> {
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| ParseError::new(line, ParseErrorKind::UnbalancedHeader, trimmed))?;

    let name = inner.trim();
    if name.is_empty() {
        return Err(ParseError::new(
            line,
            ParseErrorKind::EmptySectionName,
            trimmed,
        ));
    }
    Ok(name.to_string())
}

fn parse_entry(line: usize, trimmed: &str) -> Result<(&str, &str), ParseError> {
    let Some(delimiter) = trimmed.find(['=', ':']) else {
        // `Name]` is a header missing its opening bracket
        let kind = if trimmed.ends_with(']') {
            ParseErrorKind::UnbalancedHeader
        } else {
            ParseErrorKind::MalformedEntry
        };
        return Err(ParseError::new(line, kind, trimmed));
    };

    let key = trimmed[..delimiter].trim();
    let value = trimmed[delimiter + 1..].trim();
    if key.is_empty() {
        return Err(ParseError::new(line, ParseErrorKind::EmptyKey, trimmed));
    }
    Ok((key, value))
}
