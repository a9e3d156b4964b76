//! Ordered INI document model.

use std::fmt;

/// A named section holding ordered, unique key/value entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    /// Create an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a value by key (case-sensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a value.
    ///
    /// An existing key keeps its position and has its value replaced; a new
    /// key is appended. Returns the previous value, if any.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Iterate entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An INI document: ordered sections with unique names.
///
/// Insertion order is preserved so that serializing the same logical content
/// always produces the same text, keeping committed output diffs minimal.
///
/// # Example
///
/// ```
/// use manifest_sync::ini::ManifestDocument;
///
/// let mut doc = ManifestDocument::new();
/// doc.section_mut("Scenario1").set("url", "http://example/s1");
///
/// assert_eq!(doc.get("Scenario1", "url"), Some("http://example/s1"));
/// assert_eq!(doc.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDocument {
    sections: Vec<Section>,
}

impl ManifestDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Get a section for modification, creating it at the end if missing.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        let position = match self.sections.iter().position(|s| s.name == name) {
            Some(position) => position,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[position]
    }

    /// Insert a whole section.
    ///
    /// A section with the same name is replaced in place.
    pub fn insert_section(&mut self, section: Section) {
        match self.sections.iter_mut().find(|s| s.name == section.name) {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Shorthand for a value lookup in a named section.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Iterate sections in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl fmt::Display for ManifestDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::serialize(self))
    }
}

impl FromIterator<Section> for ManifestDocument {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        let mut doc = ManifestDocument::new();
        for section in iter {
            doc.insert_section(section);
        }
        doc
    }
}
