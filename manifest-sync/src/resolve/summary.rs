//! Per-manifest resolution tally.

use crate::mode::ManifestKind;

/// An entry whose payload could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub name: String,
    pub location: String,
    pub reason: String,
}

/// Outcome of resolving one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveSummary {
    pub kind: ManifestKind,
    /// Sections in the input manifest.
    pub total: usize,
    pub resolved: Vec<String>,
    pub failed: Vec<EntryFailure>,
    /// Sections without a location key.
    pub skipped: Vec<String>,
}

impl ResolveSummary {
    pub fn new(kind: ManifestKind, total: usize) -> Self {
        Self {
            kind,
            total,
            resolved: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn record_resolved(&mut self, name: &str) {
        self.resolved.push(name.to_string());
    }

    pub fn record_failure(&mut self, failure: EntryFailure) {
        self.failed.push(failure);
    }

    pub fn record_skipped(&mut self, name: &str) {
        self.skipped.push(name.to_string());
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Entries written to the output, resolved or marked failed.
    pub fn written(&self) -> usize {
        self.resolved.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut summary = ResolveSummary::new(ManifestKind::ContentPacks, 3);
        summary.record_resolved("a");
        summary.record_skipped("b");
        assert!(!summary.has_failures());

        summary.record_failure(EntryFailure {
            name: "c".into(),
            location: "http://h/c".into(),
            reason: "not found".into(),
        });
        assert!(summary.has_failures());
        assert_eq!(summary.written(), 2);
        assert_eq!(summary.total, 3);
    }
}
