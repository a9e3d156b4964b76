//! Per-entry resolution of a manifest into a download manifest.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::payload::{decode_payload, payload_url, PayloadError};
use super::summary::{EntryFailure, ResolveSummary};
use crate::fetch::{format_commit_date, CommitHistory, CommitQuery, HttpClient, RetryPolicy};
use crate::ini::{ManifestDocument, Section};
use crate::mode::ManifestKind;

/// Keys naming an entry's remote location, in order of preference.
pub const SOURCE_KEYS: [&str; 2] = ["external", "url"];

/// Output key holding the entry's location.
pub const URL_KEY: &str = "url";

/// Output key holding the newest commit date of the location.
pub const LATEST_UPDATE_KEY: &str = "latest_update";

/// Output key recording why an entry could not be resolved.
pub const ERROR_KEY: &str = "sync_error";

/// Output of resolving one manifest.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub document: ManifestDocument,
    pub summary: ResolveSummary,
}

/// Resolves manifest entries by fetching their payloads.
///
/// Entries are processed sequentially and independently: a failure is
/// recorded on the entry and the remaining entries still resolve.
pub struct ManifestResolver {
    http: Arc<dyn HttpClient>,
    history: Option<Arc<dyn CommitHistory>>,
    retry: RetryPolicy,
}

impl ManifestResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            history: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Stamp entries with `latest_update` from this history.
    pub fn with_history(mut self, history: Arc<dyn CommitHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resolve every section of `manifest`.
    pub fn resolve(&self, kind: ManifestKind, manifest: &ManifestDocument) -> Resolution {
        let mut document = ManifestDocument::new();
        let mut summary = ResolveSummary::new(kind, manifest.len());

        for entry in manifest.sections() {
            let Some(location) = source_location(entry) else {
                warn!(kind = %kind, entry = entry.name(), "Entry has no 'external' or 'url' key, skipping");
                summary.record_skipped(entry.name());
                continue;
            };

            let section = match self.fetch_payload(kind, location) {
                Ok(fields) => {
                    // The payload replaces the manifest entry under the entry's name
                    let mut section = Section::new(entry.name());
                    for (key, value) in fields {
                        section.set(key, value);
                    }
                    section.set(URL_KEY, location);
                    section.set(LATEST_UPDATE_KEY, self.latest_update(location));
                    info!(kind = %kind, entry = entry.name(), url = location, "Resolved entry");
                    summary.record_resolved(entry.name());
                    section
                }
                Err(e) => {
                    let reason = single_line(&e.to_string());
                    warn!(kind = %kind, entry = entry.name(), url = location, error = %reason, "Failed to resolve entry");
                    let mut section = entry.clone();
                    section.set(URL_KEY, location);
                    section.set(ERROR_KEY, reason.clone());
                    summary.record_failure(EntryFailure {
                        name: entry.name().to_string(),
                        location: location.to_string(),
                        reason,
                    });
                    section
                }
            };
            document.insert_section(section);
        }

        info!(
            kind = %kind,
            resolved = summary.resolved.len(),
            failed = summary.failed.len(),
            skipped = summary.skipped.len(),
            "Resolution complete"
        );
        Resolution { document, summary }
    }

    fn fetch_payload(&self, kind: ManifestKind, location: &str) -> Result<Vec<(String, String)>, PayloadError> {
        let url = payload_url(location, kind);
        debug!(url = %url, "Fetching payload");
        let body = self.retry.run(&url, || self.http.get(&url, &[]))?;
        decode_payload(&url, &body, kind)
    }

    /// Newest commit date touching `location`, or empty when unknown.
    fn latest_update(&self, location: &str) -> String {
        let Some(history) = &self.history else {
            return String::new();
        };
        let Some(query) = CommitQuery::from_location(location) else {
            debug!(url = location, "Not a GitHub location, no commit date");
            return String::new();
        };

        match self.retry.run(location, || history.latest_commit(&query)) {
            Ok(Some(date)) => format_commit_date(&date),
            Ok(None) => String::new(),
            Err(e) => {
                warn!(url = location, error = %e, "Could not fetch latest commit date");
                String::new()
            }
        }
    }
}

fn source_location(section: &Section) -> Option<&str> {
    SOURCE_KEYS
        .iter()
        .filter_map(|key| section.get(key))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn single_line(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
