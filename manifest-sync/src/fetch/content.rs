//! Manifest sources.
//!
//! A [`ContentSource`] returns the text of a repository-relative file. The
//! production source reads the GitHub contents API, whose responses carry
//! the file as a base64 blob; a local directory source reads a checkout.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tracing::{debug, info};

use super::error::FetchError;
use super::github::{api_headers, contents_url, header_refs, RepoRef};
use super::http::HttpClient;
use super::retry::RetryPolicy;
use crate::config::SecretToken;
use crate::mode::GameMode;

/// Source of repository files.
pub trait ContentSource: Send + Sync {
    /// Return the decoded text of a repository-relative path.
    fn fetch_text(&self, path: &str) -> Result<String, FetchError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Body of a `GET /repos/{owner}/{repo}/contents/{path}` response.
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

/// Reads files through the authenticated GitHub contents API.
pub struct GitHubContentSource {
    http: Arc<dyn HttpClient>,
    api_base: String,
    repo: RepoRef,
    token: Option<SecretToken>,
}

impl GitHubContentSource {
    pub fn new(
        http: Arc<dyn HttpClient>,
        api_base: impl Into<String>,
        repo: RepoRef,
        token: Option<SecretToken>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            repo,
            token,
        }
    }
}

impl ContentSource for GitHubContentSource {
    fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let token = self.token.as_ref().ok_or(FetchError::MissingToken)?;
        let url = contents_url(&self.api_base, &self.repo, path)?;
        let headers = api_headers(Some(token));

        let body = self.http.get(&url, &header_refs(&headers))?;
        let response: ContentsResponse =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
                url: url.clone(),
                reason: format!("unexpected contents response: {}", e),
            })?;

        let bytes = match (response.encoding.as_deref(), response.content) {
            (Some("base64"), Some(content)) => decode_blob(&url, &content)?,
            // Blobs over 1 MB come back without inline content
            (_, _) => match response.download_url {
                Some(download_url) => {
                    debug!(path, "Contents API returned no inline blob, using download_url");
                    self.http.get(&download_url, &header_refs(&headers))?
                }
                None => {
                    return Err(FetchError::Decode {
                        url,
                        reason: "response has neither base64 content nor download_url".into(),
                    })
                }
            },
        };

        into_text(&url, bytes)
    }

    fn describe(&self) -> String {
        format!("GitHub contents API ({})", self.repo)
    }
}

/// Decode a base64 blob, ignoring the line breaks the API inserts.
fn decode_blob(url: &str, content: &str) -> Result<Vec<u8>, FetchError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        reason: format!("invalid base64 content: {}", e),
    })
}

fn into_text(url: &str, bytes: Vec<u8>) -> Result<String, FetchError> {
    let text = String::from_utf8(bytes).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        reason: format!("content is not UTF-8: {}", e),
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Reads files from a local checkout of the repository.
pub struct LocalContentSource {
    root: PathBuf,
}

impl LocalContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for LocalContentSource {
    fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let full = self.root.join(path);
        let bytes = fs::read(&full).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound {
                url: full.display().to_string(),
            },
            _ => FetchError::Read {
                path: full.display().to_string(),
                reason: e.to_string(),
            },
        })?;
        into_text(&full.display().to_string(), bytes)
    }

    fn describe(&self) -> String {
        format!("local directory {}", self.root.display())
    }
}

/// Fetches a game mode's manifests from a [`ContentSource`].
pub struct ManifestFetcher {
    source: Arc<dyn ContentSource>,
    retry: RetryPolicy,
}

impl ManifestFetcher {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch `<mode>/<file>` as text.
    pub fn fetch(&self, mode: GameMode, file: &str) -> Result<String, FetchError> {
        let path = mode.path(file);
        info!(path = %path, source = %self.source.describe(), "Fetching manifest");
        self.retry.run(&path, || self.source.fetch_text(&path))
    }
}
