//! Error types for remote fetches.

use thiserror::Error;

/// Coarse classification used for fatal/recoverable decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or rejected credentials.
    Auth,
    /// The requested file does not exist.
    NotFound,
    /// Transport failure, timeout, or unexpected status.
    Network,
    /// The response arrived but could not be interpreted.
    Parse,
}

/// Errors that can occur while fetching remote content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No token was configured for an authenticated API.
    #[error("no API token configured (set MANIFEST_SYNC_TOKEN or GITHUB_TOKEN)")]
    MissingToken,

    /// The server rejected the credentials.
    #[error("authentication rejected by {url} (HTTP {status})")]
    Auth { url: String, status: u16 },

    /// The resource does not exist.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Any other non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Transport-level failure.
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The per-request timeout elapsed.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// A local file could not be read.
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    /// The response body was not in the expected format.
    #[error("invalid content from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// A URL could not be built or parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// Map an HTTP status code to the matching error.
    ///
    /// Only meaningful for non-success statuses.
    pub fn from_status(url: &str, status: u16) -> Self {
        match status {
            401 | 403 => FetchError::Auth {
                url: url.to_string(),
                status,
            },
            404 | 410 => FetchError::NotFound {
                url: url.to_string(),
            },
            _ => FetchError::Status {
                url: url.to_string(),
                status,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::MissingToken | FetchError::Auth { .. } => ErrorKind::Auth,
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::Status { .. }
            | FetchError::Network { .. }
            | FetchError::Timeout { .. }
            | FetchError::Read { .. } => ErrorKind::Network,
            FetchError::Decode { .. } | FetchError::InvalidUrl { .. } => ErrorKind::Parse,
        }
    }

    /// Whether repeating the request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network { .. } | FetchError::Timeout { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
