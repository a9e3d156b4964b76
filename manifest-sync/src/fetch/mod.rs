//! Remote content access.
//!
//! - [`HttpClient`]: the single seam to the network, mockable in tests
//! - [`ContentSource`] / [`ManifestFetcher`]: manifest text for a game mode
//! - [`CommitHistory`]: newest-commit timestamps
//! - [`RetryPolicy`]: bounded retry for transient failures

mod commits;
mod content;
mod error;
mod github;
mod http;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use commits::{
    format_commit_date, parse_commit_date, CommitHistory, CommitQuery, GitHubCommitHistory,
};
pub use content::{ContentSource, GitHubContentSource, LocalContentSource, ManifestFetcher};
pub use error::{ErrorKind, FetchError};
pub use github::{RepoRef, DEFAULT_API_BASE};
pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS, USER_AGENT};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
