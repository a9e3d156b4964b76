//! Commit history lookups.
//!
//! Used twice: the freshness guard asks when the mode's directory last
//! changed, and the resolver stamps each entry with the date of the newest
//! commit touching its source location.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::error::FetchError;
use super::github::{api_headers, commits_url, header_refs};
use super::http::HttpClient;
use crate::config::SecretToken;

/// Which commits to consider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitQuery {
    pub owner: String,
    pub repo: String,
    /// Branch or commit SHA to list from; repository default when `None`.
    pub branch: Option<String>,
    /// Only commits touching this path.
    pub path: Option<String>,
}

impl CommitQuery {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: None,
            path: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Derive a query from a content location URL.
    ///
    /// Recognises `https://raw.githubusercontent.com/<owner>/<repo>/<branch>/<path>`
    /// and `https://github.com/<owner>/<repo>[/tree|blob/<branch>/<path>]`.
    /// Returns `None` for any other host.
    pub fn from_location(location: &str) -> Option<Self> {
        let url = Url::parse(location).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

        match host.as_str() {
            "raw.githubusercontent.com" if segments.len() >= 3 => {
                let mut query = CommitQuery::new(segments[0], segments[1]).with_branch(segments[2]);
                if segments.len() > 3 {
                    query = query.with_path(segments[3..].join("/"));
                }
                Some(query)
            }
            "github.com" | "www.github.com" if segments.len() >= 2 => {
                let repo = segments[1].trim_end_matches(".git");
                let mut query = CommitQuery::new(segments[0], repo);
                if segments.len() >= 4 && matches!(segments[2], "tree" | "blob") {
                    query = query.with_branch(segments[3]);
                    if segments.len() > 4 {
                        query = query.with_path(segments[4..].join("/"));
                    }
                }
                Some(query)
            }
            _ => None,
        }
    }
}

/// Source of "when did this last change" answers.
pub trait CommitHistory: Send + Sync {
    /// Committer date of the newest matching commit, or `None` when the
    /// history is empty.
    fn latest_commit(&self, query: &CommitQuery) -> Result<Option<DateTime<Utc>>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<Signature>,
    author: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: String,
}

/// [`CommitHistory`] backed by the GitHub commits API.
pub struct GitHubCommitHistory {
    http: Arc<dyn HttpClient>,
    api_base: String,
    token: Option<SecretToken>,
}

impl GitHubCommitHistory {
    /// The token is optional; public repositories answer anonymously at a
    /// lower rate limit.
    pub fn new(http: Arc<dyn HttpClient>, api_base: impl Into<String>, token: Option<SecretToken>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            token,
        }
    }
}

impl CommitHistory for GitHubCommitHistory {
    fn latest_commit(&self, query: &CommitQuery) -> Result<Option<DateTime<Utc>>, FetchError> {
        let url = commits_url(
            &self.api_base,
            &query.owner,
            &query.repo,
            query.branch.as_deref(),
            query.path.as_deref(),
        )?;
        let headers = api_headers(self.token.as_ref());
        let body = self.http.get(&url, &header_refs(&headers))?;

        let commits: Vec<CommitEntry> =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
                url: url.clone(),
                reason: format!("unexpected commits response: {}", e),
            })?;

        let Some(newest) = commits.into_iter().next() else {
            debug!(url = %url, "No commits found");
            return Ok(None);
        };
        let signature = newest
            .commit
            .committer
            .or(newest.commit.author)
            .ok_or_else(|| FetchError::Decode {
                url: url.clone(),
                reason: "commit has no committer or author date".into(),
            })?;

        parse_commit_date(&signature.date)
            .map(Some)
            .map_err(|reason| FetchError::Decode { url, reason })
    }
}

/// Parse an RFC 3339 commit timestamp.
pub fn parse_commit_date(date: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("invalid commit date '{}': {}", date, e))
}

/// Format a commit timestamp the way the API reports it (`2024-01-02T03:04:05Z`).
pub fn format_commit_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MockHttpClient;
    use chrono::TimeZone;

    #[test]
    fn test_query_from_raw_location() {
        let query = CommitQuery::from_location(
            "https://raw.githubusercontent.com/author/quests/master/MoM/MyQuest/",
        )
        .unwrap();
        assert_eq!(query.owner, "author");
        assert_eq!(query.repo, "quests");
        assert_eq!(query.branch.as_deref(), Some("master"));
        assert_eq!(query.path.as_deref(), Some("MoM/MyQuest"));
    }

    #[test]
    fn test_query_from_github_location() {
        let query = CommitQuery::from_location("https://github.com/author/quests.git").unwrap();
        assert_eq!(query, CommitQuery::new("author", "quests"));

        let query =
            CommitQuery::from_location("https://github.com/author/quests/tree/dev/D2E/Q1").unwrap();
        assert_eq!(query.branch.as_deref(), Some("dev"));
        assert_eq!(query.path.as_deref(), Some("D2E/Q1"));
    }

    #[test]
    fn test_query_from_other_hosts() {
        assert_eq!(CommitQuery::from_location("http://example/s1.json"), None);
        assert_eq!(CommitQuery::from_location("not a url"), None);
        assert_eq!(
            CommitQuery::from_location("https://raw.githubusercontent.com/only/two"),
            None
        );
    }

    #[test]
    fn test_latest_commit_parses_committer_date() {
        let query = CommitQuery::new("o", "r").with_branch("master").with_path("D2E");
        let url = commits_url("https://api.github.com", "o", "r", Some("master"), Some("D2E")).unwrap();
        let body = r#"[{"sha":"abc","commit":{"committer":{"date":"2024-05-06T07:08:09Z"}}}]"#;
        let history = GitHubCommitHistory::new(
            Arc::new(MockHttpClient::new().with_body(&url, body)),
            "https://api.github.com",
            None,
        );

        let date = history.latest_commit(&query).unwrap().unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
    }

    #[test]
    fn test_latest_commit_empty_history() {
        let query = CommitQuery::new("o", "r");
        let url = commits_url("https://api.github.com", "o", "r", None, None).unwrap();
        let history = GitHubCommitHistory::new(
            Arc::new(MockHttpClient::new().with_body(&url, "[]")),
            "https://api.github.com",
            None,
        );
        assert_eq!(history.latest_commit(&query).unwrap(), None);
    }

    #[test]
    fn test_latest_commit_bad_json() {
        let query = CommitQuery::new("o", "r");
        let url = commits_url("https://api.github.com", "o", "r", None, None).unwrap();
        let history = GitHubCommitHistory::new(
            Arc::new(MockHttpClient::new().with_body(&url, "{\"message\":\"x\"}")),
            "https://api.github.com",
            None,
        );
        assert!(matches!(
            history.latest_commit(&query),
            Err(FetchError::Decode { .. })
        ));
    }

    #[test]
    fn test_date_formatting_round_trips() {
        let date = parse_commit_date("2023-11-30T23:59:01+01:00").unwrap();
        assert_eq!(format_commit_date(&date), "2023-11-30T22:59:01Z");
        assert!(parse_commit_date("yesterday").is_err());
    }
}
