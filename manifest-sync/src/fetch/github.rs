//! GitHub REST API addressing.
//!
//! Only the two read-only endpoints the job needs are modelled:
//! `GET /repos/{owner}/{repo}/contents/{path}` and
//! `GET /repos/{owner}/{repo}/commits`.

use std::fmt;

use url::Url;

use super::error::FetchError;
use crate::config::SecretToken;

/// Default API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Media type requested from the API.
pub const API_ACCEPT: &str = "application/vnd.github+json";

/// A repository and the branch to read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepoRef {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Split an `owner/repo` slug, as found in `GITHUB_REPOSITORY`.
    pub fn parse_slug(slug: &str) -> Option<(String, String)> {
        let (owner, repo) = slug.trim().split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some((owner.to_string(), repo.to_string()))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Request headers for an API call; the token is attached when present.
pub(crate) fn api_headers(token: Option<&SecretToken>) -> Vec<(&'static str, String)> {
    let mut headers = vec![
        ("Accept", API_ACCEPT.to_string()),
        ("X-GitHub-Api-Version", "2022-11-28".to_string()),
    ];
    if let Some(token) = token {
        headers.push(("Authorization", format!("Bearer {}", token.expose())));
    }
    headers
}

/// Borrow owned headers in the shape [`HttpClient::get`](super::HttpClient::get) takes.
pub(crate) fn header_refs<'a>(headers: &'a [(&'static str, String)]) -> Vec<(&'a str, &'a str)> {
    headers.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

fn endpoint(api_base: &str, owner: &str, repo: &str, tail: &str) -> Result<Url, FetchError> {
    let raw = format!(
        "{}/repos/{}/{}/{}",
        api_base.trim_end_matches('/'),
        owner,
        repo,
        tail.trim_start_matches('/')
    );
    Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

/// URL of a file's contents on the configured branch.
pub(crate) fn contents_url(api_base: &str, repo: &RepoRef, path: &str) -> Result<String, FetchError> {
    let mut url = endpoint(api_base, &repo.owner, &repo.repo, &format!("contents/{}", path))?;
    url.query_pairs_mut().append_pair("ref", &repo.branch);
    Ok(url.into())
}

/// URL listing the newest commit, optionally filtered by branch and path.
pub(crate) fn commits_url(
    api_base: &str,
    owner: &str,
    repo: &str,
    branch: Option<&str>,
    path: Option<&str>,
) -> Result<String, FetchError> {
    let mut url = endpoint(api_base, owner, repo, "commits")?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("per_page", "1");
        if let Some(branch) = branch {
            query.append_pair("sha", branch);
        }
        if let Some(path) = path {
            query.append_pair("path", path);
        }
    }
    Ok(url.into())
}
