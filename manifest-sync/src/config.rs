//! Configuration for a sync run.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional INI config file (`[source]` and `[sync]` sections)
//! 3. Environment (`GITHUB_REPOSITORY`, `MANIFEST_SYNC_TOKEN`, `GITHUB_TOKEN`)
//! 4. Command-line overrides applied by the CLI through the `with_*` builders
//!
//! The API token only ever comes from the environment; it is never read from
//! or written to the config file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::fetch::{RepoRef, RetryPolicy, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
use crate::freshness::DEFAULT_FRESHNESS_THRESHOLD;

/// Default game-data repository owner.
pub const DEFAULT_OWNER: &str = "NPBruce";

/// Default game-data repository.
pub const DEFAULT_REPO: &str = "valkyrie-store";

/// Default branch holding the manifests.
pub const DEFAULT_BRANCH: &str = "master";

/// Environment variables consulted for the token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["MANIFEST_SYNC_TOKEN", "GITHUB_TOKEN"];

/// Environment variable holding `owner/repo`, set by GitHub Actions.
pub const REPOSITORY_ENV_VAR: &str = "GITHUB_REPOSITORY";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or parsed.
    #[error("failed to load config file {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// A setting has an unusable value.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// A credential that never appears in logs or debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building request headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken(***)")
    }
}

impl fmt::Display for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Configuration for a sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Content API endpoint.
    pub api_base: String,

    /// Repository holding the input manifests.
    pub repo: RepoRef,

    /// API token.
    pub token: Option<SecretToken>,

    /// Working tree root; outputs land in `<output_dir>/<mode>/`.
    pub output_dir: PathBuf,

    /// Read manifests from this checkout instead of the content API.
    pub input_dir: Option<PathBuf>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Retry policy for transient fetch failures.
    pub retry: RetryPolicy,

    /// Skip the run when the mode's directory changed more recently than
    /// this. Zero disables the guard.
    pub freshness_threshold: Duration,

    /// Ignore the freshness guard.
    pub force: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            repo: RepoRef::new(DEFAULT_OWNER, DEFAULT_REPO, DEFAULT_BRANCH),
            token: None,
            output_dir: PathBuf::from("."),
            input_dir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            freshness_threshold: DEFAULT_FRESHNESS_THRESHOLD,
            force: false,
        }
    }
}

impl SyncConfig {
    /// Defaults, overlaid with `path` when given, then with the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = path {
            config.apply_file(path)?;
        }
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Overlay settings from an INI config file.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.apply_ini(&ini)
    }

    /// Overlay settings from INI text.
    pub fn apply_ini_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Load {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        self.apply_ini(&ini)
    }

    fn apply_ini(&mut self, ini: &Ini) -> Result<(), ConfigError> {
        if let Some(source) = ini.section(Some("source")) {
            if let Some(v) = source.get("api_base") {
                self.api_base = v.trim().to_string();
            }
            if let Some(v) = source.get("owner") {
                self.repo.owner = v.trim().to_string();
            }
            if let Some(v) = source.get("repo") {
                self.repo.repo = v.trim().to_string();
            }
            if let Some(v) = source.get("branch") {
                self.repo.branch = v.trim().to_string();
            }
            if let Some(v) = source.get("input_dir") {
                self.input_dir = non_empty(v).map(PathBuf::from);
            }
        }

        if let Some(sync) = ini.section(Some("sync")) {
            if let Some(v) = sync.get("output_dir") {
                self.output_dir = PathBuf::from(v.trim());
            }
            if let Some(v) = sync.get("timeout_secs") {
                self.timeout = Duration::from_secs(parse_number("sync.timeout_secs", v)?);
            }
            let attempts = sync
                .get("retry_attempts")
                .map(|v| parse_number::<u32>("sync.retry_attempts", v))
                .transpose()?;
            let delay = sync
                .get("retry_delay_secs")
                .map(|v| parse_number("sync.retry_delay_secs", v))
                .transpose()?;
            if attempts.is_some() || delay.is_some() {
                let attempts = attempts.unwrap_or(self.retry.max_attempts());
                let delay = delay
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| self.retry_delay());
                self.retry = RetryPolicy::fixed(attempts, delay);
            }
            if let Some(v) = sync.get("freshness_minutes") {
                self.freshness_threshold =
                    freshness_from_minutes(parse_number("sync.freshness_minutes", v)?)?;
            }
        }

        self.validate()
    }

    /// Overlay settings from environment variables.
    ///
    /// `lookup` abstracts `std::env::var` so tests can supply values.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some((owner, repo)) = lookup(REPOSITORY_ENV_VAR)
            .as_deref()
            .and_then(RepoRef::parse_slug)
        {
            self.repo.owner = owner;
            self.repo.repo = repo;
        }

        if let Some(token) = TOKEN_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find_map(|v| non_empty(&v).map(SecretToken::new))
        {
            self.token = Some(token);
        }
    }

    /// Check settings that would otherwise fail late.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("source.owner", &self.repo.owner),
            ("source.repo", &self.repo.repo),
            ("source.branch", &self.repo.branch),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                    reason: "must not be empty".into(),
                });
            }
        }
        if url::Url::parse(&self.api_base).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "source.api_base".into(),
                value: self.api_base.clone(),
                reason: "not an absolute URL".into(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "sync.timeout_secs".into(),
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Delay between retry attempts under the current policy.
    pub fn retry_delay(&self) -> Duration {
        self.retry.delay_for_attempt(1).unwrap_or(Duration::ZERO)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(dir.into());
        self
    }

    pub fn with_repo(mut self, repo: RepoRef) -> Self {
        self.repo = repo;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_token(mut self, token: SecretToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_freshness_threshold(mut self, threshold: Duration) -> Self {
        self.freshness_threshold = threshold;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Freshness threshold for a number of minutes.
pub fn freshness_from_minutes(minutes: u64) -> Result<Duration, ConfigError> {
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: "sync.freshness_minutes".into(),
            value: minutes.to_string(),
            reason: "too large".into(),
        })
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
