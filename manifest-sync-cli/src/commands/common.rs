//! Arguments shared across CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use manifest_sync::config::freshness_from_minutes;
use manifest_sync::SyncConfig;

use crate::error::CliError;

/// Settings that override the config file and environment.
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// INI config file with [source] and [sync] sections
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working tree root; outputs go to <DIR>/<MODE>/
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Read input manifests from a local checkout instead of the API
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Owner of the game-data repository
    #[arg(long)]
    pub owner: Option<String>,

    /// Name of the game-data repository
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch holding the manifests
    #[arg(long)]
    pub branch: Option<String>,

    /// Content API endpoint
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip the run if the mode changed within this many minutes (0 disables)
    #[arg(long, value_name = "MINUTES")]
    pub freshness_minutes: Option<u64>,

    /// Run even if the mode was updated recently
    #[arg(long)]
    pub force: bool,
}

impl SyncArgs {
    /// Load the layered configuration and apply these overrides on top.
    pub fn to_config(&self) -> Result<SyncConfig, CliError> {
        let config = SyncConfig::load(self.config.as_deref())?;
        self.apply(config)
    }

    fn apply(&self, mut config: SyncConfig) -> Result<SyncConfig, CliError> {
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(dir) = &self.input_dir {
            config = config.with_input_dir(dir);
        }
        if let Some(owner) = &self.owner {
            config.repo.owner = owner.clone();
        }
        if let Some(repo) = &self.repo {
            config.repo.repo = repo.clone();
        }
        if let Some(branch) = &self.branch {
            config.repo.branch = branch.clone();
        }
        if let Some(api_base) = &self.api_base {
            config = config.with_api_base(api_base.as_str());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(minutes) = self.freshness_minutes {
            config = config.with_freshness_threshold(freshness_from_minutes(minutes)?);
        }
        if self.force {
            config = config.with_force(true);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SyncArgs {
        SyncArgs {
            config: None,
            output_dir: None,
            input_dir: None,
            owner: None,
            repo: None,
            branch: None,
            api_base: None,
            timeout: None,
            freshness_minutes: None,
            force: false,
        }
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let config = args().apply(SyncConfig::default()).unwrap();
        let default = SyncConfig::default();
        assert_eq!(config.repo, default.repo);
        assert_eq!(config.freshness_threshold, default.freshness_threshold);
        assert!(!config.force);
    }

    #[test]
    fn test_overrides_win() {
        let mut overrides = args();
        overrides.owner = Some("me".into());
        overrides.branch = Some("main".into());
        overrides.timeout = Some(5);
        overrides.freshness_minutes = Some(0);
        overrides.input_dir = Some(PathBuf::from("/tmp/store"));
        overrides.force = true;

        let config = overrides.apply(SyncConfig::default()).unwrap();
        assert_eq!(config.repo.owner, "me");
        assert_eq!(config.repo.branch, "main");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.freshness_threshold.is_zero());
        assert_eq!(config.input_dir, Some(PathBuf::from("/tmp/store")));
        assert!(config.force);
    }

    #[test]
    fn test_freshness_override_overflow_is_rejected() {
        let mut overrides = args();
        overrides.freshness_minutes = Some(u64::MAX / 60 + 1);

        let err = overrides.apply(SyncConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Config(ref msg) if msg.contains("freshness_minutes")));
    }
}
