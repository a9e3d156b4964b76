//! Sync orchestration.
//!
//! Drives one run for one [`GameMode`] through the [`SyncState`] machine:
//! freshness check, fetch, parse, resolve, write. The orchestrator owns no
//! network code itself; every remote interaction goes through the injected
//! [`ContentSource`], [`HttpClient`] and [`CommitHistory`].

mod commit;
mod error;
mod state;

pub use commit::{commit_message, CommitPlan};
pub use error::{SyncError, SyncFailure, SyncResult};
pub use state::{InvalidTransition, StateTracker, SyncState};

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::fetch::{
    CommitHistory, CommitQuery, ContentSource, GitHubCommitHistory, GitHubContentSource,
    HttpClient, LocalContentSource, ManifestFetcher, ReqwestClient,
};
use crate::freshness::{Clock, Freshness, FreshnessGuard, SystemClock};
use crate::ini::{self, ManifestDocument};
use crate::mode::{GameMode, ManifestKind};
use crate::resolve::{ManifestResolver, ResolveSummary};

/// An output file produced by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Repository-relative path, e.g. `MoM/manifestDownload.ini`.
    pub relative: String,
    /// Location on disk.
    pub path: PathBuf,
    pub sections: usize,
    /// False when the file already held identical content.
    pub changed: bool,
}

/// Outcome of a run that ended in `Done` or `Skipped`.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub mode: GameMode,
    /// Every state visited, starting at `Idle`.
    pub states: Vec<SyncState>,
    pub freshness: Freshness,
    pub summaries: Vec<ResolveSummary>,
    pub files: Vec<WrittenFile>,
    pub plan: CommitPlan,
}

impl SyncReport {
    pub fn state(&self) -> SyncState {
        self.states.last().copied().unwrap_or(SyncState::Idle)
    }

    pub fn changed(&self) -> bool {
        self.plan.changed
    }

    /// Entries that carry a failure marker, across both manifests.
    pub fn failed_entries(&self) -> usize {
        self.summaries.iter().map(|s| s.failed.len()).sum()
    }
}

/// Runs the sync job for a game mode.
pub struct SyncOrchestrator {
    config: SyncConfig,
    source: Arc<dyn ContentSource>,
    http: Arc<dyn HttpClient>,
    history: Arc<dyn CommitHistory>,
    clock: Arc<dyn Clock>,
}

impl SyncOrchestrator {
    pub fn new(
        config: SyncConfig,
        source: Arc<dyn ContentSource>,
        http: Arc<dyn HttpClient>,
        history: Arc<dyn CommitHistory>,
    ) -> Self {
        Self {
            config,
            source,
            http,
            history,
            clock: Arc::new(SystemClock),
        }
    }

    /// Build the production wiring: a reqwest client, the GitHub contents
    /// API (or `input_dir` when set) and the GitHub commit history.
    pub fn from_config(config: SyncConfig) -> SyncResult<Self> {
        config.validate()?;

        let http: Arc<dyn HttpClient> =
            Arc::new(ReqwestClient::with_timeout(config.timeout).map_err(SyncError::Client)?);

        let source: Arc<dyn ContentSource> = match &config.input_dir {
            Some(dir) => Arc::new(LocalContentSource::new(dir.clone())),
            None => Arc::new(GitHubContentSource::new(
                Arc::clone(&http),
                config.api_base.clone(),
                config.repo.clone(),
                config.token.clone(),
            )),
        };
        let history: Arc<dyn CommitHistory> = Arc::new(GitHubCommitHistory::new(
            Arc::clone(&http),
            config.api_base.clone(),
            config.token.clone(),
        ));

        Ok(Self::new(config, source, http, history))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run the job for `mode`.
    ///
    /// Per-entry resolution failures do not fail the run; they are recorded
    /// in the output and the report's summaries.
    pub fn run(&self, mode: GameMode) -> Result<SyncReport, SyncFailure> {
        let mut tracker = StateTracker::new();
        let result = self.execute(mode, &mut tracker);
        match result {
            Ok(report) => Ok(report),
            Err(error) => {
                let failure = SyncFailure {
                    error,
                    states: tracker.fail(),
                };
                error!(mode = %mode, after = %failure.failed_after(), error = %failure.error, "Sync failed");
                Err(failure)
            }
        }
    }

    fn execute(&self, mode: GameMode, tracker: &mut StateTracker) -> SyncResult<SyncReport> {
        info!(mode = %mode, source = %self.source.describe(), "Starting sync");
        advance(tracker, SyncState::ModeSelected)?;

        let freshness = self.check_freshness(mode);
        if freshness.should_skip() {
            info!(mode = %mode, ?freshness, "Mode updated recently, skipping run");
            advance(tracker, SyncState::Skipped)?;
            return Ok(SyncReport {
                mode,
                states: tracker.history().to_vec(),
                freshness,
                summaries: Vec::new(),
                files: Vec::new(),
                plan: CommitPlan::new(mode, false),
            });
        }

        let texts = self.fetch_manifests(mode)?;
        advance(tracker, SyncState::Fetched)?;

        let manifests = parse_manifests(texts)?;
        advance(tracker, SyncState::Parsed)?;

        let resolver = ManifestResolver::new(Arc::clone(&self.http))
            .with_history(Arc::clone(&self.history))
            .with_retry(self.config.retry.clone());
        let resolutions: Vec<_> = manifests
            .iter()
            .map(|(kind, doc)| resolver.resolve(*kind, doc))
            .collect();
        advance(tracker, SyncState::Resolved)?;

        let files = resolutions
            .iter()
            .map(|r| self.write_output(mode, r.summary.kind, &r.document))
            .collect::<SyncResult<Vec<_>>>()?;
        advance(tracker, SyncState::Written)?;

        let changed = files.iter().any(|f| f.changed);
        let plan = CommitPlan::new(mode, changed);
        advance(tracker, SyncState::Done)?;

        let summaries: Vec<_> = resolutions.into_iter().map(|r| r.summary).collect();
        info!(
            mode = %mode,
            changed,
            failed_entries = summaries.iter().map(|s| s.failed.len()).sum::<usize>(),
            "Sync complete"
        );

        Ok(SyncReport {
            mode,
            states: tracker.history().to_vec(),
            freshness,
            summaries,
            files,
            plan,
        })
    }

    /// Consult the freshness guard. Lookup problems never block a run.
    fn check_freshness(&self, mode: GameMode) -> Freshness {
        if self.config.force {
            debug!("Freshness guard bypassed by force");
            return Freshness::Disabled;
        }
        let guard = FreshnessGuard::new(self.config.freshness_threshold);
        if !guard.is_enabled() {
            return Freshness::Disabled;
        }

        let repo = &self.config.repo;
        let query = CommitQuery::new(&repo.owner, &repo.repo)
            .with_branch(&repo.branch)
            .with_path(mode.dir_name());
        let last_change = match self.history.latest_commit(&query) {
            Ok(date) => date,
            Err(e) => {
                warn!(mode = %mode, error = %e, "Could not determine last update, proceeding");
                None
            }
        };

        let freshness = guard.evaluate(self.clock.now(), last_change);
        debug!(mode = %mode, ?freshness, "Freshness evaluated");
        freshness
    }

    fn fetch_manifests(&self, mode: GameMode) -> SyncResult<Vec<(ManifestKind, String, String)>> {
        let fetcher = ManifestFetcher::new(Arc::clone(&self.source)).with_retry(self.config.retry.clone());
        ManifestKind::ALL
            .iter()
            .map(|kind| {
                let path = mode.path(kind.input_file());
                let text = fetcher
                    .fetch(mode, kind.input_file())
                    .map_err(|source| SyncError::Fetch {
                        path: path.clone(),
                        source,
                    })?;
                Ok((*kind, path, text))
            })
            .collect()
    }

    fn write_output(
        &self,
        mode: GameMode,
        kind: ManifestKind,
        doc: &ManifestDocument,
    ) -> SyncResult<WrittenFile> {
        let relative = mode.path(kind.output_file());
        let path = self.config.output_dir.join(&relative);
        let content = ini::serialize(doc);

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| SyncError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let changed = match fs::read_to_string(&path) {
            Ok(existing) => existing != content,
            Err(_) => true,
        };
        if changed {
            fs::write(&path, &content).map_err(|source| SyncError::Write {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), sections = doc.len(), "Wrote download manifest");
        } else {
            info!(path = %path.display(), "Download manifest unchanged");
        }

        Ok(WrittenFile {
            relative,
            path,
            sections: doc.len(),
            changed,
        })
    }
}

fn advance(tracker: &mut StateTracker, next: SyncState) -> SyncResult<()> {
    tracker.advance(next)?;
    debug!(state = %next, "State transition");
    Ok(())
}

fn parse_manifests(
    texts: Vec<(ManifestKind, String, String)>,
) -> SyncResult<Vec<(ManifestKind, ManifestDocument)>> {
    texts
        .into_iter()
        .map(|(kind, path, text)| {
            let doc = ini::parse(&text).map_err(|source| SyncError::Parse {
                path: path.clone(),
                source,
            })?;
            info!(path = %path, sections = doc.len(), "Parsed manifest");
            Ok((kind, doc))
        })
        .collect()
}
