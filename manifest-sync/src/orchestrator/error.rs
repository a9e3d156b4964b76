//! Error types for a sync run.

use std::fmt;
use std::io;
use std::path::PathBuf;

use super::state::{InvalidTransition, SyncState};
use crate::config::ConfigError;
use crate::fetch::{ErrorKind, FetchError};
use crate::ini::ParseError;

/// Result type for orchestrator stages.
pub type SyncResult<T> = Result<T, SyncError>;

/// Unrecoverable errors that end a run in [`SyncState::Failed`].
#[derive(Debug)]
pub enum SyncError {
    /// The configuration is unusable.
    Config(ConfigError),

    /// The HTTP client could not be built.
    Client(FetchError),

    /// An input manifest could not be fetched.
    Fetch { path: String, source: FetchError },

    /// An input manifest is not valid INI.
    Parse { path: String, source: ParseError },

    /// An output file or directory could not be written.
    Write { path: PathBuf, source: io::Error },

    /// The run attempted a transition the state machine forbids.
    State(InvalidTransition),
}

impl SyncError {
    /// Classification of the underlying fetch failure, if any.
    pub fn fetch_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Client(e) | Self::Fetch { source: e, .. } => Some(e.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {}", e),
            Self::Client(e) => write!(f, "failed to create HTTP client: {}", e),
            Self::Fetch { path, source } => write!(f, "failed to fetch {}: {}", path, source),
            Self::Parse { path, source } => write!(f, "failed to parse {}: {}", path, source),
            Self::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::State(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Client(e) => Some(e),
            Self::Fetch { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
            Self::State(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SyncError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<InvalidTransition> for SyncError {
    fn from(e: InvalidTransition) -> Self {
        Self::State(e)
    }
}

/// A failed run: the error and every state visited, ending in `Failed`.
#[derive(Debug)]
pub struct SyncFailure {
    pub error: SyncError,
    pub states: Vec<SyncState>,
}

impl SyncFailure {
    /// Last state reached before failing.
    pub fn failed_after(&self) -> SyncState {
        self.states
            .iter()
            .rev()
            .find(|s| **s != SyncState::Failed)
            .copied()
            .unwrap_or(SyncState::Idle)
    }

    pub fn final_state(&self) -> SyncState {
        self.states.last().copied().unwrap_or(SyncState::Failed)
    }
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sync failed after {}: {}", self.failed_after(), self.error)
    }
}

impl std::error::Error for SyncFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
