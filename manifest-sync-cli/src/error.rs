//! CLI error type.

use std::fmt;
use std::io;
use std::path::PathBuf;

use manifest_sync::{ConfigError, SyncError, SyncFailure};

/// Errors surfaced to the user; every variant exits with status 1.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    Config(String),

    /// The orchestrator could not be set up.
    Setup(SyncError),

    /// The run ended in the failed state.
    Sync(SyncFailure),

    /// Some files given to `check` are malformed.
    Check { failed: usize, total: usize },

    /// A local file could not be read or written.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Setup(e) => write!(f, "{}", e),
            Self::Sync(failure) => write!(f, "{}", failure),
            Self::Check { failed, total } => {
                write!(f, "{} of {} files failed to parse", failed, total)
            }
            Self::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Setup(e) => Some(e),
            Self::Sync(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<SyncError> for CliError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Config(e) => Self::Config(e.to_string()),
            other => Self::Setup(other),
        }
    }
}
