//! Run state machine.
//!
//! ```text
//! Idle --> ModeSelected --> Fetched --> Parsed --> Resolved --> Written --> Done
//!               │
//!               └--[freshness guard]--> Skipped
//!
//! any non-terminal state --[unrecoverable error]--> Failed
//! ```

use std::fmt;

/// Stage of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    /// Nothing has happened yet.
    Idle,
    /// The game mode is known and the freshness guard has been consulted.
    ModeSelected,
    /// Both input manifests were downloaded.
    Fetched,
    /// Both input manifests parsed.
    Parsed,
    /// Every entry was resolved or marked failed.
    Resolved,
    /// Output files are on disk.
    Written,
    /// The run finished and produced a commit plan.
    Done,
    /// The mode was updated too recently; nothing was done.
    Skipped,
    /// An unrecoverable error ended the run.
    Failed,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::ModeSelected => "mode_selected",
            SyncState::Fetched => "fetched",
            SyncState::Parsed => "parsed",
            SyncState::Resolved => "resolved",
            SyncState::Written => "written",
            SyncState::Done => "done",
            SyncState::Skipped => "skipped",
            SyncState::Failed => "failed",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncState::Done | SyncState::Skipped | SyncState::Failed)
    }

    /// Whether the run counts as successful for exit-code purposes.
    pub fn is_success(&self) -> bool {
        matches!(self, SyncState::Done | SyncState::Skipped)
    }

    pub fn can_transition_to(&self, next: SyncState) -> bool {
        use SyncState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Idle, ModeSelected)
            | (ModeSelected, Fetched)
            | (ModeSelected, Skipped)
            | (Fetched, Parsed)
            | (Parsed, Resolved)
            | (Resolved, Written)
            | (Written, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition the state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid state transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: SyncState,
    pub to: SyncState,
}

/// Current state plus every state visited so far.
#[derive(Debug, Clone)]
pub struct StateTracker {
    history: Vec<SyncState>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            history: vec![SyncState::Idle],
        }
    }

    pub fn current(&self) -> SyncState {
        self.history
            .last()
            .copied()
            .unwrap_or(SyncState::Idle)
    }

    pub fn history(&self) -> &[SyncState] {
        &self.history
    }

    pub fn advance(&mut self, next: SyncState) -> Result<(), InvalidTransition> {
        let from = self.current();
        if !from.can_transition_to(next) {
            return Err(InvalidTransition { from, to: next });
        }
        self.history.push(next);
        Ok(())
    }

    /// Enter `Failed` unless already terminal, returning the visited states.
    pub fn fail(mut self) -> Vec<SyncState> {
        if !self.current().is_terminal() {
            self.history.push(SyncState::Failed);
        }
        self.history
    }
}
