//! What the workflow should commit after a run.

use crate::mode::GameMode;

/// Instructions for the external commit step.
///
/// The path list covers both game modes' outputs so the workflow can stage
/// them unconditionally; only files that actually changed produce a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    pub mode: GameMode,
    pub message: String,
    pub paths: Vec<String>,
    /// Whether any output file changed on disk.
    pub changed: bool,
}

impl CommitPlan {
    pub fn new(mode: GameMode, changed: bool) -> Self {
        Self {
            mode,
            message: commit_message(mode),
            paths: GameMode::all_output_paths(),
            changed,
        }
    }

    /// Key/value pairs for a workflow step output file.
    pub fn outputs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("changed", self.changed.to_string()),
            ("commit_message", self.message.clone()),
            ("paths", self.paths.join(" ")),
        ]
    }
}

/// `Update <mode> download manifests`
pub fn commit_message(mode: GameMode) -> String {
    format!("Update {} download manifests", mode)
}
