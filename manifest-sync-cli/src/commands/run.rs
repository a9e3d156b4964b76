//! `run` command: one sync for one game mode.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use manifest_sync::freshness::Freshness;
use manifest_sync::resolve::ResolveSummary;
use manifest_sync::{CommitPlan, GameMode, SyncOrchestrator, SyncReport, SyncState};
use tracing::info;

use super::common::SyncArgs;
use crate::error::CliError;

/// Workflow step output file, set by GitHub Actions.
const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Game mode to sync: D2E or MoM (any case)
    #[arg(value_name = "MODE")]
    pub mode: GameMode,

    #[command(flatten)]
    pub sync: SyncArgs,

    /// Append state, changed and commit_message outputs to this file
    /// [default: $GITHUB_OUTPUT]
    #[arg(long, value_name = "FILE")]
    pub github_output: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> Result<(), CliError> {
    let mode = args.mode;
    let config = args.sync.to_config()?;
    let output = args.github_output.clone().or_else(github_output_from_env);

    info!(mode = %mode, repo = %config.repo, "Running manifest sync");
    let orchestrator = SyncOrchestrator::from_config(config)?;

    match orchestrator.run(mode) {
        Ok(report) => {
            print_report(&report);
            if let Some(path) = &output {
                write_github_output(path, report.state(), &report.plan)?;
            }
            Ok(())
        }
        Err(failure) => {
            if let Some(path) = &output {
                write_github_output(path, SyncState::Failed, &CommitPlan::new(mode, false))?;
            }
            Err(CliError::Sync(failure))
        }
    }
}

fn github_output_from_env() -> Option<PathBuf> {
    env::var_os(GITHUB_OUTPUT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn print_report(report: &SyncReport) {
    println!("Mode:      {}", report.mode);
    println!("State:     {}", report.state());

    match report.freshness {
        Freshness::Recent { age } => {
            println!("Freshness: updated {}s ago, skipped", age.as_secs());
            return;
        }
        Freshness::Stale { age } => println!("Freshness: updated {}s ago", age.as_secs()),
        Freshness::Unknown => println!("Freshness: no previous update found"),
        Freshness::Disabled => println!("Freshness: not checked"),
    }

    println!();
    for summary in &report.summaries {
        println!("{}", summary_line(summary));
        if summary.has_failures() {
            for failure in &summary.failed {
                println!("  ! [{}] {}", failure.name, failure.reason);
            }
        }
    }

    println!();
    for file in &report.files {
        let status = if file.changed { "updated" } else { "unchanged" };
        println!("{} ({} entries, {})", file.relative, file.sections, status);
    }

    if report.changed() {
        println!("Commit:    {}", report.plan.message);
    } else {
        println!("Commit:    nothing to commit");
    }
}

fn summary_line(summary: &ResolveSummary) -> String {
    format!(
        "{}: {} of {} entries written ({} resolved, {} failed, {} skipped)",
        summary.kind,
        summary.written(),
        summary.total,
        summary.resolved.len(),
        summary.failed.len(),
        summary.skipped.len()
    )
}

/// Append `key=value` lines for the workflow.
fn write_github_output(path: &Path, state: SyncState, plan: &CommitPlan) -> Result<(), CliError> {
    let io_err = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;

    writeln!(file, "state={}", state).map_err(io_err)?;
    for (key, value) in plan.outputs() {
        writeln!(file, "{}={}", key, value).map_err(io_err)?;
    }
    Ok(())
}
