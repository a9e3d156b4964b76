//! manifest-sync CLI
//!
//! Regenerates the download manifests of one game mode. Intended to run from
//! a scheduled workflow that commits the outputs afterwards.

mod commands;
mod error;
mod logging;

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use commands::{check, config, run};
use logging::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "manifest-sync")]
#[command(version, about = "Regenerate game-data download manifests", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, resolve and write the download manifests of a game mode
    Run(run::RunArgs),

    /// Parse local INI manifests and report syntax errors
    Check(check::CheckArgs),

    /// Print the effective configuration
    Config(config::ConfigArgs),
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::init(cli.verbose, cli.log_format);

    let result = match cli.command {
        Commands::Run(args) => run::run(args),
        Commands::Check(args) => check::run(args),
        Commands::Config(args) => config::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
