//! `config` command: show the effective configuration.

use clap::Args;
use manifest_sync::SyncConfig;

use super::common::SyncArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub sync: SyncArgs,
}

pub fn run(args: ConfigArgs) -> Result<(), CliError> {
    let config = args.sync.to_config()?;
    config.validate()?;
    for line in render(&config) {
        println!("{}", line);
    }
    Ok(())
}

fn render(config: &SyncConfig) -> Vec<String> {
    let or_unset = |value: Option<String>| value.unwrap_or_else(|| "(not set)".to_string());

    vec![
        "[source]".to_string(),
        format!("  api_base = {}", config.api_base),
        format!("  owner = {}", config.repo.owner),
        format!("  repo = {}", config.repo.repo),
        format!("  branch = {}", config.repo.branch),
        format!(
            "  input_dir = {}",
            or_unset(config.input_dir.as_ref().map(|d| d.display().to_string()))
        ),
        format!("  token = {}", or_unset(config.token.as_ref().map(|t| t.to_string()))),
        String::new(),
        "[sync]".to_string(),
        format!("  output_dir = {}", config.output_dir.display()),
        format!("  timeout_secs = {}", config.timeout.as_secs()),
        format!("  retry_attempts = {}", config.retry.max_attempts()),
        format!("  retry_delay_secs = {}", config.retry_delay().as_secs()),
        format!("  freshness_minutes = {}", config.freshness_threshold.as_secs() / 60),
        format!("  force = {}", config.force),
    ]
}
