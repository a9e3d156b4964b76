//! Log subscriber setup.

use clap::ValueEnum;
use tracing_subscriber::{fmt, EnvFilter};

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human oriented
    Pretty,
    /// One line per event
    Compact,
}

/// Install the global subscriber on stderr.
///
/// `RUST_LOG` overrides the filter derived from `verbose`.
pub fn init(verbose: u8, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

fn default_directives(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("warn,manifest_sync={}", level)
}
