//! `check` command: validate local INI manifests.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use manifest_sync::ini;
use tracing::debug;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// INI files to parse
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

pub fn run(args: CheckArgs) -> Result<(), CliError> {
    let total = args.files.len();
    let mut failed = 0;

    for path in &args.files {
        match check_file(path) {
            Ok(sections) => println!("ok     {} ({} sections)", path.display(), sections),
            Err(reason) => {
                failed += 1;
                println!("error  {}: {}", path.display(), reason);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Check { failed, total });
    }
    Ok(())
}

fn check_file(path: &Path) -> Result<usize, String> {
    debug!(path = %path.display(), "Checking manifest");
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    ini::parse(&text)
        .map(|doc| doc.len())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_counts_failures() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.ini");
        let bad = dir.path().join("bad.ini");
        fs::write(&good, "[A]\nk=v\n[B]\n").unwrap();
        fs::write(&bad, "k=v\n").unwrap();

        assert_eq!(check_file(&good), Ok(2));
        assert!(check_file(&bad).unwrap_err().starts_with("line 1:"));

        let result = run(CheckArgs {
            files: vec![good, bad, dir.path().join("missing.ini")],
        });
        assert!(matches!(result, Err(CliError::Check { failed: 2, total: 3 })));
    }
}
