//! Game modes and the repository paths they namespace.
//!
//! Every file the job reads or writes lives under a directory named after the
//! game mode, so runs for different modes never touch the same paths.

use std::fmt;
use std::str::FromStr;

/// Input manifest enumerating scenarios.
pub const MANIFEST_FILE: &str = "manifest.ini";

/// Input manifest enumerating content packs.
pub const CONTENT_PACKS_MANIFEST_FILE: &str = "contentPacksManifest.ini";

/// Output manifest derived from [`MANIFEST_FILE`].
pub const MANIFEST_DOWNLOAD_FILE: &str = "manifestDownload.ini";

/// Output manifest derived from [`CONTENT_PACKS_MANIFEST_FILE`].
pub const CONTENT_PACKS_DOWNLOAD_FILE: &str = "contentPacksManifestDownload.ini";

/// Supported game variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// Descent: Journeys in the Dark (Second Edition).
    D2E,
    /// Mansions of Madness.
    MoM,
}

impl GameMode {
    /// All modes, in schedule order.
    pub const ALL: [GameMode; 2] = [GameMode::D2E, GameMode::MoM];

    /// Directory name used in the repository.
    pub fn dir_name(&self) -> &'static str {
        match self {
            GameMode::D2E => "D2E",
            GameMode::MoM => "MoM",
        }
    }

    /// Repository path of a file inside this mode's directory.
    ///
    /// # Example
    ///
    /// ```
    /// use manifest_sync::GameMode;
    ///
    /// assert_eq!(GameMode::MoM.path("manifest.ini"), "MoM/manifest.ini");
    /// ```
    pub fn path(&self, file: &str) -> String {
        format!("{}/{}", self.dir_name(), file.trim_start_matches('/'))
    }

    /// The two input paths read for this mode.
    pub fn input_paths(&self) -> [String; 2] {
        ManifestKind::ALL.map(|kind| self.path(kind.input_file()))
    }

    /// The two output paths written for this mode.
    pub fn output_paths(&self) -> [String; 2] {
        ManifestKind::ALL.map(|kind| self.path(kind.output_file()))
    }

    /// Output paths of every mode; the set a commit stages.
    pub fn all_output_paths() -> Vec<String> {
        Self::ALL.iter().flat_map(|mode| mode.output_paths()).collect()
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Error returned when a game mode name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game mode '{0}' (expected D2E or MoM)")]
pub struct UnknownGameMode(pub String);

impl FromStr for GameMode {
    type Err = UnknownGameMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d2e" => Ok(GameMode::D2E),
            "mom" => Ok(GameMode::MoM),
            _ => Err(UnknownGameMode(s.to_string())),
        }
    }
}

/// The two manifests processed per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    /// `manifest.ini`, entries point at scenario directories.
    Scenarios,
    /// `contentPacksManifest.ini`, entries point at content pack directories.
    ContentPacks,
}

impl ManifestKind {
    pub const ALL: [ManifestKind; 2] = [ManifestKind::Scenarios, ManifestKind::ContentPacks];

    pub fn input_file(&self) -> &'static str {
        match self {
            ManifestKind::Scenarios => MANIFEST_FILE,
            ManifestKind::ContentPacks => CONTENT_PACKS_MANIFEST_FILE,
        }
    }

    pub fn output_file(&self) -> &'static str {
        match self {
            ManifestKind::Scenarios => MANIFEST_DOWNLOAD_FILE,
            ManifestKind::ContentPacks => CONTENT_PACKS_DOWNLOAD_FILE,
        }
    }

    /// Descriptor file appended to directory-style locations.
    pub fn payload_file(&self) -> &'static str {
        match self {
            ManifestKind::Scenarios => "scenario.ini",
            ManifestKind::ContentPacks => "content_pack.ini",
        }
    }

    /// Section of the descriptor holding the entry's metadata.
    pub fn payload_section(&self) -> &'static str {
        match self {
            ManifestKind::Scenarios => "Quest",
            ManifestKind::ContentPacks => "ContentPack",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestKind::Scenarios => f.write_str("scenarios"),
            ManifestKind::ContentPacks => f.write_str("content packs"),
        }
    }
}
