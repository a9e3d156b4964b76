//! manifest-sync - download manifest generation for game-data repositories
//!
//! This library implements a single-shot batch job: for one [`GameMode`] it
//! fetches the `manifest.ini` and `contentPacksManifest.ini` files from a
//! remote game-data repository, resolves every entry's scenario or content
//! pack descriptor, and writes the derived download manifests into the
//! working tree for an external workflow to commit.
//!
//! # Architecture
//!
//! ```text
//! SyncOrchestrator
//!     │
//!     ├── FreshnessGuard ── CommitHistory + Clock
//!     │
//!     ├── ManifestFetcher ── ContentSource (GitHub API / local dir)
//!     │                          └── HttpClient
//!     ├── ini::parse / ini::serialize
//!     │
//!     └── ManifestResolver ── HttpClient + CommitHistory
//! ```
//!
//! All network access goes through the [`fetch::HttpClient`] trait so every
//! stage can be exercised in tests without a network.

pub mod config;
pub mod fetch;
pub mod freshness;
pub mod ini;
pub mod mode;
pub mod orchestrator;
pub mod resolve;

pub use config::{ConfigError, SecretToken, SyncConfig};
pub use mode::{GameMode, ManifestKind};
pub use orchestrator::{CommitPlan, SyncError, SyncFailure, SyncOrchestrator, SyncReport, SyncState};
