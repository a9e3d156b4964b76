//! Integration tests for a full sync run.
//!
//! These tests wire the production GitHub content source and commit history
//! to an in-memory HTTP client and verify:
//! - manifest fetch → parse → resolve → write
//! - partial failure of individual entries
//! - the freshness guard and authentication failures
//! - that a run only touches its own game mode's paths
//!
//! Run with: `cargo test --test sync_integration`

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use manifest_sync::fetch::{
    ErrorKind, FetchError, GitHubCommitHistory, GitHubContentSource, HttpClient, RepoRef,
    RetryPolicy,
};
use manifest_sync::freshness::FixedClock;
use manifest_sync::ini::parse;
use manifest_sync::{GameMode, SecretToken, SyncConfig, SyncError, SyncOrchestrator, SyncState};

// ============================================================================
// Helpers
// ============================================================================

const API: &str = "https://api.example.test";

/// HTTP client answering from a route table and recording requests.
#[derive(Default)]
struct RoutedHttp {
    routes: HashMap<String, Result<Vec<u8>, FetchError>>,
    requests: Mutex<Vec<String>>,
}

impl RoutedHttp {
    fn route(mut self, url: &str, body: &str) -> Self {
        self.routes.insert(url.to_string(), Ok(body.as_bytes().to_vec()));
        self
    }

    fn status(mut self, url: &str, status: u16) -> Self {
        self.routes
            .insert(url.to_string(), Err(FetchError::from_status(url, status)));
        self
    }

    /// Serve `text` as a contents API response for a repository path.
    fn file(self, path: &str, text: &str) -> Self {
        let encoded = STANDARD.encode(text);
        // The API wraps base64 at 60 columns
        let wrapped: Vec<String> = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();
        let body = serde_json::json!({
            "encoding": "base64",
            "content": wrapped.join("\n"),
        });
        self.route(&contents_url(path), &body.to_string())
    }

    fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for RoutedHttp {
    fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.routes.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::NotFound {
                url: url.to_string(),
            })
        })
    }
}

fn contents_url(path: &str) -> String {
    format!("{}/repos/owner/store/contents/{}?ref=master", API, path)
}

fn config(dir: &TempDir) -> SyncConfig {
    SyncConfig::default()
        .with_api_base(API)
        .with_repo(RepoRef::new("owner", "store", "master"))
        .with_output_dir(dir.path())
        .with_retry(RetryPolicy::None)
        .with_timeout(Duration::from_secs(5))
}

fn orchestrator(config: SyncConfig, http: Arc<RoutedHttp>) -> SyncOrchestrator {
    let source = GitHubContentSource::new(
        http.clone(),
        API,
        config.repo.clone(),
        config.token.clone(),
    );
    let history = GitHubCommitHistory::new(http.clone(), API, config.token.clone());
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    SyncOrchestrator::new(config, Arc::new(source), http, Arc::new(history))
        .with_clock(Arc::new(FixedClock(now)))
}

fn token() -> SecretToken {
    SecretToken::new("test-token")
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_scenario_url_is_resolved_into_download_manifest() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(
        RoutedHttp::default()
            .file("MoM/manifest.ini", "[Scenario1]\nurl=http://example/s1.json\n")
            .file("MoM/contentPacksManifest.ini", "")
            .route(
                "http://example/s1.json",
                r#"{"name":"Scenario One","version":"1.0"}"#,
            ),
    );

    let report = orchestrator(config(&dir).with_token(token()), http.clone())
        .run(GameMode::MoM)
        .unwrap();

    assert_eq!(report.state(), SyncState::Done);
    assert!(http.requested().contains(&"http://example/s1.json".to_string()));

    let written = fs::read_to_string(dir.path().join("MoM/manifestDownload.ini")).unwrap();
    assert_eq!(
        written,
        "[Scenario1]\n\
         name=Scenario One\n\
         version=1.0\n\
         url=http://example/s1.json\n\
         latest_update=\n\
         \n"
    );

    let packs = fs::read_to_string(dir.path().join("MoM/contentPacksManifestDownload.ini")).unwrap();
    assert!(packs.is_empty());
    assert!(report.plan.changed);
    assert_eq!(report.plan.message, "Update MoM download manifests");
}

#[test]
fn test_one_failed_entry_does_not_fail_the_run() {
    let dir = TempDir::new().unwrap();
    let manifest = "\
[Alpha]
external=https://raw.githubusercontent.com/u/quests/master/Alpha
[Beta]
external=https://raw.githubusercontent.com/u/quests/master/Beta
[Gamma]
external=https://raw.githubusercontent.com/u/quests/master/Gamma
";
    let raw = "https://raw.githubusercontent.com/u/quests/master";
    let http = Arc::new(
        RoutedHttp::default()
            .file("D2E/manifest.ini", manifest)
            .file("D2E/contentPacksManifest.ini", "")
            .route(&format!("{}/Alpha/scenario.ini", raw), "[Quest]\nname=Alpha\n")
            .status(&format!("{}/Beta/scenario.ini", raw), 404)
            .route(&format!("{}/Gamma/scenario.ini", raw), "[Quest]\nname=Gamma\n")
            .route(
                &format!("{}/repos/u/quests/commits?per_page=1&sha=master&path=Alpha", API),
                r#"[{"commit":{"committer":{"date":"2024-05-01T08:00:00Z"}}}]"#,
            ),
    );

    let report = orchestrator(config(&dir).with_token(token()), http)
        .run(GameMode::D2E)
        .unwrap();

    assert_eq!(report.state(), SyncState::Done);
    assert!(report.states.contains(&SyncState::Written));
    assert_eq!(report.failed_entries(), 1);

    let written = fs::read_to_string(dir.path().join("D2E/manifestDownload.ini")).unwrap();
    let doc = parse(&written).unwrap();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.get("Alpha", "name"), Some("Alpha"));
    assert_eq!(doc.get("Alpha", "latest_update"), Some("2024-05-01T08:00:00Z"));
    assert!(!doc.section("Alpha").unwrap().contains_key("external"));
    assert_eq!(doc.get("Gamma", "name"), Some("Gamma"));
    assert_eq!(doc.get("Gamma", "latest_update"), Some(""));

    let beta = doc.section("Beta").unwrap();
    assert!(beta.get("sync_error").unwrap().starts_with("not found"));
    assert_eq!(
        beta.get("url"),
        Some("https://raw.githubusercontent.com/u/quests/master/Beta")
    );
}

#[test]
fn test_recent_update_skips_run() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(
        RoutedHttp::default()
            .file("MoM/manifest.ini", "[Q]\nurl=http://example/q.ini\n")
            .file("MoM/contentPacksManifest.ini", "")
            .route(
                &format!("{}/repos/owner/store/commits?per_page=1&sha=master&path=MoM", API),
                r#"[{"commit":{"committer":{"date":"2024-06-01T11:55:00Z"}}}]"#,
            ),
    );

    let report = orchestrator(config(&dir).with_token(token()), http.clone())
        .run(GameMode::MoM)
        .unwrap();

    assert_eq!(report.state(), SyncState::Skipped);
    assert_eq!(
        report.states,
        vec![SyncState::Idle, SyncState::ModeSelected, SyncState::Skipped]
    );
    assert!(!report.plan.changed);
    assert!(http.requested().iter().all(|url| url.contains("/commits?")));
    assert!(!dir.path().join("MoM").exists());
}

#[test]
fn test_missing_token_fails_with_auth_error() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(
        RoutedHttp::default()
            .file("MoM/manifest.ini", "[Q]\nurl=http://example/q.ini\n")
            .file("MoM/contentPacksManifest.ini", ""),
    );

    let failure = orchestrator(config(&dir), http.clone())
        .run(GameMode::MoM)
        .unwrap_err();

    assert_eq!(failure.final_state(), SyncState::Failed);
    assert_eq!(failure.error.fetch_kind(), Some(ErrorKind::Auth));
    assert!(matches!(
        failure.error,
        SyncError::Fetch {
            source: FetchError::MissingToken,
            ..
        }
    ));
    assert!(!http.requested().iter().any(|url| url.contains("/contents/")));
    assert!(!dir.path().join("MoM").exists());
}

#[test]
fn test_rejected_token_fails_run() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(RoutedHttp::default().status(&contents_url("D2E/manifest.ini"), 401));

    let failure = orchestrator(config(&dir).with_token(token()), http)
        .run(GameMode::D2E)
        .unwrap_err();

    assert_eq!(failure.error.fetch_kind(), Some(ErrorKind::Auth));
    assert_eq!(failure.failed_after(), SyncState::ModeSelected);
}

#[test]
fn test_run_touches_only_its_mode() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("MoM")).unwrap();
    fs::write(dir.path().join("MoM/manifestDownload.ini"), "[Untouched]\n").unwrap();

    let http = Arc::new(
        RoutedHttp::default()
            .file("D2E/manifest.ini", "")
            .file("D2E/contentPacksManifest.ini", "[P]\nurl=http://example/p.ini\n")
            .route("http://example/p.ini", "[ContentPack]\nname=Pack\n"),
    );

    let report = orchestrator(config(&dir).with_token(token()), http.clone())
        .run(GameMode::D2E)
        .unwrap();
    assert_eq!(report.state(), SyncState::Done);

    let contents: Vec<_> = http
        .requested()
        .into_iter()
        .filter(|url| url.contains("/contents/"))
        .collect();
    assert_eq!(
        contents,
        vec![
            contents_url("D2E/manifest.ini"),
            contents_url("D2E/contentPacksManifest.ini")
        ]
    );

    assert_eq!(
        fs::read_to_string(dir.path().join("MoM/manifestDownload.ini")).unwrap(),
        "[Untouched]\n"
    );
    let packs = fs::read_to_string(dir.path().join("D2E/contentPacksManifestDownload.ini")).unwrap();
    assert!(packs.contains("name=Pack"));
}
