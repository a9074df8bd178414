//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p vaultstream-api`. Storage is a local
//! backend rooted in a temp directory; ffprobe and ffmpeg are replaced by fakes.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;
use vaultstream_api::auth::JwtIdentityResolver;
use vaultstream_api::setup::routes;
use vaultstream_api::state::AppState;
use vaultstream_api::InMemoryVideoRepository;
use vaultstream_core::Config;
use vaultstream_processing::{ThumbnailIngest, UploadPipeline};
use vaultstream_storage::create_storage;

pub const ASSETS_BASE_URL: &str = "http://localhost:8091/assets";

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn assets_root(&self) -> &Path {
        &self.state.config.storage.assets_root
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.state.config.media.upload_temp_dir.clone()
    }

    /// Bearer header value for `user_id`.
    pub fn bearer(&self, user_id: Uuid) -> String {
        format!("Bearer {}", auth::issue_token(user_id))
    }
}

pub fn create_test_config(root: &Path) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", auth::TEST_JWT_SECRET.to_string()),
        ("STORAGE_BACKEND", "local".to_string()),
        ("ASSETS_ROOT", root.join("assets").display().to_string()),
        ("ASSETS_BASE_URL", ASSETS_BASE_URL.to_string()),
        ("UPLOAD_TEMP_DIR", root.join("scratch").display().to_string()),
        ("MAX_VIDEO_SIZE_MB", "4".to_string()),
        ("MAX_THUMBNAIL_SIZE_MB", "1".to_string()),
    ]);
    Config::from_lookup(|name| vars.get(name).cloned()).expect("valid test config")
}

/// Setup test app with local storage and fake media tools.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(temp_dir.path());
    std::fs::create_dir_all(&config.media.upload_temp_dir).expect("scratch dir");

    let storage = create_storage(&config)
        .await
        .expect("Failed to create local storage");

    let pipeline = UploadPipeline::new(
        storage.clone(),
        Arc::new(fixtures::LandscapeProbe),
        Arc::new(fixtures::AppendingRepackager),
        config.media.upload_temp_dir.clone(),
    );
    let thumbnails = ThumbnailIngest::new(storage.clone(), config.max_thumbnail_size_bytes());

    let state = Arc::new(AppState {
        identity: Arc::new(JwtIdentityResolver::new(config.jwt_secret())),
        videos: Arc::new(InMemoryVideoRepository::new()),
        storage,
        pipeline,
        thumbnails,
        config,
    });

    let router = routes::setup_routes(&state.config, state.clone()).expect("routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Create a record owned by `user_id` through the API and return its id.
pub async fn create_video(app: &TestApp, user_id: Uuid, title: &str) -> Uuid {
    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", app.bearer(user_id))
        .json(&serde_json::json!({ "title": title, "description": "test upload" }))
        .await;
    assert_eq!(response.status_code(), 201);

    let body: serde_json::Value = response.json();
    body["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("created record has an id")
}

/// Path and query of a signed asset URL, relative to the test server.
pub fn asset_path(signed_url: &str) -> String {
    signed_url
        .strip_prefix("http://localhost:8091")
        .unwrap_or_else(|| panic!("unexpected asset url {}", signed_url))
        .to_string()
}
