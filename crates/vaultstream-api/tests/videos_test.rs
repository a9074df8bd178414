//! Video record and upload API integration tests.
//!
//! Run with: `cargo test -p vaultstream-api --test videos_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::{sample_png, sample_video, FASTSTART_MARKER};
use helpers::{asset_path, create_video, setup_test_app, ASSETS_BASE_URL};
use uuid::Uuid;

fn video_form(data: Vec<u8>, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "video",
        Part::bytes(data).file_name("boots.mp4").mime_type(mime),
    )
}

fn thumbnail_form(data: Vec<u8>, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "thumbnail",
        Part::bytes(data).file_name("boots.png").mime_type(mime),
    )
}

fn scratch_entries(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;
    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["storage"], "local");
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/videos")
        .json(&serde_json::json!({ "title": "Boots" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .get(&format!("/api/videos/{}", Uuid::new_v4()))
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_create_rejects_blank_title() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", app.bearer(Uuid::new_v4()))
        .json(&serde_json::json!({ "title": "   " }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_and_foreign_videos() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;

    let response = app
        .client()
        .get(&format!("/api/videos/{}", Uuid::new_v4()))
        .add_header("Authorization", app.bearer(owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .client()
        .get(&format!("/api/videos/{}", id))
        .add_header("Authorization", app.bearer(Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_metadata() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;

    let response = app
        .client()
        .put(&format!("/api/videos/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .json(&serde_json::json!({ "description": "A cat in boots" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Boots");
    assert_eq!(body["description"], "A cat in boots");

    let response = app
        .client()
        .put(&format!("/api/videos/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .json(&serde_json::json!({ "title": "" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_video_commits_repackaged_file() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(sample_video(), "video/mp4"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    let video_url = body["video_url"].as_str().expect("signed video url");
    let expected_prefix = format!("{}/landscape/{}.mp4?expires=", ASSETS_BASE_URL, id);
    assert!(video_url.starts_with(&expected_prefix), "{}", video_url);
    assert!(video_url.contains("&signature="));

    // The record itself keeps the opaque reference, not the URL.
    let stored = app.state.videos.get_video(id).await.unwrap().unwrap();
    assert_eq!(
        stored.video_url.as_deref(),
        Some(format!("local,landscape/{}.mp4", id).as_str())
    );

    let on_disk = std::fs::read(app.assets_root().join(format!("landscape/{}.mp4", id))).unwrap();
    let mut expected = sample_video();
    expected.extend_from_slice(FASTSTART_MARKER);
    assert_eq!(on_disk, expected);

    assert_eq!(scratch_entries(&app.scratch_dir()), 0);

    let asset = app.client().get(&asset_path(video_url)).await;
    assert_eq!(asset.status_code(), StatusCode::OK);
    assert_eq!(asset.as_bytes().to_vec(), expected);
}

#[tokio::test]
async fn test_upload_video_rejects_bad_input() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;
    let path = format!("/api/video_upload/{}", id);

    let response = app
        .client()
        .post(&path)
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(sample_video(), "video/webm"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .client()
        .post(&path)
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(Vec::new(), "video/mp4"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .client()
        .post(&path)
        .add_header("Authorization", app.bearer(owner))
        .multipart(thumbnail_form(sample_png(), "image/png"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let stored = app.state.videos.get_video(id).await.unwrap().unwrap();
    assert!(stored.video_url.is_none());
    assert_eq!(scratch_entries(&app.scratch_dir()), 0);
}

#[tokio::test]
async fn test_upload_to_foreign_video_is_forbidden() {
    let app = setup_test_app().await;
    let id = create_video(&app, Uuid::new_v4(), "Boots").await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", id))
        .add_header("Authorization", app.bearer(Uuid::new_v4()))
        .multipart(video_form(sample_video(), "video/mp4"))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert!(!app.assets_root().join("landscape").exists());
}

#[tokio::test]
async fn test_thumbnail_upload_and_delete() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(thumbnail_form(sample_png(), "image/png"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    let thumbnail_url = body["thumbnail_url"].as_str().expect("signed thumbnail url");
    assert!(thumbnail_url.starts_with(&format!("{}/thumbnails/{}.png?", ASSETS_BASE_URL, id)));

    let file = app.assets_root().join(format!("thumbnails/{}.png", id));
    assert!(file.exists());

    let response = app
        .client()
        .delete(&format!("/api/videos/{}/thumbnail", id))
        .add_header("Authorization", app.bearer(owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(!file.exists());

    let stored = app.state.videos.get_video(id).await.unwrap().unwrap();
    assert!(stored.thumbnail_url.is_none());
}

#[tokio::test]
async fn test_thumbnail_rejects_unsupported_type() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(thumbnail_form(b"GIF89a".to_vec(), "image/gif"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_video_file_clears_reference_even_when_object_is_gone() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(sample_video(), "video/mp4"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    std::fs::remove_file(app.assets_root().join(format!("landscape/{}.mp4", id))).unwrap();

    let response = app
        .client()
        .delete(&format!("/api/videos/{}/video-file", id))
        .add_header("Authorization", app.bearer(owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = app
        .client()
        .get(&format!("/api/videos/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .await
        .json();
    assert!(body["video_url"].is_null());
}

#[tokio::test]
async fn test_oversized_thumbnail_rejected_at_route_limit() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;

    let oversized = vec![0u8; 3 * 1024 * 1024];
    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(thumbnail_form(oversized, "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!response.text().contains("3145728"));
    assert!(!app.assets_root().join("thumbnails").exists());
}

#[tokio::test]
async fn test_thumbnail_past_cap_stops_reading() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;

    // Inside the route's framing allowance, one byte over the 1 MiB cap.
    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(thumbnail_form(vec![0u8; 1024 * 1024 + 1], "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert!(!body.to_string().contains("1048577"));

    let stored = app.state.videos.get_video(id).await.unwrap().unwrap();
    assert!(stored.thumbnail_url.is_none());
}

#[tokio::test]
async fn test_list_videos_returns_only_callers_records() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let first = create_video(&app, owner, "Boots").await;
    let second = create_video(&app, owner, "Cats").await;
    create_video(&app, Uuid::new_v4(), "Someone else").await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", first))
        .add_header("Authorization", app.bearer(owner))
        .multipart(thumbnail_form(sample_png(), "image/png"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .client()
        .get("/api/videos")
        .add_header("Authorization", app.bearer(owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Vec<serde_json::Value> = response.json();
    assert_eq!(body.len(), 2);
    let mut ids: Vec<&str> = body.iter().filter_map(|v| v["id"].as_str()).collect();
    ids.sort_unstable();
    let mut expected = vec![first.to_string(), second.to_string()];
    expected.sort_unstable();
    assert_eq!(ids, expected);

    let listed_first = body
        .iter()
        .find(|v| v["id"] == first.to_string())
        .expect("first record listed");
    let thumbnail_url = listed_first["thumbnail_url"].as_str().expect("signed thumbnail url");
    assert!(thumbnail_url.starts_with(&format!("{}/thumbnails/{}.png?", ASSETS_BASE_URL, first)));
    assert!(thumbnail_url.contains("signature="));
}

#[tokio::test]
async fn test_delete_video_removes_record_even_when_objects_are_gone() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let id = create_video(&app, owner, "Boots").await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(sample_video(), "video/mp4"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(thumbnail_form(sample_png(), "image/png"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // The video file vanished out of band; the thumbnail is still on disk.
    std::fs::remove_file(app.assets_root().join(format!("landscape/{}.mp4", id))).unwrap();
    let thumbnail = app.assets_root().join(format!("thumbnails/{}.png", id));
    assert!(thumbnail.exists());

    let response = app
        .client()
        .delete(&format!("/api/videos/{}", id))
        .add_header("Authorization", app.bearer(Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .client()
        .delete(&format!("/api/videos/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert!(!thumbnail.exists());
    assert!(app.state.videos.get_video(id).await.unwrap().is_none());

    let response = app
        .client()
        .get(&format!("/api/videos/{}", id))
        .add_header("Authorization", app.bearer(owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
