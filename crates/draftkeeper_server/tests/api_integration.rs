//! Integration tests for the Draftkeeper HTTP API.

mod support;

use axum::http::StatusCode;
use draftkeeper_server::LockOwnerId;
use serde_json::json;
use support::{setup_test_server, test_config_for_db_path, test_server_for_config};
use tempfile::TempDir;

const OWNER: &str = "x-draftkeeper-owner";

#[tokio::test]
async fn test_document_lifecycle() {
    let (server, _temp, _locks) = setup_test_server();

    let created = server
        .put("/api/document/lesson-1")
        .json(&json!({ "content": "Photosynthesis" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::OK);
    let doc: serde_json::Value = created.json();
    assert_eq!(doc["id"], "lesson-1");
    assert_eq!(doc["revision"], 1);

    let fetched = server.get("/api/document/lesson-1").await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    let body: serde_json::Value = fetched.json();
    assert_eq!(body["content"], "Photosynthesis");
    let etag = format!("\"{}\"", body["content_hash"].as_str().expect("hash"));
    fetched.assert_header("etag", etag.as_str());

    let unchanged = server
        .put("/api/document/lesson-1")
        .json(&json!({ "content": "Photosynthesis" }))
        .await;
    assert_eq!(unchanged.status_code(), StatusCode::OK);
    assert_eq!(unchanged.json::<serde_json::Value>()["revision"], 1);

    let updated = server
        .put("/api/document/lesson-1")
        .json(&json!({ "content": "Photosynthesis and respiration" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let updated: serde_json::Value = updated.json();
    assert_eq!(updated["revision"], 2);
    assert_eq!(updated["content"], "Photosynthesis and respiration");
}

#[tokio::test]
async fn test_missing_document_returns_json_404() {
    let (server, _temp, _locks) = setup_test_server();

    let response = server.get("/api/document/nope").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_invalid_document_id_rejected() {
    let (server, _temp, _locks) = setup_test_server();

    let response = server
        .put("/api/document/bad%20id")
        .json(&json!({ "content": "x" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_documents_returns_recent_first() {
    let (server, _temp, _locks) = setup_test_server();

    for (id, content) in [("a", "first"), ("b", "second")] {
        let response = server
            .put(&format!("/api/document/{}", id))
            .json(&json!({ "content": content }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let response = server.get("/api/documents").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let items: Vec<serde_json::Value> = response.json();
    let ids: Vec<&str> = items
        .iter()
        .map(|item| item["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(items[0]["content_len"], "second".len());

    let limited: Vec<serde_json::Value> = server
        .get("/api/documents")
        .add_query_param("limit", 1)
        .await
        .json();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_max_document_size_enforced_on_decoded_content() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = test_config_for_db_path(&temp_dir.path().join("db"));
    config.max_document_size = 1_000;
    let (server, _locks) = test_server_for_config(config);

    // Quote-heavy content roughly doubles in JSON; the limit applies to decoded bytes.
    let at_limit = "\"".repeat(1_000);
    let ok = server
        .put("/api/document/big")
        .json(&json!({ "content": at_limit }))
        .await;
    assert_eq!(ok.status_code(), StatusCode::OK);

    let above_limit = "x".repeat(1_001);
    let rejected = server
        .put("/api/document/big")
        .json(&json!({ "content": above_limit }))
        .await;
    assert_eq!(rejected.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = rejected.json();
    assert!(body["error"]
        .as_str()
        .expect("error")
        .contains("1000 bytes"));
}

#[tokio::test]
async fn test_locked_document_only_accepts_holder_writes() {
    let (server, _temp, _locks) = setup_test_server();

    let acquired = server
        .post("/api/document/notes/lock")
        .add_header(OWNER, "ada")
        .await;
    assert_eq!(acquired.status_code(), StatusCode::OK);
    assert_eq!(acquired.json::<serde_json::Value>()["owner"], "ada");

    let anonymous = server
        .put("/api/document/notes")
        .json(&json!({ "content": "anon" }))
        .await;
    assert_eq!(anonymous.status_code(), StatusCode::LOCKED);

    let other = server
        .put("/api/document/notes")
        .add_header(OWNER, "bob")
        .json(&json!({ "content": "bob" }))
        .await;
    assert_eq!(other.status_code(), StatusCode::LOCKED);

    let contended = server
        .post("/api/document/notes/lock")
        .add_header(OWNER, "bob")
        .await;
    assert_eq!(contended.status_code(), StatusCode::LOCKED);

    let holder = server
        .put("/api/document/notes")
        .add_header(OWNER, "ada")
        .json(&json!({ "content": "ada" }))
        .await;
    assert_eq!(holder.status_code(), StatusCode::OK);

    let wrong_release = server
        .delete("/api/document/notes/lock")
        .add_header(OWNER, "bob")
        .await;
    assert_eq!(wrong_release.status_code(), StatusCode::BAD_REQUEST);

    let released = server
        .delete("/api/document/notes/lock")
        .add_header(OWNER, "ada")
        .await;
    assert_eq!(released.status_code(), StatusCode::OK);

    let after_release = server
        .put("/api/document/notes")
        .json(&json!({ "content": "anyone" }))
        .await;
    assert_eq!(after_release.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_lock_requires_owner_header() {
    let (server, _temp, _locks) = setup_test_server();

    let response = server.post("/api/document/notes/lock").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_locks_taken_in_process_block_http_writes() {
    let (server, _temp, locks) = setup_test_server();
    let owner = LockOwnerId::new("editor-window");
    locks.acquire("shared", &owner).expect("acquire");

    let blocked = server
        .put("/api/document/shared")
        .json(&json!({ "content": "x" }))
        .await;
    assert_eq!(blocked.status_code(), StatusCode::LOCKED);

    locks.release("shared", &owner).expect("release");
    let allowed = server
        .put("/api/document/shared")
        .json(&json!({ "content": "x" }))
        .await;
    assert_eq!(allowed.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_and_strict_cors() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = test_config_for_db_path(&temp_dir.path().join("db"));
    config.port = 4055;
    let (server, _locks) = test_server_for_config(config);

    let response = server
        .get("/api/documents")
        .add_header("origin", "http://127.0.0.1:4055")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.assert_header("x-content-type-options", "nosniff");
    response.assert_header("x-frame-options", "DENY");
    response.assert_header("access-control-allow-origin", "http://127.0.0.1:4055");

    let foreign = server
        .get("/api/documents")
        .add_header("origin", "http://example.com:3000")
        .await;
    assert_eq!(foreign.status_code(), StatusCode::OK);
    assert!(!foreign.contains_header("access-control-allow-origin"));
}
