//! Web API file tests.
//!
//! Integration tests for upload, listing, search, download, delete, and
//! quota enforcement.

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use cubby::db::Database;
use cubby::file::{DiskBlobStore, FileService, SqliteMetadataStore};
use cubby::web::handlers::AppState;
use cubby::web::middleware::JwtState;
use cubby::web::router::create_router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// Create a test server with the given per-user quota.
async fn create_test_server_with_quota(quota_bytes: u64) -> (TestServer, TempDir) {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blobs = Arc::new(DiskBlobStore::new(temp_dir.path()).expect("Failed to create blob store"));
    let metadata = Arc::new(SqliteMetadataStore::new(db.pool().clone()));
    let files = Arc::new(FileService::new(metadata, blobs).with_quota_bytes(quota_bytes));

    let app_state = Arc::new(AppState::new(db, files, JWT_SECRET, 900));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET));

    let router = create_router(app_state, jwt_state, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, temp_dir)
}

async fn create_test_server() -> (TestServer, TempDir) {
    create_test_server_with_quota(10 * 1024 * 1024).await
}

/// Register a user and return their access token.
async fn register_and_login(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password123"
        }))
        .await;

    let body = response.json::<Value>();
    body["data"]["access_token"]
        .as_str()
        .expect("access_token missing")
        .to_string()
}

/// Upload a file and return the response.
async fn upload(
    server: &TestServer,
    token: &str,
    filename: &str,
    content: &[u8],
    mime_type: &str,
) -> axum_test::TestResponse {
    let part = Part::bytes(content.to_vec())
        .file_name(filename.to_string())
        .mime_type(mime_type);
    let form = MultipartForm::new().add_part("file", part);

    server
        .post("/api/files")
        .authorization_bearer(token)
        .multipart(form)
        .await
}

/// Upload a file, asserting success, and return its ID.
async fn upload_ok(server: &TestServer, token: &str, filename: &str, content: &[u8]) -> i64 {
    let response = upload(server, token, filename, content, "text/plain").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()["data"]["file"]["id"]
        .as_i64()
        .expect("file id missing")
}

#[tokio::test]
async fn test_upload_success() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let response = upload(&server, &token, "hello.txt", b"Hello, World!", "text/plain").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    let file = &body["data"]["file"];
    assert_eq!(file["original_name"], "hello.txt");
    assert_eq!(file["size_bytes"], 13);
    assert_eq!(file["mime_type"], "text/plain");
    assert!(file["id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_upload_requires_authentication() {
    let (server, _dir) = create_test_server().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"data".to_vec()).file_name("a.txt".to_string()),
    );
    let response = server.post("/api/files").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let form = MultipartForm::new().add_text("note", "no file here");
    let response = server
        .post("/api/files")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_empty_file_rejected() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let response = upload(&server, &token, "empty.txt", b"", "text/plain").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_quota_rejected() {
    let (server, _dir) = create_test_server_with_quota(1000).await;
    let token = register_and_login(&server, "alice").await;

    // Fill up to quota - 10
    let response = upload(&server, &token, "base.bin", &vec![0u8; 990], "application/octet-stream").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // 11 more bytes exceed the quota
    let response = upload(&server, &token, "over.bin", &vec![0u8; 11], "application/octet-stream").await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

    // Exactly 10 bytes still fit
    let response = upload(&server, &token, "fits.bin", &vec![0u8; 10], "application/octet-stream").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let usage = server
        .get("/api/usage")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(usage["data"]["used_bytes"], 1000);
    assert_eq!(usage["data"]["percent"], 100);
}

#[tokio::test]
async fn test_list_files_newest_first() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    upload_ok(&server, &token, "first.txt", b"one").await;
    upload_ok(&server, &token, "second.txt", b"two").await;
    upload_ok(&server, &token, "third.txt", b"three").await;

    let response = server
        .get("/api/files")
        .authorization_bearer(&token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    let names: Vec<&str> = body["data"]["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["original_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["third.txt", "second.txt", "first.txt"]);

    let stats = &body["data"]["stats"];
    assert_eq!(stats["file_count"], 3);
    assert_eq!(stats["used_bytes"], 11);
}

#[tokio::test]
async fn test_list_files_search() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    upload_ok(&server, &token, "Report.pdf", b"report data").await;
    upload_ok(&server, &token, "image.png", b"image data").await;

    let response = server
        .get("/api/files")
        .add_query_param("search", "report")
        .authorization_bearer(&token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    let files = body["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["original_name"], "Report.pdf");

    // Stats still cover all of the user's files, not just the matches
    assert_eq!(body["data"]["stats"]["file_count"], 2);
}

#[tokio::test]
async fn test_list_is_scoped_to_owner() {
    let (server, _dir) = create_test_server().await;
    let alice = register_and_login(&server, "alice").await;
    let bob = register_and_login(&server, "bob").await;

    upload_ok(&server, &alice, "alice.txt", b"alice data").await;
    upload_ok(&server, &bob, "bob.txt", b"bob data").await;

    let body = server
        .get("/api/files")
        .authorization_bearer(&alice)
        .await
        .json::<Value>();

    let files = body["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["original_name"], "alice.txt");
}

#[tokio::test]
async fn test_download_returns_content_and_headers() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let content = b"Download test content";
    let id = upload_ok(&server, &token, "notes.txt", content).await;

    let response = server
        .get(&format!("/api/files/{id}/download"))
        .authorization_bearer(&token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().to_vec(), content.to_vec());

    let content_type = response.header("content-type");
    assert_eq!(content_type.to_str().unwrap(), "text/plain");

    let disposition = response.header("content-disposition");
    assert_eq!(
        disposition.to_str().unwrap(),
        "attachment; filename=\"notes.txt\""
    );
}

#[tokio::test]
async fn test_download_with_query_token() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let id = upload_ok(&server, &token, "notes.txt", b"data").await;

    // Browser-initiated downloads can't set headers; the token query
    // parameter works instead
    let response = server
        .get(&format!("/api/files/{id}/download"))
        .add_query_param("token", &token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().to_vec(), b"data".to_vec());
}

#[tokio::test]
async fn test_download_missing_file() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let response = server
        .get("/api/files/9999/download")
        .authorization_bearer(&token)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_foreign_file_is_not_found() {
    let (server, _dir) = create_test_server().await;
    let alice = register_and_login(&server, "alice").await;
    let bob = register_and_login(&server, "bob").await;

    let id = upload_ok(&server, &alice, "private.txt", b"secret").await;

    // Bob sees the same response as for a file that doesn't exist
    let response = server
        .get(&format!("/api/files/{id}/download"))
        .authorization_bearer(&bob)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_success() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let id = upload_ok(&server, &token, "delete-me.txt", b"data").await;

    let response = server
        .delete(&format!("/api/files/{id}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // The file is gone from the listing and can't be downloaded
    let body = server
        .get("/api/files")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert!(body["data"]["files"].as_array().unwrap().is_empty());

    let response = server
        .get(&format!("/api/files/{id}/download"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_foreign_file_is_not_found_and_file_survives() {
    let (server, _dir) = create_test_server().await;
    let alice = register_and_login(&server, "alice").await;
    let bob = register_and_login(&server, "bob").await;

    let id = upload_ok(&server, &alice, "keep.txt", b"alice data").await;

    let response = server
        .delete(&format!("/api/files/{id}"))
        .authorization_bearer(&bob)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Alice's file is fully intact
    let response = server
        .get(&format!("/api/files/{id}/download"))
        .authorization_bearer(&alice)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().to_vec(), b"alice data".to_vec());
}

#[tokio::test]
async fn test_usage_lifecycle() {
    let (server, _dir) = create_test_server_with_quota(1000).await;
    let token = register_and_login(&server, "alice").await;

    // Initially empty
    let usage = server
        .get("/api/usage")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(usage["data"]["used_bytes"], 0);
    assert_eq!(usage["data"]["percent"], 0);
    assert_eq!(usage["data"]["file_count"], 0);

    // Upload a 100-byte file: 10% of the quota
    let id = upload_ok(&server, &token, "a.txt", &[b'x'; 100]).await;

    let usage = server
        .get("/api/usage")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(usage["data"]["used_bytes"], 100);
    assert_eq!(usage["data"]["percent"], 10);
    assert_eq!(usage["data"]["file_count"], 1);

    // Delete it: back to zero
    server
        .delete(&format!("/api/files/{id}"))
        .authorization_bearer(&token)
        .await;

    let usage = server
        .get("/api/usage")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(usage["data"]["used_bytes"], 0);
    assert_eq!(usage["data"]["percent"], 0);
}

#[tokio::test]
async fn test_upload_uses_declared_content_type() {
    let (server, _dir) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let response = upload(&server, &token, "data.json", b"{}", "application/json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["file"]["mime_type"], "application/json");
}
