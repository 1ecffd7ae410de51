//! Shared helpers for the HTTP integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use sapt_backend::auth::TokenSigner;
use sapt_backend::db::repositories::LocalRepository;
use sapt_backend::db::FullRepository;
use sapt_backend::http::{create_router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Build a router over a fresh in-memory repository, with temporary upload
/// and frontend directories. The TempDir must be kept alive by the caller.
pub fn test_app() -> (Router, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let uploads = dir.path().join("uploads");
    let frontend = dir.path().join("frontend");
    std::fs::create_dir_all(&uploads).expect("create uploads dir");
    std::fs::create_dir_all(&frontend).expect("create frontend dir");
    std::fs::write(frontend.join("main.html"), "<html>SAPT</html>").expect("write main.html");

    let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
    let state = AppState::new(repo, TokenSigner::new(TEST_SECRET), uploads, frontend);
    (create_router(state), dir)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}

/// Send a JSON request and return (status, parsed body).
pub async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::from(json.to_string())).expect("request")
        }
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    (status, body_json(response).await)
}

/// Send a request with a bearer token.
pub async fn request_json_with_token(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    let request = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::from(json.to_string())).expect("request")
        }
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    (status, body_json(response).await)
}

/// Send a raw request and return (status, body bytes).
pub async fn request_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    let request = builder.body(Body::from(body)).expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, bytes.to_vec())
}

/// Encode fields as a multipart/form-data body.
/// Each field is (name, optional filename, bytes).
pub fn multipart_body(boundary: &str, fields: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/pdf\r\n\r\n",
                    name, f
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

/// Create a student over the API and return its id.
pub async fn seed_student(app: &Router, name: &str, email: &str) -> i64 {
    let (status, body) = request_json(
        app,
        "POST",
        "/api/students/",
        Some(serde_json::json!({
            "name": name,
            "email": email,
            "password": "pw123456",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed_student failed: {}", body);
    body["id"].as_i64().expect("student id")
}
