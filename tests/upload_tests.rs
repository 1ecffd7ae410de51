//! Integration tests for reference book upload, serving and deletion.

mod support;

use axum::http::StatusCode;
use serde_json::json;

use support::{multipart_body, request_json, request_raw, test_app};

const BOUNDARY: &str = "----sapt-test-boundary";

fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

async fn upload(
    app: &axum::Router,
    author: Option<&str>,
    title: Option<&str>,
    file: Option<(&str, &[u8])>,
) -> (StatusCode, serde_json::Value) {
    let mut fields: Vec<(&str, Option<&str>, &[u8])> = Vec::new();
    if let Some(a) = author {
        fields.push(("author", None, a.as_bytes()));
    }
    if let Some(t) = title {
        fields.push(("title", None, t.as_bytes()));
    }
    if let Some((name, data)) = file {
        fields.push(("pdf", Some(name), data));
    }

    let body = multipart_body(BOUNDARY, &fields);
    let (status, bytes) = request_raw(
        app,
        "POST",
        "/api/reference-books/",
        Some(&multipart_content_type()),
        body,
    )
    .await;
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_upload_requires_all_fields() {
    let (app, _dir) = test_app();

    let (status, body) = upload(&app, Some("Knuth"), None, Some(("taocp.pdf", b"%PDF-1.4"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "author, title and pdf are required");

    let (status, _) = upload(&app, Some("Knuth"), Some("TAOCP"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_non_pdf() {
    let (app, _dir) = test_app();

    let (status, body) =
        upload(&app, Some("Knuth"), Some("TAOCP"), Some(("taocp.docx", b"PK"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PDF files allowed");
}

#[tokio::test]
async fn test_upload_stores_and_serves_file() {
    let (app, _dir) = test_app();

    let (status, body) = upload(
        &app,
        Some("Knuth"),
        Some("TAOCP"),
        Some(("taocp.pdf", b"%PDF-1.4 content")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"], "Knuth");
    assert_eq!(body["pdf_url"], "/uploads/taocp.pdf");

    let (status, bytes) = request_raw(&app, "GET", "/uploads/taocp.pdf", None, Vec::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"%PDF-1.4 content");

    let (status, _) = request_raw(&app, "GET", "/uploads/missing.pdf", None, Vec::new()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_filenames_get_timestamp_suffix() {
    let (app, _dir) = test_app();

    let (_, first) = upload(&app, Some("A"), Some("One"), Some(("notes.pdf", b"first"))).await;
    let (_, second) = upload(&app, Some("B"), Some("Two"), Some(("notes.pdf", b"second"))).await;

    let first_url = first["pdf_url"].as_str().unwrap();
    let second_url = second["pdf_url"].as_str().unwrap();
    assert_eq!(first_url, "/uploads/notes.pdf");
    assert_ne!(first_url, second_url);
    assert!(second_url.starts_with("/uploads/notes_"));
    assert!(second_url.ends_with(".pdf"));

    // Both files remain independently retrievable with their own bytes.
    let (status, bytes) = request_raw(&app, "GET", first_url, None, Vec::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"first");
    let (status, bytes) = request_raw(&app, "GET", second_url, None, Vec::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"second");
}

#[tokio::test]
async fn test_listing_and_delete() {
    let (app, _dir) = test_app();

    let (_, created) =
        upload(&app, Some("Knuth"), Some("TAOCP"), Some(("taocp.pdf", b"%PDF"))).await;
    let id = created["id"].as_i64().unwrap();

    let (status, listing) = request_json(&app, "GET", "/api/reference-books/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);
    assert_eq!(listing[0]["title"], "TAOCP");

    let (status, _) =
        request_json(&app, "DELETE", &format!("/api/reference-books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        request_json(&app, "DELETE", &format!("/api/reference-books/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");

    // Deleting the row leaves the stored file behind.
    let (status, _) = request_raw(&app, "GET", "/uploads/taocp.pdf", None, Vec::new()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_records_uploader_when_token_present() {
    let (app, _dir) = test_app();

    // Create a staff user and log in to get a token.
    let (status, _) = request_json(
        &app,
        "POST",
        "/api/staff/",
        Some(json!({"name": "Jane", "email": "jane@example.com", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, login) = request_json(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"username": "jane@example.com", "password": "hunter22"})),
    )
    .await;
    let token = login["access_token"].as_str().unwrap();

    // Upload with the bearer token attached; a garbage token would simply
    // leave the uploader unset, so success here only checks the happy path.
    let body = multipart_body(
        BOUNDARY,
        &[
            ("author", None, b"Knuth" as &[u8]),
            ("title", None, b"TAOCP"),
            ("pdf", Some("taocp.pdf"), b"%PDF"),
        ],
    );
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/reference-books/")
        .header(axum::http::header::CONTENT_TYPE, multipart_content_type())
        .header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", token),
        )
        .body(axum::body::Body::from(body))
        .unwrap();

    use tower::ServiceExt;
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}
