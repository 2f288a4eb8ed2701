//! Router tests for the upload form. No network, no pdfium, no provider.
#![cfg(feature = "server")]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use sof_assistant::web::{create_router, AppState};
use sof_assistant::AnalysisConfig;
use tower::ServiceExt;

const BOUNDARY: &str = "sof-test-boundary";

fn app() -> axum::Router {
    let config = AnalysisConfig::builder()
        .pdfium_library("/definitely/not/libpdfium.so")
        .build()
        .unwrap();
    create_router(AppState::new(config))
}

/// Multipart body with the given text fields and `(file name, bytes)` files.
fn multipart(fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"statements\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn index_serves_the_form() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("AML Source of Funds Assistant"));
    assert!(html.contains("name=\"purchase_price\""));
    assert!(html.contains("name=\"mortgage_advance\""));
    assert!(html.contains("name=\"personal_contribution\""));
}

#[tokio::test]
async fn health_is_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn form_without_files_warns() {
    let body = multipart(&[("purchase_price", "250000"), ("role", "Solicitor")], &[]);
    let response = app().oneshot(post("/analyze", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("class=\"warning\""));
    assert!(html.contains("Please upload at least one PDF."));
    // Submitted values survive the round trip.
    assert!(html.contains("value=\"250000\""));
    assert!(html.contains("<option value=\"Solicitor\" selected>"));
}

#[tokio::test]
async fn empty_file_part_counts_as_no_upload() {
    let body = multipart(&[], &[("", b"")]);
    let response = app().oneshot(post("/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Please upload at least one PDF."));
}

#[tokio::test]
async fn negative_figure_is_rejected() {
    let body = multipart(&[("mortgage_advance", "-1")], &[("jan.pdf", b"%PDF-1.4\n")]);
    let response = app().oneshot(post("/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("class=\"error\""));
    assert!(html.contains("mortgage_advance"));
}

#[tokio::test]
async fn missing_provider_is_unavailable() {
    let body = multipart(&[("purchase_price", "1000")], &[("jan.pdf", b"%PDF-1.4\n")]);
    let response = app().oneshot(post("/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_text(response).await.contains("not configured"));
}

#[tokio::test]
async fn api_without_files_is_json_error() {
    let response = app()
        .oneshot(post("/api/analyze", multipart(&[], &[])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["error"], "Please upload at least one PDF.");
    assert!(json.get("raw_response").is_none());
}

#[tokio::test]
async fn api_rejects_unknown_role() {
    let body = multipart(&[("role", "Banker")], &[("jan.pdf", b"%PDF-1.4\n")]);
    let response = app().oneshot(post("/api/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("unknown role"));
}
