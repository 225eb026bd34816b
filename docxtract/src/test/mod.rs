//! End-to-end tests against the full application router.

use crate::Application;
use crate::api::models::extract::ExtractResponse;
use crate::config::{DOC_CONTENT_TYPE, DOCX_CONTENT_TYPE};
use crate::extract::ExtractorKind;
use crate::test_utils::{create_test_app, create_test_config, docx_bytes, document_form, staged_file_count};
use axum::http::StatusCode;
use std::future::IntoFuture;

fn numbered_body(i: usize) -> String {
    format!("<w:p><w:r><w:t>document</w:t></w:r><w:r><w:t xml:space=\"preserve\">number-{i}</w:t></w:r></w:p>")
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn test_concurrent_uploads_are_isolated() {
    let staging = tempfile::tempdir().unwrap();
    let app = create_test_app(create_test_config(&staging));

    let requests = (0..16).map(|i| {
        app.post("/extract")
            .multipart(document_form(docx_bytes(&numbered_body(i)), DOCX_CONTENT_TYPE))
            .into_future()
    });
    let responses = futures::future::join_all(requests).await;

    for (i, response) in responses.into_iter().enumerate() {
        response.assert_status_ok();
        let body: ExtractResponse = response.json();
        assert_eq!(body.content, format!("document number-{i} "));
    }
    assert_eq!(staged_file_count(&staging), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_outcomes_leave_no_files() {
    let staging = tempfile::tempdir().unwrap();
    let app = create_test_app(create_test_config(&staging));

    let requests = (0..12).map(|i| {
        let bytes = if i % 2 == 0 {
            docx_bytes(&numbered_body(i))
        } else {
            b"corrupt".to_vec()
        };
        app.post("/extract").multipart(document_form(bytes, DOCX_CONTENT_TYPE)).into_future()
    });
    let responses = futures::future::join_all(requests).await;

    for (i, response) in responses.into_iter().enumerate() {
        if i % 2 == 0 {
            response.assert_status_ok();
        } else {
            response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
    assert_eq!(staged_file_count(&staging), 0);
}

#[tokio::test]
async fn test_default_limit_is_ten_mebibytes() {
    let staging = tempfile::tempdir().unwrap();
    let app = create_test_app(create_test_config(&staging));

    let oversized = vec![0u8; (10 << 20) + 1];
    let response = app.post("/extract").multipart(document_form(oversized, DOC_CONTENT_TYPE)).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "File too large");
    assert_eq!(staged_file_count(&staging), 0);
}

#[tokio::test]
async fn test_header_trust_is_independent_of_bytes() {
    let staging = tempfile::tempdir().unwrap();
    let app = create_test_app(create_test_config(&staging));

    // A genuine package is rejected under the wrong declared type...
    let response = app
        .post("/extract")
        .multipart(document_form(docx_bytes(&numbered_body(1)), "application/octet-stream"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // ...and accepted under the legacy Word type, since only the header is checked
    let response = app
        .post("/extract")
        .multipart(document_form(docx_bytes(&numbered_body(1)), DOC_CONTENT_TYPE))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<ExtractResponse>().content, "document number-1 ");
}

#[tokio::test]
async fn test_application_router() {
    let staging = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&staging);
    config.extraction.strategy = ExtractorKind::BodyXml;
    let server = Application::new(config).into_test_server();

    let response = server
        .post("/extract")
        .multipart(document_form(docx_bytes("<w:p/>"), DOCX_CONTENT_TYPE))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<ExtractResponse>().content, "<w:body><w:p/></w:body>");
    server.get("/extract").await.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}
