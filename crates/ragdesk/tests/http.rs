//! Router-level tests: status mapping, error bodies, and the multipart
//! upload handler, driven in-process with `tower::ServiceExt::oneshot`.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use common::{test_context, CANNED_ANSWER, REFUND_DOC};
use ragdesk::server::router;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn chat_request(query: &str, session_id: &str) -> Request<Body> {
    Request::post("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "query": query, "session_id": session_id }).to_string(),
        ))
        .unwrap()
}

fn upload_request(filename: &str, content: &str) -> Request<Body> {
    let boundary = "ragdesk-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );
    Request::post("/api/upload-and-process")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = TempDir::new().unwrap();
    let (ctx, _) = test_context(dir.path().to_path_buf());

    let response = router(ctx)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn chat_before_upload_is_404_with_detail() {
    let dir = TempDir::new().unwrap();
    let (ctx, _) = test_context(dir.path().to_path_buf());

    let response = router(ctx)
        .oneshot(chat_request("what is the refund window?", "s1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["detail"],
        "Knowledge base is empty. Please upload a document."
    );
}

#[tokio::test]
async fn unsupported_upload_is_400_with_detail() {
    let dir = TempDir::new().unwrap();
    let (ctx, _) = test_context(dir.path().to_path_buf());

    let response = router(ctx)
        .oneshot(upload_request("deck.pptx", "not really a deck"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let detail = body_json(response).await["detail"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(detail.contains("unsupported file type"), "detail: {detail}");
}

#[tokio::test]
async fn upload_missing_file_field_is_400() {
    let dir = TempDir::new().unwrap();
    let (ctx, _) = test_context(dir.path().to_path_buf());

    let boundary = "ragdesk-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"other\"\r\n\r\n\
         irrelevant\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::post("/api/upload-and-process")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = router(ctx).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_then_chat_round_trip() {
    let dir = TempDir::new().unwrap();
    let (ctx, _) = test_context(dir.path().to_path_buf());
    let app = router(ctx);

    let response = app
        .clone()
        .oneshot(upload_request("notes.txt", REFUND_DOC))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let analysis = body_json(response).await;
    assert_eq!(analysis["assigned_role"], "Finance Manager");

    let response = app
        .clone()
        .oneshot(Request::get("/api/documents").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!(["notes.txt"]));

    let response = app
        .oneshot(chat_request("what is the refund window?", "s1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let chat = body_json(response).await;
    assert_eq!(chat["answer"], CANNED_ANSWER);
    assert_eq!(chat["sources"], serde_json::json!(["notes.txt"]));
}

#[tokio::test]
async fn documents_list_is_empty_not_an_error() {
    let dir = TempDir::new().unwrap();
    let (ctx, _) = test_context(dir.path().to_path_buf());

    let response = router(ctx)
        .oneshot(Request::get("/api/documents").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}
