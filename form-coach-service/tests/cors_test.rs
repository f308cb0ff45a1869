//! Method handling and CORS headers on every response.

mod common;

use axum::http::{header, Method, StatusCode};
use common::{TestApp, TestResponse};
use serde_json::json;

fn assert_cors(response: &TestResponse) {
    let headers = &response.headers;
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization"
    );
}

#[tokio::test]
async fn preflight_returns_empty_ok() {
    let app = TestApp::new();

    for path in ["/api/analyze", "/api/coach"] {
        let response = app.request(Method::OPTIONS, path).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());
        assert_cors(&response);
    }

    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    let app = TestApp::new();

    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = app.request(method, "/api/coach").await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.json(), json!({ "error": "Method not allowed" }));
        assert_cors(&response);
    }

    let response = app.request(Method::GET, "/api/analyze").await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_cors(&response);
}

#[tokio::test]
async fn error_and_success_responses_carry_cors_headers() {
    let app = TestApp::new();

    let response = app.post_json("/api/analyze", json!({ "record": {} })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_cors(&response);

    let response = app
        .post_json("/api/coach", json!({ "scan_id": "s", "json_data": {} }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_cors(&response);
}

#[tokio::test]
async fn unknown_route_is_not_found_with_cors() {
    let app = TestApp::new();

    let response = app.request(Method::POST, "/api/unknown").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_cors(&response);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new();

    let response = app
        .send(
            axum::http::Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/analyze")
                .header("x-request-id", "req-abc-123")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.headers["x-request-id"], "req-abc-123");
}
