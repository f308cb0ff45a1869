//! Form-analysis webhook tests against a scripted model and in-memory store.

mod common;

use axum::http::StatusCode;
use common::{fenced, trigger, valid_scorecard, TestApp, TEST_VIDEO_URL};
use form_coach_service::services::providers::Operation;
use form_coach_service::services::ProviderError;
use serde_json::json;

const ANALYZE: &str = "/api/analyze";

#[tokio::test]
async fn stores_validated_scorecard_and_returns_its_id() {
    let app = TestApp::new();
    let scorecard = valid_scorecard();
    app.provider.push_text(fenced(&scorecard));

    let response = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Video analysis completed and saved successfully"
    );

    let scans = app.store.form_scans().await;
    assert_eq!(scans.len(), 1);
    assert_eq!(body["analysisId"], scans[0].id.to_string());
    assert_eq!(scans[0].video_url, TEST_VIDEO_URL);
    assert_eq!(scans[0].analysis_data.0, scorecard);
}

#[tokio::test]
async fn prompt_ends_with_the_video_reference() {
    let app = TestApp::new();
    app.provider.push_text(valid_scorecard().to_string());

    let response = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await;
    assert_eq!(response.status, StatusCode::OK);

    let prompts = app.provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].operation, Operation::FormAnalysis);
    assert!(prompts[0]
        .prompt
        .ends_with(&format!("\n\nPlease analyze this video: {}", TEST_VIDEO_URL)));
    assert!(prompts[0].prompt.contains("JSON Schema:"));
}

#[tokio::test]
async fn missing_record_url_is_rejected_before_calling_the_model() {
    let app = TestApp::new();

    let payloads = [
        json!({}),
        json!({ "type": "INSERT", "table": "videos" }),
        json!({ "url": TEST_VIDEO_URL }),
        json!({ "record": TEST_VIDEO_URL }),
        json!({ "record": null }),
        json!({ "record": {} }),
        json!({ "record": { "video": TEST_VIDEO_URL } }),
        json!({ "record": { "url": "" } }),
        json!({ "record": { "url": null } }),
    ];

    for payload in payloads {
        let response = app.post_json(ANALYZE, payload.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(
            response.json(),
            json!({ "error": "No video URL found in webhook payload" })
        );
    }

    assert_eq!(app.provider.call_count(), 0);
    assert!(app.store.form_scans().await.is_empty());
}

#[tokio::test]
async fn empty_or_non_json_body_counts_as_missing_url() {
    let app = TestApp::new();

    let response = app.post_raw(ANALYZE, "").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.post_raw(ANALYZE, "record[url]=https://x/y.mp4").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "No video URL found in webhook payload");

    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn prose_reply_is_a_parse_failure() {
    let app = TestApp::new();
    app.provider
        .push_text("Here is my analysis: your bench looks great!");

    let response = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Failed to parse AI response");
    assert!(body["details"].as_str().is_some_and(|d| !d.is_empty()));
    assert!(app.store.form_scans().await.is_empty());
}

#[tokio::test]
async fn wrong_metric_count_persists_nothing() {
    let app = TestApp::new();
    let mut scorecard = valid_scorecard();
    scorecard["metrics"].as_array_mut().unwrap().pop();
    app.provider.push_text(fenced(&scorecard));

    let response = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json()["error"].as_str().unwrap().to_string();
    assert!(error.contains("metrics array structure"), "{error}");
    assert!(error.ends_with("got 5"), "{error}");
    assert!(app.store.form_scans().await.is_empty());
}

#[tokio::test]
async fn missing_metric_field_is_named() {
    let app = TestApp::new();
    let mut scorecard = valid_scorecard();
    scorecard["metrics"][5]
        .as_object_mut()
        .unwrap()
        .remove("recommendation");
    app.provider.push_text(fenced(&scorecard));

    let response = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "error": "Missing required field 'recommendation' in metrics" })
    );
    assert!(app.store.form_scans().await.is_empty());
}

#[tokio::test]
async fn zero_overall_score_is_rejected() {
    let app = TestApp::new();
    let mut scorecard = valid_scorecard();
    scorecard["overall_score"] = json!(0);
    app.provider.push_text(fenced(&scorecard));

    let response = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json()["error"],
        "Invalid analysis data structure from AI: missing 'overall_score'"
    );
}

#[tokio::test]
async fn model_failure_is_an_internal_error() {
    let app = TestApp::new();
    app.provider.push_error(ProviderError::RateLimited);

    let response = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "error": "Internal server error", "details": "Rate limited" })
    );
    assert!(app.store.form_scans().await.is_empty());
}

#[tokio::test]
async fn store_failure_reports_persistence_error() {
    let app = TestApp::new();
    app.provider.push_text(fenced(&valid_scorecard()));
    app.store.set_fail_inserts(true);

    let response = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Failed to save analysis to database");
    assert_eq!(body["details"], "insert rejected by in-memory store");
}

#[tokio::test]
async fn empty_model_reply_is_a_parse_failure() {
    let app = TestApp::new();
    app.provider.push_text("");

    let response = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "Failed to parse AI response");
    assert!(app.store.form_scans().await.is_empty());
}

#[tokio::test]
async fn analysis_id_is_the_store_assigned_id() {
    let app = TestApp::new();
    app.provider.push_text(fenced(&valid_scorecard()));
    app.provider.push_text(fenced(&valid_scorecard()));

    let first = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await.json();
    let second = app.post_json(ANALYZE, trigger(TEST_VIDEO_URL)).await.json();

    let scans = app.store.form_scans().await;
    assert_eq!(first["analysisId"], json!(scans[0].id));
    assert_eq!(second["analysisId"], json!(scans[1].id));
    assert_ne!(first["analysisId"], second["analysisId"]);
}
