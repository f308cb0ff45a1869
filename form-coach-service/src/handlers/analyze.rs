//! `POST /api/analyze`: score a bench-press video and store the scorecard.

use super::{generate_text, parse_payload};
use crate::error::HandlerError;
use crate::models::{validate_scorecard, NewFormScan, RecordId, FORM_SCANS_TABLE};
use crate::services::ai_output::parse_model_json;
use crate::services::{metrics, prompts, Operation};
use crate::startup::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

pub const NO_VIDEO_URL: &str = "No video URL found in webhook payload";
pub const SAVE_FAILED: &str = "Failed to save analysis to database";
pub const SUCCESS_MESSAGE: &str = "Video analysis completed and saved successfully";

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(rename = "analysisId")]
    pub analysis_id: RecordId,
}

/// The inserted row's `url` from a `{record: {url}}` webhook body.
fn video_url(payload: &Map<String, Value>) -> Option<&str> {
    payload
        .get("record")
        .and_then(|record| record.get("url"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}

#[instrument(skip_all)]
pub async fn analyze_video(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, HandlerError> {
    let payload = parse_payload(&body);
    let video_url = video_url(&payload).ok_or(HandlerError::InvalidTrigger(NO_VIDEO_URL))?;

    tracing::info!(video_url = %video_url, "Starting form analysis");

    let raw = generate_text(
        &state,
        Operation::FormAnalysis,
        &prompts::analysis_prompt(video_url),
    )
    .await?;

    let analysis = parse_model_json(&raw).map_err(|e| {
        tracing::error!(error = %e, raw_response = %raw, "Model returned unparseable JSON");
        metrics::record_validation_failure("malformed_json");
        HandlerError::MalformedAiOutput {
            details: e.to_string(),
        }
    })?;

    validate_scorecard(&analysis).map_err(|violation| {
        tracing::error!(violation = %violation, "Scorecard rejected");
        metrics::record_validation_failure(violation.reason());
        violation
    })?;

    let scan = state
        .store
        .insert_form_scan(NewFormScan::new(video_url, analysis))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to store form scan");
            metrics::record_persisted(FORM_SCANS_TABLE, "error");
            HandlerError::Persistence {
                message: SAVE_FAILED,
                details: e.details(),
            }
        })?;

    metrics::record_persisted(FORM_SCANS_TABLE, "ok");
    tracing::info!(analysis_id = %scan.id, "Form analysis stored");

    Ok(Json(AnalyzeResponse {
        success: true,
        message: SUCCESS_MESSAGE,
        analysis_id: scan.id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn video_url_is_read_from_the_record() {
        let body = payload(json!({ "record": { "url": "https://x/y.mp4", "id": 9 } }));
        assert_eq!(video_url(&body), Some("https://x/y.mp4"));
    }

    #[test]
    fn top_level_url_is_not_a_trigger() {
        assert_eq!(video_url(&payload(json!({ "url": "https://x/y.mp4" }))), None);
        assert_eq!(video_url(&payload(json!({ "record": "https://x/y.mp4" }))), None);
        assert_eq!(video_url(&payload(json!({ "record": { "url": "" } }))), None);
        assert_eq!(video_url(&payload(json!({ "record": { "url": 7 } }))), None);
    }
}
