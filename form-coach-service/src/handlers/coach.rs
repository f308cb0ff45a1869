//! `POST /api/coach`: turn a stored scorecard into coaching prose.

use super::{generate_text, parse_payload};
use crate::error::HandlerError;
use crate::models::{is_truthy, NewCoachOutput, RecordId, COACH_OUTPUT_TABLE};
use crate::services::{metrics, prompts, Operation};
use crate::startup::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

pub const MISSING_SCAN_ID: &str = "Missing scan_id in request payload";
pub const MISSING_JSON_DATA: &str = "Missing json_data in request payload";
pub const SAVE_FAILED: &str = "Failed to save coaching output to database";
pub const SUCCESS_MESSAGE: &str = "Coaching analysis completed and saved successfully";

#[derive(Debug, Serialize)]
pub struct CoachResponse {
    pub success: bool,
    pub message: &'static str,
    /// Echoed exactly as received.
    pub scan_id: Value,
    #[serde(rename = "coachingId")]
    pub coaching_id: RecordId,
}

/// Text form of a scan reference for storage: strings verbatim, anything
/// else as compact JSON.
pub fn scan_reference(scan_id: &Value) -> String {
    match scan_id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[instrument(skip_all)]
pub async fn coach_scan(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CoachResponse>, HandlerError> {
    let mut payload = parse_payload(&body);

    let scan_id = payload
        .remove("scan_id")
        .filter(is_truthy)
        .ok_or(HandlerError::InvalidTrigger(MISSING_SCAN_ID))?;
    let json_data = payload
        .remove("json_data")
        .filter(is_truthy)
        .ok_or(HandlerError::InvalidTrigger(MISSING_JSON_DATA))?;

    let reference = scan_reference(&scan_id);
    tracing::info!(scan_id = %reference, "Starting coaching summary");

    let coaching_text = generate_text(
        &state,
        Operation::CoachingSummary,
        &prompts::coaching_prompt(&json_data),
    )
    .await?;

    let output = state
        .store
        .insert_coach_output(NewCoachOutput::new(reference, coaching_text))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to store coaching output");
            metrics::record_persisted(COACH_OUTPUT_TABLE, "error");
            HandlerError::Persistence {
                message: SAVE_FAILED,
                details: e.details(),
            }
        })?;

    metrics::record_persisted(COACH_OUTPUT_TABLE, "ok");
    tracing::info!(coaching_id = %output.id, "Coaching summary stored");

    Ok(Json(CoachResponse {
        success: true,
        message: SUCCESS_MESSAGE,
        scan_id,
        coaching_id: output.id,
    }))
}
