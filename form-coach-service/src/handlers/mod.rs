//! HTTP handlers for the form coach service.
//!
//! Both webhook endpoints run the same linear pipeline: check the trigger,
//! build a prompt, call the model once, check the output, insert one row.

pub mod analyze;
pub mod coach;
pub mod health;

use crate::error::HandlerError;
use crate::services::metrics;
use crate::services::{GenerationParams, Operation};
use crate::startup::AppState;
use axum::body::Bytes;
use axum::http::{StatusCode, Uri};
use serde_json::{Map, Value};
use service_core::error::AppError;
use std::time::Instant;

/// Read a webhook body as a JSON object.
///
/// An empty body, invalid JSON, or a non-object value all yield an empty map,
/// so the caller reports the missing field rather than a parse error.
pub(crate) fn parse_payload(body: &Bytes) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            if !body.is_empty() {
                tracing::warn!(error = %e, "Webhook body is not valid JSON");
            }
            Map::new()
        }
    }
}

/// Call the configured model once and return its raw text.
pub(crate) async fn generate_text(
    state: &AppState,
    operation: Operation,
    prompt: &str,
) -> Result<String, HandlerError> {
    let start = Instant::now();
    let result = state
        .text_provider
        .generate(prompt, &GenerationParams::for_operation(operation))
        .await;
    let elapsed = start.elapsed().as_secs_f64();

    match result {
        Ok(response) => {
            metrics::record_ai_request(operation.as_str(), "ok", elapsed);
            metrics::record_tokens(
                operation.as_str(),
                response.input_tokens,
                response.output_tokens,
            );
            tracing::debug!(
                operation = operation.as_str(),
                output_len = response.text.len(),
                finish_reason = ?response.finish_reason,
                "Model response received"
            );
            Ok(response.text)
        }
        Err(e) => {
            metrics::record_ai_request(operation.as_str(), e.kind(), elapsed);
            tracing::error!(operation = operation.as_str(), error = %e, "Model call failed");
            Err(e.into())
        }
    }
}

/// CORS preflight: 200 with an empty body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> HandlerError {
    HandlerError::MethodNotAllowed
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}
