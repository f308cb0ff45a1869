//! Failure taxonomy for the webhook handlers.

use crate::models::ScorecardError;
use crate::services::ProviderError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service_core::error::ErrorResponse;
use thiserror::Error;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const MALFORMED_AI_OUTPUT_MESSAGE: &str = "Failed to parse AI response";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum HandlerError {
    /// The trigger payload lacks a required field.
    #[error("{0}")]
    InvalidTrigger(&'static str),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Model text was not parseable as JSON after fence stripping.
    #[error("Failed to parse AI response: {details}")]
    MalformedAiOutput { details: String },

    #[error(transparent)]
    InvalidAiOutput(#[from] ScorecardError),

    #[error("{message}: {details}")]
    Persistence {
        message: &'static str,
        details: String,
    },

    #[error("Internal server error: {0}")]
    Unknown(String),
}

impl From<ProviderError> for HandlerError {
    fn from(err: ProviderError) -> Self {
        HandlerError::Unknown(err.to_string())
    }
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::InvalidTrigger(_) => StatusCode::BAD_REQUEST,
            HandlerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            HandlerError::InvalidTrigger(message) => ErrorResponse::new(message),
            HandlerError::MethodNotAllowed => ErrorResponse::new(METHOD_NOT_ALLOWED_MESSAGE),
            HandlerError::MalformedAiOutput { details } => {
                ErrorResponse::with_details(MALFORMED_AI_OUTPUT_MESSAGE, details)
            }
            HandlerError::InvalidAiOutput(violation) => ErrorResponse::new(violation.to_string()),
            HandlerError::Persistence { message, details } => {
                ErrorResponse::with_details(message, details)
            }
            HandlerError::Unknown(details) => {
                ErrorResponse::with_details(INTERNAL_ERROR_MESSAGE, details)
            }
        };
        body.into_response_with(status)
    }
}
