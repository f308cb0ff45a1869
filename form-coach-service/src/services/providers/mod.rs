//! AI provider abstractions and implementations.
//!
//! Handlers only see [`TextProvider`]: a prompt goes in, free-form text comes
//! out. Gemini backs production; the mock backs local runs and tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::ApiError(_) => "api_error",
            Self::RateLimited => "rate_limited",
            Self::ContentFiltered => "content_filtered",
            Self::NetworkError(_) => "network_error",
        }
    }
}

/// Result of a provider response.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text.
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    /// Finish reason.
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

impl FinishReason {
    pub fn from_gemini(reason: Option<&str>) -> Self {
        match reason {
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") => FinishReason::ContentFilter,
            _ => FinishReason::Complete,
        }
    }
}

/// Which handler a generation call serves; selects the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FormAnalysis,
    CoachingSummary,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FormAnalysis => "form_analysis",
            Operation::CoachingSummary => "coaching_summary",
        }
    }
}

/// Generation parameters for AI requests. Sampling is left at the model's
/// defaults.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub operation: Operation,
}

impl GenerationParams {
    pub fn for_operation(operation: Operation) -> Self {
        Self { operation }
    }
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a single, complete text response.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
