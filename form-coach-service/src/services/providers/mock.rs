//! Mock provider implementation for local runs and testing.

use super::{FinishReason, GenerationParams, Operation, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// A prompt received by the mock, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    pub operation: Operation,
    pub prompt: String,
}

/// Mock text provider.
///
/// Scripted replies are served first-in first-out. Once the script runs dry a
/// canned reply for the operation is returned: a fenced scorecard for form
/// analysis and a short paragraph for coaching.
pub struct MockTextProvider {
    enabled: bool,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a raw text reply.
    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        lock(&self.script).push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn push_error(&self, error: ProviderError) -> &Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn canned_reply(operation: Operation) -> String {
    match operation {
        Operation::FormAnalysis => {
            let scorecard = json!({
                "context": {
                    "camera_angle": "side view",
                    "environment": "commercial gym",
                    "visual_issues": "none"
                },
                "overall_score": 75,
                "metrics": [
                    { "name": "Scapular Retraction", "score": 80, "observed_flaw": "Shoulders stay pinned", "recommendation": "Keep squeezing the shoulder blades" },
                    { "name": "Bar Path", "score": 70, "observed_flaw": "Bar drifts toward the face", "recommendation": "Touch lower on the sternum" },
                    { "name": "Elbow Position", "score": 72, "observed_flaw": "Elbows flare early", "recommendation": "Tuck elbows to about 45 degrees" },
                    { "name": "Range of Motion", "score": 85, "observed_flaw": "Full range on every rep", "recommendation": "Maintain the chest touch" },
                    { "name": "Wrist Alignment", "score": 0, "observed_flaw": "N/A", "recommendation": "N/A" },
                    { "name": "Leg Drive", "score": 65, "observed_flaw": "Heels lift off the floor", "recommendation": "Plant the heels and push the floor away" }
                ]
            });
            format!("```json\n{:#}\n```", scorecard)
        }
        Operation::CoachingSummary => "Solid session! Your form is in good shape overall with a few \
            areas to tighten up. Keep your shoulder blades pinned, bring the bar down a little lower, \
            and drive through your heels."
            .to_string(),
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        lock(&self.prompts).push(RecordedPrompt {
            operation: params.operation,
            prompt: prompt.to_string(),
        });

        let scripted = lock(&self.script).pop_front();
        let text = match scripted {
            Some(reply) => reply?,
            None => canned_reply(params.operation),
        };

        Ok(ProviderResponse {
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: text.len() as i32 / 4,
            text,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validate_scorecard;
    use crate::services::ai_output::parse_model_json;

    fn params(operation: Operation) -> GenerationParams {
        GenerationParams::for_operation(operation)
    }

    #[tokio::test]
    async fn serves_script_then_canned_reply() {
        let provider = MockTextProvider::new(true);
        provider.push_text("first").push_error(ProviderError::RateLimited);

        let first = provider
            .generate("a", &params(Operation::CoachingSummary))
            .await
            .unwrap();
        assert_eq!(first.text, "first");

        let second = provider
            .generate("b", &params(Operation::CoachingSummary))
            .await;
        assert!(matches!(second, Err(ProviderError::RateLimited)));

        let third = provider
            .generate("c", &params(Operation::CoachingSummary))
            .await
            .unwrap();
        assert!(third.text.starts_with("Solid session!"));

        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.prompts()[1].prompt, "b");
    }

    #[tokio::test]
    async fn canned_analysis_passes_validation() {
        let provider = MockTextProvider::new(true);
        let response = provider
            .generate("analyze", &params(Operation::FormAnalysis))
            .await
            .unwrap();

        let value = parse_model_json(&response.text).unwrap();
        assert_eq!(validate_scorecard(&value), Ok(()));
    }

    #[tokio::test]
    async fn disabled_provider_refuses() {
        let provider = MockTextProvider::new(false);
        assert!(provider.health_check().await.is_err());
        assert!(matches!(
            provider.generate("x", &params(Operation::FormAnalysis)).await,
            Err(ProviderError::NotConfigured(_))
        ));
        assert_eq!(provider.call_count(), 0);
    }
}
