//! Routing request/result types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ai::provider::{AdapterResult, Completion, ProviderError};
use crate::types::{ComplexityTier, FailureKind, Prompt, RequestId, TaskLabel};

/// Per-call options supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Caller identity, recorded on the routing span only
    pub user_id: Option<String>,
    /// Already-enhanced text; used instead of calling the enhancer unless
    /// the prompt carries the skip directive
    pub pre_enhanced_prompt: Option<String>,
}

impl RouteOptions {
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_pre_enhanced_prompt(mut self, text: impl Into<String>) -> Self {
        self.pre_enhanced_prompt = Some(text.into());
        self
    }
}

/// Fully-prepared dispatch: final text plus the tier's ordered candidates
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub prompt: Prompt,
    pub tier: ComplexityTier,
    pub task: TaskLabel,
    /// Fallback order; never re-sorted
    pub model_candidates: Vec<String>,
}

/// Successful routing outcome, returned once per `route` call
#[derive(Debug, Clone, Serialize)]
pub struct RouteResult {
    pub text: String,
    pub provider_name: String,
    pub model_used: String,
    /// Words in the text actually sent to the provider
    pub word_count: usize,
    pub task: TaskLabel,
    pub signature: String,
    pub request_id: RequestId,
    pub tier: ComplexityTier,
    /// Adapter calls made, including the successful one
    pub attempts: usize,
    /// Whether the enhancer's rewrite was the text sent
    pub enhanced: bool,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one candidate attempt, consumed by the fallback loop
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Completion),
    Retryable(ProviderError),
    Fatal(ProviderError),
}

impl From<AdapterResult> for AttemptOutcome {
    fn from(result: AdapterResult) -> Self {
        match result {
            Ok(completion) => Self::Success(completion),
            Err(e) => match e.kind {
                FailureKind::Retryable => Self::Retryable(e),
                FailureKind::Fatal => Self::Fatal(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let ok: AdapterResult = Ok(Completion {
            text: "t".to_string(),
            provider_name: "p".to_string(),
            model_id: "m".to_string(),
        });
        assert!(matches!(AttemptOutcome::from(ok), AttemptOutcome::Success(_)));

        let retry: AdapterResult = Err(ProviderError::retryable("429").status(429));
        assert!(matches!(
            AttemptOutcome::from(retry),
            AttemptOutcome::Retryable(e) if e.status == Some(429)
        ));

        let fatal: AdapterResult = Err(ProviderError::fatal("bad shape"));
        assert!(matches!(AttemptOutcome::from(fatal), AttemptOutcome::Fatal(_)));
    }

    #[test]
    fn test_route_result_serializes_lowercase_tier() {
        let result = RouteResult {
            text: "answer".to_string(),
            provider_name: "openai".to_string(),
            model_used: "gpt-4o-mini".to_string(),
            word_count: 3,
            task: TaskLabel::general(),
            signature: "sig".to_string(),
            request_id: RequestId::new(),
            tier: ComplexityTier::Medium,
            attempts: 1,
            enhanced: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["tier"], "medium");
        assert_eq!(json["task"], "general");
        assert_eq!(json["request_id"].as_str().unwrap(), result.request_id.as_str());
    }
}
