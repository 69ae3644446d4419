//! OpenAI API Adapter
//!
//! Provider adapter for OpenAI-compatible Chat Completions endpoints.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::http::{build_client, send_json, validate_endpoint};
use super::{AdapterResult, Completion, GenerationRequest, ProviderAdapter, ProviderConfig};
use crate::constants::generation;
use crate::types::ProviderError;

const PROVIDER_NAME: &str = "openai";
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI API adapter with secure API key handling
pub struct OpenAiAdapter {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdapter")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl OpenAiAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let api_key_str = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::missing_credentials(PROVIDER_NAME, API_KEY_ENV))?;

        let api_base = validate_endpoint(
            config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
            PROVIDER_NAME,
        )?;

        let client = build_client(config.timeout_secs, PROVIDER_NAME)?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            client,
        })
    }

    fn build_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.model_id.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature.unwrap_or(generation::TEMPERATURE),
            max_tokens: Some(request.max_tokens.unwrap_or(generation::MAX_TOKENS)),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    async fn invoke(&self, request: &GenerationRequest) -> AdapterResult {
        debug!(model = %request.model_id, task = %request.task, "Sending request to OpenAI API");

        let body = self.build_request(request);
        let url = format!("{}/chat/completions", self.api_base);

        let http = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret());

        let response: ChatCompletionResponse = send_json(http, &body, PROVIDER_NAME).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::fatal("No content in OpenAI response").provider(PROVIDER_NAME)
            })?;

        Ok(Completion {
            text,
            provider_name: PROVIDER_NAME.to_string(),
            model_id: request.model_id.clone(),
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("OpenAI API is available");
                true
            }
            Ok(resp) => {
                warn!("OpenAI API check failed: {}", resp.status());
                false
            }
            Err(e) => {
                warn!("OpenAI API check failed: {}", e);
                false
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
