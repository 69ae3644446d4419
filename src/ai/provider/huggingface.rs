//! Hugging Face Inference Adapter
//!
//! Provider adapter for text-generation inference endpoints
//! (`POST {base}/models/{model}`). The endpoint answers either with a
//! batch `[{"generated_text": ..}]` or a single object; anything else is a
//! malformed response.
//!
//! This adapter keeps a [`StickyIndex`] and starts health probes from the
//! last model that served a request.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::http::{build_client, send_json, validate_endpoint};
use super::{
    AdapterResult, Completion, GenerationRequest, ProviderAdapter, ProviderConfig, StickyIndex,
};
use crate::constants::generation;
use crate::types::ProviderError;

const PROVIDER_NAME: &str = "huggingface";
const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";
pub const API_KEY_ENV: &str = "HF_API_TOKEN";

pub struct HuggingFaceAdapter {
    api_key: SecretString,
    api_base: String,
    /// Models probed by `health_check`
    models: Vec<String>,
    sticky: StickyIndex,
    client: reqwest::Client,
}

impl std::fmt::Debug for HuggingFaceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceAdapter")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .field("sticky", &self.sticky.get())
            .finish()
    }
}

impl HuggingFaceAdapter {
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
            models: config.models,
            sticky: StickyIndex::new(),
            client,
        })
    }

    fn model_url(&self, model_id: &str) -> String {
        format!("{}/models/{}", self.api_base, model_id)
    }

    fn build_request(&self, request: &GenerationRequest) -> TextGenerationRequest {
        TextGenerationRequest {
            inputs: request.prompt.clone(),
            parameters: TextGenerationParameters {
                temperature: request.temperature.unwrap_or(generation::TEMPERATURE),
                max_new_tokens: request.max_tokens.unwrap_or(generation::MAX_TOKENS),
                return_full_text: false,
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for HuggingFaceAdapter {
    async fn invoke(&self, request: &GenerationRequest) -> AdapterResult {
        debug!(model = %request.model_id, task = %request.task, "Sending request to Hugging Face");

        let body = self.build_request(request);
        let http = self
            .client
            .post(self.model_url(&request.model_id))
            .bearer_auth(self.api_key.expose_secret());

        let response: TextGenerationResponse = send_json(http, &body, PROVIDER_NAME).await?;

        let text = response.into_text().ok_or_else(|| {
            ProviderError::fatal("No generated_text in Hugging Face response")
                .provider(PROVIDER_NAME)
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
        if self.models.is_empty() {
            warn!("Hugging Face adapter has no models to probe");
            return false;
        }

        for model in self.sticky.rotated(&self.models) {
            let response = self
                .client
                .get(self.model_url(model))
                .bearer_auth(self.api_key.expose_secret())
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    info!(model = %model, "Hugging Face inference is available");
                    return true;
                }
                Ok(resp) => debug!(model = %model, status = %resp.status(), "Model probe failed"),
                Err(e) => debug!(model = %model, error = %e, "Model probe failed"),
            }
        }

        warn!("No Hugging Face model answered the health probe");
        false
    }

    fn sticky_index(&self) -> Option<&StickyIndex> {
        Some(&self.sticky)
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct TextGenerationRequest {
    inputs: String,
    parameters: TextGenerationParameters,
}

#[derive(Debug, Serialize)]
struct TextGenerationParameters {
    temperature: f32,
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextGenerationResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

impl TextGenerationResponse {
    fn into_text(self) -> Option<String> {
        let text = match self {
            Self::Batch(items) => items.into_iter().next()?.generated_text,
            Self::Single(item) => item.generated_text,
        };
        (!text.trim().is_empty()).then_some(text)
    }
}
