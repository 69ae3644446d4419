//! Anthropic Messages API Adapter

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::http::{build_client, send_json, validate_endpoint};
use super::{AdapterResult, Completion, GenerationRequest, ProviderAdapter, ProviderConfig};
use crate::constants::generation;
use crate::types::ProviderError;

const PROVIDER_NAME: &str = "anthropic";
const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

pub struct AnthropicAdapter {
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicAdapter")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl AnthropicAdapter {
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

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    async fn invoke(&self, request: &GenerationRequest) -> AdapterResult {
        debug!(model = %request.model_id, task = %request.task, "Sending request to Anthropic API");

        let body = MessagesRequest {
            model: request.model_id.clone(),
            max_tokens: request.max_tokens.unwrap_or(generation::MAX_TOKENS),
            temperature: request.temperature.unwrap_or(generation::TEMPERATURE),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        };

        let http = self.authorized(self.client.post(format!("{}/v1/messages", self.api_base)));
        let response: MessagesResponse = send_json(http, &body, PROVIDER_NAME).await?;

        let text = response.text().ok_or_else(|| {
            ProviderError::fatal("No text content in Anthropic response").provider(PROVIDER_NAME)
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
        let url = format!("{}/v1/models", self.api_base);

        match self.authorized(self.client.get(&url)).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Anthropic API is available");
                true
            }
            Ok(resp) => {
                warn!("Anthropic API check failed: {}", resp.status());
                false
            }
            Err(e) => {
                warn!("Anthropic API check failed: {}", e);
                false
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated `text` blocks; `None` when there are none
    fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}
