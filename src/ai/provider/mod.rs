//! Provider Adapter Abstraction
//!
//! Defines the [`ProviderAdapter`] trait: a uniform interface over one
//! external text-generation endpoint. Adapters know only their own upstream
//! protocol; they never see the complexity tier or the other adapters.
//!
//! ## Modules
//!
//! - `openai`: OpenAI-compatible Chat Completions (Provider A)
//! - `huggingface`: text-generation inference endpoint (Provider B)
//! - `anthropic`: Messages API (Provider C)
//! - `echo`: offline stand-in for non-production runs
//! - `sticky`: adapter-owned "last successful candidate" hint

mod anthropic;
mod echo;
mod http;
mod huggingface;
mod openai;
mod sticky;

pub use anthropic::AnthropicAdapter;
pub use echo::EchoAdapter;
pub use huggingface::HuggingFaceAdapter;
pub use openai::OpenAiAdapter;
pub use sticky::StickyIndex;

pub use crate::types::{ErrorClassifier, FailureKind, ProviderError};

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::network;
use crate::types::TaskLabel;

// =============================================================================
// Request / Completion
// =============================================================================

/// Generic generation request handed to an adapter
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Final prompt text (directive already stripped)
    pub prompt: String,
    /// Telemetry label
    pub task: TaskLabel,
    /// Candidate model for this attempt
    pub model_id: String,
    /// Sampling temperature (adapter default when unset)
    pub temperature: Option<f32>,
    /// Generation limit (adapter default when unset)
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            task: TaskLabel::general(),
            model_id: model_id.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_task(mut self, task: TaskLabel) -> Self {
        self.task = task;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Successful adapter response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub text: String,
    pub provider_name: String,
    pub model_id: String,
}

pub type AdapterResult = std::result::Result<Completion, ProviderError>;

/// Shared adapter type for concurrent access across routing calls
pub type SharedProvider = Arc<dyn ProviderAdapter>;

// =============================================================================
// Provider Adapter Trait
// =============================================================================

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Invoke the upstream once with the request's model.
    ///
    /// Failures are classified: 429/5xx/transport are `Retryable`;
    /// malformed responses and other 4xx are `Fatal`.
    async fn invoke(&self, request: &GenerationRequest) -> AdapterResult;

    /// Provider name for logging and results
    fn name(&self) -> &str;

    /// Check if the upstream is reachable and accepting our credentials
    async fn health_check(&self) -> bool;

    /// Sticky "last successful candidate" hint, for adapters that keep one
    fn sticky_index(&self) -> Option<&StickyIndex> {
        None
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// Construction-time settings for one adapter
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider type: "openai", "huggingface", "anthropic", "echo"
    pub provider: String,
    /// API key from config; adapters fall back to their env var
    pub api_key: Option<String>,
    /// Endpoint base URL override
    pub api_base: Option<String>,
    /// HTTP client timeout backstop in seconds
    pub timeout_secs: u64,
    /// Models this provider serves, in first-seen tier order
    pub models: Vec<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("models", &self.models)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            api_key: None,
            api_base: None,
            timeout_secs: network::MAX_REQUEST_TIMEOUT_SECS,
            models: Vec::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Derive adapter settings for `provider` from the application config
    pub fn from_app_config(config: &Config, provider: &str) -> Self {
        let mut provider_config = Self::new(provider);

        if let Some(creds) = config.providers.get(provider) {
            provider_config.api_key = creds.api_key.clone();
            provider_config.api_base = creds.api_base.clone();
        }

        let bound: Vec<_> = [&config.tiers.small, &config.tiers.medium, &config.tiers.high]
            .into_iter()
            .filter(|tier| tier.provider == provider)
            .collect();

        if let Some(max_timeout) = bound.iter().map(|tier| tier.timeout_secs).max() {
            provider_config.timeout_secs = max_timeout;
        }
        if config.enhancer.enabled && config.enhancer.provider == provider {
            provider_config.timeout_secs =
                provider_config.timeout_secs.max(config.enhancer.timeout_secs);
        }

        for tier in bound {
            for model in &tier.models {
                if !provider_config.models.contains(model) {
                    provider_config.models.push(model.clone());
                }
            }
        }

        provider_config
    }
}

/// Conventional API key env var for a provider
pub fn api_key_env(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some(openai::API_KEY_ENV),
        "huggingface" => Some(huggingface::API_KEY_ENV),
        "anthropic" => Some(anthropic::API_KEY_ENV),
        _ => None,
    }
}

/// Whether an API key for `provider` is set in config or its env var.
/// Providers without credentials (echo) always report true.
pub fn credentials_available(config: &Config, provider: &str) -> bool {
    let Some(env_var) = api_key_env(provider) else {
        return true;
    };

    let from_config = config
        .providers
        .get(provider)
        .and_then(|creds| creds.api_key.as_deref())
        .is_some_and(|key| !key.trim().is_empty());

    from_config || std::env::var(env_var).is_ok_and(|key| !key.trim().is_empty())
}

/// Create a shared adapter from configuration.
///
/// Missing credentials or an invalid endpoint fail here, at construction,
/// with a `Fatal` error.
pub fn create_provider(config: &ProviderConfig) -> std::result::Result<SharedProvider, ProviderError> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiAdapter::new(config.clone())?)),
        "huggingface" => Ok(Arc::new(HuggingFaceAdapter::new(config.clone())?)),
        "anthropic" => Ok(Arc::new(AnthropicAdapter::new(config.clone())?)),
        "echo" => Ok(Arc::new(EchoAdapter::new())),
        other => Err(ProviderError::fatal(format!(
            "Unknown provider: {}. Supported: openai, huggingface, anthropic, echo",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_from_app_config() {
        let mut config = Config::default();
        config.providers.openai.api_key = Some("sk-test".to_string());
        config.tiers.small.provider = "openai".to_string();
        config.tiers.small.models = vec!["gpt-4o-mini".to_string(), "tiny".to_string()];

        let provider_config = ProviderConfig::from_app_config(&config, "openai");
        assert_eq!(provider_config.api_key.as_deref(), Some("sk-test"));
        // Small (30s) and medium (45s) both bound; largest wins
        assert_eq!(provider_config.timeout_secs, 45);
        assert_eq!(provider_config.models[0], "gpt-4o-mini");
        assert!(provider_config.models.contains(&"tiny".to_string()));
        assert_eq!(
            provider_config
                .models
                .iter()
                .filter(|m| *m == "gpt-4o-mini")
                .count(),
            1
        );
    }

    #[test]
    fn test_unknown_provider_is_fatal() {
        let err = create_provider(&ProviderConfig::new("mystery")).err().unwrap();
        assert_eq!(err.kind, FailureKind::Fatal);
    }

    #[test]
    fn test_create_echo_provider() {
        let provider = create_provider(&ProviderConfig::new("echo")).unwrap();
        assert_eq!(provider.name(), "echo");
        assert!(provider.sticky_index().is_none());
    }

    #[test]
    fn test_credentials_from_config() {
        let mut config = Config::default();
        config.providers.anthropic.api_key = Some("sk-ant".to_string());
        assert!(credentials_available(&config, "anthropic"));
        assert!(credentials_available(&config, "echo"));

        config.providers.anthropic.api_key = Some("   ".to_string());
        if std::env::var(anthropic::API_KEY_ENV).is_err() {
            assert!(!credentials_available(&config, "anthropic"));
        }
    }

    #[test]
    fn test_provider_config_debug_redacts_key() {
        let config = ProviderConfig::new("openai").with_api_key("sk-secret");
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
