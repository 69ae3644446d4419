//! Configuration Types
//!
//! All configuration structures with safe non-production defaults.
//! Every routing constant (thresholds, timeouts, candidate lists) lives
//! here so it can be overridden from file or environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::constants::{classifier, enhancer, generation, tiers};
use crate::types::{ComplexityTier, Result, RouterError};

/// Provider names the router knows how to construct
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "huggingface", "anthropic", "echo"];

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Deployment environment; production makes missing settings fatal
    pub environment: Environment,

    /// Router-wide settings
    pub router: RouterSettings,

    /// Complexity classifier settings
    pub classifier: ClassifierConfig,

    /// Per-tier provider binding, timeout and candidate models
    pub tiers: TiersConfig,

    /// Provider credentials and endpoints
    pub providers: ProvidersConfig,

    /// Prompt enhancer settings
    pub enhancer: EnhancerConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `RouterError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.router.temperature) {
            return Err(RouterError::Config(format!(
                "router.temperature must be between 0.0 and 2.0, got {}",
                self.router.temperature
            )));
        }

        if self.router.max_tokens == 0 {
            return Err(RouterError::Config(
                "router.max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.classifier.low_word_threshold >= self.classifier.high_word_threshold {
            return Err(RouterError::Config(format!(
                "classifier.low_word_threshold ({}) must be below high_word_threshold ({})",
                self.classifier.low_word_threshold, self.classifier.high_word_threshold
            )));
        }

        for tier in ComplexityTier::ALL {
            let tier_config = self.tiers.get(tier);

            if !KNOWN_PROVIDERS.contains(&tier_config.provider.as_str()) {
                return Err(RouterError::Config(format!(
                    "tiers.{}.provider '{}' is unknown. Supported: {}",
                    tier,
                    tier_config.provider,
                    KNOWN_PROVIDERS.join(", ")
                )));
            }

            if tier_config.timeout_secs == 0 {
                return Err(RouterError::Config(format!(
                    "tiers.{}.timeout_secs must be greater than 0",
                    tier
                )));
            }

            let count = tier_config.models.len();
            if !(tiers::MIN_CANDIDATES..=tiers::MAX_CANDIDATES).contains(&count) {
                return Err(RouterError::Config(format!(
                    "tiers.{}.models must list {}-{} candidates, got {}",
                    tier,
                    tiers::MIN_CANDIDATES,
                    tiers::MAX_CANDIDATES,
                    count
                )));
            }
            if count < tiers::RECOMMENDED_MIN_CANDIDATES {
                warn!(
                    tier = %tier,
                    candidates = count,
                    "Tier has fewer than {} fallback candidates",
                    tiers::RECOMMENDED_MIN_CANDIDATES
                );
            }

            if tier_config.models.iter().any(|m| m.trim().is_empty()) {
                return Err(RouterError::Config(format!(
                    "tiers.{}.models contains an empty model id",
                    tier
                )));
            }

            if self.environment.is_production() && tier_config.provider == "echo" {
                return Err(RouterError::Config(format!(
                    "tiers.{} is bound to the echo provider, which is not allowed in production",
                    tier
                )));
            }
        }

        if self.enhancer.enabled {
            if !KNOWN_PROVIDERS.contains(&self.enhancer.provider.as_str()) {
                return Err(RouterError::Config(format!(
                    "enhancer.provider '{}' is unknown",
                    self.enhancer.provider
                )));
            }
            if self.enhancer.timeout_secs == 0 {
                return Err(RouterError::Config(
                    "enhancer.timeout_secs must be greater than 0".to_string(),
                ));
            }
            if self.enhancer.model.trim().is_empty() {
                return Err(RouterError::Config(
                    "enhancer.model must not be empty".to_string(),
                ));
            }
        }

        if self.enhancer.skip_directive.trim().is_empty() {
            return Err(RouterError::Config(
                "enhancer.skip_directive must not be empty".to_string(),
            ));
        }

        if self.environment.is_production() && self.router.signature.trim().is_empty() {
            return Err(RouterError::Config(
                "router.signature must be set in production".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Environment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!(
                "Unknown environment: {}. Valid values: development, production",
                s
            )),
        }
    }
}

// =============================================================================
// Router Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Attribution string attached to every result
    pub signature: String,

    /// Stop the fallback loop on the first fatal failure instead of
    /// trying the remaining candidates
    pub stop_on_fatal: bool,

    /// Sampling temperature passed to providers
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            signature: generation::SIGNATURE.to_string(),
            stop_on_fatal: false,
            temperature: generation::TEMPERATURE,
            max_tokens: generation::MAX_TOKENS,
        }
    }
}

// =============================================================================
// Classifier Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Word counts at or below this lean small
    pub low_word_threshold: usize,

    /// Word counts above this are always high
    pub high_word_threshold: usize,

    /// Keywords that force the high tier
    pub heavy_keywords: Vec<String>,

    /// Greeting/simple keywords that pull toward the small tier
    pub simple_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            low_word_threshold: classifier::LOW_WORD_THRESHOLD,
            high_word_threshold: classifier::HIGH_WORD_THRESHOLD,
            heavy_keywords: to_strings(classifier::HEAVY_KEYWORDS),
            simple_keywords: to_strings(classifier::SIMPLE_KEYWORDS),
        }
    }
}

// =============================================================================
// Tier Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    /// Provider bound to this tier
    pub provider: String,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Ordered fallback candidates
    pub models: Vec<String>,
}

impl TierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TiersConfig {
    pub small: TierConfig,
    pub medium: TierConfig,
    pub high: TierConfig,
}

impl TiersConfig {
    pub fn get(&self, tier: ComplexityTier) -> &TierConfig {
        match tier {
            ComplexityTier::Small => &self.small,
            ComplexityTier::Medium => &self.medium,
            ComplexityTier::High => &self.high,
        }
    }
}

impl Default for TiersConfig {
    fn default() -> Self {
        Self {
            small: TierConfig {
                provider: tiers::SMALL_PROVIDER.to_string(),
                timeout_secs: tiers::SMALL_TIMEOUT_SECS,
                models: to_strings(tiers::SMALL_MODELS),
            },
            medium: TierConfig {
                provider: tiers::MEDIUM_PROVIDER.to_string(),
                timeout_secs: tiers::MEDIUM_TIMEOUT_SECS,
                models: to_strings(tiers::MEDIUM_MODELS),
            },
            high: TierConfig {
                provider: tiers::HIGH_PROVIDER.to_string(),
                timeout_secs: tiers::HIGH_TIMEOUT_SECS,
                models: to_strings(tiers::HIGH_MODELS),
            },
        }
    }
}

// =============================================================================
// Provider Credentials
// =============================================================================

/// Credentials and endpoint for one provider.
///
/// API keys are never serialized to output and are redacted in debug output.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderCredentials {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Endpoint base URL override
    pub api_base: Option<String>,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderCredentials,
    pub huggingface: ProviderCredentials,
    pub anthropic: ProviderCredentials,
}

impl ProvidersConfig {
    pub fn get(&self, provider: &str) -> Option<&ProviderCredentials> {
        match provider {
            "openai" => Some(&self.openai),
            "huggingface" => Some(&self.huggingface),
            "anthropic" => Some(&self.anthropic),
            _ => None,
        }
    }
}

// =============================================================================
// Enhancer Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancerConfig {
    /// Whether high-tier prompts are rewritten before dispatch
    pub enabled: bool,

    /// Provider used as the rewriting service
    pub provider: String,

    /// Model used for rewriting
    pub model: String,

    /// Rewrite call timeout in seconds
    pub timeout_secs: u64,

    /// In-band marker that disables enhancement (case-insensitive)
    pub skip_directive: String,
}

impl EnhancerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: enhancer::PROVIDER.to_string(),
            model: enhancer::MODEL.to_string(),
            timeout_secs: enhancer::TIMEOUT_SECS,
            skip_directive: enhancer::SKIP_DIRECTIVE.to_string(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Tests
// =============================================================================
