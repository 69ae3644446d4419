//! Provider Integration Layer
//!
//! Adapters for external text-generation services, bounded invocation and
//! routing metrics.

pub mod metrics;
pub mod provider;
pub mod timeout;

pub use metrics::{
    AttemptKind, EnhancementOutcome, MetricsSnapshot, ProviderSnapshot, RouterMetrics,
    SharedMetrics, create_shared_metrics,
};
pub use provider::{
    AdapterResult, AnthropicAdapter, Completion, EchoAdapter, ErrorClassifier, FailureKind,
    GenerationRequest, HuggingFaceAdapter, OpenAiAdapter, ProviderAdapter, ProviderConfig,
    ProviderError, SharedProvider, StickyIndex, api_key_env, create_provider,
    credentials_available,
};
pub use timeout::{invoke_with_timeout, with_timeout, with_timeout_map};
