//! Unified Error Type System
//!
//! Centralized error types for the router and its provider adapters.
//! Every adapter failure is classified into a [`FailureKind`] that drives
//! the router's fallback decision.
//!
//! ## Failure Kinds
//!
//! - **Retryable**: rate limiting (429), upstream 5xx, transport errors and
//!   timeouts; the router moves on to the next candidate model
//! - **Fatal**: malformed responses, missing credentials, other 4xx
//!
//! ## Design Principles
//!
//! - Single application error type (RouterError)
//! - Expected failures are values, never panics
//! - Terminal routing failure carries the request id for log correlation

use std::time::Duration;
use thiserror::Error;

use super::{ComplexityTier, RequestId};

// =============================================================================
// Failure Kind
// =============================================================================

/// Classification of an adapter failure for fallback decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transient upstream condition - try the next candidate
    Retryable,
    /// Permanent for this request/configuration
    Fatal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retryable => write!(f, "RETRYABLE"),
            Self::Fatal => write!(f, "FATAL"),
        }
    }
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable)
    }
}

// =============================================================================
// Provider Error
// =============================================================================

/// Structured adapter failure with kind, provider and HTTP status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Failure kind for routing decisions
    pub kind: FailureKind,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// Upstream HTTP status, when one was received
    pub status: Option<u16>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.provider, self.status) {
            (Some(provider), Some(status)) => {
                write!(f, "[{}:{}:{}] {}", provider, self.kind, status, self.message)
            }
            (Some(provider), None) => write!(f, "[{}:{}] {}", provider, self.kind, self.message),
            (None, _) => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: None,
            status: None,
        }
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Retryable, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Fatal, message)
    }

    /// Add provider context
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Add upstream HTTP status
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Timed-out attempt; always retryable
    pub fn timed_out(provider: &str, timeout: Duration) -> Self {
        Self::retryable(format!("request timed out after {:?}", timeout)).provider(provider)
    }

    /// Missing credential; raised at adapter construction
    pub fn missing_credentials(provider: &str, env_var: &str) -> Self {
        Self::fatal(format!(
            "API key not found. Set {} or providers.{}.api_key in config",
            env_var, provider
        ))
        .provider(provider)
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps upstream signals onto failure kinds
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> ProviderError {
        let kind = match status {
            429 => FailureKind::Retryable,
            500..=599 => FailureKind::Retryable,
            _ => FailureKind::Fatal,
        };
        ProviderError::new(kind, message)
            .provider(provider)
            .status(status)
    }

    /// Classify a transport-level reqwest failure
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> ProviderError {
        if err.is_builder() {
            return ProviderError::fatal(format!("invalid request: {}", err)).provider(provider);
        }
        if err.is_timeout() {
            return ProviderError::retryable(format!("request timed out: {}", err))
                .provider(provider);
        }
        // Connection refused, DNS, reset - all transient from the router's view
        ProviderError::retryable(format!("request failed: {}", err)).provider(provider)
    }

    /// Classify a body that could not be decoded into the provider schema
    pub fn classify_decode(err: impl std::fmt::Display, provider: &str) -> ProviderError {
        ProviderError::fatal(format!("malformed response: {}", err)).provider(provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum RouterError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("{unhealthy} of {total} provider(s) failed the health check")]
    Unhealthy { unhealthy: usize, total: usize },

    // -------------------------------------------------------------------------
    // Routing Errors
    // -------------------------------------------------------------------------
    #[error("No provider registered for tier '{0}'")]
    NoProviderForTier(ComplexityTier),

    #[error("All {attempts} candidate(s) failed for request {request_id}: {last}")]
    AllProvidersFailed {
        request_id: RequestId,
        attempts: usize,
        last: Box<ProviderError>,
    },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RouterError>;

impl RouterError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Request id of a terminal routing failure
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            Self::AllProvidersFailed { request_id, .. } => Some(request_id),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
