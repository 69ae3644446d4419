//! prompt-router - Complexity-Based Prompt Orchestration
//!
//! Classifies a prompt's complexity, optionally rewrites it, and dispatches
//! it to the text-generation provider bound to its tier, falling back across
//! that provider's candidate models on failure.
//!
//! ## Core Features
//!
//! - **Classification**: word-count and keyword rules map prompts to
//!   `small`, `medium` or `high`
//! - **Enhancement**: best-effort rewrite of high-tier prompts, skippable
//!   with an in-band directive (`!no enhance`)
//! - **Fallback**: sequential candidate models per tier, each attempt under
//!   its own timeout, retryable vs fatal failure classification
//! - **Layered Config**: defaults, TOML file and `PROMPT_ROUTER_*` env vars
//!
//! ## Quick Start
//!
//! ```ignore
//! use prompt_router::{ConfigLoader, RouteOptions, Router};
//!
//! let config = ConfigLoader::load(None)?;
//! let router = Router::from_config(&config)?;
//! let result = router.route("Explain borrow checking", RouteOptions::default()).await?;
//! println!("{} via {}/{}", result.text, result.provider_name, result.model_used);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider adapters, bounded invocation, metrics
//! - [`router`]: classifier, enhancer and the fallback orchestrator
//! - [`config`]: layered configuration
//! - [`types`]: prompt, tier and error types

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod router;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, Environment};

// Error Types
pub use types::error::{ErrorClassifier, FailureKind, ProviderError, Result, RouterError};

// Domain Types
pub use types::{ComplexityTier, Prompt, RequestId, TaskLabel};

// =============================================================================
// Routing Re-exports
// =============================================================================

pub use router::{
    Classification, Classifier, Enhancer, RouteOptions, RouteResult, Router, RouterBuilder,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    // Providers
    Completion,
    GenerationRequest,
    // Metrics
    MetricsSnapshot,
    ProviderAdapter,
    RouterMetrics,
    SharedMetrics,
    SharedProvider,
    StickyIndex,
    // Timeout
    with_timeout,
};
