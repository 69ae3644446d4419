//! Global Constants
//!
//! Default values for configuration and adapter request fallbacks.
//! Routing limits can be overridden through the config file or environment.

/// Prompt classifier defaults
pub mod classifier {
    /// Prompts with at most this many words lean small
    pub const LOW_WORD_THRESHOLD: usize = 20;

    /// Prompts with more than this many words are always high
    pub const HIGH_WORD_THRESHOLD: usize = 100;

    pub const HEAVY_KEYWORDS: &[&str] = &[
        "code",
        "analyze",
        "research",
        "develop",
        "debug",
        "create",
        "complex",
        "programming",
    ];

    pub const SIMPLE_KEYWORDS: &[&str] = &["hi", "hello", "simple", "basic"];
}

/// Per-tier routing defaults
pub mod tiers {
    pub const SMALL_PROVIDER: &str = "huggingface";
    pub const MEDIUM_PROVIDER: &str = "openai";
    pub const HIGH_PROVIDER: &str = "anthropic";

    pub const SMALL_TIMEOUT_SECS: u64 = 30;
    pub const MEDIUM_TIMEOUT_SECS: u64 = 45;
    pub const HIGH_TIMEOUT_SECS: u64 = 60;

    pub const SMALL_MODELS: &[&str] = &[
        "mistralai/Mistral-7B-Instruct-v0.3",
        "HuggingFaceH4/zephyr-7b-beta",
        "google/gemma-2-2b-it",
        "microsoft/Phi-3-mini-4k-instruct",
    ];

    pub const MEDIUM_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4.1-mini", "gpt-3.5-turbo"];

    pub const HIGH_MODELS: &[&str] = &[
        "claude-sonnet-4-20250514",
        "claude-3-7-sonnet-latest",
        "claude-3-5-haiku-latest",
    ];

    /// Candidate list bounds per tier
    pub const MIN_CANDIDATES: usize = 1;
    pub const RECOMMENDED_MIN_CANDIDATES: usize = 3;
    pub const MAX_CANDIDATES: usize = 7;
}

/// Prompt enhancer defaults
pub mod enhancer {
    pub const SKIP_DIRECTIVE: &str = "!no enhance";
    pub const PROVIDER: &str = "openai";
    pub const MODEL: &str = "gpt-4o-mini";
    pub const TIMEOUT_SECS: u64 = 20;
}

/// Generation defaults
pub mod generation {
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 1024;
    pub const SIGNATURE: &str = "routed by prompt-router";
}

/// HTTP/Network constants
pub mod network {
    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;

    /// Upper bound on any single adapter request (seconds); the router's
    /// per-tier timeout is normally the tighter one
    pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;
}
