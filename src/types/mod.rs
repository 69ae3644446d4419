pub mod error;

pub use error::{ErrorClassifier, FailureKind, ProviderError, Result, RouterError};

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Prompt
// =============================================================================

/// Immutable prompt text with derived counts.
///
/// Rewrites (enhancement, directive stripping) always produce a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
    word_count: usize,
    char_count: usize,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        let char_count = text.chars().count();
        Self {
            text,
            word_count,
            char_count,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whitespace-delimited token count, empty tokens ignored
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Prompt {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

// =============================================================================
// Complexity Tier
// =============================================================================

/// Three-level complexity classification, ordered `Small < Medium < High`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    #[default]
    Small,
    Medium,
    High,
}

impl ComplexityTier {
    pub const ALL: [ComplexityTier; 3] = [Self::Small, Self::Medium, Self::High];
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityTier::Small => write!(f, "small"),
            ComplexityTier::Medium => write!(f, "medium"),
            ComplexityTier::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for ComplexityTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" => Ok(ComplexityTier::Small),
            "medium" => Ok(ComplexityTier::Medium),
            "high" => Ok(ComplexityTier::High),
            _ => Err(format!(
                "Unknown complexity tier: {}. Valid values: small, medium, high",
                s
            )),
        }
    }
}

// =============================================================================
// Task Label
// =============================================================================

/// Coarse intent tag; telemetry only, never a routing input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskLabel(String);

impl TaskLabel {
    pub const GENERAL: &'static str = "general";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn general() -> Self {
        Self(Self::GENERAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Request Id
// =============================================================================

/// Per-prompt identifier correlating logs across fallback attempts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Fresh random (v4) identifier
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
