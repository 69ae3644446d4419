//! Prompt Enhancer
//!
//! Best-effort rewrite of a prompt through an external rewriting service
//! (any [`ProviderAdapter`]). Enhancement never fails the caller: on any
//! error, timeout or empty output the original prompt is returned.
//!
//! The in-band skip directive (default `!no enhance`) opts a prompt out of
//! enhancement and is always stripped before dispatch.

use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ai::provider::{GenerationRequest, SharedProvider};
use crate::ai::timeout::invoke_with_timeout;
use crate::config::EnhancerConfig;
use crate::types::{Prompt, Result, RouterError};

const REWRITE_INSTRUCTION: &str = "Rewrite the following prompt so it is clear, specific and \
complete. Preserve the original intent and language. Reply with the rewritten prompt only.";

// =============================================================================
// Skip Directive
// =============================================================================

/// Case-insensitive matcher for the skip directive
#[derive(Debug, Clone)]
pub struct SkipDirective {
    pattern: Regex,
}

impl SkipDirective {
    pub fn new(directive: &str) -> Result<Self> {
        let directive = directive.trim();
        if directive.is_empty() {
            return Err(RouterError::Config(
                "enhancer.skip_directive must not be empty".to_string(),
            ));
        }

        let pattern = Regex::new(&format!(r"[ \t]*(?i:{})[ \t]*", regex::escape(directive)))
            .map_err(|e| RouterError::Config(format!("Invalid skip directive: {}", e)))?;

        Ok(Self { pattern })
    }

    pub fn is_present(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Remove every occurrence and trim the ends.
    ///
    /// Only the spaces and tabs around a marker are consumed. A marker between
    /// two words leaves a single space; elsewhere it leaves nothing, so line
    /// breaks and indentation in the rest of the prompt are kept.
    pub fn strip(&self, prompt: &Prompt) -> Prompt {
        let text = prompt.text();
        if !self.is_present(text) {
            return prompt.clone();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.pattern.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            let between_words = matches!(
                (before, after),
                (Some(b), Some(a)) if !b.is_whitespace() && !a.is_whitespace()
            );
            if between_words {
                out.push(' ');
            }
            last = m.end();
        }
        out.push_str(&text[last..]);

        Prompt::new(out.trim())
    }
}

// =============================================================================
// Enhancer
// =============================================================================

pub struct Enhancer {
    provider: SharedProvider,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for Enhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enhancer")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Result of one enhancement call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enhanced {
    Rewritten(Prompt),
    /// Service failed; carries the unchanged input
    Unchanged(Prompt),
}

impl Enhanced {
    pub fn into_prompt(self) -> Prompt {
        match self {
            Enhanced::Rewritten(prompt) | Enhanced::Unchanged(prompt) => prompt,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, Enhanced::Rewritten(_))
    }
}

impl Enhancer {
    pub fn new(provider: SharedProvider, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }

    pub fn from_config(provider: SharedProvider, config: &EnhancerConfig) -> Self {
        Self::new(provider, config.model.clone(), config.timeout())
    }

    /// Adapter backing the rewriting service
    pub fn adapter(&self) -> SharedProvider {
        Arc::clone(&self.provider)
    }

    /// Rewrite `prompt`; returns the original text on any failure
    pub async fn enhance(&self, prompt: &Prompt) -> Prompt {
        self.try_enhance(prompt).await.into_prompt()
    }

    /// Like [`enhance`](Self::enhance), reporting whether a rewrite was used
    pub async fn try_enhance(&self, prompt: &Prompt) -> Enhanced {
        let request = GenerationRequest::new(
            format!("{}\n\n{}", REWRITE_INSTRUCTION, prompt.text()),
            self.model.clone(),
        );

        match invoke_with_timeout(self.provider.as_ref(), &request, self.timeout).await {
            Ok(completion) if !completion.text.trim().is_empty() => {
                debug!(
                    provider = %self.provider.name(),
                    original_words = prompt.word_count(),
                    "Prompt enhanced"
                );
                Enhanced::Rewritten(Prompt::new(completion.text.trim()))
            }
            Ok(_) => {
                warn!(provider = %self.provider.name(), "Enhancer returned empty text; using original prompt");
                Enhanced::Unchanged(prompt.clone())
            }
            Err(e) => {
                warn!(
                    provider = %self.provider.name(),
                    kind = %e.kind,
                    error = %e,
                    "Prompt enhancement failed; using original prompt"
                );
                Enhanced::Unchanged(prompt.clone())
            }
        }
    }
}
