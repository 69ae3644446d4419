//! Prompt Complexity Classifier
//!
//! Maps a prompt to a [`ComplexityTier`] and a coarse [`TaskLabel`].
//! Pure and deterministic; never fails.
//!
//! ## Rules
//!
//! 1. `High` when the word count exceeds the high threshold, or any heavy
//!    keyword is present
//! 2. `Small` when the word count is at or below the low threshold, or any
//!    simple keyword is present
//! 3. `Medium` otherwise
//!
//! Keywords match whole words, case-insensitively. A prompt is split into
//! words on every non-alphanumeric character, so `debugging` does not
//! contain `debug` but `debug:` does.

use serde::Serialize;
use std::collections::HashSet;

use crate::config::ClassifierConfig;
use crate::types::{ComplexityTier, Prompt, TaskLabel};

/// Task label groups, checked in order; first hit wins
const TASK_GROUPS: &[(&str, &[&str])] = &[
    ("code", &["code", "programming", "debug", "develop"]),
    ("research", &["research", "analyze"]),
    ("creative", &["create"]),
    ("greeting", &["hi", "hello"]),
];

/// Classifier output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: ComplexityTier,
    pub task: TaskLabel,
    pub word_count: usize,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    low_word_threshold: usize,
    high_word_threshold: usize,
    heavy_keywords: HashSet<String>,
    simple_keywords: HashSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            low_word_threshold: config.low_word_threshold,
            high_word_threshold: config.high_word_threshold,
            heavy_keywords: normalize(&config.heavy_keywords),
            simple_keywords: normalize(&config.simple_keywords),
        }
    }

    pub fn classify(&self, prompt: &Prompt) -> Classification {
        let words = keyword_tokens(prompt.text());
        let word_count = prompt.word_count();

        let has_heavy = words.iter().any(|w| self.heavy_keywords.contains(w));
        let has_simple = words.iter().any(|w| self.simple_keywords.contains(w));

        let tier = if word_count > self.high_word_threshold || has_heavy {
            ComplexityTier::High
        } else if word_count <= self.low_word_threshold || has_simple {
            ComplexityTier::Small
        } else {
            ComplexityTier::Medium
        };

        Classification {
            tier,
            task: task_label(&words),
            word_count,
        }
    }
}

fn normalize(keywords: &[String]) -> HashSet<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Lowercased alphanumeric runs of `text`
fn keyword_tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn task_label(words: &HashSet<String>) -> TaskLabel {
    TASK_GROUPS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| words.contains(*k)))
        .map(|(label, _)| TaskLabel::from(*label))
        .unwrap_or_else(TaskLabel::general)
}
