//! Sticky Candidate Index
//!
//! Adapter-owned hint recording the last candidate that succeeded: its
//! position in the routed tier's candidate list and its model id. It only
//! biases where an adapter starts its own probing; it never reorders or
//! constrains the router's candidate sequence.
//!
//! One adapter may serve several tiers with different candidate lists, so
//! probing resolves the start point by model id, not by position.
//!
//! Concurrent routing calls may race on the value; last writer wins.

use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct StickyIndex {
    index: AtomicUsize,
    model: RwLock<Option<String>>,
}

impl StickyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded successful position (0 when never recorded or reset)
    pub fn get(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    /// Last recorded successful model id
    pub fn model(&self) -> Option<String> {
        self.model
            .read()
            .unwrap_or_else(|poisoned| {
                tracing::error!("Sticky model RwLock poisoned on read, recovering");
                poisoned.into_inner()
            })
            .clone()
    }

    /// Record a confirmed success of `model_id` at `position`
    pub fn record_success(&self, position: usize, model_id: &str) {
        self.index.store(position, Ordering::Relaxed);
        self.set_model(Some(model_id.to_string()));
    }

    pub fn reset(&self) {
        self.index.store(0, Ordering::Relaxed);
        self.set_model(None);
    }

    fn set_model(&self, model: Option<String>) {
        let mut current = self.model.write().unwrap_or_else(|poisoned| {
            tracing::error!("Sticky model RwLock poisoned, recovering");
            poisoned.into_inner()
        });
        *current = model;
    }

    /// `models` rotated to begin at the recorded model; unrotated when the
    /// recorded model is not in the list
    pub fn rotated<'a, T: AsRef<str>>(
        &self,
        models: &'a [T],
    ) -> impl Iterator<Item = &'a T> + 'a {
        let start = self
            .model()
            .and_then(|last| models.iter().position(|m| m.as_ref() == last))
            .unwrap_or(0);
        models[start..].iter().chain(models[..start].iter())
    }
}
