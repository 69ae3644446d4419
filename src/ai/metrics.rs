//! Router Metrics Collection
//!
//! Process-wide counters for routing outcomes, adapter attempts and
//! enhancement results. Thread-safe for concurrent routing calls.
//!
//! ## Usage
//!
//! ```ignore
//! let metrics = create_shared_metrics();
//! metrics.record_attempt("openai", AttemptKind::Success, 420);
//! let snapshot = metrics.snapshot();
//! ```

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::types::{ComplexityTier, FailureKind};

/// Outcome of a single adapter attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    Success,
    Failed(FailureKind),
}

/// Outcome of the enhancement step for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhancementOutcome {
    /// Rewritten text was used
    Applied,
    /// Service failed; original text used
    Failed,
    /// Skip directive or caller-supplied text
    Skipped,
}

/// Per-provider counters
#[derive(Debug, Default)]
struct ProviderCounters {
    attempts: AtomicU64,
    successes: AtomicU64,
    retryable: AtomicU64,
    fatal: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Thread-safe metrics collector.
///
/// Uses atomics for counters and a DashMap for per-provider state.
pub struct RouterMetrics {
    start_time: Instant,
    requests: AtomicU64,
    succeeded: AtomicU64,
    exhausted: AtomicU64,
    tier_counts: [AtomicU64; 3],
    enhancements_applied: AtomicU64,
    enhancements_failed: AtomicU64,
    enhancements_skipped: AtomicU64,
    providers: DashMap<String, ProviderCounters>,
}

/// Serializable point-in-time view of the counters
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_ms: u64,
    pub requests: u64,
    pub succeeded: u64,
    pub exhausted: u64,
    pub small: u64,
    pub medium: u64,
    pub high: u64,
    pub enhancements_applied: u64,
    pub enhancements_failed: u64,
    pub enhancements_skipped: u64,
    pub providers: Vec<ProviderSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderSnapshot {
    pub provider: String,
    pub attempts: u64,
    pub successes: u64,
    pub retryable_failures: u64,
    pub fatal_failures: u64,
    pub avg_latency_ms: f64,
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            exhausted: AtomicU64::new(0),
            tier_counts: Default::default(),
            enhancements_applied: AtomicU64::new(0),
            enhancements_failed: AtomicU64::new(0),
            enhancements_skipped: AtomicU64::new(0),
            providers: DashMap::new(),
        }
    }

    /// Record an incoming routing request after classification
    pub fn record_request(&self, tier: ComplexityTier) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.tier_counts[tier as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attempt(&self, provider: &str, kind: AttemptKind, latency_ms: u64) {
        let counters = self.providers.entry(provider.to_string()).or_default();
        counters.attempts.fetch_add(1, Ordering::Relaxed);
        counters
            .total_latency_ms
            .fetch_add(latency_ms, Ordering::Relaxed);

        let counter = match kind {
            AttemptKind::Success => &counters.successes,
            AttemptKind::Failed(FailureKind::Retryable) => &counters.retryable,
            AttemptKind::Failed(FailureKind::Fatal) => &counters.fatal,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, succeeded: bool) {
        if succeeded {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.exhausted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_enhancement(&self, outcome: EnhancementOutcome) {
        let counter = match outcome {
            EnhancementOutcome::Applied => &self.enhancements_applied,
            EnhancementOutcome::Failed => &self.enhancements_failed,
            EnhancementOutcome::Skipped => &self.enhancements_skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut providers: Vec<ProviderSnapshot> = self
            .providers
            .iter()
            .map(|entry| {
                let counters = entry.value();
                let attempts = counters.attempts.load(Ordering::Relaxed);
                let total_latency = counters.total_latency_ms.load(Ordering::Relaxed);
                ProviderSnapshot {
                    provider: entry.key().clone(),
                    attempts,
                    successes: counters.successes.load(Ordering::Relaxed),
                    retryable_failures: counters.retryable.load(Ordering::Relaxed),
                    fatal_failures: counters.fatal.load(Ordering::Relaxed),
                    avg_latency_ms: if attempts > 0 {
                        total_latency as f64 / attempts as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect();
        providers.sort_by(|a, b| a.provider.cmp(&b.provider));

        MetricsSnapshot {
            uptime_ms: self.start_time.elapsed().as_millis() as u64,
            requests: self.requests.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            small: self.tier_counts[ComplexityTier::Small as usize].load(Ordering::Relaxed),
            medium: self.tier_counts[ComplexityTier::Medium as usize].load(Ordering::Relaxed),
            high: self.tier_counts[ComplexityTier::High as usize].load(Ordering::Relaxed),
            enhancements_applied: self.enhancements_applied.load(Ordering::Relaxed),
            enhancements_failed: self.enhancements_failed.load(Ordering::Relaxed),
            enhancements_skipped: self.enhancements_skipped.load(Ordering::Relaxed),
            providers,
        }
    }
}

impl Default for RouterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSnapshot {
    /// Format snapshot for display
    pub fn display(&self) -> String {
        let mut out = format!(
            "Requests: {} (succeeded: {}, exhausted: {})\n\
             Tiers: small {} / medium {} / high {}\n\
             Enhancement: applied {}, failed {}, skipped {}",
            self.requests,
            self.succeeded,
            self.exhausted,
            self.small,
            self.medium,
            self.high,
            self.enhancements_applied,
            self.enhancements_failed,
            self.enhancements_skipped
        );
        for p in &self.providers {
            out.push_str(&format!(
                "\n  {}: {} attempts, {} ok, {} retryable, {} fatal, avg {:.0}ms",
                p.provider,
                p.attempts,
                p.successes,
                p.retryable_failures,
                p.fatal_failures,
                p.avg_latency_ms
            ));
        }
        out
    }
}

// =============================================================================
// Shared Type
// =============================================================================

pub type SharedMetrics = Arc<RouterMetrics>;

pub fn create_shared_metrics() -> SharedMetrics {
    Arc::new(RouterMetrics::new())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_attempts_per_provider() {
        let metrics = RouterMetrics::new();
        metrics.record_attempt("openai", AttemptKind::Failed(FailureKind::Retryable), 100);
        metrics.record_attempt("openai", AttemptKind::Success, 300);
        metrics.record_attempt("anthropic", AttemptKind::Failed(FailureKind::Fatal), 50);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.providers.len(), 2);

        let anthropic = &snapshot.providers[0];
        assert_eq!(anthropic.provider, "anthropic");
        assert_eq!(anthropic.fatal_failures, 1);

        let openai = &snapshot.providers[1];
        assert_eq!(openai.attempts, 2);
        assert_eq!(openai.successes, 1);
        assert_eq!(openai.retryable_failures, 1);
        assert!((openai.avg_latency_ms - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_request_and_enhancement_counters() {
        let metrics = RouterMetrics::new();
        metrics.record_request(ComplexityTier::High);
        metrics.record_request(ComplexityTier::Small);
        metrics.record_enhancement(EnhancementOutcome::Failed);
        metrics.record_outcome(true);
        metrics.record_outcome(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 2);
        assert_eq!(snapshot.high, 1);
        assert_eq!(snapshot.small, 1);
        assert_eq!(snapshot.medium, 0);
        assert_eq!(snapshot.enhancements_failed, 1);
        assert_eq!(snapshot.succeeded, 1);
        assert_eq!(snapshot.exhausted, 1);
        assert!(snapshot.display().contains("Requests: 2"));
    }

    #[test]
    fn test_concurrent_recording() {
        use std::thread;

        let metrics = create_shared_metrics();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..100 {
                        m.record_attempt("huggingface", AttemptKind::Success, 10);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.providers[0].attempts, 1000);
        assert_eq!(snapshot.providers[0].successes, 1000);
    }
}
