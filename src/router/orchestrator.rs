//! Routing Orchestrator
//!
//! Sequential per-tier fallback across candidate models.
//!
//! ## Strategy
//!
//! 1. Classify the prompt and mint a [`RequestId`]
//! 2. Select the adapter bound to the tier (no cross-tier fallback)
//! 3. Enhance `High` prompts unless skip-directed or pre-enhanced
//! 4. Strip the skip directive from the final text
//! 5. Try candidates in declared order, each under the tier timeout
//! 6. First success wins and updates the adapter's sticky index
//! 7. Exhaustion yields `AllProvidersFailed` with the last failure

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{Span, debug, field, info, instrument, warn};

use super::classifier::{Classification, Classifier};
use super::enhancer::{Enhanced, Enhancer, SkipDirective};
use super::types::{AttemptOutcome, RouteOptions, RouteRequest, RouteResult};
use crate::ai::metrics::{AttemptKind, EnhancementOutcome, SharedMetrics, create_shared_metrics};
use crate::ai::provider::{
    EchoAdapter, GenerationRequest, ProviderConfig, ProviderError, SharedProvider,
    create_provider, credentials_available,
};
use crate::ai::timeout::invoke_with_timeout;
use crate::config::{ClassifierConfig, Config, RouterSettings};
use crate::constants::{enhancer as enhancer_constants, tiers as tier_constants};
use crate::types::{ComplexityTier, Prompt, RequestId, Result, RouterError};

/// Adapter, candidates and per-attempt timeout bound to one tier
#[derive(Clone)]
pub struct TierRoute {
    pub adapter: SharedProvider,
    pub models: Vec<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for TierRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierRoute")
            .field("adapter", &self.adapter.name())
            .field("models", &self.models)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Health of one registered adapter
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderHealth {
    pub provider: String,
    pub tiers: Vec<ComplexityTier>,
    pub enhancer: bool,
    pub healthy: bool,
}

pub struct Router {
    classifier: Classifier,
    skip_directive: SkipDirective,
    enhancer: Option<Enhancer>,
    enhancer_adapter: Option<SharedProvider>,
    routes: HashMap<ComplexityTier, TierRoute>,
    settings: RouterSettings,
    metrics: SharedMetrics,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("enhancer", &self.enhancer)
            .field("stop_on_fatal", &self.settings.stop_on_fatal)
            .finish()
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Build a router from application config.
    ///
    /// In development a provider without credentials is replaced by the
    /// echo adapter and an enhancer without credentials is disabled, each
    /// with a warning. In production both are construction errors.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let production = config.environment.is_production();
        let mut adapters: HashMap<String, SharedProvider> = HashMap::new();
        let mut builder = Router::builder()
            .classifier(config.classifier.clone())
            .settings(config.router.clone())
            .skip_directive(config.enhancer.skip_directive.clone());

        for tier in ComplexityTier::ALL {
            let tier_config = config.tiers.get(tier);
            let name = tier_config.provider.as_str();

            let adapter = match adapters.get(name) {
                Some(adapter) => Arc::clone(adapter),
                None => {
                    let adapter: SharedProvider = if production || credentials_available(config, name)
                    {
                        create_provider(&ProviderConfig::from_app_config(config, name))?
                    } else {
                        warn!(
                            provider = %name,
                            tier = %tier,
                            "No credentials for provider; using echo adapter (development only)"
                        );
                        Arc::new(EchoAdapter::new())
                    };
                    adapters.insert(name.to_string(), Arc::clone(&adapter));
                    adapter
                }
            };

            builder = builder.tier(tier, adapter, tier_config.models.clone(), tier_config.timeout());
        }

        if config.enhancer.enabled {
            let name = config.enhancer.provider.as_str();
            if production || credentials_available(config, name) {
                let adapter = match adapters.get(name) {
                    Some(adapter) => Arc::clone(adapter),
                    None => create_provider(&ProviderConfig::from_app_config(config, name))?,
                };
                builder = builder.enhancer(Enhancer::from_config(adapter, &config.enhancer));
            } else {
                warn!(
                    provider = %name,
                    "No credentials for enhancer provider; prompt enhancement disabled"
                );
            }
        }

        let router = builder.build()?;
        info!(
            environment = %config.environment,
            enhancer = router.enhancer.is_some(),
            "Router initialized"
        );
        Ok(router)
    }

    pub fn classify(&self, prompt: &str) -> Classification {
        self.classifier.classify(&Prompt::new(prompt))
    }

    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }

    pub fn route_for(&self, tier: ComplexityTier) -> Option<&TierRoute> {
        self.routes.get(&tier)
    }

    pub fn has_enhancer(&self) -> bool {
        self.enhancer.is_some()
    }

    /// Route one prompt to a provider and return its completion
    pub async fn route(&self, prompt: &str, options: RouteOptions) -> Result<RouteResult> {
        self.route_request(RequestId::new(), prompt, options).await
    }

    #[instrument(
        name = "route",
        skip_all,
        fields(
            request_id = %request_id,
            user_id = ?options.user_id,
            tier = field::Empty,
            task = field::Empty
        )
    )]
    async fn route_request(
        &self,
        request_id: RequestId,
        prompt: &str,
        options: RouteOptions,
    ) -> Result<RouteResult> {
        let original = Prompt::new(prompt);
        let classification = self.classifier.classify(&original);
        let tier = classification.tier;

        let span = Span::current();
        span.record("tier", field::display(tier));
        span.record("task", field::display(&classification.task));

        debug!(
            words = classification.word_count,
            chars = original.char_count(),
            "Prompt classified"
        );

        let route = self
            .routes
            .get(&tier)
            .ok_or(RouterError::NoProviderForTier(tier))?;
        self.metrics.record_request(tier);

        let (text, enhanced) = self.prepare_prompt(&original, tier, options).await;

        let request = RouteRequest {
            prompt: self.skip_directive.strip(&text),
            tier,
            task: classification.task,
            model_candidates: route.models.clone(),
        };

        self.dispatch(route, request, request_id, enhanced).await
    }

    /// Select the text to send; returns it with whether the enhancer rewrote it
    async fn prepare_prompt(
        &self,
        original: &Prompt,
        tier: ComplexityTier,
        options: RouteOptions,
    ) -> (Prompt, bool) {
        if self.skip_directive.is_present(original.text()) {
            if tier == ComplexityTier::High {
                debug!("Skip directive present; enhancement skipped");
                self.metrics.record_enhancement(EnhancementOutcome::Skipped);
            }
            return (original.clone(), false);
        }

        if let Some(pre_enhanced) = options.pre_enhanced_prompt {
            if tier == ComplexityTier::High {
                self.metrics.record_enhancement(EnhancementOutcome::Skipped);
            }
            return (Prompt::new(pre_enhanced), false);
        }

        if tier != ComplexityTier::High {
            return (original.clone(), false);
        }

        let Some(enhancer) = &self.enhancer else {
            return (original.clone(), false);
        };

        match enhancer.try_enhance(original).await {
            Enhanced::Rewritten(prompt) => {
                self.metrics.record_enhancement(EnhancementOutcome::Applied);
                (prompt, true)
            }
            Enhanced::Unchanged(prompt) => {
                self.metrics.record_enhancement(EnhancementOutcome::Failed);
                (prompt, false)
            }
        }
    }

    /// Try each candidate in order until one succeeds or the list is exhausted
    async fn dispatch(
        &self,
        route: &TierRoute,
        request: RouteRequest,
        request_id: RequestId,
        enhanced: bool,
    ) -> Result<RouteResult> {
        let adapter = route.adapter.as_ref();
        let provider_name = adapter.name().to_string();
        let total = request.model_candidates.len();

        let mut attempts = 0;
        let mut last_error: Option<ProviderError> = None;

        for (position, model) in request.model_candidates.iter().enumerate() {
            attempts += 1;

            let generation = GenerationRequest::new(request.prompt.text(), model.clone())
                .with_task(request.task.clone())
                .with_temperature(self.settings.temperature)
                .with_max_tokens(self.settings.max_tokens);

            debug!(
                provider = %provider_name,
                model = %model,
                attempt = attempts,
                candidates = total,
                "Dispatch attempt"
            );

            let attempt_start = Instant::now();
            let outcome =
                AttemptOutcome::from(invoke_with_timeout(adapter, &generation, route.timeout).await);
            let latency_ms = attempt_start.elapsed().as_millis() as u64;

            match outcome {
                AttemptOutcome::Success(completion) => {
                    self.metrics
                        .record_attempt(&provider_name, AttemptKind::Success, latency_ms);
                    self.metrics.record_outcome(true);
                    if let Some(sticky) = adapter.sticky_index() {
                        sticky.record_success(position, model);
                    }

                    info!(
                        provider = %completion.provider_name,
                        model = %completion.model_id,
                        attempts,
                        latency_ms,
                        "Routing succeeded"
                    );

                    return Ok(RouteResult {
                        text: completion.text,
                        provider_name: completion.provider_name,
                        model_used: completion.model_id,
                        word_count: request.prompt.word_count(),
                        task: request.task,
                        signature: self.settings.signature.clone(),
                        request_id,
                        tier: request.tier,
                        attempts,
                        enhanced,
                        created_at: Utc::now(),
                    });
                }
                AttemptOutcome::Retryable(error) => {
                    self.record_failure(&provider_name, model, attempts, &error, latency_ms);
                    last_error = Some(error);
                }
                AttemptOutcome::Fatal(error) => {
                    self.record_failure(&provider_name, model, attempts, &error, latency_ms);
                    last_error = Some(error);
                    if self.settings.stop_on_fatal {
                        debug!("Stopping on fatal failure");
                        break;
                    }
                }
            }
        }

        self.metrics.record_outcome(false);
        let last = last_error
            .unwrap_or_else(|| ProviderError::fatal("No candidate models").provider(&provider_name));

        info!(
            provider = %provider_name,
            attempts,
            last_kind = %last.kind,
            "All candidates failed"
        );

        Err(RouterError::AllProvidersFailed {
            request_id,
            attempts,
            last: Box::new(last),
        })
    }

    fn record_failure(
        &self,
        provider_name: &str,
        model: &str,
        attempt: usize,
        error: &ProviderError,
        latency_ms: u64,
    ) {
        self.metrics
            .record_attempt(provider_name, AttemptKind::Failed(error.kind), latency_ms);
        warn!(
            provider = %provider_name,
            model = %model,
            attempt,
            kind = %error.kind,
            status = ?error.status,
            error = %error.message,
            "Candidate failed"
        );
    }

    /// Reset the sticky index of every registered adapter
    pub fn reset_sticky_indices(&self) {
        for adapter in self.distinct_adapters() {
            if let Some(sticky) = adapter.sticky_index() {
                sticky.reset();
            }
        }
    }

    /// Run `health_check` once per distinct registered adapter
    pub async fn check_providers(&self) -> Vec<ProviderHealth> {
        let mut results = Vec::new();

        for adapter in self.distinct_adapters() {
            let mut tiers: Vec<ComplexityTier> = self
                .routes
                .iter()
                .filter(|(_, route)| Arc::ptr_eq(&route.adapter, &adapter))
                .map(|(tier, _)| *tier)
                .collect();
            tiers.sort();

            let enhancer = self
                .enhancer_adapter
                .as_ref()
                .is_some_and(|a| Arc::ptr_eq(a, &adapter));

            results.push(ProviderHealth {
                provider: adapter.name().to_string(),
                tiers,
                enhancer,
                healthy: adapter.health_check().await,
            });
        }

        results
    }

    fn distinct_adapters(&self) -> Vec<SharedProvider> {
        let mut distinct: Vec<SharedProvider> = Vec::new();
        let mut tiers: Vec<_> = self.routes.keys().copied().collect();
        tiers.sort();

        let candidates = tiers
            .iter()
            .filter_map(|tier| self.routes.get(tier).map(|route| &route.adapter))
            .chain(self.enhancer_adapter.iter());

        for adapter in candidates {
            if !distinct.iter().any(|a| Arc::ptr_eq(a, adapter)) {
                distinct.push(Arc::clone(adapter));
            }
        }
        distinct
    }
}

// =============================================================================
// Builder
// =============================================================================

pub struct RouterBuilder {
    classifier: ClassifierConfig,
    settings: RouterSettings,
    skip_directive: String,
    enhancer: Option<(Enhancer, SharedProvider)>,
    routes: HashMap<ComplexityTier, TierRoute>,
    metrics: Option<SharedMetrics>,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            settings: RouterSettings::default(),
            skip_directive: enhancer_constants::SKIP_DIRECTIVE.to_string(),
            enhancer: None,
            routes: HashMap::new(),
            metrics: None,
        }
    }
}

impl RouterBuilder {
    pub fn classifier(mut self, config: ClassifierConfig) -> Self {
        self.classifier = config;
        self
    }

    pub fn settings(mut self, settings: RouterSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn skip_directive(mut self, directive: impl Into<String>) -> Self {
        self.skip_directive = directive.into();
        self
    }

    pub fn stop_on_fatal(mut self, stop: bool) -> Self {
        self.settings.stop_on_fatal = stop;
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.settings.signature = signature.into();
        self
    }

    pub fn enhancer(mut self, enhancer: Enhancer) -> Self {
        let adapter = enhancer.adapter();
        self.enhancer = Some((enhancer, adapter));
        self
    }

    /// Bind `adapter` and its ordered candidates to `tier`
    pub fn tier<S: Into<String>>(
        mut self,
        tier: ComplexityTier,
        adapter: SharedProvider,
        models: impl IntoIterator<Item = S>,
        timeout: Duration,
    ) -> Self {
        self.routes.insert(
            tier,
            TierRoute {
                adapter,
                models: models.into_iter().map(Into::into).collect(),
                timeout,
            },
        );
        self
    }

    pub fn metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<Router> {
        for (tier, route) in &self.routes {
            if route.models.is_empty() {
                return Err(RouterError::Config(format!(
                    "tier '{}' has no candidate models",
                    tier
                )));
            }
            if route.models.len() > tier_constants::MAX_CANDIDATES {
                return Err(RouterError::Config(format!(
                    "tier '{}' has {} candidate models (max {})",
                    tier,
                    route.models.len(),
                    tier_constants::MAX_CANDIDATES
                )));
            }
            if route.timeout.is_zero() {
                return Err(RouterError::Config(format!(
                    "tier '{}' timeout must be greater than 0",
                    tier
                )));
            }
        }

        let (enhancer, enhancer_adapter) = match self.enhancer {
            Some((enhancer, adapter)) => (Some(enhancer), Some(adapter)),
            None => (None, None),
        };

        Ok(Router {
            classifier: Classifier::new(&self.classifier),
            skip_directive: SkipDirective::new(&self.skip_directive)?,
            enhancer,
            enhancer_adapter,
            routes: self.routes,
            settings: self.settings,
            metrics: self.metrics.unwrap_or_else(create_shared_metrics),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{AdapterResult, Completion, ProviderAdapter, StickyIndex};
    use crate::types::FailureKind;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Adapter replaying a scripted sequence of outcomes
    struct ScriptedAdapter {
        name: &'static str,
        script: Mutex<VecDeque<std::result::Result<String, ProviderError>>>,
        calls: Mutex<Vec<GenerationRequest>>,
        delay: Duration,
        sticky: StickyIndex,
    }

    impl ScriptedAdapter {
        fn new(
            name: &'static str,
            script: Vec<std::result::Result<&str, ProviderError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                script: Mutex::new(
                    script
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                calls: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
                sticky: StickyIndex::new(),
            })
        }

        fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                script: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
                delay,
                sticky: StickyIndex::new(),
            })
        }

        fn calls(&self) -> Vec<GenerationRequest> {
            self.calls.lock().unwrap().clone()
        }

        fn models_called(&self) -> Vec<String> {
            self.calls().into_iter().map(|c| c.model_id).collect()
        }
    }

    #[async_trait]
    impl ProviderAdapter for ScriptedAdapter {
        async fn invoke(&self, request: &GenerationRequest) -> AdapterResult {
            self.calls.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(text)) => Ok(Completion {
                    text,
                    provider_name: self.name.to_string(),
                    model_id: request.model_id.clone(),
                }),
                Some(Err(e)) => Err(e.provider(self.name)),
                None => Ok(Completion {
                    text: format!("reply to: {}", request.prompt),
                    provider_name: self.name.to_string(),
                    model_id: request.model_id.clone(),
                }),
            }
        }

        fn name(&self) -> &str {
            self.name
        }

        async fn health_check(&self) -> bool {
            self.name != "down"
        }

        fn sticky_index(&self) -> Option<&StickyIndex> {
            Some(&self.sticky)
        }
    }

    const MODELS: [&str; 3] = ["m0", "m1", "m2"];
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn retryable() -> std::result::Result<&'static str, ProviderError> {
        Err(ProviderError::retryable("503 Service Unavailable").status(503))
    }

    fn fatal() -> std::result::Result<&'static str, ProviderError> {
        Err(ProviderError::fatal("401 Unauthorized").status(401))
    }

    fn single_tier(tier: ComplexityTier, adapter: &Arc<ScriptedAdapter>) -> RouterBuilder {
        Router::builder().tier(tier, adapter.clone() as SharedProvider, MODELS, TIMEOUT)
    }

    fn all_tiers(adapter: &Arc<ScriptedAdapter>) -> RouterBuilder {
        ComplexityTier::ALL
            .into_iter()
            .fold(Router::builder(), |b, tier| {
                b.tier(tier, adapter.clone() as SharedProvider, MODELS, TIMEOUT)
            })
    }

    fn high_prompt() -> &'static str {
        "Please analyze the trade-offs between these two caching strategies"
    }

    #[tokio::test]
    async fn test_first_candidate_success() {
        let adapter = ScriptedAdapter::new("a", vec![Ok("done")]);
        let router = single_tier(ComplexityTier::Small, &adapter).build().unwrap();

        let result = router.route("hello", RouteOptions::default()).await.unwrap();
        assert_eq!(result.text, "done");
        assert_eq!(result.model_used, "m0");
        assert_eq!(result.provider_name, "a");
        assert_eq!(result.attempts, 1);
        assert_eq!(result.tier, ComplexityTier::Small);
        assert_eq!(result.task.as_str(), "greeting");
        assert_eq!(result.word_count, 1);
        assert!(!result.enhanced);
        assert_eq!(adapter.models_called(), vec!["m0"]);
    }

    #[tokio::test]
    async fn test_retryable_failures_then_success() {
        let adapter = ScriptedAdapter::new("a", vec![retryable(), retryable(), Ok("third")]);
        let router = single_tier(ComplexityTier::Small, &adapter).build().unwrap();

        let result = router.route("hi", RouteOptions::default()).await.unwrap();
        assert_eq!(result.model_used, "m2");
        assert_eq!(result.attempts, 3);
        assert_eq!(adapter.models_called(), vec!["m0", "m1", "m2"]);
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let adapter = ScriptedAdapter::new("a", vec![retryable(), retryable(), retryable()]);
        let router = single_tier(ComplexityTier::Small, &adapter).build().unwrap();

        let err = router.route("hi", RouteOptions::default()).await.unwrap_err();
        match &err {
            RouterError::AllProvidersFailed { attempts, last, .. } => {
                assert_eq!(*attempts, 3);
                assert_eq!(last.status, Some(503));
                assert_eq!(last.kind, FailureKind::Retryable);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.request_id().is_some());
        assert_eq!(adapter.calls().len(), 3);
        assert_eq!(router.metrics().snapshot().exhausted, 1);
    }

    #[tokio::test]
    async fn test_fatal_continues_by_default() {
        let adapter = ScriptedAdapter::new("a", vec![fatal(), Ok("recovered")]);
        let router = single_tier(ComplexityTier::Small, &adapter).build().unwrap();

        let result = router.route("hi", RouteOptions::default()).await.unwrap();
        assert_eq!(result.model_used, "m1");
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn test_stop_on_fatal() {
        let adapter = ScriptedAdapter::new("a", vec![fatal(), Ok("unreached")]);
        let router = single_tier(ComplexityTier::Small, &adapter)
            .stop_on_fatal(true)
            .build()
            .unwrap();

        let err = router.route("hi", RouteOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            RouterError::AllProvidersFailed { attempts: 1, ref last, .. } if last.kind == FailureKind::Fatal
        ));
        assert_eq!(adapter.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stop_on_fatal_still_retries_transient() {
        let adapter = ScriptedAdapter::new("a", vec![retryable(), Ok("ok")]);
        let router = single_tier(ComplexityTier::Small, &adapter)
            .stop_on_fatal(true)
            .build()
            .unwrap();

        let result = router.route("hi", RouteOptions::default()).await.unwrap();
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn test_timeout_is_retryable() {
        let adapter = ScriptedAdapter::slow("slow", Duration::from_secs(5));
        let router = Router::builder()
            .tier(
                ComplexityTier::Small,
                adapter.clone() as SharedProvider,
                ["m0", "m1"],
                Duration::from_millis(20),
            )
            .build()
            .unwrap();

        let err = router.route("hi", RouteOptions::default()).await.unwrap_err();
        match err {
            RouterError::AllProvidersFailed { attempts, last, .. } => {
                assert_eq!(attempts, 2);
                assert_eq!(last.kind, FailureKind::Retryable);
                assert!(last.message.contains("timed out"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(adapter.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_no_provider_for_tier() {
        let adapter = ScriptedAdapter::new("a", vec![]);
        let router = single_tier(ComplexityTier::Small, &adapter).build().unwrap();

        let err = router
            .route(high_prompt(), RouteOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RouterError::NoProviderForTier(ComplexityTier::High)
        ));
        assert!(adapter.calls().is_empty());

        // rejected before dispatch, so not counted as a request
        let snapshot = router.metrics().snapshot();
        assert_eq!(snapshot.requests, 0);
        assert_eq!(snapshot.high, 0);
        assert_eq!(snapshot.requests, snapshot.succeeded + snapshot.exhausted);
    }

    #[tokio::test]
    async fn test_sticky_index_updated_and_reset() {
        let adapter = ScriptedAdapter::new("a", vec![retryable(), Ok("ok"), Ok("again")]);
        let router = single_tier(ComplexityTier::Small, &adapter).build().unwrap();

        router.route("hi", RouteOptions::default()).await.unwrap();
        assert_eq!(adapter.sticky.get(), 1);

        // candidate order is not re-sorted by the sticky hint
        let result = router.route("hi", RouteOptions::default()).await.unwrap();
        assert_eq!(result.model_used, "m0");
        assert_eq!(adapter.sticky.get(), 0);

        adapter.sticky.record_success(2, "m2");
        router.reset_sticky_indices();
        assert_eq!(adapter.sticky.get(), 0);
    }

    #[tokio::test]
    async fn test_sticky_untouched_on_exhaustion() {
        let adapter = ScriptedAdapter::new("a", vec![retryable(), retryable(), retryable()]);
        let router = single_tier(ComplexityTier::Small, &adapter).build().unwrap();
        adapter.sticky.record_success(2, "m2");

        let _ = router.route("hi", RouteOptions::default()).await;
        assert_eq!(adapter.sticky.get(), 2);
    }

    #[tokio::test]
    async fn test_high_tier_is_enhanced() {
        let target = ScriptedAdapter::new("target", vec![]);
        let rewriter = ScriptedAdapter::new("rewriter", vec![Ok("A precise rewritten prompt")]);
        let router = all_tiers(&target)
            .enhancer(Enhancer::new(rewriter.clone(), "rw", TIMEOUT))
            .build()
            .unwrap();

        let result = router.route(high_prompt(), RouteOptions::default()).await.unwrap();
        assert!(result.enhanced);
        assert_eq!(rewriter.calls().len(), 1);
        assert_eq!(target.calls()[0].prompt, "A precise rewritten prompt");
        assert_eq!(result.word_count, 4);
        assert_eq!(router.metrics().snapshot().enhancements_applied, 1);
    }

    #[tokio::test]
    async fn test_lower_tiers_never_enhanced() {
        let target = ScriptedAdapter::new("target", vec![]);
        let rewriter = ScriptedAdapter::new("rewriter", vec![]);
        let router = all_tiers(&target)
            .enhancer(Enhancer::new(rewriter.clone(), "rw", TIMEOUT))
            .build()
            .unwrap();

        let medium = vec!["word"; 30].join(" ");
        for prompt in ["hello there", medium.as_str()] {
            let result = router.route(prompt, RouteOptions::default()).await.unwrap();
            assert!(!result.enhanced);
        }
        assert!(rewriter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_skip_directive_blocks_enhancement_and_is_stripped() {
        let target = ScriptedAdapter::new("target", vec![]);
        let rewriter = ScriptedAdapter::new("rewriter", vec![]);
        let router = all_tiers(&target)
            .enhancer(Enhancer::new(rewriter.clone(), "rw", TIMEOUT))
            .build()
            .unwrap();

        let prompt = format!("{} !NO Enhance", high_prompt());
        let result = router.route(&prompt, RouteOptions::default()).await.unwrap();

        assert!(rewriter.calls().is_empty());
        assert!(!result.enhanced);
        assert_eq!(target.calls()[0].prompt, high_prompt());
        assert_eq!(router.metrics().snapshot().enhancements_skipped, 1);
    }

    #[tokio::test]
    async fn test_directive_stripped_on_lower_tier() {
        let target = ScriptedAdapter::new("target", vec![]);
        let router = all_tiers(&target).build().unwrap();

        router
            .route("Enhance this prompt please !no enhance", RouteOptions::default())
            .await
            .unwrap();
        let sent = &target.calls()[0].prompt;
        assert_eq!(sent, "Enhance this prompt please");
        assert!(!sent.to_lowercase().contains("!no enhance"));
    }

    #[tokio::test]
    async fn test_pre_enhanced_prompt_takes_precedence() {
        let target = ScriptedAdapter::new("target", vec![]);
        let rewriter = ScriptedAdapter::new("rewriter", vec![]);
        let router = all_tiers(&target)
            .enhancer(Enhancer::new(rewriter.clone(), "rw", TIMEOUT))
            .build()
            .unwrap();

        let options = RouteOptions::default().with_pre_enhanced_prompt("caller supplied text");
        let result = router.route(high_prompt(), options).await.unwrap();

        assert!(rewriter.calls().is_empty());
        assert_eq!(target.calls()[0].prompt, "caller supplied text");
        assert_eq!(result.word_count, 3);
    }

    #[tokio::test]
    async fn test_skip_directive_beats_pre_enhanced_prompt() {
        let target = ScriptedAdapter::new("target", vec![]);
        let router = all_tiers(&target).build().unwrap();

        let prompt = format!("!no enhance {}", high_prompt());
        let options = RouteOptions::default().with_pre_enhanced_prompt("caller supplied text");
        router.route(&prompt, options).await.unwrap();

        assert_eq!(target.calls()[0].prompt, high_prompt());
    }

    #[tokio::test]
    async fn test_enhancement_failure_does_not_change_outcome() {
        let target = ScriptedAdapter::new("target", vec![Ok("answer")]);
        let rewriter = ScriptedAdapter::new("rewriter", vec![fatal()]);
        let router = all_tiers(&target)
            .enhancer(Enhancer::new(rewriter.clone(), "rw", TIMEOUT))
            .build()
            .unwrap();

        let result = router.route(high_prompt(), RouteOptions::default()).await.unwrap();
        assert_eq!(result.text, "answer");
        assert!(!result.enhanced);
        assert_eq!(target.calls()[0].prompt, high_prompt());
        assert_eq!(router.metrics().snapshot().enhancements_failed, 1);
    }

    #[tokio::test]
    async fn test_request_ids_are_fresh() {
        let adapter = ScriptedAdapter::new("a", vec![]);
        let router = single_tier(ComplexityTier::Small, &adapter)
            .signature("sig")
            .build()
            .unwrap();

        let a = router.route("hi", RouteOptions::default()).await.unwrap();
        let b = router.route("hi", RouteOptions::default()).await.unwrap();
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.signature, "sig");
    }

    #[tokio::test]
    async fn test_generation_settings_forwarded() {
        let adapter = ScriptedAdapter::new("a", vec![]);
        let router = single_tier(ComplexityTier::Small, &adapter).build().unwrap();

        router.route("hi", RouteOptions::default()).await.unwrap();
        let call = &adapter.calls()[0];
        assert_eq!(call.task.as_str(), "greeting");
        assert_eq!(call.max_tokens, Some(RouterSettings::default().max_tokens));
    }

    #[tokio::test]
    async fn test_check_providers_deduplicates() {
        let shared = ScriptedAdapter::new("shared", vec![]);
        let down = ScriptedAdapter::new("down", vec![]);
        let router = Router::builder()
            .tier(ComplexityTier::Small, shared.clone() as SharedProvider, MODELS, TIMEOUT)
            .tier(ComplexityTier::Medium, shared.clone() as SharedProvider, MODELS, TIMEOUT)
            .tier(ComplexityTier::High, down.clone() as SharedProvider, MODELS, TIMEOUT)
            .enhancer(Enhancer::new(shared.clone(), "rw", TIMEOUT))
            .build()
            .unwrap();

        let health = router.check_providers().await;
        assert_eq!(health.len(), 2);
        assert_eq!(health[0].provider, "shared");
        assert_eq!(
            health[0].tiers,
            vec![ComplexityTier::Small, ComplexityTier::Medium]
        );
        assert!(health[0].enhancer);
        assert!(health[0].healthy);
        assert!(!health[1].healthy);
    }

    #[test]
    fn test_build_rejects_empty_candidates() {
        let adapter = ScriptedAdapter::new("a", vec![]);
        let err = Router::builder()
            .tier(
                ComplexityTier::Small,
                adapter as SharedProvider,
                Vec::<String>::new(),
                TIMEOUT,
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, RouterError::Config(_)));
    }

    #[test]
    fn test_build_rejects_too_many_candidates() {
        let adapter = ScriptedAdapter::new("a", vec![]);
        let models: Vec<String> = (0..8).map(|i| format!("m{i}")).collect();
        let err = Router::builder()
            .tier(ComplexityTier::Small, adapter as SharedProvider, models, TIMEOUT)
            .build()
            .unwrap_err();
        assert!(matches!(err, RouterError::Config(_)));
    }

    fn bind_all_tiers(config: &mut Config, provider: &str) {
        for tier_config in [
            &mut config.tiers.small,
            &mut config.tiers.medium,
            &mut config.tiers.high,
        ] {
            tier_config.provider = provider.to_string();
        }
    }

    #[tokio::test]
    async fn test_from_config_echo_binding_routes_offline() {
        let mut config = Config::default();
        bind_all_tiers(&mut config, "echo");
        config.enhancer.enabled = false;

        let router = Router::from_config(&config).unwrap();
        assert!(!router.has_enhancer());

        let result = router.route("hi there", RouteOptions::default()).await.unwrap();
        assert_eq!(result.provider_name, "echo");
        assert_eq!(result.text, "hi there");
        assert_eq!(result.signature, config.router.signature);
    }

    #[tokio::test]
    async fn test_from_config_development_missing_key_falls_back_to_echo() {
        if std::env::var(crate::ai::api_key_env("anthropic").unwrap()).is_ok() {
            return;
        }

        let mut config = Config::default();
        bind_all_tiers(&mut config, "anthropic");
        config.providers.anthropic.api_key = None;
        config.enhancer.enabled = false;

        let router = Router::from_config(&config).unwrap();
        let result = router
            .route("Debug this loop", RouteOptions::default())
            .await
            .unwrap();

        assert_eq!(result.tier, ComplexityTier::High);
        assert_eq!(result.provider_name, "echo");
        assert_eq!(result.text, "Debug this loop");
    }

    #[tokio::test]
    async fn test_from_config_development_missing_enhancer_key_disables_enhancer() {
        if std::env::var(crate::ai::api_key_env("openai").unwrap()).is_ok() {
            return;
        }

        let mut config = Config::default();
        bind_all_tiers(&mut config, "echo");
        config.enhancer.enabled = true;
        config.enhancer.provider = "openai".to_string();
        config.providers.openai.api_key = None;

        let router = Router::from_config(&config).unwrap();
        assert!(!router.has_enhancer());

        let result = router
            .route("Debug this loop", RouteOptions::default())
            .await
            .unwrap();
        assert!(!result.enhanced);
        assert_eq!(result.text, "Debug this loop");
    }

    #[test]
    fn test_from_config_production_propagates_adapter_errors() {
        let mut config = Config::default();
        config.environment = crate::config::Environment::Production;
        for creds in [
            &mut config.providers.openai,
            &mut config.providers.huggingface,
            &mut config.providers.anthropic,
        ] {
            creds.api_key = Some("test-key".to_string());
        }
        config.providers.huggingface.api_base = Some("not a url".to_string());

        let err = Router::from_config(&config).unwrap_err();
        assert!(matches!(err, RouterError::Provider(ref e) if e.kind == FailureKind::Fatal));
    }

    #[test]
    fn test_from_config_development_propagates_adapter_errors() {
        let mut config = Config::default();
        bind_all_tiers(&mut config, "openai");
        config.enhancer.enabled = false;
        config.providers.openai.api_key = Some("test-key".to_string());
        config.providers.openai.api_base = Some("ftp://example.com".to_string());

        assert!(Router::from_config(&config).is_err());
    }
}
