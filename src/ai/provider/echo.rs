//! Echo Adapter
//!
//! Offline adapter that returns the prompt unchanged. Registered only in
//! non-production runs, in place of a provider whose credentials are
//! missing, so a development setup routes end to end without keys.

use async_trait::async_trait;
use std::time::Duration;

use super::{AdapterResult, Completion, GenerationRequest, ProviderAdapter};

const PROVIDER_NAME: &str = "echo";

#[derive(Debug, Default)]
pub struct EchoAdapter {
    /// Simulated upstream latency
    delay: Duration,
}

impl EchoAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ProviderAdapter for EchoAdapter {
    async fn invoke(&self, request: &GenerationRequest) -> AdapterResult {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(Completion {
            text: request.prompt.clone(),
            provider_name: PROVIDER_NAME.to_string(),
            model_id: request.model_id.clone(),
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn health_check(&self) -> bool {
        true
    }
}
