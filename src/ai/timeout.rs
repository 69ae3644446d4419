//! Timeout Helpers
//!
//! Every upstream call the router makes is bounded:
//! - adapter invocations via [`invoke_with_timeout`], where an elapsed
//!   deadline aborts the attempt and becomes a `Retryable` failure
//! - other async operations via [`with_timeout`] / [`with_timeout_map`]

use std::future::Future;
use std::time::Duration;

use crate::ai::provider::{AdapterResult, GenerationRequest, ProviderAdapter, ProviderError};
use crate::types::{Result, RouterError};

/// Invoke `adapter` once, aborting after `timeout`.
///
/// The in-flight request future is dropped on timeout, which cancels the
/// underlying HTTP call.
pub async fn invoke_with_timeout(
    adapter: &dyn ProviderAdapter,
    request: &GenerationRequest,
    timeout: Duration,
) -> AdapterResult {
    match tokio::time::timeout(timeout, adapter.invoke(request)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::timed_out(adapter.name(), timeout)),
    }
}

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(RouterError::timeout(operation_name, timeout)),
    }
}

/// Execute an async operation with a timeout, wrapping a non-Result output
pub async fn with_timeout_map<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => Ok(result),
        Err(_) => Err(RouterError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::EchoAdapter;
    use crate::types::FailureKind;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, RouterError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, RouterError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), RouterError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_with_timeout_map() {
        let result = with_timeout_map(Duration::from_secs(1), async { true }, "probe").await;
        assert!(result.unwrap());
    }

    #[tokio::test]
    async fn test_invoke_timeout_is_retryable() {
        let slow = EchoAdapter::with_delay(Duration::from_secs(5));
        let request = GenerationRequest::new("hello", "m");

        let err = invoke_with_timeout(&slow, &request, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Retryable);
        assert_eq!(err.provider.as_deref(), Some("echo"));
    }

    #[tokio::test]
    async fn test_invoke_within_deadline() {
        let fast = EchoAdapter::new();
        let request = GenerationRequest::new("hello", "m");
        let completion = invoke_with_timeout(&fast, &request, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(completion.text, "hello");
    }
}
