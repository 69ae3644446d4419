//! HTTP plumbing shared by the network adapters.
//!
//! Client construction, endpoint validation, and the send → classify →
//! decode sequence every adapter runs.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::network;
use crate::types::{ErrorClassifier, ProviderError};

/// Longest upstream error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 512;

pub(super) fn build_client(
    timeout_secs: u64,
    provider: &str,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
        .build()
        .map_err(|e| {
            ProviderError::fatal(format!("Failed to create HTTP client: {}", e)).provider(provider)
        })
}

/// Validate an endpoint base URL (http/https only) and strip trailing slash
pub(super) fn validate_endpoint(endpoint: &str, provider: &str) -> Result<String, ProviderError> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        ProviderError::fatal(format!("Invalid endpoint URL '{}': {}", endpoint, e))
            .provider(provider)
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProviderError::fatal(format!(
            "Endpoint must use http or https scheme, got: {}",
            url.scheme()
        ))
        .provider(provider));
    }

    if url.scheme() == "http"
        && let Some(host) = url.host_str()
        && !matches!(host, "localhost" | "127.0.0.1" | "::1")
    {
        warn!(
            provider,
            host, "Endpoint uses plain http on a non-local host; credentials travel unencrypted"
        );
    }

    let mut result = url.to_string();
    while result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

/// Send `body` as JSON and decode a success response into `T`.
///
/// Non-2xx statuses go through [`ErrorClassifier::classify_http_status`];
/// a body that does not match `T` is a fatal malformed response.
pub(super) async fn send_json<B, T>(
    request: reqwest::RequestBuilder,
    body: &B,
    provider: &str,
) -> Result<T, ProviderError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| ErrorClassifier::classify_transport(&e, provider))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        return Err(ErrorClassifier::classify_http_status(
            status.as_u16(),
            &format!("{} API error ({}): {}", provider, status, body),
            provider,
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ErrorClassifier::classify_transport(&e, provider))?;

    debug!(provider, bytes = bytes.len(), "Received response body");

    serde_json::from_slice(&bytes).map_err(|e| ErrorClassifier::classify_decode(e, provider))
}
