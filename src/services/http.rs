use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Build the shared reqwest client used by every polled endpoint
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))
}

/// GET `url` with `query` and decode the JSON body into `T`
///
/// Non-2xx answers become `Network` errors carrying the body text; undecodable bodies
/// become `Parse` errors. Field-level validation is left to the caller.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T> {
    debug!(url, ?query, "GET");

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| AppError::Network(format!("Request failed: {} (url: {})", e, url)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        return Err(AppError::Network(format!(
            "{} returned error status {}: {}",
            url, status, body
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;

    serde_json::from_str(&body)
        .map_err(|e| AppError::Parse(format!("Failed to parse JSON from {}: {}", url, e)))
}
