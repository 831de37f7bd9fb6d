use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::AggregatedSnapshot;

/// Guards the dashboard against a wedged proxy; the in-flight tick guard
/// would otherwise never release.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced to the dashboard. The `Display` text is written to be
/// shown directly in the error banner.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Proxy not reachable at all
    #[error("Could not reach the stats proxy: {message}")]
    Unreachable { message: String },

    /// Proxy answered non-2xx without a usable error body
    #[error("Stats proxy returned HTTP {status}")]
    Http { status: u16 },

    /// Proxy (or upstream, relayed by the proxy) reported a failure message
    #[error("{message}")]
    Proxy { message: String },

    /// Response body did not match the snapshot contract
    #[error("Stats proxy returned an unexpected body: {message}")]
    Decode { message: String },
}

/// Structured error body emitted by the proxy on failure
#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Client for the aggregation proxy. Pure fetch-and-normalize: no caching,
/// no retries, no backoff.
pub struct LiveStatsClient {
    client: Client,
    endpoint_url: String,
}

impl LiveStatsClient {
    /// Create a client for a proxy at `base_url` (scheme + host + port)
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build live stats HTTP client")?;

        Ok(Self {
            client,
            endpoint_url: format!("{}/api/live-stats", base_url.trim_end_matches('/')),
        })
    }

    /// Fetch one fresh snapshot from the proxy.
    ///
    /// A millisecond timestamp query parameter plus no-cache request headers
    /// defeat any intermediate cache that would otherwise serve a stale
    /// response despite the proxy's own no-store headers.
    pub async fn get_live_stats(&self) -> Result<AggregatedSnapshot, FetchError> {
        let response = self
            .client
            .get(&self.endpoint_url)
            .query(&[("_", Utc::now().timestamp_millis())])
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
            .send()
            .await
            .map_err(|e| FetchError::Unreachable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the proxy's own message when the body carries one
            if let Ok(body) = response.json::<ProxyErrorBody>().await {
                if let Some(message) = body.error {
                    return Err(FetchError::Proxy { message });
                }
            }
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value =
            response.json().await.map_err(|e| FetchError::Decode {
                message: e.to_string(),
            })?;

        // Honor the upstream failed:true convention even under HTTP 200
        if body.get("failed").and_then(|v| v.as_bool()).unwrap_or(false) {
            let message = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("The game API reported an error")
                .to_string();
            return Err(FetchError::Proxy { message });
        }

        let snapshot: AggregatedSnapshot =
            serde_json::from_value(body).map_err(|e| FetchError::Decode {
                message: e.to_string(),
            })?;

        debug!(
            "Snapshot fetched: {} players, assembled at {}",
            snapshot.stats.len(),
            snapshot.meta.timestamp
        );

        Ok(snapshot)
    }
}
