use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{GameState, PlayerCombatStat, TeamView};

/// The three CRCON endpoints the proxy aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Gamestate,
    LiveStats,
    TeamView,
}

impl Endpoint {
    /// API route name on the CRCON server
    fn path(&self) -> &'static str {
        match self {
            Endpoint::Gamestate => "get_gamestate",
            Endpoint::LiveStats => "get_live_game_stats",
            Endpoint::TeamView => "get_team_view",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Gamestate => "Gamestate",
            Endpoint::LiveStats => "Live Stats",
            Endpoint::TeamView => "Team View",
        };
        f.write_str(name)
    }
}

/// Errors raised by a single upstream call. No retries happen at this
/// layer; the polling client decides when to try again.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-2xx status
    #[error("{endpoint} endpoint returned HTTP {status}")]
    Http { endpoint: Endpoint, status: u16 },

    /// Upstream answered 200 but flagged the envelope as failed
    #[error("{endpoint} endpoint reported failure: {message}")]
    Logical { endpoint: Endpoint, message: String },

    /// Network-level failure: refused, DNS, timeout
    #[error("{endpoint} endpoint unreachable: {message}")]
    Unreachable { endpoint: Endpoint, message: String },

    /// Body did not match the documented envelope shape
    #[error("{endpoint} endpoint returned an unexpected body: {message}")]
    Decode { endpoint: Endpoint, message: String },
}

impl UpstreamError {
    /// Which endpoint produced this error
    pub fn endpoint(&self) -> Endpoint {
        match self {
            UpstreamError::Http { endpoint, .. }
            | UpstreamError::Logical { endpoint, .. }
            | UpstreamError::Unreachable { endpoint, .. }
            | UpstreamError::Decode { endpoint, .. } => *endpoint,
        }
    }
}

/// CRCON wraps every payload in this envelope. `failed` is the mandatory
/// discriminant: a body without it does not decode.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    result: Option<T>,
    failed: bool,
    #[serde(default)]
    error: Option<String>,
}

/// The live-stats result nests the player list one level down
#[derive(Debug, Deserialize)]
struct LiveGameStats {
    stats: Vec<PlayerCombatStat>,
}

/// Client for the CRCON game-server control API
pub struct CrconClient {
    client: Client,
    base_url: String,
    api_token: String,
    gamestate_via_post: bool,
}

impl CrconClient {
    /// Create a new client. `gamestate_via_post` switches the gamestate
    /// call to POST with an empty body for CRCON versions that reject GET
    /// on that route.
    pub fn new(
        base_url: &str,
        api_token: &str,
        timeout: Duration,
        gamestate_via_post: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build CRCON HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            gamestate_via_post,
        })
    }

    /// Fetch the current match state
    pub async fn get_gamestate(&self) -> Result<GameState, UpstreamError> {
        self.fetch(Endpoint::Gamestate).await
    }

    /// Fetch live per-player statistics for the current match
    pub async fn get_live_game_stats(&self) -> Result<Vec<PlayerCombatStat>, UpstreamError> {
        let live: LiveGameStats = self.fetch(Endpoint::LiveStats).await?;
        debug!("Live stats returned {} players", live.stats.len());
        Ok(live.stats)
    }

    /// Fetch the squad/team composition for both factions
    pub async fn get_team_view(&self) -> Result<TeamView, UpstreamError> {
        self.fetch(Endpoint::TeamView).await
    }

    /// Issue one authenticated, cache-defeating call and unwrap its envelope
    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, UpstreamError> {
        let url = format!("{}/api/{}", self.base_url, endpoint.path());
        debug!("Fetching {} from {}", endpoint, url);

        let request = if endpoint == Endpoint::Gamestate && self.gamestate_via_post {
            self.client.post(&url)
        } else {
            self.client.get(&url)
        };

        let response = request
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable {
                endpoint,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Http {
                endpoint,
                status: status.as_u16(),
            });
        }

        let envelope: ApiEnvelope<T> =
            response.json().await.map_err(|e| UpstreamError::Decode {
                endpoint,
                message: e.to_string(),
            })?;

        unwrap_envelope(envelope, endpoint)
    }
}

/// Validate the envelope discriminant and extract the payload
fn unwrap_envelope<T>(envelope: ApiEnvelope<T>, endpoint: Endpoint) -> Result<T, UpstreamError> {
    if envelope.failed {
        return Err(UpstreamError::Logical {
            endpoint,
            message: envelope
                .error
                .unwrap_or_else(|| "upstream reported failure without a message".to_string()),
        });
    }

    envelope.result.ok_or_else(|| UpstreamError::Decode {
        endpoint,
        message: "envelope has no result despite failed=false".to_string(),
    })
}
