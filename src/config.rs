use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the CRCON admin tool, without the /api suffix
    pub crcon_base_url: String,

    /// Bearer token for the CRCON API
    pub crcon_api_token: String,

    /// Send get_gamestate as POST for CRCON builds that reject GET on it
    pub crcon_gamestate_post: bool,

    /// Address the aggregation proxy listens on
    pub bind_addr: String,

    /// Timeout in seconds for each upstream CRCON request
    pub upstream_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            crcon_base_url: env::var("CRCON_BASE_URL")
                .context("CRCON_BASE_URL must be set (e.g. https://rcon.example.org)")?,

            crcon_api_token: env::var("CRCON_API_TOKEN")
                .context("CRCON_API_TOKEN must be set")?,

            crcon_gamestate_post: env::var("CRCON_GAMESTATE_POST")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),

            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("UPSTREAM_TIMEOUT_SECS must be a valid number")?,
        })
    }
}
