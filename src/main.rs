use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frontline_stats::api::CrconClient;
use frontline_stats::config::Config;
use frontline_stats::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frontline_stats=info,tower_http=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting frontline-stats proxy");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    // Upstream CRCON client
    let crcon = Arc::new(CrconClient::new(
        &config.crcon_base_url,
        &config.crcon_api_token,
        Duration::from_secs(config.upstream_timeout_secs),
        config.crcon_gamestate_post,
    )?);
    info!("CRCON client initialized for {}", config.crcon_base_url);

    server::run(&config.bind_addr, crcon).await
}
