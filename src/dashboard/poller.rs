use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::api::LiveStatsClient;
use crate::models::AggregatedSnapshot;

/// Shared dashboard state. A failed poll keeps the last good snapshot so
/// the scoreboard never blanks out under a transient error; renderers show
/// `error` as a banner on top of the stale data.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub snapshot: Option<AggregatedSnapshot>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Polls the aggregation proxy on a fixed cadence and publishes results
/// into shared state for renderers to read
pub struct DashboardPoller {
    client: LiveStatsClient,
    state: Arc<RwLock<DashboardState>>,
    poll_interval: Duration,
    fetch_gate: Mutex<()>,
}

impl DashboardPoller {
    pub fn new(client: LiveStatsClient, poll_interval_secs: u64) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(DashboardState::default())),
            poll_interval: Duration::from_secs(poll_interval_secs),
            fetch_gate: Mutex::new(()),
        }
    }

    /// Read handle for renderers; the poller keeps the write side
    pub fn state(&self) -> Arc<RwLock<DashboardState>> {
        Arc::clone(&self.state)
    }

    /// Run the poll loop until `shutdown` fires. The first fetch happens
    /// immediately; ticks that land while a slow fetch is still in flight
    /// are skipped rather than queued.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Dashboard poller started (interval: {:?})",
            self.poll_interval
        );

        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => self.tick().await,
                _ = shutdown.changed() => {
                    info!("Dashboard poller stopping");
                    return;
                }
            }
        }
    }

    async fn tick(&self) {
        let Ok(_guard) = self.fetch_gate.try_lock() else {
            debug!("Previous fetch still in flight, skipping tick");
            return;
        };
        self.fetch_once().await;
    }

    /// Fetch immediately, outside the poll cadence. Waits for any fetch
    /// already in flight instead of skipping, so a manual retry from the
    /// error banner always produces a fresh attempt.
    pub async fn refresh_now(&self) {
        let _guard = self.fetch_gate.lock().await;
        self.fetch_once().await;
    }

    async fn fetch_once(&self) {
        match self.client.get_live_stats().await {
            Ok(snapshot) => {
                debug!("Fetched snapshot with {} players", snapshot.stats.len());
                let mut state = self.state.write().await;
                state.snapshot = Some(snapshot);
                state.error = None;
                state.last_updated = Some(Utc::now());
            }
            Err(err) => {
                error!("Live stats fetch failed: {}", err);
                let mut state = self.state.write().await;
                // Keep the stale snapshot and its timestamp
                state.error = Some(err.to_string());
            }
        }
    }
}
