pub mod api;
pub mod config;
pub mod dashboard;
pub mod matching;
pub mod models;
pub mod server;

pub use api::{CrconClient, FetchError, LiveStatsClient, UpstreamError};
pub use config::Config;
pub use models::AggregatedSnapshot;
