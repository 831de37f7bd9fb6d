pub mod crcon;
pub mod live_stats;

pub use crcon::{CrconClient, Endpoint, UpstreamError};
pub use live_stats::{FetchError, LiveStatsClient};
