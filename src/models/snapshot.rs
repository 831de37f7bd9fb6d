use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GameState, PlayerCombatStat, TeamView};

/// One complete, internally consistent aggregation of game state, player
/// stats and team composition. Serialized by the proxy and deserialized by
/// the client data service as the same type, so the boundary cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedSnapshot {
    /// Match progress
    pub gamestate: GameState,

    /// Flat per-player statistics
    pub stats: Vec<PlayerCombatStat>,

    /// Nested squad/team composition
    pub team_view: TeamView,

    /// Assembly metadata
    pub meta: SnapshotMeta,
}

/// Server-side assembly metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// When the proxy assembled this snapshot
    pub timestamp: DateTime<Utc>,
}

impl AggregatedSnapshot {
    pub fn new(gamestate: GameState, stats: Vec<PlayerCombatStat>, team_view: TeamView) -> Self {
        Self {
            gamestate,
            stats,
            team_view,
            meta: SnapshotMeta {
                timestamp: Utc::now(),
            },
        }
    }
}
