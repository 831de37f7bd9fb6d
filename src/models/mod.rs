pub mod gamestate;
pub mod player_stats;
pub mod snapshot;
pub mod team_view;

pub use gamestate::{GameState, MapInfo};
pub use player_stats::PlayerCombatStat;
pub use snapshot::{AggregatedSnapshot, SnapshotMeta};
pub use team_view::{Squad, SquadMember, SquadType, TeamRoster, TeamView};
