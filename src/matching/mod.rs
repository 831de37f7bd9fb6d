pub mod team_resolver;

pub use team_resolver::{find_stat, member_matches, resolve_team, ResolvedTeam};
