use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{PlayerCombatStat, SquadMember, TeamRoster, TeamView};

/// Which faction a player's statistics belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTeam {
    Allies,
    Axis,
    /// Present in the flat stats but in neither roster
    Unresolved,
}

impl ResolvedTeam {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedTeam::Allies => "allies",
            ResolvedTeam::Axis => "axis",
            ResolvedTeam::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for ResolvedTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a player's faction by cross-referencing the team view: commander
/// slot, every squad's member list, then the unassigned list, allies before
/// axis. A player found in neither roster is `Unresolved`, never an error.
pub fn resolve_team(stat: &PlayerCombatStat, view: &TeamView) -> ResolvedTeam {
    if roster_contains(&view.allies, stat) {
        ResolvedTeam::Allies
    } else if roster_contains(&view.axis, stat) {
        ResolvedTeam::Axis
    } else {
        ResolvedTeam::Unresolved
    }
}

/// Reverse join: the combat stat belonging to a rostered player, if the
/// flat list has one. Used by the squad view.
pub fn find_stat<'a>(
    member: &SquadMember,
    stats: &'a [PlayerCombatStat],
) -> Option<&'a PlayerCombatStat> {
    stats
        .iter()
        .find(|stat| member_matches(member, stat.player_id.as_deref(), &stat.player))
}

/// The single identity predicate for joining the flat stats against the
/// team view. Identifier equality wins; the case-insensitive name fallback
/// is best-effort, because the upstream sources are not guaranteed to use
/// identical identifiers for the same player.
pub fn member_matches(member: &SquadMember, player_id: Option<&str>, name: &str) -> bool {
    if let (Some(member_id), Some(stat_id)) = (member.player_id.as_deref(), player_id) {
        if member_id == stat_id {
            return true;
        }
    }

    member.name.to_lowercase() == name.to_lowercase()
}

fn roster_contains(roster: &TeamRoster, stat: &PlayerCombatStat) -> bool {
    roster_members(roster).any(|m| member_matches(m, stat.player_id.as_deref(), &stat.player))
}

/// All players in a roster: commander, squads, unassigned
pub fn roster_members(roster: &TeamRoster) -> impl Iterator<Item = &SquadMember> {
    roster
        .commander
        .iter()
        .chain(roster.squads.values().flat_map(|s| s.players.iter()))
        .chain(roster.unassigned.iter())
}
