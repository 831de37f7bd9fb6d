use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-player statistics for the current match, as reported by the live
/// stats endpoint. Core counters are required: a payload that drops them is
/// treated as malformed rather than silently zeroed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCombatStat {
    /// Display name
    pub player: String,

    /// Stable platform identifier (17-digit string on Steam). Not always
    /// present, and not guaranteed to match the team view's identifier for
    /// the same player. Older CRCON releases call this `steam_id_64`.
    #[serde(default, alias = "steam_id_64")]
    pub player_id: Option<String>,

    /// Kill count
    pub kills: u32,

    /// Death count
    pub deaths: u32,

    /// Composite combat score
    pub combat: u32,

    /// Offense sub-score
    #[serde(alias = "offence")]
    pub offense: u32,

    /// Defense sub-score
    #[serde(alias = "defence")]
    pub defense: u32,

    /// Support sub-score
    pub support: u32,

    /// Current kill streak
    pub kills_streak: u32,

    /// Current death streak
    #[serde(alias = "death_streak")]
    pub deaths_streak: u32,

    /// Kill/death ratio as computed upstream
    #[serde(default)]
    pub kill_death_ratio: f64,

    /// Time spent in the match, in seconds
    #[serde(default)]
    pub time_seconds: u64,

    /// Longest single life, in seconds
    #[serde(default)]
    pub longest_life_secs: u64,

    /// Kills per weapon name
    #[serde(default)]
    pub weapons: HashMap<String, u32>,

    /// Deaths per cause (weapon that killed this player)
    #[serde(default)]
    pub death_by: HashMap<String, u32>,

    /// Kills per victim name
    #[serde(default)]
    pub most_killed: HashMap<String, u32>,
}
