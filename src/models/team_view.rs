use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Hierarchical team/squad composition for both factions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamView {
    /// Allied roster; empty when the faction has no players
    #[serde(default)]
    pub allies: TeamRoster,

    /// Axis roster; empty when the faction has no players
    #[serde(default)]
    pub axis: TeamRoster,
}

/// One faction's roster
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    /// Commander slot, if filled
    #[serde(default)]
    pub commander: Option<SquadMember>,

    /// Squads keyed by squad name (e.g. "able", "baker")
    #[serde(default)]
    pub squads: HashMap<String, Squad>,

    /// Players not assigned to any squad
    #[serde(default)]
    pub unassigned: Vec<SquadMember>,
}

/// A named unit within a faction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Squad {
    /// Unit type
    #[serde(rename = "type", default)]
    pub squad_type: SquadType,

    /// Squad membership
    #[serde(default)]
    pub players: Vec<SquadMember>,
}

/// Squad unit type. Anything the upstream adds later decodes as `Unknown`
/// instead of failing the whole aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SquadType {
    #[default]
    Infantry,
    Armor,
    Recon,
    #[serde(other)]
    Unknown,
}

impl SquadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SquadType::Infantry => "infantry",
            SquadType::Armor => "armor",
            SquadType::Recon => "recon",
            SquadType::Unknown => "unknown",
        }
    }
}

/// A player as listed in the team view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadMember {
    /// Display name
    pub name: String,

    /// Stable platform identifier; may be absent, and may disagree with the
    /// identifier the live stats use for the same player
    #[serde(default, alias = "steam_id_64")]
    pub player_id: Option<String>,

    /// In-game role (e.g. "officer", "rifleman", "tankcommander")
    #[serde(default)]
    pub role: Option<String>,

    /// Player level
    #[serde(default)]
    pub level: Option<u32>,

    /// VIP flag
    #[serde(default)]
    pub is_vip: Option<bool>,

    /// Selected loadout name
    #[serde(default)]
    pub loadout: Option<String>,
}

impl TeamRoster {
    /// Number of players in the roster, commander included
    pub fn player_count(&self) -> usize {
        self.commander.is_some() as usize
            + self.squads.values().map(|s| s.players.len()).sum::<usize>()
            + self.unassigned.len()
    }
}
