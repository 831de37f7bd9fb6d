use serde::{Deserialize, Serialize};

/// Snapshot of match progress from the gamestate endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Allied sector score
    pub allied_score: u32,

    /// Axis sector score
    pub axis_score: u32,

    /// Remaining match time, formatted "H:MM:SS"
    pub time_remaining: String,

    /// Map currently being played
    pub current_map: MapInfo,

    /// Players currently on the allied side
    pub num_allied_players: u32,

    /// Players currently on the axis side
    pub num_axis_players: u32,
}

/// Map descriptor. Older CRCON builds send a bare map name, newer ones an
/// object carrying a display name alongside the internal one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapInfo {
    Detailed {
        name: String,
        #[serde(default)]
        pretty_name: Option<String>,
    },
    Name(String),
}

impl MapInfo {
    /// Internal map name (e.g. "stmariedumont_warfare")
    pub fn name(&self) -> &str {
        match self {
            MapInfo::Detailed { name, .. } => name,
            MapInfo::Name(name) => name,
        }
    }

    /// Human-readable map name, falling back to the internal name
    pub fn pretty_name(&self) -> &str {
        match self {
            MapInfo::Detailed {
                pretty_name: Some(pretty),
                ..
            } => pretty,
            MapInfo::Detailed { name, .. } => name,
            MapInfo::Name(name) => name,
        }
    }
}

impl GameState {
    /// Total players on the server across both sides
    pub fn total_players(&self) -> u32 {
        self.num_allied_players + self.num_axis_players
    }
}
