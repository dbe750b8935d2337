//! Player descriptor, one-to-one with a Tank by id, spec.md §3.

use serde::{Deserialize, Serialize};
use tanks_core::config::{AiDifficulty, Team};

use super::tank::TankId;

/// Players share the tank id space: `players[id] <=> tanks[id]` (spec.md §3
/// invariant), so no separate `Id<Player>` type exists.
pub type PlayerId = TankId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiMetadata {
    pub level: AiDifficulty,
    pub strategy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub callname: String,
    pub tank_color: String,
    pub tank_camo: String,
    pub team_name: String,
    pub team_color: String,
    pub last_update_ms: f64,
    pub ai: Option<AiMetadata>,
}

impl Player {
    pub fn new(id: PlayerId, callname: String, tank_color: String, tank_camo: String, team: Team, now_ms: f64) -> Self {
        Self {
            id,
            callname,
            tank_color,
            tank_camo,
            team_name: team.name.to_string(),
            team_color: team.color.to_string(),
            last_update_ms: now_ms,
            ai: None,
        }
    }
}
