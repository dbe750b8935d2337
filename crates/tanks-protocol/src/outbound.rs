//! Server → client events, spec.md §6. Mirrors the teacher's
//! `ServerMessage` shape: a tagged enum with per-variant constructors and a
//! `to_json` convenience for the transport layer.

use serde::Serialize;
use tanks_core::config::AiDifficulty;
use tanks_engine::entities::TankId;

use crate::snapshot::{GameStateMessage, PlayerStateMessage};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    Joined {
        tank_id: TankId,
        team_name: String,
        team_color: String,
    },
    Reconnected {
        tank_id: TankId,
    },
    GameState(GameStateMessage),
    PlayerState(PlayerStateMessage),
    AiAdded {
        tank_id: TankId,
        level: AiDifficulty,
    },
    AiRemoved {
        tank_id: TankId,
    },
    GameReset,
    TerrainMapChanged {
        map_id: String,
    },
    BalanceSettings(tanks_core::config::Settings),
    PlayerLeft {
        tank_id: TankId,
    },
    DamageFeedback {
        tank_id: TankId,
        shooter_id: TankId,
        fatal: bool,
    },
    SettingsApplied {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl ServerEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server event")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_applied_omits_absent_error() {
        let event = ServerEvent::SettingsApplied { success: true, error: None };
        assert!(!event.to_json().contains("error"));
    }

    #[test]
    fn joined_tags_its_variant() {
        let event = ServerEvent::Joined {
            tank_id: TankId::new(),
            team_name: "NATO".to_string(),
            team_color: "#4a90d9".to_string(),
        };
        assert!(event.to_json().contains("\"type\":\"joined\""));
    }
}
