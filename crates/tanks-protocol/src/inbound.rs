//! Client → server events, spec.md §6. Tagged the way the teacher's
//! `ServerMessage` is tagged, mirrored onto the inbound direction.

use serde::{Deserialize, Serialize};
use tanks_core::config::{AiDifficulty, AttributeLimits, Settings, SettingsPatch};
use tanks_core::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub x: f32,
    pub y: f32,
}

impl From<Movement> for Vector2 {
    fn from(m: Movement) -> Self {
        Vector2::new(m.x, m.y)
    }
}

/// `{attributeName, 'min'|'max', value}` from `setPlayerAttributeLimit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitBound {
    Min,
    Max,
}

/// Partial per-attribute overwrite from `setPlayerAttributes`: absent fields
/// are left untouched on every non-AI tank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributesPatch {
    pub health: Option<f32>,
    pub speed: Option<f32>,
    pub gasoline: Option<f32>,
    pub rotation: Option<f32>,
    pub ammunition: Option<f32>,
    pub kinetics: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    Join {
        callname: String,
        tank_color: String,
        tank_camo: String,
        team_name: String,
    },
    PlayerInput {
        movement: Movement,
        shoot: bool,
    },
    ToggleAi {
        enabled: bool,
    },
    ApplyAiSettings {
        ai_count: u32,
        ai_level: AiDifficulty,
    },
    ResetGame,
    ChangeTerrainMap {
        map_name: String,
    },
    UpdateSettings(SettingsPatch),
    ApplySettings(SettingsPatch),
    SetPlayerAttributes(AttributesPatch),
    SetPlayerAttributeLimit {
        attribute_name: String,
        bound: LimitBound,
        value: f32,
    },
    RequestGameState,
    RequestPlayerState,
}

impl ClientEvent {
    /// Applies the settings half of this event in place, returning `true` if
    /// the event was a settings/attribute-limit mutation this function
    /// handled. Everything else (join, input, admin toggles) is the caller's
    /// responsibility — this only centralizes the two shapes that both read
    /// as "merge a patch into `Settings`".
    pub fn apply_settings_patch(self, settings: &mut Settings) -> Option<ClientEvent> {
        match self {
            ClientEvent::UpdateSettings(patch) | ClientEvent::ApplySettings(patch) => {
                settings.apply_patch(patch);
                None
            }
            other => Some(other),
        }
    }

    /// Merges `setPlayerAttributeLimit` into `limits`, returning `false` for
    /// an unrecognized attribute name (spec.md §7 Configuration error).
    pub fn apply_attribute_limit(attribute_name: &str, bound: LimitBound, value: f32, limits: &mut AttributeLimits) -> bool {
        use tanks_core::config::Attribute;
        let attr = match attribute_name.to_ascii_lowercase().as_str() {
            "health" => Attribute::Health,
            "speed" => Attribute::Speed,
            "gasoline" => Attribute::Gasoline,
            "rotation" => Attribute::Rotation,
            "ammunition" => Attribute::Ammunition,
            "kinetics" => Attribute::Kinetics,
            _ => return false,
        };
        let mut limit = limits.get(attr);
        match bound {
            LimitBound::Min => limit.min = value,
            LimitBound::Max => limit.max = value,
        }
        limits.0.insert(attr, limit);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_round_trips_through_json() {
        let json = r#"{"type":"join","callname":"Ace","tankColor":"#fff","tankCamo":"digital","teamName":"NATO"}"#;
        let event: ClientEvent = serde_json::from_str(json).expect("valid join");
        match event {
            ClientEvent::Join { callname, team_name, .. } => {
                assert_eq!(callname, "Ace");
                assert_eq!(team_name, "NATO");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn player_input_decodes_movement_vector() {
        let json = r#"{"type":"playerInput","movement":{"x":0.5,"y":-0.5},"shoot":true}"#;
        let event: ClientEvent = serde_json::from_str(json).expect("valid input");
        match event {
            ClientEvent::PlayerInput { movement, shoot } => {
                assert_eq!(movement, Movement { x: 0.5, y: -0.5 });
                assert!(shoot);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_attribute_name_is_rejected() {
        let mut limits = AttributeLimits::default();
        assert!(!ClientEvent::apply_attribute_limit("warpdrive", LimitBound::Max, 10.0, &mut limits));
    }

    #[test]
    fn known_attribute_limit_updates_in_place() {
        let mut limits = AttributeLimits::default();
        assert!(ClientEvent::apply_attribute_limit("speed", LimitBound::Max, 500.0, &mut limits));
        assert_eq!(limits.get(tanks_core::config::Attribute::Speed).max, 500.0);
    }
}
