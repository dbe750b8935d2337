//! Centralizes the protocol layer between wire JSON and typed events,
//! grounded on the teacher's `Protocol` unit struct
//! (`crates/gameroom/src/protocol.rs`): `encode`/`decode`/`validate`
//! associated functions plus an inline test module.

use crate::inbound::{ClientEvent, Movement};
use crate::outbound::ServerEvent;

#[derive(Debug, Clone)]
pub enum ProtocolError {
    InvalidEvent(String),
    IllegalInput(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEvent(s) => write!(f, "invalid event: {}", s),
            Self::IllegalInput(s) => write!(f, "illegal input: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

pub struct Protocol;

impl Protocol {
    /// Parses a raw client message into a typed event.
    pub fn decode(raw: &str) -> Result<ClientEvent, ProtocolError> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::InvalidEvent(e.to_string()))
    }

    /// Serializes a server event to its wire form.
    pub fn encode(event: &ServerEvent) -> String {
        event.to_json()
    }

    /// Rejects non-finite or absurdly large movement vectors before they
    /// reach the tick (spec.md §4.8: "no rotation is accepted from clients";
    /// this only guards against malformed magnitudes, not direction).
    pub fn validate_movement(movement: Movement) -> Result<Movement, ProtocolError> {
        if !movement.x.is_finite() || !movement.y.is_finite() {
            return Err(ProtocolError::IllegalInput("movement vector is not finite".to_string()));
        }
        Ok(movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_player_input() {
        let raw = r#"{"type":"playerInput","movement":{"x":1.0,"y":0.0},"shoot":false}"#;
        assert!(Protocol::decode(raw).is_ok());
    }

    #[test]
    fn decode_rejects_malformed_json() {
        assert!(Protocol::decode("not json").is_err());
    }

    #[test]
    fn decode_rejects_unknown_event_type() {
        let raw = r#"{"type":"selfDestruct"}"#;
        assert!(Protocol::decode(raw).is_err());
    }

    #[test]
    fn validate_rejects_non_finite_movement() {
        let movement = Movement { x: f32::NAN, y: 0.0 };
        assert!(Protocol::validate_movement(movement).is_err());
    }

    #[test]
    fn validate_accepts_ordinary_movement() {
        let movement = Movement { x: 0.7, y: -0.3 };
        assert!(Protocol::validate_movement(movement).is_ok());
    }
}
