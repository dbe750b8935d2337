//! AI controller, spec.md §4.6. One controller per AI tank: a cheap
//! execution path runs every step, a slower decision path re-evaluates the
//! current target on a difficulty-tuned interval. Not async — the teacher's
//! `Player` trait shape (`async fn decide(&mut self, recall) -> Action`)
//! informed the split between a "decide" and an "act" entrypoint, but AI
//! here runs synchronously inside the tick with no I/O.

mod decision;
mod execution;

pub use decision::decide;
pub use execution::execute;

use tanks_core::config::AiDifficulty;
use tanks_core::{Id, Vector2};

use crate::entities::{TankId, UpgradeId};

pub struct AiControllerMarker;
pub type AiControllerId = Id<AiControllerMarker>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Enemy,
    Upgrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    pub tank_id: Option<TankId>,
    pub upgrade_id: Option<UpgradeId>,
}

pub struct AiController {
    pub tank_id: TankId,
    pub difficulty: AiDifficulty,
    pub target: Option<Target>,
    pub last_decision_ms: f64,
    pub last_shot_ms: f64,
    pub wander_waypoint: Option<Vector2>,
    pub last_stuck_check_ms: f64,
    pub last_stuck_check_position: Vector2,
}

impl AiController {
    pub fn new(tank_id: TankId, difficulty: AiDifficulty, now_ms: f64, position: Vector2) -> Self {
        Self {
            tank_id,
            difficulty,
            target: None,
            last_decision_ms: now_ms,
            last_shot_ms: 0.0,
            wander_waypoint: None,
            last_stuck_check_ms: now_ms,
            last_stuck_check_position: position,
        }
    }

    pub fn clear_target(&mut self) {
        self.target = None;
        self.wander_waypoint = None;
    }
}

/// What the AI wants to do this step — fed back into the same
/// `target_velocity`/fire-attempt contract a human player's input uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Intent {
    pub target_velocity: Vector2,
    pub shoot: bool,
}
