//! Upgrade pickup entity, spec.md §3/§4.4/§4.7.

use serde::{Deserialize, Serialize};
use tanks_core::config::UpgradeType;
use tanks_core::{Bounds, Id, Vector2};

pub struct Upgrade;
pub type UpgradeId = Id<Upgrade>;

pub const UPGRADE_RADIUS: f32 = 14.0;
pub const UPGRADE_PICKUP_PAD: f32 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: UpgradeId,
    pub kind: UpgradeType,
    pub position: Vector2,
    pub rotation: f32,
    pub collected: bool,
    pub bounds: Bounds,
}

impl Upgrade {
    pub fn spawn(kind: UpgradeType, position: Vector2, rotation: f32) -> Self {
        Self {
            id: UpgradeId::new(),
            kind,
            position,
            rotation,
            collected: false,
            bounds: Bounds::centered(position, UPGRADE_RADIUS * 2.0, UPGRADE_RADIUS * 2.0),
        }
    }
}
