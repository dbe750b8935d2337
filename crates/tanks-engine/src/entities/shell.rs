//! Shell (projectile) entity, spec.md §3/§4.2/§4.4.

use serde::{Deserialize, Serialize};
use tanks_core::config::{ARENA_HEIGHT, ARENA_WIDTH};
use tanks_core::{Bounds, Id, Vector2};

use super::tank::TankId;

pub struct Shell;
pub type ShellId = Id<Shell>;

pub const SHELL_SIZE: f32 = 6.0;
pub const SHELL_MUZZLE_OFFSET: f32 = 20.0;
pub const FAST_SHELL_THRESHOLD: f32 = 10.0;
pub const ANTI_TUNNELING_RADIUS: f32 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub id: ShellId,
    pub shooter_id: TankId,
    pub position: Vector2,
    pub velocity: Vector2,
    pub created_at_ms: f64,
    pub shooter_immunity_until: f64,
    pub bounds: Bounds,
}

impl Shell {
    pub fn fire(shooter_id: TankId, muzzle_position: Vector2, velocity: Vector2, now_ms: f64, immunity_until: f64) -> Self {
        Self {
            id: ShellId::new(),
            shooter_id,
            position: muzzle_position,
            velocity,
            created_at_ms: now_ms,
            shooter_immunity_until: immunity_until,
            bounds: Bounds::centered(muzzle_position, SHELL_SIZE, SHELL_SIZE),
        }
    }

    /// Re-initializes a pooled shell in place for a fresh shot, minting a
    /// new id so in-flight client references to the recycled slot's
    /// previous occupant can't be confused with this one (spec.md §5: pool
    /// release is mandatory on destruction, but identity is still per-shot).
    pub fn recycle(&mut self, shooter_id: TankId, muzzle_position: Vector2, velocity: Vector2, now_ms: f64, immunity_until: f64) {
        self.id = ShellId::new();
        self.shooter_id = shooter_id;
        self.position = muzzle_position;
        self.velocity = velocity;
        self.created_at_ms = now_ms;
        self.shooter_immunity_until = immunity_until;
        self.bounds = Bounds::centered(muzzle_position, SHELL_SIZE, SHELL_SIZE);
    }

    pub fn integrate(&mut self, delta_ms: f32) {
        self.position.add_assign_scaled(self.velocity, delta_ms / 1000.0);
        self.bounds = Bounds::centered(self.position, SHELL_SIZE, SHELL_SIZE);
    }

    pub fn is_fast(&self) -> bool {
        self.velocity.magnitude() > FAST_SHELL_THRESHOLD
    }

    pub fn is_outside_arena(&self) -> bool {
        self.position.x < 0.0 || self.position.x > ARENA_WIDTH || self.position.y < 0.0 || self.position.y > ARENA_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fired_shell_inherits_shooter_immunity() {
        let shell = Shell::fire(TankId::new(), Vector2::new(10.0, 10.0), Vector2::new(100.0, 0.0), 1000.0, 1200.0);
        assert_eq!(shell.shooter_immunity_until, 1200.0);
    }

    #[test]
    fn fast_shell_threshold() {
        let mut shell = Shell::fire(TankId::new(), Vector2::ZERO, Vector2::new(5.0, 0.0), 0.0, 0.0);
        assert!(!shell.is_fast());
        shell.velocity = Vector2::new(50.0, 0.0);
        assert!(shell.is_fast());
    }

    #[test]
    fn outside_arena_detected() {
        let mut shell = Shell::fire(TankId::new(), Vector2::new(10.0, 10.0), Vector2::ZERO, 0.0, 0.0);
        shell.position = Vector2::new(-5.0, 10.0);
        assert!(shell.is_outside_arena());
    }
}
