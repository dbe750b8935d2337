//! Tree entity: trunk collision plus a cosmetic pendulum + foliage
//! spring-damper, spec.md §3/§4.5.

use serde::{Deserialize, Serialize};
use tanks_core::{Bounds, Id, Vector2};

pub struct Tree;
pub type TreeId = Id<Tree>;

const IMPACT_RECENCY_MS: f64 = 5000.0;
const ANGULAR_GRAVITY: f32 = 2.0;
const ANGULAR_DAMPING: f32 = 0.3;
const ANGLE_CLAMP: f32 = 1.0;
const SPRING_K: f32 = 0.2;
const SPRING_DAMPING: f32 = 0.2;
const OFFSET_CLAMP: f32 = 5.0;
const IDLE_VELOCITY_DECAY: f32 = 0.95;
const IDLE_DISPLACEMENT_DECAY: f32 = 0.98;
const REST_SNAP_EPSILON: f32 = 0.001;
const IMPACT_FORCE_CAP: f32 = 5.0;
const SWING_IMPULSE_SCALE: f32 = 0.02;
const FOLIAGE_IMPULSE_SCALE: f32 = 1.0;
const BOOST_DURATION_MS: f64 = 1200.0;
const BOOST_FACTOR: f32 = 1.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    pub swing_angle: f32,
    pub swing_velocity: f32,
    pub last_impact_at: f64,
    pub frequency_boost_until: f64,
    pub boost_factor: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FoliageState {
    pub offset: Vector2,
    pub velocity: Vector2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub id: TreeId,
    pub position: Vector2,
    pub size: f32,
    pub pendulum: PendulumState,
    pub foliage: FoliageState,
    pub cosmetic_type: u32,
    pub leaf_rotation: f32,
    pub bounds: Bounds,
}

impl Tree {
    pub fn spawn(position: Vector2, size: f32, cosmetic_type: u32, leaf_rotation: f32) -> Self {
        let trunk_size = size / 16.0 * 2.0;
        Self {
            id: TreeId::new(),
            position,
            size,
            pendulum: PendulumState::default(),
            foliage: FoliageState::default(),
            cosmetic_type,
            leaf_rotation,
            bounds: Bounds::centered(Self::trunk_center(position, size), trunk_size, trunk_size),
        }
    }

    pub fn trunk_center(position: Vector2, size: f32) -> Vector2 {
        Vector2::new(position.x, position.y - size / 2.0)
    }

    pub fn trunk_radius(&self) -> f32 {
        self.size / 16.0
    }

    /// Deposits an impact impulse from a collision, spec.md §4.4/§4.5.
    pub fn apply_impact(&mut self, impact_angle: f32, inward_dir: Vector2, force: f32, now_ms: f64, boosted: bool) {
        let force_scale = (force / 10.0).min(IMPACT_FORCE_CAP);
        self.pendulum.swing_velocity += -impact_angle * force_scale * SWING_IMPULSE_SCALE;
        self.foliage.velocity -= inward_dir * (force_scale * FOLIAGE_IMPULSE_SCALE);
        self.pendulum.last_impact_at = now_ms;
        if boosted {
            self.pendulum.frequency_boost_until = now_ms + BOOST_DURATION_MS;
            self.pendulum.boost_factor = BOOST_FACTOR;
        }
    }

    /// Per-step pendulum + foliage integration, spec.md §4.5.
    pub fn tick(&mut self, delta_ms: f32, now_ms: f64) {
        let dt = delta_ms / 1000.0;
        let recent = now_ms - self.pendulum.last_impact_at < IMPACT_RECENCY_MS;

        if recent {
            let boost = if now_ms < self.pendulum.frequency_boost_until {
                self.pendulum.boost_factor.max(1.0)
            } else {
                1.0
            };
            let g = ANGULAR_GRAVITY * boost;
            let angular_accel = -g * self.pendulum.swing_angle.sin() - ANGULAR_DAMPING * self.pendulum.swing_velocity;
            self.pendulum.swing_velocity += angular_accel * dt;
            self.pendulum.swing_angle += self.pendulum.swing_velocity * dt;
            self.pendulum.swing_angle = self.pendulum.swing_angle.clamp(-ANGLE_CLAMP, ANGLE_CLAMP);

            let spring_accel = self.foliage.offset * -SPRING_K - self.foliage.velocity * SPRING_DAMPING;
            self.foliage.velocity += spring_accel * dt;
            self.foliage.offset += self.foliage.velocity * dt;
            self.foliage.offset = self.foliage.offset.clamp_components(
                Vector2::new(-OFFSET_CLAMP, -OFFSET_CLAMP),
                Vector2::new(OFFSET_CLAMP, OFFSET_CLAMP),
            );
        } else {
            self.pendulum.swing_velocity *= IDLE_VELOCITY_DECAY;
            self.pendulum.swing_angle *= IDLE_DISPLACEMENT_DECAY;
            self.foliage.velocity.scale_assign(IDLE_VELOCITY_DECAY);
            self.foliage.offset.scale_assign(IDLE_DISPLACEMENT_DECAY);

            if self.pendulum.swing_angle.abs() < REST_SNAP_EPSILON && self.pendulum.swing_velocity.abs() < REST_SNAP_EPSILON {
                self.pendulum.swing_angle = 0.0;
                self.pendulum.swing_velocity = 0.0;
            }
            if self.foliage.offset.magnitude() < REST_SNAP_EPSILON && self.foliage.velocity.magnitude() < REST_SNAP_EPSILON {
                self.foliage.offset = Vector2::ZERO;
                self.foliage.velocity = Vector2::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_sets_nonzero_swing_velocity() {
        let mut tree = Tree::spawn(Vector2::new(100.0, 100.0), 32.0, 0, 0.0);
        tree.apply_impact(0.3, Vector2::new(1.0, 0.0), 50.0, 1000.0, true);
        assert_ne!(tree.pendulum.swing_velocity, 0.0);
        assert_eq!(tree.pendulum.frequency_boost_until, 2200.0);
    }

    #[test]
    fn idle_tree_decays_to_rest() {
        let mut tree = Tree::spawn(Vector2::new(0.0, 0.0), 32.0, 0, 0.0);
        tree.apply_impact(0.1, Vector2::new(1.0, 0.0), 20.0, 0.0, false);
        for i in 0..2000 {
            tree.tick(16.667, 6000.0 + i as f64 * 16.667);
        }
        assert_eq!(tree.pendulum.swing_angle, 0.0);
        assert_eq!(tree.pendulum.swing_velocity, 0.0);
    }
}
