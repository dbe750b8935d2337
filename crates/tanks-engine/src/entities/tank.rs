//! Tank entity and its kinematics (spec.md §3, §4.2).
//!
//! Struct shape and the `take_damage` clamp-then-flip-alive pattern follow
//! the flat-struct-with-clamping style of simple game-state entities; the
//! `Alive -> Dead -> Alive` lifecycle is driven entirely by `respawn_ms`.

use serde::{Deserialize, Serialize};
use tanks_core::config::{Attribute, AttributeLimits, DamageParams, ARENA_HEIGHT, ARENA_WIDTH, TANK_MARGIN};
use tanks_core::{Bounds, Id, Vector2};

use super::shell::SHELL_MUZZLE_OFFSET;

pub struct Tank;

pub type TankId = Id<Tank>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankAttributes {
    pub health: f32,
    pub speed: f32,
    pub gasoline: f32,
    pub rotation: f32,
    pub ammunition: f32,
    pub kinetics: f32,
}

impl TankAttributes {
    pub fn maxed(limits: &AttributeLimits) -> Self {
        Self {
            health: limits.get(Attribute::Health).max,
            speed: limits.get(Attribute::Speed).max,
            gasoline: limits.get(Attribute::Gasoline).max,
            rotation: limits.get(Attribute::Rotation).max,
            ammunition: limits.get(Attribute::Ammunition).max,
            kinetics: limits.get(Attribute::Kinetics).max,
        }
    }

    pub fn get(&self, attr: Attribute) -> f32 {
        match attr {
            Attribute::Health => self.health,
            Attribute::Speed => self.speed,
            Attribute::Gasoline => self.gasoline,
            Attribute::Rotation => self.rotation,
            Attribute::Ammunition => self.ammunition,
            Attribute::Kinetics => self.kinetics,
        }
    }

    pub fn set(&mut self, attr: Attribute, value: f32) {
        match attr {
            Attribute::Health => self.health = value,
            Attribute::Speed => self.speed = value,
            Attribute::Gasoline => self.gasoline = value,
            Attribute::Rotation => self.rotation = value,
            Attribute::Ammunition => self.ammunition = value,
            Attribute::Kinetics => self.kinetics = value,
        }
    }

    pub fn clamp_all(&mut self, limits: &AttributeLimits) {
        for attr in Attribute::ALL {
            let l = limits.get(attr);
            self.set(attr, self.get(attr).clamp(l.min, l.max));
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TankTimers {
    pub respawn_ms: f32,
    pub reload_ms: f32,
    pub firing_immunity_until: f64,
    pub last_shot_ms: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoilState {
    pub body_offset: Vector2,
    pub turret_offset: Vector2,
    pub pendulum_angle: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: TankId,
    pub position: Vector2,
    pub angle: f32,
    pub velocity: Vector2,
    pub target_velocity: Vector2,
    pub attributes: TankAttributes,
    pub is_alive: bool,
    pub is_ai: bool,
    pub timers: TankTimers,
    pub recoil: RecoilState,
    pub bounds: Bounds,
    pub collision_width: f32,
    pub collision_height: f32,
    /// Total distance moved since last gasoline burn, accumulated for the
    /// step's burn computation (spec.md §4.2 step 8).
    pub distance_moved_this_step: f32,
}

pub const TANK_COLLISION_WIDTH: f32 = 30.0;
pub const TANK_COLLISION_HEIGHT: f32 = 24.0;
pub const TANK_TREE_COLLISION_RADIUS: f32 = 20.0;
const ROTATION_RATE_SCALE: f32 = 0.06;
const ROTATION_DEADZONE: f32 = 0.005;
const VELOCITY_LERP_FACTOR: f32 = 0.12;
const IDLE_FRICTION: f32 = 0.7;
const IDLE_SNAP_THRESHOLD: f32 = 0.1;
const TARGET_VELOCITY_EPSILON: f32 = 1e-4;

impl Tank {
    pub fn spawn(position: Vector2, limits: &AttributeLimits, is_ai: bool) -> Self {
        let w = TANK_COLLISION_WIDTH;
        let h = TANK_COLLISION_HEIGHT;
        Self {
            id: TankId::new(),
            position,
            angle: 0.0,
            velocity: Vector2::ZERO,
            target_velocity: Vector2::ZERO,
            attributes: TankAttributes::maxed(limits),
            is_alive: true,
            is_ai,
            timers: TankTimers::default(),
            recoil: RecoilState::default(),
            bounds: Bounds::centered(position, w, h),
            collision_width: w,
            collision_height: h,
            distance_moved_this_step: 0.0,
        }
    }

    pub fn refresh_bounds(&mut self) {
        self.bounds = Bounds::centered(self.position, self.collision_width, self.collision_height);
    }

    pub fn can_shoot(&self) -> bool {
        self.is_alive && self.attributes.ammunition >= 1.0 && self.timers.reload_ms <= 0.0
    }

    /// Fires, per §4.2: decrements ammo, sets reload/immunity timers, and
    /// returns the muzzle position, shell velocity, and shared immunity
    /// timestamp for the caller to build a `Shell` from. Returns `None` when
    /// `can_shoot()` is false (a stateful error, silently ignored).
    pub fn attempt_fire(&mut self, now_ms: f64, reload_time_ms: f32, immunity_window_ms: f64) -> Option<(Vector2, Vector2, f64)> {
        if !self.can_shoot() {
            return None;
        }
        self.attributes.ammunition -= 1.0;
        self.timers.reload_ms = reload_time_ms;
        self.timers.last_shot_ms = now_ms;
        let immunity_until = now_ms + immunity_window_ms;
        self.timers.firing_immunity_until = immunity_until;

        let facing = Vector2::from_angle(self.angle);
        let muzzle = self.position + facing * SHELL_MUZZLE_OFFSET;
        let velocity = facing * self.attributes.kinetics;
        Some((muzzle, velocity, immunity_until))
    }

    /// Step 1 of §4.2: respawn countdown. Returns true if the tank respawned
    /// this step.
    pub fn tick_respawn(&mut self, delta_ms: f32, limits: &AttributeLimits, respawn_position: Vector2) -> bool {
        if self.is_alive {
            return false;
        }
        self.timers.respawn_ms -= delta_ms;
        if self.timers.respawn_ms > 0.0 {
            return false;
        }
        self.position = respawn_position;
        self.angle = 0.0;
        self.velocity = Vector2::ZERO;
        self.target_velocity = Vector2::ZERO;
        self.attributes = TankAttributes::maxed(limits);
        self.timers = TankTimers::default();
        self.is_alive = true;
        self.refresh_bounds();
        true
    }

    /// Steps 2-6 of §4.2: reload decrement, effective speed, rotation,
    /// velocity lerp, position integration. Returns distance moved this step.
    pub fn tick_motion(&mut self, delta_ms: f32, gasoline_speed_penalty: f32) -> f32 {
        self.timers.reload_ms -= delta_ms;

        let effective_speed = if self.attributes.gasoline <= 0.0 {
            self.attributes.speed * gasoline_speed_penalty
        } else {
            self.attributes.speed
        };

        let dt_s = delta_ms / 1000.0;

        if self.target_velocity.magnitude() > TARGET_VELOCITY_EPSILON {
            let dir = self.target_velocity.normalized();
            let target_angle = dir.angle();

            let mut diff = target_angle - self.angle;
            while diff > std::f32::consts::PI {
                diff -= std::f32::consts::TAU;
            }
            while diff < -std::f32::consts::PI {
                diff += std::f32::consts::TAU;
            }
            let max_step = self.attributes.rotation * ROTATION_RATE_SCALE * dt_s;
            if diff.abs() > ROTATION_DEADZONE {
                let step = diff.clamp(-max_step, max_step);
                self.angle += step;
                self.angle = self.angle.rem_euclid(std::f32::consts::TAU);
            }

            let facing = Vector2::from_angle(self.angle);
            let dot = facing.dot(dir);
            let forward = dot.abs() * effective_speed;
            let target_linear = facing * (forward * dot.signum());
            self.velocity = self.velocity.lerp(target_linear, VELOCITY_LERP_FACTOR);
        } else {
            self.velocity.scale_assign(IDLE_FRICTION);
            if self.velocity.magnitude() < IDLE_SNAP_THRESHOLD {
                self.velocity = Vector2::ZERO;
            }
        }

        let before = self.position;
        self.position.add_assign_scaled(self.velocity, dt_s);
        let distance = self.position.distance(before);
        self.distance_moved_this_step = distance;
        distance
    }

    pub fn burn_gasoline(&mut self, gasoline_per_unit: f32) {
        self.attributes.gasoline = (self.attributes.gasoline - self.distance_moved_this_step * gasoline_per_unit).max(0.0);
    }

    pub fn clamp_to_arena(&mut self) {
        self.position = self.position.clamp_components(
            Vector2::new(TANK_MARGIN, TANK_MARGIN),
            Vector2::new(ARENA_WIDTH - TANK_MARGIN, ARENA_HEIGHT - TANK_MARGIN),
        );
    }

    /// Advances the cosmetic recoil easing, driven purely off elapsed time
    /// since the last shot (spec.md §4.2 step 10); never gates gameplay.
    pub fn tick_recoil_animation(&mut self, now_ms: f64) {
        let elapsed = (now_ms - self.timers.last_shot_ms) as f32;
        if elapsed < 0.0 || elapsed > 1000.0 {
            self.recoil.body_offset = Vector2::ZERO;
            self.recoil.turret_offset = Vector2::ZERO;
            return;
        }
        let t = (elapsed / 1000.0).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        let recoil_depth = -4.0 * (1.0 - eased);
        let facing = Vector2::from_angle(self.angle);
        self.recoil.body_offset = facing * (recoil_depth * 0.3);
        self.recoil.turret_offset = facing * recoil_depth;
        self.recoil.pendulum_angle = (elapsed * 0.02).sin() * (1.0 - eased) * 0.15;
    }

    /// Applies a confirmed hit's damage vector, clamped to each attribute's
    /// configured minimum. Returns true if the tank died from this hit.
    pub fn apply_damage(&mut self, damage: &DamageParams, limits: &AttributeLimits) -> bool {
        self.attributes.health = (self.attributes.health - damage.health).max(limits.get(Attribute::Health).min);
        self.attributes.speed = (self.attributes.speed - damage.speed).max(limits.get(Attribute::Speed).min);
        self.attributes.rotation = (self.attributes.rotation - damage.rotation).max(limits.get(Attribute::Rotation).min);
        self.attributes.kinetics = (self.attributes.kinetics - damage.kinetics).max(limits.get(Attribute::Kinetics).min);
        self.attributes.gasoline = (self.attributes.gasoline - damage.gasoline).max(limits.get(Attribute::Gasoline).min);

        if self.attributes.health <= limits.get(Attribute::Health).min && self.is_alive {
            self.is_alive = false;
            self.velocity = Vector2::ZERO;
            self.timers.respawn_ms = 5000.0;
            return true;
        }
        false
    }

    /// Whether a shell can damage this tank right now: alive, past this
    /// tank's own post-shot immunity window, and (shell not ours, or shell's
    /// own immunity already lapsed).
    pub fn can_be_damaged_by(&self, now_ms: f64, shell_shooter: TankId, shell_immunity_until: f64) -> bool {
        if !self.is_alive || now_ms < self.timers.firing_immunity_until {
            return false;
        }
        shell_shooter != self.id || now_ms >= shell_immunity_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> AttributeLimits {
        AttributeLimits::default()
    }

    #[test]
    fn respawn_restores_max_attributes() {
        let mut tank = Tank::spawn(Vector2::new(10.0, 10.0), &limits(), false);
        tank.is_alive = false;
        tank.timers.respawn_ms = 10.0;
        assert!(!tank.tick_respawn(5.0, &limits(), Vector2::new(5.0, 5.0)));
        assert!(tank.tick_respawn(10.0, &limits(), Vector2::new(5.0, 5.0)));
        assert!(tank.is_alive);
        assert_eq!(tank.position, Vector2::new(5.0, 5.0));
    }

    #[test]
    fn tanks_never_strafe_velocity_follows_facing() {
        let mut tank = Tank::spawn(Vector2::new(100.0, 100.0), &limits(), false);
        tank.target_velocity = Vector2::new(0.0, 1.0);
        for _ in 0..200 {
            tank.tick_motion(16.667, 0.4);
        }
        let facing = Vector2::from_angle(tank.angle);
        let vel_dir = tank.velocity.normalized();
        assert!(facing.dot(vel_dir).abs() > 0.99);
    }

    #[test]
    fn gasoline_depletion_applies_speed_penalty_on_next_motion() {
        let mut tank = Tank::spawn(Vector2::ZERO, &limits(), false);
        tank.attributes.gasoline = 0.0;
        tank.target_velocity = Vector2::new(1.0, 0.0);
        tank.tick_motion(16.667, 0.4);
        assert!(tank.velocity.magnitude() <= tank.attributes.speed * 0.4 + 1e-3);
    }

    #[test]
    fn fatal_damage_sets_respawn_timer_and_zero_velocity() {
        let mut tank = Tank::spawn(Vector2::ZERO, &limits(), false);
        tank.velocity = Vector2::new(5.0, 0.0);
        let damage = DamageParams { health: 1000.0, ..DamageParams::default() };
        let died = tank.apply_damage(&damage, &limits());
        assert!(died);
        assert!(!tank.is_alive);
        assert_eq!(tank.velocity, Vector2::ZERO);
        assert_eq!(tank.timers.respawn_ms, 5000.0);
    }

    #[test]
    fn firing_decrements_ammo_and_sets_reload() {
        let mut tank = Tank::spawn(Vector2::ZERO, &limits(), false);
        let before_ammo = tank.attributes.ammunition;
        let result = tank.attempt_fire(1000.0, 1000.0, 200.0);
        assert!(result.is_some());
        assert_eq!(tank.attributes.ammunition, before_ammo - 1.0);
        assert_eq!(tank.timers.reload_ms, 1000.0);
        assert_eq!(tank.timers.firing_immunity_until, 1200.0);
    }

    #[test]
    fn cannot_fire_while_reloading() {
        let mut tank = Tank::spawn(Vector2::ZERO, &limits(), false);
        tank.timers.reload_ms = 500.0;
        assert!(tank.attempt_fire(1000.0, 1000.0, 200.0).is_none());
    }

    #[test]
    fn self_damage_blocked_during_firing_immunity() {
        let tank = Tank::spawn(Vector2::ZERO, &limits(), false);
        let mut tank = tank;
        tank.timers.firing_immunity_until = 1200.0;
        assert!(!tank.can_be_damaged_by(1000.0, tank.id, 1200.0));
        assert!(tank.can_be_damaged_by(1300.0, tank.id, 1200.0));
    }
}
