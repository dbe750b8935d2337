//! The "execute" half of the AI controller, spec.md §4.6: runs every step
//! regardless of decision cadence, driving movement continuously and gating
//! shots by the difficulty's `minShotInterval`.

use rand::Rng;
use tanks_core::config::{ARENA_HEIGHT, ARENA_WIDTH, TANK_MARGIN};
use tanks_core::Vector2;

use crate::entities::GameState;

use super::{AiController, Intent, Target, TargetKind};

const STRAFE_DISTANCE: f32 = 150.0;
const WANDER_SPEED_SCALE: f32 = 0.4;
const NEAR_GOAL_RADIUS: f32 = 50.0;
const AVOIDANCE_RADIUS: f32 = 80.0;
const AVOIDANCE_BLEND: f32 = 0.5;
const MIN_SHOT_RANGE: f32 = 25.0;
const MAX_SHOT_RANGE: f32 = 400.0;
const MIN_AIM_RANGE: f32 = 30.0;
const MAX_PERPENDICULAR_TARGET_SPEED: f32 = 8.0;
const SLOW_TARGET_ANGLE_TOLERANCE: f32 = 1.2;
const FAST_TARGET_ANGLE_TOLERANCE: f32 = 0.8;
const SLOW_TARGET_SPEED_THRESHOLD: f32 = 20.0;
const PREDICTION_FACTOR_MIN: f32 = 0.8;
const PREDICTION_FACTOR_MAX: f32 = 1.2;
const UPGRADE_RELEASE_RADIUS: f32 = 25.0;
const STUCK_WINDOW_MS: f64 = 3000.0;
const STUCK_DISTANCE_THRESHOLD: f32 = 20.0;
const STUCK_ESCAPE_SPEED_SCALE: f32 = 0.8;

/// Runs both the continuous movement/firing execution and the stuck
/// watchdog, returning the intent to feed into the tank's normal physics
/// update (same contract a human player's `playerInput` uses).
pub fn execute(controller: &mut AiController, state: &GameState, now_ms: f64, rng: &mut impl Rng) -> Intent {
    let Some(tank) = state.tanks.get(&controller.tank_id) else {
        return Intent::default();
    };
    if !tank.is_alive {
        return Intent::default();
    }

    if check_stuck(controller, tank.position, now_ms) {
        let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        return Intent {
            target_velocity: Vector2::from_angle(angle) * (tank.attributes.speed * STUCK_ESCAPE_SPEED_SCALE),
            shoot: false,
        };
    }

    let goal_velocity = match resolve_target(controller, state) {
        Some(Target { kind: TargetKind::Enemy, tank_id: Some(enemy_id), .. }) => {
            execute_enemy_behavior(controller, state, tank.position, tank.angle, enemy_id, now_ms, rng)
        }
        Some(Target { kind: TargetKind::Upgrade, upgrade_id: Some(upgrade_id), .. }) => {
            execute_upgrade_behavior(controller, state, tank.position, upgrade_id)
        }
        _ => execute_wander_behavior(controller, tank.position, rng),
    };

    goal_velocity
}

fn resolve_target(controller: &AiController, state: &GameState) -> Option<Target> {
    let target = controller.target?;
    match target.kind {
        TargetKind::Enemy => {
            let tank_id = target.tank_id?;
            let enemy = state.tanks.get(&tank_id)?;
            if enemy.is_alive {
                Some(target)
            } else {
                None
            }
        }
        TargetKind::Upgrade => {
            let upgrade_id = target.upgrade_id?;
            let upgrade = state.upgrades.iter().find(|u| u.id == upgrade_id)?;
            if !upgrade.collected {
                Some(target)
            } else {
                None
            }
        }
    }
}

fn avoid_obstacles(state: &GameState, position: Vector2, goal_direction: Vector2, distance_to_goal: f32) -> Vector2 {
    if distance_to_goal < NEAR_GOAL_RADIUS {
        return goal_direction;
    }

    let mut repulsion = Vector2::ZERO;
    for tree in &state.trees {
        let to_tree = position - tree.position;
        let distance = to_tree.magnitude();
        if distance < AVOIDANCE_RADIUS && distance > f32::EPSILON {
            repulsion.add_assign_scaled(to_tree.normalized(), AVOIDANCE_RADIUS / distance);
        }
    }

    (goal_direction + repulsion * AVOIDANCE_BLEND).normalized()
}

fn execute_wander_behavior(controller: &mut AiController, position: Vector2, rng: &mut impl Rng) -> Intent {
    let waypoint = *controller.wander_waypoint.get_or_insert_with(|| {
        Vector2::new(
            rng.gen_range(TANK_MARGIN..ARENA_WIDTH - TANK_MARGIN),
            rng.gen_range(TANK_MARGIN..ARENA_HEIGHT - TANK_MARGIN),
        )
    });

    let to_waypoint = waypoint - position;
    let distance = to_waypoint.magnitude();
    if distance < NEAR_GOAL_RADIUS {
        controller.wander_waypoint = None;
    }

    let direction = if distance > f32::EPSILON { to_waypoint.normalized() } else { Vector2::ZERO };
    Intent {
        target_velocity: direction * WANDER_SPEED_SCALE,
        shoot: false,
    }
}

fn execute_upgrade_behavior(controller: &mut AiController, state: &GameState, position: Vector2, upgrade_id: crate::entities::UpgradeId) -> Intent {
    let Some(upgrade) = state.upgrades.iter().find(|u| u.id == upgrade_id) else {
        controller.clear_target();
        return Intent::default();
    };

    let to_upgrade = upgrade.position - position;
    let distance = to_upgrade.magnitude();
    if distance < UPGRADE_RELEASE_RADIUS {
        controller.clear_target();
        return Intent::default();
    }

    let goal_dir = if distance > f32::EPSILON { to_upgrade.normalized() } else { Vector2::ZERO };
    let direction = avoid_obstacles(state, position, goal_dir, distance);
    Intent {
        target_velocity: direction,
        shoot: false,
    }
}

fn execute_enemy_behavior(
    controller: &mut AiController,
    state: &GameState,
    position: Vector2,
    angle: f32,
    enemy_id: crate::entities::TankId,
    now_ms: f64,
    rng: &mut impl Rng,
) -> Intent {
    let Some(enemy) = state.tanks.get(&enemy_id) else {
        controller.clear_target();
        return Intent::default();
    };

    let engagement_range = controller.difficulty.config().engagement_range;
    let to_enemy = enemy.position - position;
    let distance = to_enemy.magnitude();
    let facing = Vector2::from_angle(angle);

    let movement_dir = if distance < STRAFE_DISTANCE {
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        facing.rotated(std::f32::consts::FRAC_PI_2 * sign)
    } else if distance > engagement_range {
        avoid_obstacles(state, position, to_enemy.normalized(), distance)
    } else {
        let roll: f32 = rng.gen_range(0.0..1.0);
        if roll < 0.4 {
            Vector2::ZERO
        } else if roll < 0.7 {
            to_enemy.normalized() * 0.6
        } else {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            facing.rotated(std::f32::consts::FRAC_PI_2 * sign)
        }
    };

    // Always rotate toward the enemy: aim the intent direction at the enemy
    // even if the linear component above chose a strafe/flee direction, by
    // nudging the target velocity's direction toward facing the enemy.
    let aim_dir = to_enemy.normalized();
    let target_velocity = if movement_dir.magnitude() > f32::EPSILON {
        movement_dir
    } else {
        aim_dir * 0.01
    };

    let shoot = should_fire(controller, enemy, position, angle, distance, now_ms, rng);

    Intent { target_velocity, shoot }
}

fn should_fire(controller: &mut AiController, enemy: &crate::entities::Tank, position: Vector2, angle: f32, distance: f32, now_ms: f64, rng: &mut impl Rng) -> bool {
    let config = controller.difficulty.config();
    if now_ms - controller.last_shot_ms < config.min_shot_interval_ms as f64 {
        return false;
    }
    if distance < MIN_SHOT_RANGE || distance < MIN_AIM_RANGE || distance > MAX_SHOT_RANGE {
        return false;
    }

    let perpendicular_speed = perpendicular_speed_component(position, enemy.position, enemy.velocity);
    if perpendicular_speed >= MAX_PERPENDICULAR_TARGET_SPEED {
        return false;
    }

    let prediction_factor: f32 = rng.gen_range(PREDICTION_FACTOR_MIN..PREDICTION_FACTOR_MAX);
    let predicted_position = enemy.position + enemy.velocity * prediction_factor;
    let aim_dir = (predicted_position - position).normalized();
    let facing = Vector2::from_angle(angle);
    let angle_error = facing.dot(aim_dir).clamp(-1.0, 1.0).acos();

    let tolerance = if enemy.velocity.magnitude() < SLOW_TARGET_SPEED_THRESHOLD {
        SLOW_TARGET_ANGLE_TOLERANCE
    } else {
        FAST_TARGET_ANGLE_TOLERANCE
    };
    if angle_error > tolerance {
        return false;
    }

    let roll: f32 = rng.gen_range(0.0..1.0);
    let fires = roll < config.accuracy;
    if fires {
        controller.last_shot_ms = now_ms;
    }
    fires
}

fn perpendicular_speed_component(from: Vector2, target_position: Vector2, target_velocity: Vector2) -> f32 {
    let to_target = (target_position - from).normalized();
    let perpendicular = Vector2::new(-to_target.y, to_target.x);
    target_velocity.dot(perpendicular).abs()
}

fn check_stuck(controller: &mut AiController, position: Vector2, now_ms: f64) -> bool {
    if now_ms - controller.last_stuck_check_ms < STUCK_WINDOW_MS {
        return false;
    }
    let moved = position.distance(controller.last_stuck_check_position);
    controller.last_stuck_check_ms = now_ms;
    controller.last_stuck_check_position = position;

    if moved < STUCK_DISTANCE_THRESHOLD {
        controller.clear_target();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tanks_core::config::{AiDifficulty, AttributeLimits};

    #[test]
    fn stuck_detection_fires_after_window_with_no_movement() {
        let limits = AttributeLimits::default();
        let tank = crate::entities::Tank::spawn(Vector2::new(100.0, 100.0), &limits, true);
        let tank_id = tank.id;
        let mut controller = AiController::new(tank_id, AiDifficulty::Hard, 0.0, Vector2::new(100.0, 100.0));
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);

        let mut state = GameState::new();
        state.tanks.insert(tank_id, tank);

        let intent = execute(&mut controller, &state, 3100.0, &mut rng);
        assert!(intent.target_velocity.magnitude() > 0.0);
        assert!(controller.target.is_none());
    }

    #[test]
    fn idle_ai_with_no_target_wanders() {
        let limits = AttributeLimits::default();
        let tank = crate::entities::Tank::spawn(Vector2::new(500.0, 500.0), &limits, true);
        let tank_id = tank.id;
        let mut controller = AiController::new(tank_id, AiDifficulty::Hard, 0.0, Vector2::new(500.0, 500.0));
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);

        let mut state = GameState::new();
        state.tanks.insert(tank_id, tank);

        let intent = execute(&mut controller, &state, 100.0, &mut rng);
        assert!(!intent.shoot);
        assert!(controller.wander_waypoint.is_some());
    }
}
