//! The "decide" half of the AI controller, spec.md §4.6's seven-branch
//! target-selection priority, re-run every `decisionInterval`.

use tanks_core::config::{Attribute, AttributeLimits, UpgradeType};
use tanks_core::Vector2;

use crate::entities::{GameState, TankId};

use super::{AiController, Target, TargetKind};

const LOW_ATTRIBUTE_RATIO: f32 = 0.25;
const LOW_GASOLINE_THRESHOLD: f32 = 30.0;
const LOW_AMMO_THRESHOLD: f32 = 5.0;
const MIN_AMMO_TO_ENGAGE: f32 = 3.0;

fn nearest_upgrade(state: &GameState, kind: UpgradeType, from: Vector2) -> Option<Target> {
    state
        .upgrades
        .iter()
        .filter(|u| !u.collected && u.kind == kind)
        .min_by(|a, b| a.position.distance(from).total_cmp(&b.position.distance(from)))
        .map(|u| Target {
            kind: TargetKind::Upgrade,
            tank_id: None,
            upgrade_id: Some(u.id),
        })
}

fn most_needed_upgrade(state: &GameState, from: Vector2, ratios: &[(Attribute, f32)]) -> Option<Target> {
    let (worst_attr, _) = ratios.iter().min_by(|a, b| a.1.total_cmp(&b.1))?;
    let kind = match worst_attr {
        Attribute::Health => UpgradeType::Health,
        Attribute::Speed => UpgradeType::Speed,
        Attribute::Gasoline => UpgradeType::Gasoline,
        Attribute::Rotation => UpgradeType::Rotation,
        Attribute::Ammunition => UpgradeType::Ammunition,
        Attribute::Kinetics => UpgradeType::Kinetics,
    };
    nearest_upgrade(state, kind, from)
}

fn best_enemy_target(state: &GameState, self_id: TankId, from: Vector2, limits: &AttributeLimits) -> Option<Target> {
    state
        .tanks
        .values()
        .filter(|t| t.id != self_id && t.is_alive)
        .max_by(|a, b| score_enemy(a.position, a.attributes.health, limits, from).total_cmp(&score_enemy(b.position, b.attributes.health, limits, from)))
        .map(|t| Target {
            kind: TargetKind::Enemy,
            tank_id: Some(t.id),
            upgrade_id: None,
        })
}

fn score_enemy(enemy_pos: Vector2, enemy_health: f32, limits: &AttributeLimits, from: Vector2) -> f32 {
    let distance = from.distance(enemy_pos).max(1.0);
    let health_ratio = enemy_health / limits.get(Attribute::Health).max;
    100.0 / distance + (1.0 - health_ratio) * 50.0
}

/// Re-evaluates `controller.target` per spec.md §4.6's priority list.
/// Changing the target clears the controller's caches (there are none kept
/// beyond the target itself in this implementation, so this is a no-op
/// beyond the assignment).
pub fn decide(controller: &mut AiController, state: &GameState, limits: &AttributeLimits, now_ms: f64) {
    let config = controller.difficulty.config();
    if now_ms - controller.last_decision_ms < config.decision_interval_ms as f64 {
        return;
    }
    controller.last_decision_ms = now_ms;

    let Some(tank) = state.tanks.get(&controller.tank_id) else {
        controller.clear_target();
        return;
    };
    if !tank.is_alive {
        controller.clear_target();
        return;
    }
    let position = tank.position;
    let attrs = tank.attributes;

    let ratios: Vec<(Attribute, f32)> = Attribute::ALL
        .iter()
        .map(|&a| (a, attrs.get(a) / limits.get(a).max.max(f32::EPSILON)))
        .collect();

    let new_target = if attrs.ammunition < 1.0 {
        nearest_upgrade(state, UpgradeType::Ammunition, position)
    } else if ratios.iter().any(|(_, r)| *r < LOW_ATTRIBUTE_RATIO) {
        most_needed_upgrade(state, position, &ratios)
    } else if attrs.gasoline < LOW_GASOLINE_THRESHOLD {
        nearest_upgrade(state, UpgradeType::Gasoline, position)
    } else if attrs.ammunition < LOW_AMMO_THRESHOLD {
        nearest_upgrade(state, UpgradeType::Ammunition, position)
    } else if attrs.ammunition > MIN_AMMO_TO_ENGAGE {
        best_enemy_target(state, controller.tank_id, position, limits)
    } else if attrs.health / limits.get(Attribute::Health).max < config.retreat_health_threshold {
        most_needed_upgrade(state, position, &ratios)
    } else {
        None
    };

    controller.target = new_target;
    controller.wander_waypoint = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_ammo_targets_ammunition_upgrade() {
        let limits = AttributeLimits::default();
        let mut state = GameState::new();
        let mut tank = crate::entities::Tank::spawn(Vector2::new(0.0, 0.0), &limits, true);
        tank.attributes.ammunition = 0.0;
        let tank_id = tank.id;
        state.tanks.insert(tank_id, tank);
        state.upgrades.push(crate::entities::Upgrade::spawn(UpgradeType::Ammunition, Vector2::new(50.0, 0.0), 0.0));

        let mut controller = AiController::new(tank_id, tanks_core::config::AiDifficulty::Hard, 0.0, Vector2::ZERO);
        decide(&mut controller, &state, &limits, 10_000.0);

        let target = controller.target.expect("should target the upgrade");
        assert_eq!(target.kind, TargetKind::Upgrade);
    }

    #[test]
    fn healthy_well_stocked_ai_engages_nearest_enemy() {
        let limits = AttributeLimits::default();
        let mut state = GameState::new();
        let self_tank = crate::entities::Tank::spawn(Vector2::new(0.0, 0.0), &limits, true);
        let self_id = self_tank.id;
        state.tanks.insert(self_id, self_tank);
        let enemy = crate::entities::Tank::spawn(Vector2::new(100.0, 0.0), &limits, false);
        let enemy_id = enemy.id;
        state.tanks.insert(enemy_id, enemy);

        let mut controller = AiController::new(self_id, tanks_core::config::AiDifficulty::Hard, 0.0, Vector2::ZERO);
        decide(&mut controller, &state, &limits, 10_000.0);

        let target = controller.target.expect("should engage");
        assert_eq!(target.kind, TargetKind::Enemy);
        assert_eq!(target.tank_id, Some(enemy_id));
    }
}
