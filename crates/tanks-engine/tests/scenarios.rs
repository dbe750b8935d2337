//! End-to-end scenarios driven through the real tick loop rather than a
//! single entity method, transcribing spec.md §8's named literal-input cases.

use std::collections::HashMap;

use rand::SeedableRng;

use tanks_core::config::{AiDifficulty, AttributeLimits, Settings, UpgradeType, UpgradeTypeConfig, UpgradeTypes};
use tanks_core::Vector2;
use tanks_engine::ai::AiController;
use tanks_engine::entities::{GameState, Tank, Tree, Upgrade};
use tanks_engine::tick::step;

fn stdrng(seed: u64) -> rand::rngs::StdRng {
    rand::rngs::StdRng::seed_from_u64(seed)
}

#[test]
fn single_shot_hit() {
    let settings = Settings::default();
    let mut state = GameState::new();

    let mut tank_a = Tank::spawn(Vector2::new(500.0, 450.0), &settings.attribute_limits, false);
    tank_a.angle = 0.0;
    let tank_a_id = tank_a.id;
    let before_ammo = tank_a.attributes.ammunition;
    state.tanks.insert(tank_a_id, tank_a);

    let tank_b = Tank::spawn(Vector2::new(600.0, 450.0), &settings.attribute_limits, false);
    let tank_b_id = tank_b.id;
    let before_health = tank_b.attributes.health;
    state.tanks.insert(tank_b_id, tank_b);

    let mut controllers = HashMap::new();
    let mut rng = stdrng(1);

    let mut fire_attempts = HashMap::new();
    fire_attempts.insert(tank_a_id, true);
    let report = step(&mut state, &settings, &mut controllers, &mut fire_attempts, false, &mut rng);

    assert_eq!(report.fired_shells, 1);
    assert_eq!(state.tanks[&tank_a_id].attributes.ammunition, before_ammo - 1.0);
    assert_eq!(state.shells.len(), 1);
    let shell = &state.shells[0];
    assert!((shell.position.x - 520.0).abs() < 1.0);
    assert!((shell.position.y - 450.0).abs() < 1.0);
    assert!(shell.velocity.y.abs() < 1e-3);
    assert!(shell.velocity.x > 0.0);

    // Shell travels at `kinetics` px/s toward B, 80 px away at spawn.
    let mut hit = false;
    for _ in 0..200 {
        let empty = &mut HashMap::new();
        let report = step(&mut state, &settings, &mut controllers, empty, false, &mut rng);
        if report.damage_events.iter().any(|e| e.tank_id == tank_b_id) {
            hit = true;
            break;
        }
    }

    assert!(hit, "shell never reached tank B");
    assert!(state.shells.is_empty(), "shell should be removed on hit");
    assert_eq!(state.tanks[&tank_b_id].attributes.health, before_health - settings.damage_params.health);
}

#[test]
fn direction_lock() {
    let settings = Settings::default();
    let mut state = GameState::new();

    let mut tank = Tank::spawn(Vector2::new(750.0, 450.0), &settings.attribute_limits, false);
    tank.angle = 0.0;
    // A high rotation attribute so the turn completes well within the 2 s
    // window (rate = rotation × 0.06 rad/s, spec.md §4.2); the default
    // configured rotation cap is tuned for gameplay pacing, not this test.
    tank.attributes.rotation = 20.0;
    let speed = tank.attributes.speed;
    tank.target_velocity = Vector2::new(0.0, 1.0) * speed;
    let tank_id = tank.id;
    let start_position = tank.position;
    state.tanks.insert(tank_id, tank);

    let mut controllers = HashMap::new();
    let mut rng = stdrng(2);

    // 2 s of sustained input at 60 Hz.
    for _ in 0..120 {
        let mut fire_attempts = HashMap::new();
        step(&mut state, &settings, &mut controllers, &mut fire_attempts, false, &mut rng);
    }

    let tank = &state.tanks[&tank_id];
    assert!((tank.angle - std::f32::consts::FRAC_PI_2).abs() < 0.05, "angle = {}", tank.angle);
    let moved = tank.position - start_position;
    assert!(moved.y > 0.0);
    assert!(moved.y.abs() > moved.x.abs() * 2.0, "movement should be primarily along +y: {:?}", moved);
}

#[test]
fn upgrade_pickup() {
    let mut settings = Settings::default();
    let mut types = HashMap::new();
    types.insert(UpgradeType::Speed, UpgradeTypeConfig { value: 20.0, count: 1 });
    settings.upgrade_types = UpgradeTypes(types);

    let mut state = GameState::new();
    let limits = AttributeLimits::default();
    let mut tank = Tank::spawn(Vector2::new(380.0, 400.0), &limits, false);
    tank.attributes.speed = 30.0;
    let tank_id = tank.id;
    state.tanks.insert(tank_id, tank);
    state.upgrades.push(Upgrade::spawn(UpgradeType::Speed, Vector2::new(400.0, 400.0), 0.0));

    let mut controllers = HashMap::new();
    let mut fire_attempts = HashMap::new();
    let mut rng = stdrng(3);

    step(&mut state, &settings, &mut controllers, &mut fire_attempts, false, &mut rng);

    assert_eq!(state.tanks[&tank_id].attributes.speed, limits.get(tanks_core::config::Attribute::Speed).max);
    assert_eq!(state.upgrades.len(), 1, "respawner should have topped back up to the configured count of 1");
    assert_eq!(state.upgrades[0].kind, UpgradeType::Speed);
    assert!(!state.upgrades[0].collected);
}

#[test]
fn tree_bounce() {
    let settings = Settings::default();
    let mut state = GameState::new();

    let mut tank = Tank::spawn(Vector2::new(100.0, 450.0), &settings.attribute_limits, false);
    tank.angle = 0.0;
    tank.target_velocity = Vector2::new(1.0, 0.0) * tank.attributes.speed;
    let tank_id = tank.id;
    state.tanks.insert(tank_id, tank);
    state.trees.push(Tree::spawn(Vector2::new(200.0, 450.0), 32.0, 0, 0.0));

    let mut controllers = HashMap::new();
    let mut rng = stdrng(4);

    for _ in 0..400 {
        let mut fire_attempts = HashMap::new();
        step(&mut state, &settings, &mut controllers, &mut fire_attempts, false, &mut rng);
    }

    let tree = &state.trees[0];
    let trunk_center = Tree::trunk_center(tree.position, tree.size);
    let min_distance = tanks_engine::entities::tank::TANK_TREE_COLLISION_RADIUS + tree.trunk_radius();
    assert!(state.tanks[&tank_id].position.distance(trunk_center) >= min_distance - 1e-2);
    assert_ne!(tree.pendulum.swing_velocity, 0.0);
}

#[test]
fn ai_out_of_ammo_retargets_to_ammunition_upgrade() {
    let mut settings = Settings::default();
    let mut types = HashMap::new();
    types.insert(UpgradeType::Ammunition, UpgradeTypeConfig { value: 15.0, count: 1 });
    settings.upgrade_types = UpgradeTypes(types);

    let mut state = GameState::new();
    let mut tank = Tank::spawn(Vector2::new(100.0, 100.0), &settings.attribute_limits, true);
    tank.attributes.ammunition = 0.0;
    let tank_id = tank.id;
    state.tanks.insert(tank_id, tank);
    state.upgrades.push(Upgrade::spawn(UpgradeType::Ammunition, Vector2::new(140.0, 100.0), 0.0));

    let mut controllers = HashMap::new();
    controllers.insert(tank_id, AiController::new(tank_id, AiDifficulty::Hard, 0.0, Vector2::new(100.0, 100.0)));
    let mut rng = stdrng(5);

    let mut retargeted_to_upgrade = false;
    for _ in 0..900 {
        let mut fire_attempts = HashMap::new();
        step(&mut state, &settings, &mut controllers, &mut fire_attempts, true, &mut rng);
        if matches!(controllers[&tank_id].target, Some(t) if t.kind == tanks_engine::ai::TargetKind::Upgrade) {
            retargeted_to_upgrade = true;
        }
        if state.tanks[&tank_id].attributes.ammunition > 0.0 {
            break;
        }
    }

    assert!(retargeted_to_upgrade, "AI should have targeted the ammunition upgrade at some point");
    assert!(state.tanks[&tank_id].attributes.ammunition > 0.0, "ammo should be restored on contact");
    assert_eq!(state.upgrades.len(), 1, "respawner should have topped back up to the configured count of 1");
    assert_eq!(state.upgrades[0].kind, UpgradeType::Ammunition);
}
