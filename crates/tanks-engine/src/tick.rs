//! Fixed-timestep accumulator and the eight ordered per-step phases,
//! spec.md §4.1. Grounded on the teacher's `Room::run` main loop shape
//! (`loop { phase; phase; if should_stop { break } }`) generalized from a
//! single decision deadline to four broadcast-category deadlines.

use std::collections::HashMap;

use rand::Rng;
use tanks_core::config::{Settings, AI_FRAME_SKIP, MAX_CATCHUP_STEPS, TICK_DELTA_MS};

use crate::ai::{decide, execute, AiController};
use crate::collision::{rebuild_spatial_hash, resolve_shell_vs_tanks_and_trees, resolve_tank_vs_trees, resolve_tank_vs_upgrades, DamageEvent, PickupEvent};
use crate::entities::{GameState, TankId};
use crate::terrain::respawn_upgrades;

/// Drives the fixed-Δ accumulator: given how much wall-clock time elapsed,
/// decide how many Δ-sized steps to run this wake, capped to avoid a spiral
/// of death. Remainder beyond the cap is dropped and `skipped_frames` grows.
pub struct TickScheduler {
    accumulator_ms: f32,
    ai_frame_counter: u32,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            accumulator_ms: 0.0,
            ai_frame_counter: 0,
        }
    }

    /// Returns the number of Δ-sized steps to run for this wake.
    pub fn accumulate(&mut self, elapsed_ms: f32, skipped_frames: &mut u64) -> u32 {
        self.accumulator_ms += elapsed_ms;
        let mut steps = 0;
        while self.accumulator_ms >= TICK_DELTA_MS && steps < MAX_CATCHUP_STEPS {
            self.accumulator_ms -= TICK_DELTA_MS;
            steps += 1;
        }
        if self.accumulator_ms >= TICK_DELTA_MS {
            // Catch-up cap exceeded: drop the remainder rather than spiral.
            self.accumulator_ms = 0.0;
            *skipped_frames += 1;
        }
        steps
    }

    pub fn should_run_ai(&mut self) -> bool {
        self.ai_frame_counter += 1;
        if self.ai_frame_counter >= AI_FRAME_SKIP {
            self.ai_frame_counter = 0;
            true
        } else {
            false
        }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a single step produced, for the broadcast/feedback layer.
#[derive(Default)]
pub struct StepReport {
    pub damage_events: Vec<DamageEvent>,
    pub pickup_events: Vec<PickupEvent>,
    pub fired_shells: u32,
}

/// Runs the eight ordered phases of spec.md §4.1 once, advancing `state` by
/// one Δ. `run_ai` gates phase 3 to every Nth step per the frame-skip
/// scheduler. `fire_attempts` carries this step's `playerInput{shoot:true}`
/// requests, keyed by tank id, consumed during phase 2.
pub fn step(
    state: &mut GameState,
    settings: &Settings,
    controllers: &mut HashMap<TankId, AiController>,
    fire_attempts: &mut HashMap<TankId, bool>,
    run_ai: bool,
    rng: &mut impl Rng,
) -> StepReport {
    let delta_ms = TICK_DELTA_MS;
    let mut report = StepReport::default();

    // 1. Advance gameTime.
    state.game_time_ms += delta_ms as f64;
    let now_ms = state.game_time_ms;

    // 2. Update every tank: respawn, motion, tree collision, gasoline burn,
    //    recoil animation, fire attempts.
    let tank_ids: Vec<TankId> = state.tanks.keys().copied().collect();
    for tank_id in &tank_ids {
        let respawn_position = random_arena_point(rng);
        let tank = state.tanks.get_mut(tank_id).expect("iterating known ids");

        tank.tick_respawn(delta_ms, &settings.attribute_limits, respawn_position);
        // A dead tank counting down has velocity=0 and takes no further
        // motion steps this tick (spec.md §3 invariant); a tank that just
        // respawned this step falls through and runs steps 2-9 normally.
        if tank.is_alive {
            tank.tick_motion(delta_ms, settings.game_params.gasoline_speed_penalty);
            resolve_tank_vs_trees(tank, &mut state.trees, now_ms);
            tank.burn_gasoline(settings.game_params.gasoline_per_unit);
            tank.clamp_to_arena();
            tank.refresh_bounds();
        }
        tank.tick_recoil_animation(now_ms);

        let wants_to_shoot = fire_attempts.remove(tank_id).unwrap_or(false);
        if wants_to_shoot {
            if let Some((muzzle, velocity, immunity_until)) = tank.attempt_fire(now_ms, settings.game_params.reload_time_ms, 200.0) {
                state.spawn_shell(*tank_id, muzzle, velocity, now_ms, immunity_until);
                report.fired_shells += 1;
            }
        }
    }

    // 3. Every Nth step, update AI controllers.
    if run_ai {
        for controller in controllers.values_mut() {
            decide(controller, state, &settings.attribute_limits, now_ms);
        }
        for (tank_id, controller) in controllers.iter_mut() {
            let intent = execute(controller, state, now_ms, rng);
            if let Some(tank) = state.tanks.get_mut(tank_id) {
                tank.target_velocity = intent.target_velocity * tank.attributes.speed;
                if intent.shoot {
                    fire_attempts.insert(*tank_id, true);
                }
            }
        }
        // AI shots decided this frame are applied on the *next* tank-update
        // phase as if it were fresh input, matching how a human player's
        // `playerInput` arrives asynchronously between steps.
    }

    // 4. Update every shell: integrate position, refresh bounds.
    for shell in &mut state.shells {
        shell.integrate(delta_ms);
    }

    // 5. Update every tree: pendulum + foliage spring-damper.
    for tree in &mut state.trees {
        tree.tick(delta_ms, now_ms);
    }

    // 6. Collision pass.
    let hash = rebuild_spatial_hash(state);
    let (damage_events, _destroyed) = resolve_shell_vs_tanks_and_trees(state, &hash, &settings.damage_params, &settings.attribute_limits, now_ms);
    report.damage_events = damage_events;
    let hash_after_shells = rebuild_spatial_hash(state);
    report.pickup_events = resolve_tank_vs_upgrades(state, &hash_after_shells, &settings.attribute_limits, &settings.upgrade_types);

    // 7. Upgrade respawn pass.
    respawn_upgrades(state, &settings.upgrade_types, rng);

    // 8. Cull shells that left the arena. `shellLifetime` is wire-compatible
    //    configuration only (spec.md §9 open question #2) and is never read
    //    here. Removed in reverse so each `remove_shell` call's index is
    //    still valid and the pool slot is released, not dropped.
    for i in (0..state.shells.len()).rev() {
        if state.shells[i].is_outside_arena() {
            state.remove_shell(i);
        }
    }

    report
}

fn random_arena_point(rng: &mut impl Rng) -> tanks_core::Vector2 {
    use tanks_core::config::{ARENA_HEIGHT, ARENA_WIDTH, TANK_MARGIN};
    tanks_core::Vector2::new(
        rng.gen_range(TANK_MARGIN..ARENA_WIDTH - TANK_MARGIN),
        rng.gen_range(TANK_MARGIN..ARENA_HEIGHT - TANK_MARGIN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tanks_core::Vector2;

    #[test]
    fn accumulator_caps_catchup_steps() {
        let mut scheduler = TickScheduler::new();
        let mut skipped = 0u64;
        let steps = scheduler.accumulate(1000.0, &mut skipped);
        assert_eq!(steps, MAX_CATCHUP_STEPS);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn accumulator_runs_exact_step_count_under_cap() {
        let mut scheduler = TickScheduler::new();
        let mut skipped = 0u64;
        let steps = scheduler.accumulate(TICK_DELTA_MS * 2.0, &mut skipped);
        assert_eq!(steps, 2);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn single_shot_hit_decrements_ammo_and_spawns_shell() {
        let mut state = GameState::new();
        let settings = Settings::default();
        let mut tank = crate::entities::Tank::spawn(Vector2::new(500.0, 450.0), &settings.attribute_limits, false);
        let tank_id = tank.id;
        tank.angle = 0.0;
        state.tanks.insert(tank_id, tank);

        let mut controllers = HashMap::new();
        let mut fire_attempts = HashMap::new();
        fire_attempts.insert(tank_id, true);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        let before_ammo = state.tanks[&tank_id].attributes.ammunition;
        let report = step(&mut state, &settings, &mut controllers, &mut fire_attempts, false, &mut rng);

        assert_eq!(report.fired_shells, 1);
        assert_eq!(state.tanks[&tank_id].attributes.ammunition, before_ammo - 1.0);
        assert_eq!(state.shells.len(), 1);
    }

    #[test]
    fn game_time_strictly_increases() {
        let mut state = GameState::new();
        let settings = Settings::default();
        let mut controllers = HashMap::new();
        let mut fire_attempts = HashMap::new();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);

        let before = state.game_time_ms;
        step(&mut state, &settings, &mut controllers, &mut fire_attempts, false, &mut rng);
        assert!(state.game_time_ms > before);
    }
}
