//! Terrain initialization and upgrade respawn, spec.md §4.7/§4.9.

use rand::Rng;
use tanks_core::config::{TreeParams, UpgradeTypes, ARENA_HEIGHT, ARENA_WIDTH};
use tanks_core::Vector2;

use crate::entities::{GameState, Tree, Upgrade};

const OBSTACLE_CUSHION: f32 = 60.0;
const CLUSTER_RADIUS_MAX: f32 = 400.0;
const CLUSTER_RADIUS_MIN: f32 = 50.0;
const UPGRADE_SPAWN_CUSHION: f32 = 50.0;
const UPGRADE_SPAWN_MAX_ATTEMPTS: u32 = 100;

fn random_interior_point(rng: &mut impl Rng) -> Vector2 {
    Vector2::new(rng.gen_range(0.0..ARENA_WIDTH), rng.gen_range(0.0..ARENA_HEIGHT))
}

fn far_from_all(position: Vector2, existing: &[Vector2], cushion: f32) -> bool {
    existing.iter().all(|&p| p.distance(position) >= cushion)
}

/// Generates trees for the active terrain map, spec.md §4.9. Replaces
/// `state.trees` wholesale — called on startup, reset, and terrain change.
pub fn generate_trees(state: &mut GameState, params: &TreeParams, rng: &mut impl Rng) {
    state.trees.clear();
    let count = rng.gen_range(params.min_trees..=params.max_trees.max(params.min_trees));

    let mut placed: Vec<Vector2> = Vec::with_capacity(count as usize);

    if params.clustering > 0.0 {
        let groups: Vec<Vector2> = (0..params.cluster_groups.max(1)).map(|_| random_interior_point(rng)).collect();
        let radius = CLUSTER_RADIUS_MAX - (CLUSTER_RADIUS_MAX - CLUSTER_RADIUS_MIN) * (params.clustering / 100.0).clamp(0.0, 1.0);

        for i in 0..count {
            let center = groups[(i as usize) % groups.len()];
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let r = rng.gen_range(0.0..radius);
            let offset = Vector2::from_angle(angle) * r;
            let position = (center + offset).clamp_components(Vector2::new(0.0, 0.0), Vector2::new(ARENA_WIDTH, ARENA_HEIGHT));
            placed.push(position);
        }
    } else {
        for _ in 0..count {
            let mut position = random_interior_point(rng);
            let mut attempts = 0;
            while !far_from_all(position, &placed, OBSTACLE_CUSHION) && attempts < UPGRADE_SPAWN_MAX_ATTEMPTS {
                position = random_interior_point(rng);
                attempts += 1;
            }
            placed.push(position);
        }
    }

    for position in placed {
        let size = params.tree_size + rng.gen_range(-params.tree_size_variance / 2.0..=params.tree_size_variance / 2.0);
        let leaf_rotation = rng.gen_range(0.0..std::f32::consts::TAU);
        state.trees.push(Tree::spawn(position, size.max(4.0), params.tree_type, leaf_rotation));
    }
}

/// Generates decorative patches for the active terrain map, spec.md §4.9.
pub fn generate_patches(state: &mut GameState, params: &tanks_core::config::PatchParams, rng: &mut impl Rng) {
    state.patches.clear();
    for (type_id, config) in &params.patch_types {
        if !config.enabled {
            continue;
        }
        for _ in 0..config.quantity {
            let position = random_interior_point(rng);
            let size = (config.size + rng.gen_range(-config.size_variance / 2.0..=config.size_variance / 2.0)).max(1.0);
            let rotation = rng.gen_range(0.0..std::f32::consts::TAU);
            state.patches.push(crate::entities::Patch {
                id: tanks_core::Id::new(),
                position,
                size,
                type_id: type_id.clone(),
                rotation,
            });
        }
    }
}

fn obstacle_positions(state: &GameState) -> Vec<Vector2> {
    let mut positions: Vec<Vector2> = state.trees.iter().map(|t| t.position).collect();
    positions.extend(state.tanks.values().map(|t| t.position));
    positions.extend(state.upgrades.iter().filter(|u| !u.collected).map(|u| u.position));
    positions
}

/// Upgrade respawn pass, spec.md §4.7: tops up every type whose live count
/// falls short of its configured target, at a position at least 50 px away
/// from every other obstacle (falling back to an unconstrained position
/// after 100 failed attempts).
pub fn respawn_upgrades(state: &mut GameState, upgrade_types: &UpgradeTypes, rng: &mut impl Rng) {
    for (&kind, config) in &upgrade_types.0 {
        let live_count = state.upgrades.iter().filter(|u| !u.collected && u.kind == kind).count() as u32;
        let deficit = config.count.saturating_sub(live_count);
        if deficit == 0 {
            continue;
        }

        for _ in 0..deficit {
            let existing = obstacle_positions(state);
            let mut position = random_interior_point(rng);
            let mut attempts = 0;
            while !far_from_all(position, &existing, UPGRADE_SPAWN_CUSHION) && attempts < UPGRADE_SPAWN_MAX_ATTEMPTS {
                position = random_interior_point(rng);
                attempts += 1;
            }
            let rotation = rng.gen_range(0.0..std::f32::consts::TAU);
            state.upgrades.push(Upgrade::spawn(kind, position, rotation));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn tree_count_stays_within_configured_bounds() {
        let mut state = GameState::new();
        let params = TreeParams { min_trees: 5, max_trees: 10, ..TreeParams::default() };
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        generate_trees(&mut state, &params, &mut rng);
        assert!(state.trees.len() >= 5 && state.trees.len() <= 10);
    }

    #[test]
    fn respawn_tops_up_to_configured_target() {
        let mut state = GameState::new();
        let mut upgrade_types = UpgradeTypes::default();
        upgrade_types.0.insert(
            tanks_core::config::UpgradeType::Health,
            tanks_core::config::UpgradeTypeConfig { value: 25.0, count: 3 },
        );
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        respawn_upgrades(&mut state, &upgrade_types, &mut rng);

        let health_count = state
            .upgrades
            .iter()
            .filter(|u| u.kind == tanks_core::config::UpgradeType::Health)
            .count();
        assert_eq!(health_count, 3);
    }
}
