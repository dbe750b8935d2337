//! Collision resolution, spec.md §4.4: shell↔tank, shell↔tree, tank↔upgrade,
//! tank↔tree. Shells are processed in reverse so removal is safe without
//! invalidating later indices; upgrades are resolved after shells, per the
//! ordering guarantee in §4.4's closing paragraph.

use tanks_core::config::{AttributeLimits, DamageParams, UpgradeTypes};

use crate::entities::{GameState, ShellId, TankId, TreeId, UpgradeId};
use crate::spatial::{EntityRef, SpatialHash};

const SHELL_TANK_SEARCH_RADIUS: f32 = 25.0;
const SHELL_TREE_SEARCH_RADIUS: f32 = 15.0;
const TANK_TREE_RESTITUTION: f32 = 0.8;
const TANK_TREE_FRICTION: f32 = 0.05;
const TANK_TREE_SEARCH_RADIUS: f32 = 80.0;

pub struct DamageEvent {
    pub tank_id: TankId,
    pub shooter_id: TankId,
    pub fatal: bool,
}

pub struct PickupEvent {
    pub tank_id: TankId,
    pub upgrade_id: UpgradeId,
}

/// Rebuilds the index from every entity with bounds, per §4.3's invariant
/// that it happens once at the start of the collision pass.
pub fn rebuild_spatial_hash(state: &GameState) -> SpatialHash {
    let mut hash = SpatialHash::new();
    for tank in state.tanks.values() {
        if tank.is_alive {
            hash.insert(tank.bounds, EntityRef::Tank(tank.id));
        }
    }
    for shell in &state.shells {
        hash.insert(shell.bounds, EntityRef::Shell(shell.id));
    }
    for tree in &state.trees {
        hash.insert(tree.bounds, EntityRef::Tree(tree.id));
    }
    for upgrade in &state.upgrades {
        if !upgrade.collected {
            hash.insert(upgrade.bounds, EntityRef::Upgrade(upgrade.id));
        }
    }
    hash
}

pub fn resolve_shell_vs_tanks_and_trees(
    state: &mut GameState,
    hash: &SpatialHash,
    damage: &DamageParams,
    limits: &AttributeLimits,
    now_ms: f64,
) -> (Vec<DamageEvent>, Vec<ShellId>) {
    let mut events = Vec::new();
    let mut destroyed = Vec::new();

    for i in (0..state.shells.len()).rev() {
        let shell_bounds = state.shells[i].bounds;
        let shell_center = state.shells[i].position;
        let shell_is_fast = state.shells[i].is_fast();
        let shooter_id = state.shells[i].shooter_id;
        let immunity_until = state.shells[i].shooter_immunity_until;

        let candidates = hash.query(shell_bounds, SHELL_TANK_SEARCH_RADIUS, Some(EntityRef::Shell(state.shells[i].id)));

        let mut hit_tank: Option<TankId> = None;
        for candidate in &candidates {
            if let EntityRef::Tank(tank_id) = candidate {
                let Some(tank) = state.tanks.get(tank_id) else { continue };
                if !tank.is_alive {
                    continue;
                }
                let aabb_hit = tank.bounds.overlaps(shell_bounds);
                let tunneling_hit = shell_is_fast && tank.position.distance(shell_center) <= 20.0;
                if aabb_hit || tunneling_hit {
                    if tank.can_be_damaged_by(now_ms, shooter_id, immunity_until) {
                        hit_tank = Some(*tank_id);
                        break;
                    }
                }
            }
        }

        if let Some(tank_id) = hit_tank {
            let tank = state.tanks.get_mut(&tank_id).expect("looked up above");
            let fatal = tank.apply_damage(damage, limits);
            tank.refresh_bounds();
            events.push(DamageEvent { tank_id, shooter_id, fatal });
            destroyed.push(state.shells[i].id);
            state.remove_shell(i);
            continue;
        }

        // Shell → tree, only attempted if no tank was hit (§4.4), queried at
        // its own 15 px search radius rather than the tank pass's 25 px.
        let tree_candidates = hash.query(shell_bounds, SHELL_TREE_SEARCH_RADIUS, Some(EntityRef::Shell(state.shells[i].id)));
        let mut hit_tree: Option<TreeId> = None;
        for candidate in &tree_candidates {
            if let EntityRef::Tree(tree_id) = candidate {
                if let Some(tree) = state.trees.iter().find(|t| t.id == *tree_id) {
                    if tree.bounds.overlaps(shell_bounds) {
                        hit_tree = Some(*tree_id);
                        break;
                    }
                }
            }
        }

        if let Some(tree_id) = hit_tree {
            if let Some(tree) = state.trees.iter_mut().find(|t| t.id == tree_id) {
                let velocity = state.shells[i].velocity;
                let inward = velocity.normalized();
                let impact_angle = inward.angle();
                let force = velocity.magnitude();
                // Swing-frequency boost is a Tank ↔ Tree effect only (§4.4);
                // a shell destroying a tree applies a plain impulse.
                tree.apply_impact(impact_angle, inward, force, now_ms, false);
            }
            destroyed.push(state.shells[i].id);
            state.remove_shell(i);
        }
    }

    (events, destroyed)
}

/// Tank ↔ upgrade, resolved after shells (§4.4 ordering guarantee).
pub fn resolve_tank_vs_upgrades(
    state: &mut GameState,
    hash: &SpatialHash,
    limits: &AttributeLimits,
    upgrade_types: &UpgradeTypes,
) -> Vec<PickupEvent> {
    let mut events = Vec::new();
    let mut collected_ids = Vec::new();

    let tank_ids: Vec<TankId> = state.tanks.keys().copied().collect();
    for tank_id in tank_ids {
        let (tank_bounds, tank_position, half_extent, alive) = {
            let tank = &state.tanks[&tank_id];
            (
                tank.bounds,
                tank.position,
                tank.collision_width.max(tank.collision_height) / 2.0,
                tank.is_alive,
            )
        };
        if !alive {
            continue;
        }

        let candidates = hash.query(tank_bounds, 0.0, None);
        for candidate in candidates {
            let EntityRef::Upgrade(upgrade_id) = candidate else { continue };
            let Some(upgrade) = state.upgrades.iter().find(|u| u.id == upgrade_id) else { continue };
            if upgrade.collected {
                continue;
            }
            if !tank_bounds.overlaps(upgrade.bounds) {
                continue;
            }
            let narrow_pad = half_extent + crate::entities::upgrade::UPGRADE_RADIUS + crate::entities::upgrade::UPGRADE_PICKUP_PAD;
            if tank_position.distance(upgrade.position) > narrow_pad {
                continue;
            }

            let attr = upgrade.kind.attribute();
            let value = upgrade_types.0.get(&upgrade.kind).map(|cfg| cfg.value).unwrap_or(0.0);
            let tank = state.tanks.get_mut(&tank_id).expect("checked above");
            let current = tank.attributes.get(attr);
            let max = limits.get(attr).max;
            tank.attributes.set(attr, (current + value).min(max));

            collected_ids.push(upgrade_id);
            events.push(PickupEvent { tank_id, upgrade_id });
        }
    }

    state.upgrades.retain(|u| !collected_ids.contains(&u.id));

    events
}

/// Tank ↔ tree continuous collision, called from inside tank motion update
/// (§4.4's "inside tank update" clause). Mutates both the tank and the tree.
pub fn resolve_tank_vs_trees(tank: &mut crate::entities::Tank, trees: &mut [crate::entities::Tree], now_ms: f64) {
    let tank_radius = crate::entities::tank::TANK_TREE_COLLISION_RADIUS;
    for tree in trees.iter_mut() {
        let delta = tank.position.distance_squared(crate::entities::tree::Tree::trunk_center(tree.position, tree.size));
        let search = TANK_TREE_SEARCH_RADIUS * TANK_TREE_SEARCH_RADIUS;
        if delta > search {
            continue;
        }
        let trunk_center = crate::entities::tree::Tree::trunk_center(tree.position, tree.size);
        let trunk_radius = tree.trunk_radius();
        let to_tank = tank.position - trunk_center;
        let distance = to_tank.magnitude();
        let min_distance = tank_radius + trunk_radius;
        if distance >= min_distance || distance < f32::EPSILON {
            continue;
        }

        let normal = to_tank.normalized();
        let penetration = min_distance - distance;
        tank.position += normal * penetration;

        let inward = tank.velocity.dot(normal);
        if inward < 0.0 {
            let reflected = normal * (-inward * (1.0 + TANK_TREE_RESTITUTION));
            tank.velocity += reflected;
        }
        tank.velocity.scale_assign(1.0 - TANK_TREE_FRICTION);

        let force = tank.velocity.magnitude();
        tree.apply_impact(normal.angle(), -normal, force.max(1.0), now_ms, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanks_core::config::AttributeLimits;
    use tanks_core::Vector2;

    #[test]
    fn tank_never_passes_through_trunk_center() {
        let mut tank = crate::entities::Tank::spawn(Vector2::new(100.0, 450.0), &AttributeLimits::default(), false);
        tank.velocity = Vector2::new(50.0, 0.0);
        let mut trees = vec![crate::entities::Tree::spawn(Vector2::new(200.0, 450.0), 32.0, 0, 0.0)];

        for _ in 0..400 {
            tank.position += tank.velocity * (16.667 / 1000.0);
            resolve_tank_vs_trees(&mut tank, &mut trees, 0.0);
        }

        let trunk_center = crate::entities::tree::Tree::trunk_center(trees[0].position, trees[0].size);
        let min_distance = crate::entities::tank::TANK_TREE_COLLISION_RADIUS + trees[0].trunk_radius();
        assert!(tank.position.distance(trunk_center) >= min_distance - 1e-3);
    }

    #[test]
    fn upgrade_pickup_applies_configured_value_and_removes_upgrade() {
        use tanks_core::config::UpgradeType;

        let limits = AttributeLimits::default();
        let mut state = GameState::new();
        let mut tank = crate::entities::Tank::spawn(Vector2::new(380.0, 400.0), &limits, false);
        tank.attributes.speed = 30.0;
        let tank_id = tank.id;
        state.tanks.insert(tank_id, tank);
        state.upgrades.push(crate::entities::Upgrade::spawn(UpgradeType::Speed, Vector2::new(400.0, 400.0), 0.0));

        let hash = rebuild_spatial_hash(&state);
        let upgrade_types = tanks_core::config::UpgradeTypes::default();
        let events = resolve_tank_vs_upgrades(&mut state, &hash, &limits, &upgrade_types);

        assert_eq!(events.len(), 1);
        assert_eq!(state.tanks[&tank_id].attributes.speed, limits.get(tanks_core::config::Attribute::Speed).max);
        assert!(state.upgrades.is_empty());
    }
}
