//! Full/delta snapshot construction, spec.md §4.8. Numeric fields are
//! quantized before inclusion per the quantization table.
//!
//! Full-resync cadence: the spec gives "no full sent for >100 ms => send
//! full" as the rule, but the 100 ms figure is also the regular broadcast
//! cadence itself, which would force a full snapshot on nearly every tick.
//! Read literally that defeats the whole point of deltas, so this resolves
//! the open question (SPEC_FULL.md §12) by treating 100 ms as the delta
//! cadence and giving full-resync its own, longer interval — full snapshots
//! are a periodic desync-recovery safety net, not the steady-state path.

use std::collections::HashMap;

use serde::Serialize;
use tanks_core::config::{PatchParams, TreeParams};
use tanks_core::Vector2;
use tanks_engine::entities::{GameState, PlayerId, TankId, UpgradeId};

use crate::quantize::{quantize_angle, quantize_attribute, POSITION_STEP, VELOCITY_STEP};

const FULL_RESYNC_INTERVAL_MS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TankWire {
    pub id: TankId,
    pub position: Vector2,
    pub angle: f32,
    pub velocity: Vector2,
    pub health: i32,
    pub speed: i32,
    pub gasoline: i32,
    pub rotation: i32,
    pub ammunition: i32,
    pub kinetics: i32,
    pub is_alive: bool,
    pub is_ai: bool,
}

impl TankWire {
    pub fn from_tank(tank: &tanks_engine::entities::Tank) -> Self {
        Self {
            id: tank.id,
            position: tank.position.quantized(POSITION_STEP),
            angle: quantize_angle(tank.angle),
            velocity: tank.velocity.quantized(VELOCITY_STEP),
            health: quantize_attribute(tank.attributes.health),
            speed: quantize_attribute(tank.attributes.speed),
            gasoline: quantize_attribute(tank.attributes.gasoline),
            rotation: quantize_attribute(tank.attributes.rotation),
            ammunition: quantize_attribute(tank.attributes.ammunition),
            kinetics: quantize_attribute(tank.attributes.kinetics),
            is_alive: tank.is_alive,
            is_ai: tank.is_ai,
        }
    }

    /// Whether the replicated fields differ — position/angle/health/ammo/
    /// gasoline/alive, per spec.md §4.8's delta field list.
    fn changed_from(&self, previous: &TankWire) -> bool {
        self.position != previous.position
            || self.angle != previous.angle
            || self.health != previous.health
            || self.ammunition != previous.ammunition
            || self.gasoline != previous.gasoline
            || self.is_alive != previous.is_alive
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShellWire {
    pub id: tanks_engine::entities::ShellId,
    pub shooter_id: TankId,
    pub position: Vector2,
    pub velocity: Vector2,
}

impl ShellWire {
    fn from_shell(shell: &tanks_engine::entities::Shell) -> Self {
        Self {
            id: shell.id,
            shooter_id: shell.shooter_id,
            position: shell.position.quantized(POSITION_STEP),
            velocity: shell.velocity.quantized(VELOCITY_STEP),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpgradeWire {
    pub id: UpgradeId,
    pub kind: tanks_core::config::UpgradeType,
    pub position: Vector2,
    pub rotation: f32,
    pub collected: bool,
}

impl UpgradeWire {
    fn from_upgrade(upgrade: &tanks_engine::entities::Upgrade) -> Self {
        Self {
            id: upgrade.id,
            kind: upgrade.kind,
            position: upgrade.position.quantized(POSITION_STEP),
            rotation: quantize_angle(upgrade.rotation),
            collected: upgrade.collected,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeWire {
    pub id: tanks_engine::entities::TreeId,
    pub position: Vector2,
    pub size: f32,
    pub swing_angle: f32,
    pub foliage_offset: Vector2,
    pub leaf_rotation: f32,
}

impl TreeWire {
    fn from_tree(tree: &tanks_engine::entities::Tree) -> Self {
        Self {
            id: tree.id,
            position: tree.position,
            size: tree.size,
            swing_angle: quantize_angle(tree.pendulum.swing_angle),
            foliage_offset: tree.foliage.offset.quantized(POSITION_STEP),
            leaf_rotation: tree.leaf_rotation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatchWire {
    pub id: tanks_engine::entities::PatchId,
    pub position: Vector2,
    pub size: f32,
    pub type_id: String,
    pub rotation: f32,
}

impl PatchWire {
    fn from_patch(patch: &tanks_engine::entities::Patch) -> Self {
        Self {
            id: patch.id,
            position: patch.position,
            size: patch.size,
            type_id: patch.type_id.clone(),
            rotation: patch.rotation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerWire {
    pub id: PlayerId,
    pub callname: String,
    pub tank_color: String,
    pub tank_camo: String,
    pub team_name: String,
    pub team_color: String,
}

impl PlayerWire {
    fn from_player(player: &tanks_engine::entities::Player) -> Self {
        Self {
            id: player.id,
            callname: player.callname.clone(),
            tank_color: player.tank_color.clone(),
            tank_camo: player.tank_camo.clone(),
            team_name: player.team_name.clone(),
            team_color: player.team_color.clone(),
        }
    }

    fn changed_from(&self, previous: &PlayerWire) -> bool {
        self.callname != previous.callname
            || self.tank_color != previous.tank_color
            || self.tank_camo != previous.tank_camo
            || self.team_name != previous.team_name
            || self.team_color != previous.team_color
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GameStateMessage {
    Full {
        tanks: Vec<TankWire>,
        shells: Vec<ShellWire>,
        upgrades: Vec<UpgradeWire>,
        trees: Vec<TreeWire>,
        patches: Vec<PatchWire>,
        players: Vec<PlayerWire>,
        tree_params: TreeParams,
        patch_params: PatchParams,
    },
    Delta {
        tanks: Vec<TankWire>,
        shells: Vec<ShellWire>,
        upgrades: Vec<UpgradeWire>,
        players: Vec<PlayerWire>,
        tree_params: TreeParams,
        patch_params: PatchParams,
    },
}

/// Per-client derived state, pushed at the same 100 ms cadence as the
/// shared `gameState` snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStateMessage {
    pub tank: TankWire,
    pub respawn_ms: f32,
}

/// Remembers the last snapshot sent so the next call can diff against it.
#[derive(Default)]
pub struct SnapshotCache {
    last_full_sent_ms: Option<f64>,
    tanks: HashMap<TankId, TankWire>,
    upgrades: HashMap<UpgradeId, bool>,
    players: HashMap<PlayerId, PlayerWire>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, tanks: &[TankWire], upgrades: &[UpgradeWire], players: &[PlayerWire]) {
        self.tanks = tanks.iter().map(|t| (t.id, *t)).collect();
        self.upgrades = upgrades.iter().map(|u| (u.id, u.collected)).collect();
        self.players = players.iter().map(|p| (p.id, p.clone())).collect();
    }
}

/// Builds the next `gameState` message per spec.md §4.8, or `None` if a
/// delta would carry no changes (example scenario 6: no outbound message).
pub fn build_snapshot(state: &GameState, tree_params: &TreeParams, patch_params: &PatchParams, cache: &mut SnapshotCache, now_ms: f64) -> Option<GameStateMessage> {
    let tanks: Vec<TankWire> = state.tanks.values().map(TankWire::from_tank).collect();
    let shells: Vec<ShellWire> = state.shells.iter().map(ShellWire::from_shell).collect();
    let upgrades: Vec<UpgradeWire> = state.upgrades.iter().map(UpgradeWire::from_upgrade).collect();
    let players: Vec<PlayerWire> = state.players.values().map(PlayerWire::from_player).collect();

    let needs_full = cache.last_full_sent_ms.map(|t| now_ms - t > FULL_RESYNC_INTERVAL_MS).unwrap_or(true);

    if needs_full {
        let trees: Vec<TreeWire> = state.trees.iter().map(TreeWire::from_tree).collect();
        let patches: Vec<PatchWire> = state.patches.iter().map(PatchWire::from_patch).collect();
        cache.record(&tanks, &upgrades, &players);
        cache.last_full_sent_ms = Some(now_ms);
        return Some(GameStateMessage::Full {
            tanks,
            shells,
            upgrades,
            trees,
            patches,
            players,
            tree_params: *tree_params,
            patch_params: patch_params.clone(),
        });
    }

    let changed_tanks: Vec<TankWire> = tanks
        .iter()
        .filter(|t| cache.tanks.get(&t.id).map(|prev| t.changed_from(prev)).unwrap_or(true))
        .copied()
        .collect();
    let changed_upgrades: Vec<UpgradeWire> = upgrades
        .iter()
        .filter(|u| cache.upgrades.get(&u.id).map(|prev| *prev != u.collected).unwrap_or(true))
        .copied()
        .collect();
    let changed_players: Vec<PlayerWire> = players
        .iter()
        .filter(|p| cache.players.get(&p.id).map(|prev| p.changed_from(prev)).unwrap_or(true))
        .cloned()
        .collect();

    cache.record(&tanks, &upgrades, &players);

    if changed_tanks.is_empty() && shells.is_empty() && changed_upgrades.is_empty() && changed_players.is_empty() {
        return None;
    }

    Some(GameStateMessage::Delta {
        tanks: changed_tanks,
        shells,
        upgrades: changed_upgrades,
        players: changed_players,
        tree_params: *tree_params,
        patch_params: patch_params.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanks_core::config::AttributeLimits;

    #[test]
    fn first_call_always_sends_full() {
        let state = GameState::new();
        let mut cache = SnapshotCache::new();
        let message = build_snapshot(&state, &TreeParams::default(), &PatchParams::default(), &mut cache, 0.0);
        assert!(matches!(message, Some(GameStateMessage::Full { .. })));
    }

    #[test]
    fn stationary_state_emits_no_delta() {
        let mut state = GameState::new();
        let tank = tanks_engine::entities::Tank::spawn(Vector2::new(100.0, 100.0), &AttributeLimits::default(), false);
        state.tanks.insert(tank.id, tank);
        let mut cache = SnapshotCache::new();
        build_snapshot(&state, &TreeParams::default(), &PatchParams::default(), &mut cache, 0.0);

        let message = build_snapshot(&state, &TreeParams::default(), &PatchParams::default(), &mut cache, 100.0);
        assert!(message.is_none());
    }

    #[test]
    fn moved_tank_produces_delta_with_only_that_tank() {
        let mut state = GameState::new();
        let tank_a = tanks_engine::entities::Tank::spawn(Vector2::new(100.0, 100.0), &AttributeLimits::default(), false);
        let id_a = tank_a.id;
        let tank_b = tanks_engine::entities::Tank::spawn(Vector2::new(200.0, 200.0), &AttributeLimits::default(), false);
        state.tanks.insert(id_a, tank_a);
        state.tanks.insert(tank_b.id, tank_b);

        let mut cache = SnapshotCache::new();
        build_snapshot(&state, &TreeParams::default(), &PatchParams::default(), &mut cache, 0.0);

        state.tanks.get_mut(&id_a).unwrap().position = Vector2::new(150.0, 100.0);
        let message = build_snapshot(&state, &TreeParams::default(), &PatchParams::default(), &mut cache, 100.0);
        match message {
            Some(GameStateMessage::Delta { tanks, .. }) => {
                assert_eq!(tanks.len(), 1);
                assert_eq!(tanks[0].id, id_a);
            }
            other => panic!("expected a delta, got {:?}", other),
        }
    }
}
