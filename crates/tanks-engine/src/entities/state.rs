//! `GameState` — the process-wide singleton, spec.md §3. Two parallel tables
//! keyed by id (players, tanks) plus flat lists for shells/upgrades/trees/
//! patches, owned exclusively by the tick loop.

use std::collections::HashMap;

use tanks_core::Vector2;

use crate::pool::Pool;

use super::patch::Patch;
use super::player::{Player, PlayerId};
use super::shell::Shell;
use super::tank::{Tank, TankId};
use super::tree::Tree;
use super::upgrade::Upgrade;

fn pooled_shell() -> Shell {
    Shell::fire(TankId::new(), Vector2::ZERO, Vector2::ZERO, 0.0, 0.0)
}

pub struct GameState {
    pub players: HashMap<PlayerId, Player>,
    pub tanks: HashMap<TankId, Tank>,
    pub shells: Vec<Shell>,
    pub upgrades: Vec<Upgrade>,
    pub trees: Vec<Tree>,
    pub patches: Vec<Patch>,
    pub game_time_ms: f64,
    pub skipped_frames: u64,
    shell_pool: Pool<Shell>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            players: HashMap::new(),
            tanks: HashMap::new(),
            shells: Vec::new(),
            upgrades: Vec::new(),
            trees: Vec::new(),
            patches: Vec::new(),
            game_time_ms: 0.0,
            skipped_frames: 0,
            shell_pool: Pool::new(pooled_shell),
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invariant check: `players[id] <=> tanks[id]` (spec.md §3).
    pub fn assert_player_tank_parity(&self) -> bool {
        self.players.len() == self.tanks.len() && self.players.keys().all(|id| self.tanks.contains_key(id))
    }

    pub fn remove_player(&mut self, id: PlayerId) -> (Option<Player>, Option<Tank>) {
        (self.players.remove(&id), self.tanks.remove(&id))
    }

    /// Fires a shell from the pool rather than allocating fresh (spec.md
    /// §3/§5: shells are pooled; release is mandatory on destruction).
    pub fn spawn_shell(&mut self, shooter_id: TankId, muzzle_position: Vector2, velocity: Vector2, now_ms: f64, immunity_until: f64) {
        let mut shell = self.shell_pool.acquire();
        shell.recycle(shooter_id, muzzle_position, velocity, now_ms, immunity_until);
        self.shells.push(shell);
    }

    /// Removes the shell at `index` and returns it to the pool. Every call
    /// site that destroys a shell (collision, arena exit) must go through
    /// this instead of `Vec::remove` directly.
    pub fn remove_shell(&mut self, index: usize) {
        let shell = self.shells.remove(index);
        self.shell_pool.release(shell);
    }

    pub fn shell_pool_stats(&self) -> (u64, u64) {
        self.shell_pool.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_trivially_satisfies_parity() {
        let state = GameState::new();
        assert!(state.assert_player_tank_parity());
    }
}
