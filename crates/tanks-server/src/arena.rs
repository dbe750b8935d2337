//! The `Arena`: owns the one `GameState` this process runs (spec.md's
//! "no horizontal sharding — one process holds one arena"), grounded on the
//! teacher's `Room` (`crates/gameroom/src/room.rs`) — a single task that
//! owns all mutable state and exposes it to the outside world only through
//! commands and broadcast messages, never a shared lock.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use tanks_core::config::{self, AiDifficulty, Settings};
use tanks_engine::ai::AiController;
use tanks_engine::entities::{GameState, Player, Tank, TankId};
use tanks_engine::terrain;
use tanks_engine::tick::{self, TickScheduler};
use tanks_protocol::inbound::{ClientEvent, LimitBound};
use tanks_protocol::outbound::ServerEvent;
use tanks_protocol::snapshot::{self, PlayerStateMessage, SnapshotCache, TankWire};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::broadcast::{Category, PriorityScheduler};
use crate::command::EngineCommand;
use crate::table::Table;

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub players: usize,
    pub tanks: usize,
    pub shells: usize,
    pub upgrades: usize,
    pub trees: usize,
}

/// Everything the tick task owns exclusively. Nothing outside this module
/// ever touches these fields directly — all communication comes through
/// `EngineCommand` on the queue `Arena::run` drains each wake.
struct ArenaState {
    game: GameState,
    settings: Settings,
    controllers: HashMap<TankId, AiController>,
    fire_attempts: HashMap<TankId, bool>,
    tick_scheduler: TickScheduler,
    priority: PriorityScheduler,
    snapshot_cache: SnapshotCache,
    table: Table,
    rng: SmallRng,
    next_team: usize,
}

impl ArenaState {
    fn new(terrain_map_id: &str) -> Self {
        let mut settings = Settings::default();
        let mut rng = SmallRng::from_entropy();
        let mut game = GameState::new();

        if let Some(map) = config::terrain_map_by_id(terrain_map_id) {
            settings.tree_params = map.tree_params;
            settings.patch_params = map.patch_params;
        }
        terrain::generate_trees(&mut game, &settings.tree_params, &mut rng);
        terrain::generate_patches(&mut game, &settings.patch_params, &mut rng);
        terrain::respawn_upgrades(&mut game, &settings.upgrade_types, &mut rng);

        Self {
            game,
            settings,
            controllers: HashMap::new(),
            fire_attempts: HashMap::new(),
            tick_scheduler: TickScheduler::new(),
            priority: PriorityScheduler::new(),
            snapshot_cache: SnapshotCache::new(),
            table: Table::new(),
            rng,
            next_team: 0,
        }
    }

    fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            status: "ok",
            players: self.game.players.len(),
            tanks: self.game.tanks.len(),
            shells: self.game.shells.len(),
            upgrades: self.game.upgrades.len(),
            trees: self.game.trees.len(),
        }
    }

    fn pick_team(&mut self, requested: &str) -> config::Team {
        config::team_by_name(requested).unwrap_or_else(|| {
            let team = config::TEAMS[self.next_team % config::TEAMS.len()].clone();
            self.next_team += 1;
            team
        })
    }

    /// Handles one queued command, mutating `self` in place.
    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Connect { requested_id, sender, reply } => {
                let tank_id = requested_id
                    .filter(|id| self.game.tanks.contains_key(id))
                    .unwrap_or_else(TankId::new);
                self.table.sit(tank_id, sender);
                let _ = reply.send(tank_id);
            }
            EngineCommand::Disconnect { tank_id } => {
                self.table.disconnect(tank_id);
                let (player, _tank) = self.game.remove_player(tank_id);
                self.controllers.remove(&tank_id);
                self.table.leave(tank_id);
                if player.is_some() {
                    self.table.broadcast(&ServerEvent::PlayerLeft { tank_id }.to_json());
                }
            }
            EngineCommand::Client { tank_id, event } => self.handle_client_event(tank_id, event),
            EngineCommand::Health { reply } => {
                let _ = reply.send(self.health());
            }
        }
    }

    fn handle_client_event(&mut self, tank_id: TankId, event: ClientEvent) {
        use tanks_protocol::protocol::Protocol;

        let event = match event.apply_settings_patch(&mut self.settings) {
            Some(rest) => rest,
            None => {
                self.table.unicast(tank_id, &ServerEvent::SettingsApplied { success: true, error: None }.to_json());
                self.table.broadcast(&ServerEvent::BalanceSettings(self.settings.clone()).to_json());
                return;
            }
        };

        match event {
            ClientEvent::Join { callname, tank_color, tank_camo, team_name } => {
                self.handle_join(tank_id, callname, tank_color, tank_camo, team_name);
            }
            ClientEvent::PlayerInput { movement, shoot } => {
                let movement = match Protocol::validate_movement(movement) {
                    Ok(m) => m,
                    Err(e) => {
                        log::debug!("[arena] rejected input from {}: {}", tank_id, e);
                        return;
                    }
                };
                if let Some(tank) = self.game.tanks.get_mut(&tank_id) {
                    tank.target_velocity = tanks_core::Vector2::from(movement) * tank.attributes.speed;
                }
                if shoot {
                    self.fire_attempts.insert(tank_id, true);
                }
                if let Some(player) = self.game.players.get_mut(&tank_id) {
                    player.last_update_ms = self.game.game_time_ms;
                }
            }
            ClientEvent::ToggleAi { enabled } => self.toggle_ai(enabled),
            ClientEvent::ApplyAiSettings { ai_count, ai_level } => self.apply_ai_settings(ai_count, ai_level),
            ClientEvent::ResetGame => self.reset_game(),
            ClientEvent::ChangeTerrainMap { map_name } => self.change_terrain_map(&map_name),
            ClientEvent::SetPlayerAttributes(patch) => self.set_player_attributes(patch),
            ClientEvent::SetPlayerAttributeLimit { attribute_name, bound, value } => {
                self.set_attribute_limit(tank_id, &attribute_name, bound, value);
            }
            ClientEvent::RequestGameState => self.unicast_full_snapshot(tank_id),
            ClientEvent::RequestPlayerState => self.unicast_player_state(tank_id),
            ClientEvent::UpdateSettings(_) | ClientEvent::ApplySettings(_) => unreachable!("consumed by apply_settings_patch above"),
        }
    }

    fn handle_join(&mut self, tank_id: TankId, callname: String, tank_color: String, tank_camo: String, team_name: String) {
        let now_ms = self.game.game_time_ms;
        if self.game.tanks.contains_key(&tank_id) {
            if let Some(player) = self.game.players.get_mut(&tank_id) {
                player.callname = callname;
                player.tank_color = tank_color;
                player.tank_camo = tank_camo;
            }
            self.table.unicast(tank_id, &ServerEvent::Reconnected { tank_id }.to_json());
        } else {
            let team = self.pick_team(&team_name);
            let position = random_spawn_point(&mut self.rng);
            let tank = Tank::spawn(position, &self.settings.attribute_limits, false);
            let player = Player::new(tank_id, callname, tank_color, tank_camo, team.clone(), now_ms);
            self.game.tanks.insert(tank_id, tank);
            self.game.players.insert(tank_id, player);
            self.table.unicast(
                tank_id,
                &ServerEvent::Joined { tank_id, team_name: team.name.to_string(), team_color: team.color.to_string() }.to_json(),
            );
        }
        // The joining client gets its full snapshot immediately; everyone
        // else picks up the new roster on the next scheduled broadcast tick
        // (at most 100 ms away) rather than an extra out-of-band push.
        self.unicast_full_snapshot(tank_id);
    }

    /// `toggleAI {enabled}` — spec.md §6: adds or removes exactly one AI,
    /// independent of `applyAISettings`'s count/level control.
    fn toggle_ai(&mut self, enabled: bool) {
        if enabled {
            self.spawn_ai(AiDifficulty::Intermediate);
        } else if let Some(id) = self.game.tanks.iter().find(|(_, t)| t.is_ai).map(|(id, _)| *id) {
            self.despawn_ai(id);
        }
    }

    /// `applyAISettings {aiCount, aiLevel}` — spec.md §6: purges every AI
    /// and spawns exactly `ai_count` fresh ones at `ai_level`.
    fn apply_ai_settings(&mut self, ai_count: u32, ai_level: AiDifficulty) {
        let current: Vec<TankId> = self.game.tanks.iter().filter(|(_, t)| t.is_ai).map(|(id, _)| *id).collect();
        for id in current {
            self.despawn_ai(id);
        }
        for _ in 0..ai_count {
            self.spawn_ai(ai_level);
        }
    }

    fn spawn_ai(&mut self, ai_level: AiDifficulty) {
        let now_ms = self.game.game_time_ms;
        let position = random_spawn_point(&mut self.rng);
        let tank = Tank::spawn(position, &self.settings.attribute_limits, true);
        let tank_id = tank.id;
        let mut player = Player::new(tank_id, format!("Bot-{}", &tank_id.to_string()[..8]), "#888888".into(), "default".into(), config::AI_TEAM, now_ms);
        player.ai = Some(tanks_engine::entities::AiMetadata { level: ai_level, strategy: "default".to_string() });
        self.game.tanks.insert(tank_id, tank);
        self.game.players.insert(tank_id, player);
        self.controllers.insert(tank_id, AiController::new(tank_id, ai_level, now_ms, position));
        self.table.broadcast(&ServerEvent::AiAdded { tank_id, level: ai_level }.to_json());
    }

    fn despawn_ai(&mut self, tank_id: TankId) {
        self.game.remove_player(tank_id);
        self.controllers.remove(&tank_id);
        self.table.broadcast(&ServerEvent::AiRemoved { tank_id }.to_json());
    }

    fn reset_game(&mut self) {
        self.game = GameState::new();
        self.controllers.clear();
        self.fire_attempts.clear();
        self.snapshot_cache = SnapshotCache::new();
        terrain::generate_trees(&mut self.game, &self.settings.tree_params, &mut self.rng);
        terrain::generate_patches(&mut self.game, &self.settings.patch_params, &mut self.rng);
        terrain::respawn_upgrades(&mut self.game, &self.settings.upgrade_types, &mut self.rng);
        self.table.broadcast(&ServerEvent::GameReset.to_json());
    }

    fn change_terrain_map(&mut self, map_name: &str) {
        match config::terrain_map_by_id(map_name) {
            Some(map) => {
                self.settings.tree_params = map.tree_params;
                self.settings.patch_params = map.patch_params;
                terrain::generate_trees(&mut self.game, &self.settings.tree_params, &mut self.rng);
                terrain::generate_patches(&mut self.game, &self.settings.patch_params, &mut self.rng);
                self.table.broadcast(&ServerEvent::TerrainMapChanged { map_id: map.id }.to_json());
            }
            None => {
                log::warn!("[arena] unknown terrain map {}", map_name);
                self.table.broadcast(&ServerEvent::SettingsApplied { success: false, error: Some(format!("unknown terrain map {}", map_name)) }.to_json());
            }
        }
    }

    fn set_player_attributes(&mut self, patch: tanks_protocol::inbound::AttributesPatch) {
        use tanks_core::config::Attribute;
        for tank in self.game.tanks.values_mut().filter(|t| !t.is_ai) {
            if let Some(v) = patch.health {
                tank.attributes.set(Attribute::Health, v);
            }
            if let Some(v) = patch.speed {
                tank.attributes.set(Attribute::Speed, v);
            }
            if let Some(v) = patch.gasoline {
                tank.attributes.set(Attribute::Gasoline, v);
            }
            if let Some(v) = patch.rotation {
                tank.attributes.set(Attribute::Rotation, v);
            }
            if let Some(v) = patch.ammunition {
                tank.attributes.set(Attribute::Ammunition, v);
            }
            if let Some(v) = patch.kinetics {
                tank.attributes.set(Attribute::Kinetics, v);
            }
            tank.attributes.clamp_all(&self.settings.attribute_limits);
        }
        self.table.broadcast(&ServerEvent::SettingsApplied { success: true, error: None }.to_json());
    }

    fn set_attribute_limit(&mut self, requester: TankId, attribute_name: &str, bound: LimitBound, value: f32) {
        let ok = ClientEvent::apply_attribute_limit(attribute_name, bound, value, &mut self.settings.attribute_limits);
        if ok {
            for tank in self.game.tanks.values_mut() {
                tank.attributes.clamp_all(&self.settings.attribute_limits);
            }
            self.table.broadcast(&ServerEvent::BalanceSettings(self.settings.clone()).to_json());
        } else {
            self.table.unicast(
                requester,
                &ServerEvent::SettingsApplied { success: false, error: Some(format!("unknown attribute {}", attribute_name)) }.to_json(),
            );
        }
    }

    fn unicast_full_snapshot(&mut self, tank_id: TankId) {
        let now_ms = self.game.game_time_ms;
        // Force a full payload regardless of the periodic cache so the
        // joining client always gets a complete world view, without
        // disturbing the shared delta cache other clients rely on.
        let mut throwaway = SnapshotCache::new();
        if let Some(message) = snapshot::build_snapshot(&self.game, &self.settings.tree_params, &self.settings.patch_params, &mut throwaway, now_ms) {
            self.table.unicast(tank_id, &ServerEvent::GameState(message).to_json());
        }
    }

    fn unicast_player_state(&mut self, tank_id: TankId) {
        if let Some(tank) = self.game.tanks.get(&tank_id) {
            let wire = TankWire::from_tank(tank);
            let message = PlayerStateMessage { tank: wire, respawn_ms: tank.timers.respawn_ms.max(0.0) };
            self.table.unicast(tank_id, &ServerEvent::PlayerState(message).to_json());
        }
    }

    fn run_tick(&mut self, elapsed_ms: f32) {
        let steps = self.tick_scheduler.accumulate(elapsed_ms, &mut self.game.skipped_frames);
        for _ in 0..steps {
            let run_ai = self.tick_scheduler.should_run_ai();
            let report = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                tick::step(&mut self.game, &self.settings, &mut self.controllers, &mut self.fire_attempts, run_ai, &mut self.rng)
            }));
            match report {
                Ok(report) => {
                    for damage in report.damage_events {
                        self.table.broadcast(&ServerEvent::DamageFeedback { tank_id: damage.tank_id, shooter_id: damage.shooter_id, fatal: damage.fatal }.to_json());
                    }
                }
                Err(_) => {
                    log::error!("[arena] panic caught at tick boundary, reinitializing");
                    self.reset_game();
                }
            }
        }
    }

    fn maybe_broadcast(&mut self) {
        if !self.priority.due(Category::Broadcast) {
            return;
        }
        let now_ms = self.game.game_time_ms;
        if let Some(message) = snapshot::build_snapshot(&self.game, &self.settings.tree_params, &self.settings.patch_params, &mut self.snapshot_cache, now_ms) {
            self.table.broadcast(&ServerEvent::GameState(message).to_json());
        }
        let tank_ids: Vec<TankId> = self.game.tanks.keys().copied().collect();
        for tank_id in tank_ids {
            self.unicast_player_state(tank_id);
        }
    }
}

fn random_spawn_point(rng: &mut SmallRng) -> tanks_core::Vector2 {
    use config::{ARENA_HEIGHT, ARENA_WIDTH, TANK_MARGIN};
    use rand::Rng;
    tanks_core::Vector2::new(rng.gen_range(TANK_MARGIN..ARENA_WIDTH - TANK_MARGIN), rng.gen_range(TANK_MARGIN..ARENA_HEIGHT - TANK_MARGIN))
}

/// Owns nothing directly reachable from outside `run`; every outside caller
/// talks to the arena only through the `EngineCommand` queue, matching
/// spec.md §5's "no shared mutable state other than through queues."
pub struct Arena;

impl Arena {
    /// Runs the fixed-Δ tick loop until the process receives a shutdown
    /// signal, draining `commands` each wake — the teacher's `Room::run`
    /// shape (`loop { phase; phase; if should_stop { break } }`) generalized
    /// to also service an inbound command queue each iteration.
    pub async fn run(terrain_map_id: String, mut commands: UnboundedReceiver<EngineCommand>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut state = ArenaState::new(&terrain_map_id);
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(1000 / config::TICK_HZ as u64));
        let mut last_tick = tokio::time::Instant::now();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        log::info!("[arena] shutdown signal received, running final tick and broadcast");
                        state.run_tick(config::TICK_DELTA_MS);
                        state.maybe_broadcast();
                        break;
                    }
                }
                _ = interval.tick() => {
                    let now = tokio::time::Instant::now();
                    let elapsed_ms = now.duration_since(last_tick).as_secs_f32() * 1000.0;
                    last_tick = now;

                    while let Ok(command) = commands.try_recv() {
                        state.handle_command(command);
                    }

                    state.run_tick(elapsed_ms);
                    state.maybe_broadcast();
                }
            }
        }
    }
}
