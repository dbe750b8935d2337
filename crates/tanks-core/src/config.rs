//! Configuration aggregate: defaults, partial-merge patches, and the static
//! terrain map table, styled on the teacher's grouped `pub const` blocks in
//! `rbp_core` but gathered into `serde`-derived structs so they can be
//! replaced wholesale via the `updateSettings`/`applySettings` wire events.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ARENA_WIDTH: f32 = 1500.0;
pub const ARENA_HEIGHT: f32 = 900.0;
pub const TANK_MARGIN: f32 = 10.0;
pub const CELL_SIZE: f32 = 50.0;
pub const TICK_HZ: u32 = 60;
pub const TICK_DELTA_MS: f32 = 1000.0 / TICK_HZ as f32;
pub const MAX_CATCHUP_STEPS: u32 = 5;
pub const AI_FRAME_SKIP: u32 = 3;
pub const QUADTREE_THRESHOLD: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Health,
    Speed,
    Gasoline,
    Rotation,
    Ammunition,
    Kinetics,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Health,
        Attribute::Speed,
        Attribute::Gasoline,
        Attribute::Rotation,
        Attribute::Ammunition,
        Attribute::Kinetics,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeLimit {
    pub min: f32,
    pub max: f32,
}

impl AttributeLimit {
    pub fn clamp(self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeLimits(pub HashMap<Attribute, AttributeLimit>);

impl Default for AttributeLimits {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert(Attribute::Health, AttributeLimit { min: 0.0, max: 100.0 });
        map.insert(Attribute::Speed, AttributeLimit { min: 10.0, max: 100.0 });
        map.insert(Attribute::Gasoline, AttributeLimit { min: 0.0, max: 100.0 });
        map.insert(Attribute::Rotation, AttributeLimit { min: 0.5, max: 6.0 });
        map.insert(Attribute::Ammunition, AttributeLimit { min: 0.0, max: 30.0 });
        map.insert(Attribute::Kinetics, AttributeLimit { min: 50.0, max: 400.0 });
        Self(map)
    }
}

impl AttributeLimits {
    pub fn get(&self, attr: Attribute) -> AttributeLimit {
        self.0.get(&attr).copied().unwrap_or(AttributeLimit { min: 0.0, max: f32::MAX })
    }
}

/// `gameParams` — spec.md §6.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameParams {
    pub respawn_time_ms: f32,
    pub reload_time_ms: f32,
    pub shell_lifetime_ms: f32,
    pub gasoline_per_unit: f32,
    pub gasoline_speed_penalty: f32,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            respawn_time_ms: 5000.0,
            reload_time_ms: 1000.0,
            shell_lifetime_ms: 8000.0,
            gasoline_per_unit: 0.02,
            gasoline_speed_penalty: 0.4,
        }
    }
}

/// `damageParams` — per-attribute decrement on a confirmed hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageParams {
    pub health: f32,
    pub speed: f32,
    pub rotation: f32,
    pub kinetics: f32,
    pub gasoline: f32,
}

impl Default for DamageParams {
    fn default() -> Self {
        Self {
            health: 1.0,
            speed: 2.0,
            rotation: 4.0,
            kinetics: 15.0,
            gasoline: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpgradeType {
    Speed,
    Gasoline,
    Rotation,
    Ammunition,
    Kinetics,
    Health,
}

impl UpgradeType {
    pub const ALL: [UpgradeType; 6] = [
        UpgradeType::Speed,
        UpgradeType::Gasoline,
        UpgradeType::Rotation,
        UpgradeType::Ammunition,
        UpgradeType::Kinetics,
        UpgradeType::Health,
    ];

    pub fn attribute(self) -> Attribute {
        match self {
            UpgradeType::Speed => Attribute::Speed,
            UpgradeType::Gasoline => Attribute::Gasoline,
            UpgradeType::Rotation => Attribute::Rotation,
            UpgradeType::Ammunition => Attribute::Ammunition,
            UpgradeType::Kinetics => Attribute::Kinetics,
            UpgradeType::Health => Attribute::Health,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTypeConfig {
    pub value: f32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTypes(pub HashMap<UpgradeType, UpgradeTypeConfig>);

impl Default for UpgradeTypes {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert(UpgradeType::Speed, UpgradeTypeConfig { value: 20.0, count: 3 });
        map.insert(UpgradeType::Gasoline, UpgradeTypeConfig { value: 40.0, count: 3 });
        map.insert(UpgradeType::Rotation, UpgradeTypeConfig { value: 1.0, count: 3 });
        map.insert(UpgradeType::Ammunition, UpgradeTypeConfig { value: 10.0, count: 3 });
        map.insert(UpgradeType::Kinetics, UpgradeTypeConfig { value: 50.0, count: 3 });
        map.insert(UpgradeType::Health, UpgradeTypeConfig { value: 25.0, count: 3 });
        Self(map)
    }
}

/// `treeParams` — spec.md §4.9/§6.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    pub min_trees: u32,
    pub max_trees: u32,
    pub tree_size: f32,
    pub tree_size_variance: f32,
    pub cluster_groups: u32,
    pub clustering: f32,
    pub tree_type: u32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            min_trees: 20,
            max_trees: 40,
            tree_size: 32.0,
            tree_size_variance: 8.0,
            cluster_groups: 4,
            clustering: 40.0,
            tree_type: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchTypeConfig {
    pub enabled: bool,
    pub quantity: u32,
    pub size: f32,
    pub size_variance: f32,
    pub opacity: f32,
    pub blend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchParams {
    pub patch_types: HashMap<String, PatchTypeConfig>,
}

impl Default for PatchParams {
    fn default() -> Self {
        let mut patch_types = HashMap::new();
        patch_types.insert(
            "grass".to_string(),
            PatchTypeConfig { enabled: true, quantity: 12, size: 80.0, size_variance: 20.0, opacity: 0.6, blend: true },
        );
        patch_types.insert(
            "mud".to_string(),
            PatchTypeConfig { enabled: true, quantity: 6, size: 60.0, size_variance: 15.0, opacity: 0.5, blend: true },
        );
        Self { patch_types }
    }
}

/// Difficulty tuning, one row per spec.md §4.6 level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiDifficultyConfig {
    pub decision_interval_ms: f32,
    pub min_shot_interval_ms: f32,
    pub accuracy: f32,
    pub retreat_health_threshold: f32,
    pub engagement_range: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Intermediate,
    Hard,
    Insane,
}

impl AiDifficulty {
    pub fn config(self) -> AiDifficultyConfig {
        match self {
            AiDifficulty::Easy => AiDifficultyConfig {
                decision_interval_ms: 1500.0,
                min_shot_interval_ms: 1800.0,
                accuracy: 0.35,
                retreat_health_threshold: 0.4,
                engagement_range: 220.0,
            },
            AiDifficulty::Intermediate => AiDifficultyConfig {
                decision_interval_ms: 1000.0,
                min_shot_interval_ms: 1200.0,
                accuracy: 0.55,
                retreat_health_threshold: 0.3,
                engagement_range: 260.0,
            },
            AiDifficulty::Hard => AiDifficultyConfig {
                decision_interval_ms: 650.0,
                min_shot_interval_ms: 800.0,
                accuracy: 0.72,
                retreat_health_threshold: 0.25,
                engagement_range: 300.0,
            },
            AiDifficulty::Insane => AiDifficultyConfig {
                decision_interval_ms: 400.0,
                min_shot_interval_ms: 500.0,
                accuracy: 0.88,
                retreat_health_threshold: 0.15,
                engagement_range: 340.0,
            },
        }
    }
}

/// Fixed team table, spec.md §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: &'static str,
    pub color: &'static str,
}

pub const TEAMS: [Team; 3] = [
    Team { name: "NATO", color: "#4a90d9" },
    Team { name: "CSTO", color: "#d94a4a" },
    Team { name: "PLA", color: "#d9b44a" },
];

pub const AI_TEAM: Team = Team { name: "AI", color: "#8a8a8a" };

pub fn team_by_name(name: &str) -> Option<Team> {
    TEAMS.iter().find(|t| t.name.eq_ignore_ascii_case(name)).cloned()
}

/// Static terrain map table, one entry per named map — spec.md §4.9/§6's
/// `GET /api/terrain-maps` surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainMap {
    pub id: String,
    pub name: String,
    pub tree_params: TreeParams,
    pub patch_params: PatchParams,
}

pub fn terrain_maps() -> Vec<TerrainMap> {
    vec![
        TerrainMap {
            id: "default".to_string(),
            name: "Default Arena".to_string(),
            tree_params: TreeParams::default(),
            patch_params: PatchParams::default(),
        },
        TerrainMap {
            id: "forest".to_string(),
            name: "Dense Forest".to_string(),
            tree_params: TreeParams {
                min_trees: 60,
                max_trees: 90,
                clustering: 75.0,
                cluster_groups: 6,
                ..TreeParams::default()
            },
            patch_params: PatchParams::default(),
        },
        TerrainMap {
            id: "open".to_string(),
            name: "Open Field".to_string(),
            tree_params: TreeParams {
                min_trees: 4,
                max_trees: 10,
                clustering: 0.0,
                ..TreeParams::default()
            },
            patch_params: PatchParams::default(),
        },
    ]
}

pub fn terrain_map_by_id(id: &str) -> Option<TerrainMap> {
    terrain_maps().into_iter().find(|m| m.id == id)
}

/// Aggregate settings block, mutated in place by partial `updateSettings`
/// merges — each field replaced wholesale when present in the inbound patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game_params: GameParams,
    pub damage_params: DamageParams,
    pub upgrade_types: UpgradeTypes,
    pub tree_params: TreeParams,
    pub patch_params: PatchParams,
    pub attribute_limits: AttributeLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_params: GameParams::default(),
            damage_params: DamageParams::default(),
            upgrade_types: UpgradeTypes::default(),
            tree_params: TreeParams::default(),
            patch_params: PatchParams::default(),
            attribute_limits: AttributeLimits::default(),
        }
    }
}

/// A partial patch over `Settings`, mirroring the teacher's preference for
/// explicit `Option<_>` partial-update DTOs over a generic JSON merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub game_params: Option<GameParams>,
    pub damage_params: Option<DamageParams>,
    pub upgrade_types: Option<UpgradeTypes>,
    pub tree_params: Option<TreeParams>,
    pub patch_params: Option<PatchParams>,
    pub attribute_limits: Option<AttributeLimits>,
}

impl Settings {
    pub fn apply_patch(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.game_params {
            self.game_params = v;
        }
        if let Some(v) = patch.damage_params {
            self.damage_params = v;
        }
        if let Some(v) = patch.upgrade_types {
            self.upgrade_types = v;
        }
        if let Some(v) = patch.tree_params {
            self.tree_params = v;
        }
        if let Some(v) = patch.patch_params {
            self.patch_params = v;
        }
        if let Some(v) = patch.attribute_limits {
            self.attribute_limits = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_damage_vector() {
        let d = DamageParams::default();
        assert_eq!(d.health, 1.0);
        assert_eq!(d.speed, 2.0);
        assert_eq!(d.rotation, 4.0);
        assert_eq!(d.kinetics, 15.0);
        assert_eq!(d.gasoline, 5.0);
    }

    #[test]
    fn patch_only_replaces_present_fields() {
        let mut settings = Settings::default();
        let original_damage = settings.damage_params;
        settings.apply_patch(SettingsPatch {
            game_params: Some(GameParams { respawn_time_ms: 9000.0, ..GameParams::default() }),
            ..Default::default()
        });
        assert_eq!(settings.game_params.respawn_time_ms, 9000.0);
        assert_eq!(settings.damage_params, original_damage);
    }

    #[test]
    fn team_lookup_is_case_insensitive() {
        assert!(team_by_name("nato").is_some());
        assert!(team_by_name("unknown").is_none());
    }

    #[test]
    fn terrain_map_lookup_finds_known_ids() {
        assert!(terrain_map_by_id("forest").is_some());
        assert!(terrain_map_by_id("nonexistent").is_none());
    }
}
