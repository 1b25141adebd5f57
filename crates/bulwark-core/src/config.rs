//! Tunable game configuration.
//!
//! One nested tree covering every subsystem. The engine treats it as
//! injected data: it never reads files, and a new config can be patched in
//! at any time with [`GameConfig::patched`].

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::components::Currencies;
use crate::enums::{BaseUpgradeKind, EnemyKind, ResourceTier, StatKind};
use crate::error::ConfigError;
use crate::math::Bounds;

/// Root of the configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub enemies: EnemiesConfig,
    pub weapons: WeaponsConfig,
    pub movement: MovementConfig,
    pub canvas: CanvasConfig,
    pub particles: ParticlesConfig,
    pub resources: ResourcesConfig,
    pub base: BaseConfig,
    pub wave: WaveConfig,
    pub buildings: BuildingsConfig,
    pub stats: StatUpgradesConfig,
}

impl GameConfig {
    /// Deep-merge a partial JSON document over this config.
    ///
    /// Objects merge key by key, any other value replaces the old one and
    /// `null` leaves the field untouched. An empty object is a no-op.
    pub fn patched(&self, patch: &Value) -> Result<GameConfig, ConfigError> {
        if !patch.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let mut doc = serde_json::to_value(self)?;
        merge_patch(&mut doc, patch);
        Ok(serde_json::from_value(doc)?)
    }
}

/// Recursively merge `patch` into `target`.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                if value.is_null() {
                    continue;
                }
                let nested =
                    value.is_object() && target_map.get(key).is_some_and(Value::is_object);
                if nested {
                    if let Some(slot) = target_map.get_mut(key) {
                        merge_patch(slot, value);
                    }
                } else {
                    target_map.insert(key.clone(), value.clone());
                }
            }
        }
        (target, patch) => {
            if !patch.is_null() {
                *target = patch.clone();
            }
        }
    }
}

// --- Player ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub starting_health: f64,
    /// Units moved per tick per held direction key.
    pub starting_speed: f64,
    pub starting_level: u32,
    pub starting_position: DVec2,
    pub size: f64,
    pub color: String,
    pub experience_per_level: u32,
    pub health_per_level: f64,
    pub speed_per_level: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            starting_health: 3.0,
            starting_speed: 10.0,
            starting_level: 1,
            starting_position: DVec2::new(960.0, 760.0),
            size: 8.0,
            color: "#00ffff".into(),
            experience_per_level: 10,
            health_per_level: 1.0,
            speed_per_level: 0.2,
        }
    }
}

// --- Enemies ---

/// Base stats of one enemy archetype, before wave scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeConfig {
    pub size: f64,
    pub color: String,
    pub health: f64,
    /// Units moved per tick toward the current target.
    pub speed: f64,
    pub experience_value: u32,
    /// Damage dealt to the base on contact, before armor.
    pub base_damage: f64,
    /// Chance per spawn on elite-eligible waves. Only read for elites.
    pub spawn_chance: f64,
    /// Range at which the archetype switches from the base to the player.
    /// `None` means the archetype never chases the player.
    pub detection_radius: Option<f64>,
}

impl Default for ArchetypeConfig {
    fn default() -> Self {
        Self {
            size: 6.0,
            color: "#ff0066".into(),
            health: 1.0,
            speed: 1.0,
            experience_value: 1,
            base_damage: 10.0,
            spawn_chance: 0.0,
            detection_radius: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemiesConfig {
    /// Random extra speed in `[0, speed_variation)` added at spawn.
    pub speed_variation: f64,
    /// Minimum gap between spawns on wave 1 (ms).
    pub wave_spawn_delay_ms: f64,
    pub basic: ArchetypeConfig,
    pub elite: ArchetypeConfig,
    pub boss: ArchetypeConfig,
}

impl EnemiesConfig {
    pub fn archetype(&self, kind: EnemyKind) -> &ArchetypeConfig {
        match kind {
            EnemyKind::Basic => &self.basic,
            EnemyKind::Elite => &self.elite,
            EnemyKind::Boss => &self.boss,
        }
    }
}

impl Default for EnemiesConfig {
    fn default() -> Self {
        Self {
            speed_variation: 1.5,
            wave_spawn_delay_ms: 500.0,
            basic: ArchetypeConfig::default(),
            elite: ArchetypeConfig {
                size: 10.0,
                color: "#ff6600".into(),
                health: 3.0,
                speed: 1.2,
                experience_value: 3,
                base_damage: 20.0,
                spawn_chance: 0.25,
                detection_radius: Some(60.0),
            },
            boss: ArchetypeConfig {
                size: 20.0,
                color: "#aa00ff".into(),
                health: 20.0,
                speed: 0.8,
                experience_value: 10,
                base_damage: 50.0,
                spawn_chance: 0.0,
                detection_radius: Some(120.0),
            },
        }
    }
}

// --- Weapons ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponsConfig {
    pub shoot_cooldown_ms: f64,
    pub bullet_speed: f64,
    pub bullet_size: f64,
    pub bullet_color: String,
    pub damage: f64,
    pub max_ammo: u32,
    /// Ammo regained per second.
    pub ammo_regen_rate: f64,
}

impl WeaponsConfig {
    /// Time between two regenerated rounds (ms).
    pub fn regen_interval_ms(&self) -> f64 {
        if self.ammo_regen_rate > 0.0 {
            1000.0 / self.ammo_regen_rate
        } else {
            f64::INFINITY
        }
    }
}

impl Default for WeaponsConfig {
    fn default() -> Self {
        Self {
            shoot_cooldown_ms: 300.0,
            bullet_speed: 8.0,
            bullet_size: 3.0,
            bullet_color: "#00ff00".into(),
            damage: 1.0,
            max_ammo: 20,
            ammo_regen_rate: 2.0,
        }
    }
}

// --- Movement ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub shoot: String,
    pub pause: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: "w".into(),
            down: "s".into(),
            left: "a".into(),
            right: "d".into(),
            shoot: " ".into(),
            pause: "p".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub key_bindings: KeyBindings,
}

// --- Canvas ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub background_color: String,
    pub grid_size: f64,
    pub grid_color: String,
    pub show_grid: bool,
}

impl CanvasConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            background_color: "#000011".into(),
            grid_size: 40.0,
            grid_color: "#001122".into(),
            show_grid: true,
        }
    }
}

// --- Particles ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlesConfig {
    pub explosion_count: u32,
    pub explosion_speed: f64,
    pub explosion_life: f64,
    pub explosion_size: f64,
    /// Velocity multiplier applied every tick.
    pub friction: f64,
    /// Life removed every tick.
    pub life_decay: f64,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            explosion_count: 8,
            explosion_speed: 2.0,
            explosion_life: 1.0,
            explosion_size: 2.0,
            friction: 0.98,
            life_decay: 0.02,
        }
    }
}

// --- Resources ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Base probability of this tier dropping from its primary archetype.
    pub drop_rate: f64,
    pub min_value: u32,
    pub max_value: u32,
    pub max_capacity: u32,
    pub color: String,
    pub size: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            drop_rate: 0.8,
            min_value: 1,
            max_value: 3,
            max_capacity: 999,
            color: "#44ddff".into(),
            size: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub energy_crystal: TierConfig,
    pub quantum_core: TierConfig,
    pub essence_fragment: TierConfig,
    pub pickup_distance: f64,
    pub pickup_duration_ms: f64,
    /// Time an uncollected pickup stays on the field (ms).
    pub lifetime_ms: f64,
}

impl ResourcesConfig {
    pub fn tier(&self, tier: ResourceTier) -> &TierConfig {
        match tier {
            ResourceTier::EnergyCrystal => &self.energy_crystal,
            ResourceTier::QuantumCore => &self.quantum_core,
            ResourceTier::EssenceFragment => &self.essence_fragment,
        }
    }

    /// Per-tier storage limits.
    pub fn capacity(&self) -> Currencies {
        Currencies {
            energy_crystals: self.energy_crystal.max_capacity,
            quantum_cores: self.quantum_core.max_capacity,
            essence_fragments: self.essence_fragment.max_capacity,
        }
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            energy_crystal: TierConfig::default(),
            quantum_core: TierConfig {
                drop_rate: 0.5,
                min_value: 1,
                max_value: 1,
                max_capacity: 99,
                color: "#ff44ff".into(),
                size: 7.0,
            },
            essence_fragment: TierConfig {
                drop_rate: 1.0,
                min_value: 1,
                max_value: 2,
                max_capacity: 50,
                color: "#ffaa00".into(),
                size: 8.0,
            },
            pickup_distance: 30.0,
            pickup_duration_ms: 300.0,
            lifetime_ms: 10_000.0,
        }
    }
}

// --- Base ---

/// One upgrade track: `levels[n]` is the value granted when buying level
/// `n + 1`, paid with `costs[n]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTrack {
    pub levels: Vec<f64>,
    pub costs: Vec<Currencies>,
}

impl UpgradeTrack {
    pub fn max_level(&self) -> u32 {
        self.levels.len().min(self.costs.len()) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseUpgradesConfig {
    pub health: UpgradeTrack,
    pub armor: UpgradeTrack,
    pub shield: UpgradeTrack,
    pub turrets: UpgradeTrack,
}

impl BaseUpgradesConfig {
    pub fn track(&self, kind: BaseUpgradeKind) -> &UpgradeTrack {
        match kind {
            BaseUpgradeKind::Health => &self.health,
            BaseUpgradeKind::Armor => &self.armor,
            BaseUpgradeKind::Shield => &self.shield,
            BaseUpgradeKind::Turrets => &self.turrets,
        }
    }
}

fn costs(entries: &[(u32, u32, u32)]) -> Vec<Currencies> {
    entries
        .iter()
        .map(|&(e, q, s)| Currencies::new(e, q, s))
        .collect()
}

impl Default for BaseUpgradesConfig {
    fn default() -> Self {
        Self {
            health: UpgradeTrack {
                levels: vec![150.0, 200.0, 300.0, 400.0],
                costs: costs(&[(20, 0, 0), (40, 1, 0), (80, 2, 0), (150, 3, 1)]),
            },
            armor: UpgradeTrack {
                levels: vec![0.1, 0.2, 0.3, 0.4],
                costs: costs(&[(30, 0, 0), (60, 1, 0), (100, 2, 0), (160, 3, 1)]),
            },
            shield: UpgradeTrack {
                levels: vec![25.0, 50.0, 100.0, 150.0],
                costs: costs(&[(40, 1, 0), (80, 2, 0), (120, 3, 1), (200, 4, 2)]),
            },
            turrets: UpgradeTrack {
                levels: vec![1.0, 2.0, 3.0, 4.0],
                costs: costs(&[(50, 1, 0), (100, 2, 0), (150, 3, 1), (250, 5, 2)]),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub starting_health: f64,
    pub max_health: f64,
    /// Health regained per second once repair kicks in.
    pub repair_rate: f64,
    /// Quiet time after the last hit before repair starts (ms).
    pub repair_delay_ms: f64,
    pub position: DVec2,
    pub size: f64,
    pub color: String,
    pub upgrades: BaseUpgradesConfig,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            starting_health: 100.0,
            max_health: 100.0,
            repair_rate: 2.0,
            repair_delay_ms: 5000.0,
            position: DVec2::new(960.0, 540.0),
            size: 40.0,
            color: "#4488ff".into(),
            upgrades: BaseUpgradesConfig::default(),
        }
    }
}

// --- Waves ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyScaling {
    pub health_multiplier: f64,
    pub speed_multiplier: f64,
    pub spawn_rate_multiplier: f64,
}

impl Default for DifficultyScaling {
    fn default() -> Self {
        Self {
            health_multiplier: 1.15,
            speed_multiplier: 1.05,
            spawn_rate_multiplier: 1.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub preparation_duration_ms: f64,
    pub combat_duration_ms: f64,
    pub intermission_duration_ms: f64,
    /// Route completed waves through UPGRADE_INTERMISSION.
    pub intermission_enabled: bool,
    pub difficulty_scaling: DifficultyScaling,
    /// Every n-th wave (from wave n on) is a boss wave. 0 disables bosses.
    pub boss_wave_interval: u32,
    pub elite_wave_start: u32,
    pub base_enemies_per_wave: u32,
    pub enemies_per_wave_increase: u32,
}

impl WaveConfig {
    pub fn is_boss_wave(&self, wave: u32) -> bool {
        self.boss_wave_interval > 0
            && wave >= self.boss_wave_interval
            && wave % self.boss_wave_interval == 0
    }

    pub fn elites_enabled(&self, wave: u32) -> bool {
        wave >= self.elite_wave_start
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            preparation_duration_ms: 10_000.0,
            combat_duration_ms: 90_000.0,
            intermission_duration_ms: 30_000.0,
            intermission_enabled: false,
            difficulty_scaling: DifficultyScaling::default(),
            boss_wave_interval: 5,
            elite_wave_start: 3,
            base_enemies_per_wave: 5,
            enemies_per_wave_increase: 2,
        }
    }
}

// --- Buildings ---

/// Combat and support effects a building type provides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingEffects {
    pub damage: Option<f64>,
    pub range: Option<f64>,
    /// Minimum time between two turret shots (ms).
    pub fire_rate_ms: Option<f64>,
    pub shield_strength: Option<f64>,
    pub resource_bonus: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingTypeConfig {
    pub name: String,
    pub description: String,
    pub size: f64,
    pub color: String,
    /// Shown to the player; placement itself does not charge it.
    pub cost: Currencies,
    pub required_level: u32,
    pub max_count: Option<u32>,
    pub requires_power: bool,
    pub power_consumption: u32,
    pub power_generation: u32,
    /// Present on generators: how many consumers one instance can feed.
    pub max_connections: Option<usize>,
    pub health: f64,
    pub effects: BuildingEffects,
}

impl BuildingTypeConfig {
    pub fn generates_power(&self) -> bool {
        self.power_generation > 0
    }
}

impl Default for BuildingTypeConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            size: 12.0,
            color: "#ffffff".into(),
            cost: Currencies::default(),
            required_level: 1,
            max_count: None,
            requires_power: false,
            power_consumption: 0,
            power_generation: 0,
            max_connections: None,
            health: 50.0,
            effects: BuildingEffects::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingsConfig {
    pub types: BTreeMap<String, BuildingTypeConfig>,
    /// Player level -> building type ids unlocked at that level.
    pub level_restrictions: BTreeMap<u32, Vec<String>>,
}

impl BuildingsConfig {
    /// Building ids available at `level`. Levels past the highest listed
    /// entry inherit that entry.
    pub fn available_at(&self, level: u32) -> &[String] {
        self.level_restrictions
            .range(..=level)
            .next_back()
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for BuildingsConfig {
    fn default() -> Self {
        let mut types = BTreeMap::new();
        types.insert(
            "pylon".to_string(),
            BuildingTypeConfig {
                name: "Power Pylon".into(),
                description: "Generates power for up to two nearby buildings.".into(),
                size: 12.0,
                color: "#ffff00".into(),
                cost: Currencies::new(25, 0, 0),
                required_level: 1,
                power_generation: 2,
                max_connections: Some(2),
                health: 50.0,
                ..Default::default()
            },
        );
        types.insert(
            "turret".to_string(),
            BuildingTypeConfig {
                name: "Auto Turret".into(),
                description: "Shoots the nearest enemy in range while powered.".into(),
                size: 16.0,
                color: "#00ff00".into(),
                cost: Currencies::new(75, 1, 0),
                required_level: 2,
                requires_power: true,
                power_consumption: 1,
                health: 75.0,
                effects: BuildingEffects {
                    damage: Some(2.0),
                    range: Some(100.0),
                    fire_rate_ms: Some(500.0),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        types.insert(
            "shield".to_string(),
            BuildingTypeConfig {
                name: "Shield Generator".into(),
                description: "Projects an energy shield over nearby structures.".into(),
                size: 18.0,
                color: "#0088ff".into(),
                cost: Currencies::new(100, 2, 0),
                required_level: 3,
                requires_power: true,
                power_consumption: 1,
                health: 60.0,
                effects: BuildingEffects {
                    shield_strength: Some(100.0),
                    range: Some(80.0),
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        let tier1 = vec!["pylon".to_string()];
        let tier2 = vec!["pylon".to_string(), "turret".to_string()];
        let tier3 = vec![
            "pylon".to_string(),
            "turret".to_string(),
            "shield".to_string(),
        ];
        let mut level_restrictions = BTreeMap::new();
        level_restrictions.insert(1, tier1);
        level_restrictions.insert(2, tier2);
        level_restrictions.insert(3, tier3.clone());
        level_restrictions.insert(4, tier3.clone());
        level_restrictions.insert(5, tier3);

        Self {
            types,
            level_restrictions,
        }
    }
}

// --- Player stat upgrades ---

/// One purchasable stat: each level adds `per_level` and costs `cost`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatUpgradeConfig {
    pub per_level: f64,
    pub max_level: u32,
    pub cost: Currencies,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatUpgradesConfig {
    pub health: StatUpgradeConfig,
    pub speed: StatUpgradeConfig,
    pub damage: StatUpgradeConfig,
    /// `per_level` is milliseconds shaved off the shot cooldown.
    pub fire_rate: StatUpgradeConfig,
    pub luck: StatUpgradeConfig,
    pub armor: StatUpgradeConfig,
}

impl StatUpgradesConfig {
    pub fn stat(&self, kind: StatKind) -> &StatUpgradeConfig {
        match kind {
            StatKind::Health => &self.health,
            StatKind::Speed => &self.speed,
            StatKind::Damage => &self.damage,
            StatKind::FireRate => &self.fire_rate,
            StatKind::Luck => &self.luck,
            StatKind::Armor => &self.armor,
        }
    }
}

impl Default for StatUpgradesConfig {
    fn default() -> Self {
        Self {
            health: StatUpgradeConfig {
                per_level: 1.0,
                max_level: 10,
                cost: Currencies::new(30, 0, 0),
            },
            speed: StatUpgradeConfig {
                per_level: 0.3,
                max_level: 8,
                cost: Currencies::new(25, 0, 0),
            },
            damage: StatUpgradeConfig {
                per_level: 1.0,
                max_level: 6,
                cost: Currencies::new(40, 1, 0),
            },
            fire_rate: StatUpgradeConfig {
                per_level: 40.0,
                max_level: 5,
                cost: Currencies::new(35, 0, 0),
            },
            luck: StatUpgradeConfig {
                per_level: 0.15,
                max_level: 5,
                cost: Currencies::new(50, 1, 0),
            },
            armor: StatUpgradeConfig {
                per_level: 0.1,
                max_level: 4,
                cost: Currencies::new(60, 2, 0),
            },
        }
    }
}
