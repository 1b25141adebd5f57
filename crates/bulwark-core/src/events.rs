//! Events emitted by the simulation.
//!
//! Every state change a subsystem wants the rest of the world to know about
//! is reported as a [`GameEvent`]. The engine gathers them for one update and
//! exposes them until the next update starts.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::components::Currencies;
use crate::enums::*;

/// A tagged event plus the engine time it was raised at.
///
/// Serializes flat: `{"type": "ENEMY_SPAWNED", ..., "timestamp": 1234.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    #[serde(flatten)]
    pub kind: GameEventKind,
    /// Engine clock in milliseconds.
    pub timestamp: f64,
}

impl GameEvent {
    pub fn new(kind: GameEventKind, timestamp: f64) -> Self {
        Self { kind, timestamp }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEventKind {
    // --- Waves ---
    WaveCombatStarted {
        wave: u32,
        enemy_quota: u32,
        is_boss_wave: bool,
    },
    WaveCompleted {
        wave: u32,
    },
    WavePreparationStarted {
        wave: u32,
    },
    WaveIntermissionStarted {
        wave: u32,
    },

    // --- Enemies ---
    EnemySpawned {
        kind: EnemyKind,
        position: DVec2,
        health: f64,
        speed: f64,
    },
    EnemyDamaged {
        kind: EnemyKind,
        damage: f64,
        remaining_health: f64,
    },
    EnemyDestroyed {
        kind: EnemyKind,
        position: DVec2,
        cause: DestroyCause,
    },

    // --- Projectiles & effects ---
    BulletFired {
        position: DVec2,
        velocity: DVec2,
        source: BulletSource,
    },
    BulletDestroyed {
        position: DVec2,
    },
    ExplosionCreated {
        position: DVec2,
        particles: u32,
    },

    // --- Player ---
    PlayerMoved {
        position: DVec2,
    },
    PlayerDamageTaken {
        damage: f64,
        health: f64,
    },
    PlayerExperienceGained {
        amount: u32,
        experience: u32,
    },
    PlayerLevelUp {
        level: u32,
        levels_gained: u32,
    },
    PlayerDeath,
    StatUpgraded {
        stat: StatKind,
        level: u32,
        cost: Currencies,
    },

    // --- Base ---
    BaseShieldDamaged {
        damage: f64,
        shield: f64,
        max_shield: f64,
    },
    BaseDamaged {
        damage: f64,
        health: f64,
        max_health: f64,
    },
    BaseDestroyed,
    BaseRepaired {
        amount: f64,
        health: f64,
    },
    BaseUpgraded {
        upgrade: BaseUpgradeKind,
        level: u32,
        cost: Currencies,
    },

    // --- Resources ---
    ResourceDropped {
        tier: ResourceTier,
        value: u32,
        position: DVec2,
    },
    ResourcePickupStarted {
        tier: ResourceTier,
        value: u32,
    },
    /// Carries the credit to the player's wallet.
    ResourceCollected {
        tier: ResourceTier,
        value: u32,
    },
    ResourceExpired {
        tier: ResourceTier,
    },

    // --- Buildings ---
    BuildingPlaced {
        building_id: u32,
        type_id: String,
        position: DVec2,
    },
    BuildingConstructed {
        building_id: u32,
    },
    BuildingPowered {
        building_id: u32,
    },
    BuildingUnpowered {
        building_id: u32,
    },
    /// Carries the turret's projectile to the engine, which spawns it.
    TurretFired {
        building_id: u32,
        origin: DVec2,
        target: DVec2,
        damage: f64,
    },
    PlacementModeStarted {
        type_id: String,
    },
    PlacementModeCancelled,

    // --- Lifecycle ---
    GamePaused,
    GameResumed,
    GameOver {
        wave: u32,
        reason: GameOverReason,
    },
    GameReset,
}
