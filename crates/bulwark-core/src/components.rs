//! Entity records.
//!
//! Transient entities (enemies, bullets, particles, pickups, buildings) are
//! hecs entities composed from the shared [`Position`], [`Velocity`],
//! [`Size`] and [`Color`] components plus one role component. The player
//! and the base are singletons owned directly by the engine.
//!
//! Components are plain data. Game logic lives in systems.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::BuildingEffects;
use crate::enums::*;

// --- Shared traits ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// Displacement applied per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

/// Side length of the entity's square footprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size(pub f64);

/// CSS-style color string handed through to the draw pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Color(pub String);

// --- Currencies ---

/// Balance (or price) in the three currency tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Currencies {
    pub energy_crystals: u32,
    pub quantum_cores: u32,
    pub essence_fragments: u32,
}

impl Currencies {
    pub const fn new(energy_crystals: u32, quantum_cores: u32, essence_fragments: u32) -> Self {
        Self {
            energy_crystals,
            quantum_cores,
            essence_fragments,
        }
    }

    pub fn get(&self, tier: ResourceTier) -> u32 {
        match tier {
            ResourceTier::EnergyCrystal => self.energy_crystals,
            ResourceTier::QuantumCore => self.quantum_cores,
            ResourceTier::EssenceFragment => self.essence_fragments,
        }
    }

    fn slot_mut(&mut self, tier: ResourceTier) -> &mut u32 {
        match tier {
            ResourceTier::EnergyCrystal => &mut self.energy_crystals,
            ResourceTier::QuantumCore => &mut self.quantum_cores,
            ResourceTier::EssenceFragment => &mut self.essence_fragments,
        }
    }

    /// Credit `amount` to one tier without exceeding `capacity` for it.
    /// Returns the amount actually added.
    pub fn credit(&mut self, tier: ResourceTier, amount: u32, capacity: &Currencies) -> u32 {
        let cap = capacity.get(tier);
        let slot = self.slot_mut(tier);
        let before = *slot;
        *slot = slot.saturating_add(amount).min(cap.max(before));
        *slot - before
    }

    /// Lower every tier to at most its capacity.
    pub fn clamp_to(&mut self, capacity: &Currencies) {
        self.energy_crystals = self.energy_crystals.min(capacity.energy_crystals);
        self.quantum_cores = self.quantum_cores.min(capacity.quantum_cores);
        self.essence_fragments = self.essence_fragments.min(capacity.essence_fragments);
    }

    pub fn covers(&self, cost: &Currencies) -> bool {
        self.energy_crystals >= cost.energy_crystals
            && self.quantum_cores >= cost.quantum_cores
            && self.essence_fragments >= cost.essence_fragments
    }

    /// Deduct `cost` if affordable. Leaves the balance untouched otherwise.
    pub fn try_spend(&mut self, cost: &Currencies) -> bool {
        if !self.covers(cost) {
            return false;
        }
        self.energy_crystals -= cost.energy_crystals;
        self.quantum_cores -= cost.quantum_cores;
        self.essence_fragments -= cost.essence_fragments;
        true
    }
}

// --- Singletons ---

/// Purchased level per player stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLevels {
    pub health: u32,
    pub speed: u32,
    pub damage: u32,
    pub fire_rate: u32,
    pub luck: u32,
    pub armor: u32,
}

impl StatLevels {
    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Health => self.health,
            StatKind::Speed => self.speed,
            StatKind::Damage => self.damage,
            StatKind::FireRate => self.fire_rate,
            StatKind::Luck => self.luck,
            StatKind::Armor => self.armor,
        }
    }

    pub fn get_mut(&mut self, kind: StatKind) -> &mut u32 {
        match kind {
            StatKind::Health => &mut self.health,
            StatKind::Speed => &mut self.speed,
            StatKind::Damage => &mut self.damage,
            StatKind::FireRate => &mut self.fire_rate,
            StatKind::Luck => &mut self.luck,
            StatKind::Armor => &mut self.armor,
        }
    }
}

/// The single player avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: DVec2,
    pub velocity: DVec2,
    pub size: f64,
    pub color: String,
    pub health: f64,
    pub max_health: f64,
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    /// Units moved per tick per held direction key.
    pub speed: f64,
    pub currencies: Currencies,
    pub stat_levels: StatLevels,
    // Derived from config plus stat levels.
    pub damage: f64,
    pub shoot_cooldown_ms: f64,
    /// Additive drop-chance bonus (0.15 = +15%).
    pub luck: f64,
    /// Fraction of ramming damage ignored.
    pub armor: f64,
    /// Set once a death event has been emitted.
    pub dead: bool,
}

/// Purchased level per base upgrade track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUpgradeLevels {
    pub health: u32,
    pub armor: u32,
    pub shield: u32,
    pub turrets: u32,
}

impl BaseUpgradeLevels {
    pub fn get(&self, kind: BaseUpgradeKind) -> u32 {
        match kind {
            BaseUpgradeKind::Health => self.health,
            BaseUpgradeKind::Armor => self.armor,
            BaseUpgradeKind::Shield => self.shield,
            BaseUpgradeKind::Turrets => self.turrets,
        }
    }

    pub fn get_mut(&mut self, kind: BaseUpgradeKind) -> &mut u32 {
        match kind {
            BaseUpgradeKind::Health => &mut self.health,
            BaseUpgradeKind::Armor => &mut self.armor,
            BaseUpgradeKind::Shield => &mut self.shield,
            BaseUpgradeKind::Turrets => &mut self.turrets,
        }
    }
}

/// The defended structure. Destruction ends the game; it is never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub position: DVec2,
    pub size: f64,
    pub color: String,
    pub health: f64,
    pub max_health: f64,
    pub shield: f64,
    pub max_shield: f64,
    /// Fractional damage reduction in `[0, 1]`.
    pub armor: f64,
    /// Health per second.
    pub repair_rate: f64,
    pub last_damage_ms: Option<f64>,
    pub upgrade_levels: BaseUpgradeLevels,
    pub destroyed: bool,
}

// --- Role components ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub speed: f64,
    pub health: f64,
    pub max_health: f64,
    pub experience_value: u32,
    pub base_damage: f64,
    /// Wave the enemy was spawned in.
    pub wave: u32,
    /// Engine time of the last non-lethal hit.
    pub hit_flash_ms: Option<f64>,
    pub target: TargetKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub damage: f64,
    pub source: BulletSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub life: f64,
    pub max_life: f64,
}

/// A currency drop lying on the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub tier: ResourceTier,
    pub value: u32,
    pub life_ms: f64,
    pub max_life_ms: f64,
    /// Size before the pickup animation starts shrinking it.
    pub base_size: f64,
    /// Engine time the pickup animation started.
    pub pickup_started_ms: Option<f64>,
    pub credited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Stable id, unique for the lifetime of the engine.
    pub id: u32,
    pub type_id: String,
    pub status: BuildingStatus,
    pub health: f64,
    pub max_health: f64,
    pub level: u32,
    /// Pylon ids feeding this building.
    pub powered_by: Vec<u32>,
    /// Consumer ids this pylon feeds.
    pub connected_to: Vec<u32>,
    pub construction_started_ms: f64,
    pub construction_duration_ms: f64,
    pub last_fire_ms: Option<f64>,
    pub effects: BuildingEffects,
}
