//! Shared enumerations for the simulation.

use serde::{Deserialize, Serialize};

/// Enemy sub-type. Drives stats, targeting and drop table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Basic,
    Elite,
    Boss,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Elite, EnemyKind::Boss];
}

/// Phase of the wave cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WavePhase {
    #[default]
    Preparation,
    Combat,
    UpgradeIntermission,
}

/// The three currency tiers dropped by enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTier {
    /// Tier 1.
    EnergyCrystal,
    /// Tier 2.
    QuantumCore,
    /// Tier 3.
    EssenceFragment,
}

/// Lifecycle status of a placed building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingStatus {
    Placing,
    #[default]
    Constructing,
    Active,
    Powered,
    Unpowered,
    Destroyed,
}

impl BuildingStatus {
    /// Construction is finished and the building is not destroyed.
    pub fn is_operational(self) -> bool {
        matches!(
            self,
            BuildingStatus::Active | BuildingStatus::Powered | BuildingStatus::Unpowered
        )
    }
}

/// Who fired a projectile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletSource {
    #[default]
    Player,
    Turret,
}

/// Purchasable player stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Health,
    Speed,
    Damage,
    FireRate,
    Luck,
    Armor,
}

impl StatKind {
    pub const ALL: [StatKind; 6] = [
        StatKind::Health,
        StatKind::Speed,
        StatKind::Damage,
        StatKind::FireRate,
        StatKind::Luck,
        StatKind::Armor,
    ];
}

/// Purchasable base upgrade track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseUpgradeKind {
    Health,
    Armor,
    Shield,
    Turrets,
}

impl BaseUpgradeKind {
    pub const ALL: [BaseUpgradeKind; 4] = [
        BaseUpgradeKind::Health,
        BaseUpgradeKind::Armor,
        BaseUpgradeKind::Shield,
        BaseUpgradeKind::Turrets,
    ];
}

/// What an enemy is currently steering toward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    #[default]
    Base,
    Player,
}

/// What removed an enemy from the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestroyCause {
    Projectile,
    BaseImpact,
    PlayerImpact,
}

/// Which terminal condition ended the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    PlayerDestroyed,
    BaseDestroyed,
}
