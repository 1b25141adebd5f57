//! Game state snapshot: the read-only view handed to the UI and the draw
//! pass after every update.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::components::{Base, Player};
use crate::enums::*;

/// Complete snapshot of the simulation at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    /// Engine clock (ms).
    pub time_ms: f64,
    pub paused: bool,
    pub game_over: bool,
    pub player: Player,
    pub base: Base,
    pub enemies: Vec<EnemyView>,
    pub bullets: Vec<BulletView>,
    pub particles: Vec<ParticleView>,
    pub pickups: Vec<PickupView>,
    pub buildings: Vec<BuildingView>,
    pub power_links: Vec<PowerLink>,
    pub wave: WaveView,
    pub ammo: AmmoView,
    pub placement_mode: bool,
    pub placement_type: Option<String>,
    pub placement_preview: Option<PlacementPreview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub position: DVec2,
    pub size: f64,
    pub color: String,
    pub kind: EnemyKind,
    pub health: f64,
    pub max_health: f64,
    pub target: TargetKind,
    /// Hit within the last flash window.
    pub flashing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    pub position: DVec2,
    pub size: f64,
    pub color: String,
    pub source: BulletSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub position: DVec2,
    pub size: f64,
    pub color: String,
    /// Remaining life as a fraction of the starting life.
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupView {
    pub position: DVec2,
    pub size: f64,
    pub color: String,
    pub tier: ResourceTier,
    pub value: u32,
    pub being_collected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingView {
    pub id: u32,
    pub type_id: String,
    pub status: BuildingStatus,
    pub position: DVec2,
    pub size: f64,
    pub color: String,
    pub health: f64,
    pub max_health: f64,
    pub powered_by: Vec<u32>,
    pub connected_to: Vec<u32>,
    /// Construction progress in `[0, 1]`.
    pub construction_progress: f64,
}

/// One pylon-to-consumer power connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerLink {
    pub pylon_id: u32,
    pub building_id: u32,
    pub from: DVec2,
    pub to: DVec2,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveView {
    pub number: u32,
    pub phase: WavePhase,
    pub time_remaining_ms: f64,
    pub enemies_total: u32,
    pub enemies_spawned: u32,
    pub enemies_alive: u32,
    pub is_boss_wave: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmmoView {
    pub current: u32,
    pub max: u32,
}

/// Result of validating the pointer position in placement mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementPreview {
    pub type_id: String,
    pub position: DVec2,
    pub size: f64,
    pub valid: bool,
    /// Human-readable reasons the placement would be rejected.
    pub conflicts: Vec<String>,
}
