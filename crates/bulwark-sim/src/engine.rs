//! Simulation engine: the orchestrator of the wave-survival game.
//!
//! `SimulationEngine` owns the hecs world and every singleton, runs the
//! subsystems in a fixed order on each `update`, and exposes the query and
//! mutator surface the UI binds to. Completely headless; the same seed,
//! deltas and inputs always produce the same snapshots.

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::{debug, info};

use bulwark_core::components::{Base, Player};
use bulwark_core::config::{BuildingTypeConfig, GameConfig};
use bulwark_core::constants::{ESCAPE_KEY, PAUSE_DEBOUNCE_MS};
use bulwark_core::enums::{BaseUpgradeKind, EnemyKind, GameOverReason, StatKind, WavePhase};
use bulwark_core::error::{ConfigError, PlacementError, UpgradeError};
use bulwark_core::events::{GameEvent, GameEventKind};
use bulwark_core::input::InputSnapshot;
use bulwark_core::state::{GameStateSnapshot, PlacementPreview};

use crate::render::{self, DrawSurface};
use crate::systems;
use crate::systems::snapshot::SnapshotContext;
use crate::systems::wave::WaveState;
use crate::systems::weapon::WeaponState;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub game: GameConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            game: GameConfig::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    config: GameConfig,
    seed: u64,
    rng: ChaCha8Rng,
    world: World,
    /// Wall clock: sum of every delta. Drives the wave timer and pause
    /// debounce.
    now_ms: f64,
    /// Simulation clock: advances only while unpaused. Every other timer
    /// reads this one.
    sim_ms: f64,

    player: Player,
    base: Base,
    wave: WaveState,
    weapon: WeaponState,

    placement_type: Option<String>,
    placement_preview: Option<PlacementPreview>,
    next_building_id: u32,

    paused: bool,
    pause_key_was_down: bool,
    last_pause_toggle_ms: Option<f64>,
    game_over: bool,

    /// Events from the most recent update.
    events: Vec<GameEvent>,
    /// Events raised by mutators between updates.
    pending: Vec<GameEvent>,
    despawn_buffer: Vec<hecs::Entity>,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        let game = config.game;
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            seed: config.seed,
            world: World::new(),
            now_ms: 0.0,
            sim_ms: 0.0,
            player: world_setup::new_player(&game),
            base: world_setup::new_base(&game),
            wave: WaveState::new(&game.wave, 0.0),
            weapon: WeaponState::new(&game.weapons, 0.0),
            placement_type: None,
            placement_preview: None,
            next_building_id: 1,
            paused: false,
            pause_key_was_down: false,
            last_pause_toggle_ms: None,
            game_over: false,
            events: Vec::new(),
            pending: Vec::new(),
            despawn_buffer: Vec::new(),
            config: game,
        }
    }

    /// Advance the simulation by `delta_ms` of wall-clock time.
    pub fn update(&mut self, delta_ms: f64, input: &InputSnapshot) {
        self.events.clear();
        self.events.append(&mut self.pending);
        if self.game_over {
            return;
        }

        let delta_ms = delta_ms.max(0.0);
        self.now_ms += delta_ms;

        self.handle_pause_key(input);

        // The phase timer keeps running while paused.
        systems::wave::run(&mut self.wave, &self.config.wave, self.now_ms, &mut self.events);
        if self.paused {
            return;
        }

        self.sim_ms += delta_ms;
        let now = self.sim_ms;

        systems::movement::run(&mut self.player, input, &self.config, now, &mut self.events);
        systems::weapon::regenerate(&mut self.weapon, &self.config.weapons, now);
        if self.placement_type.is_some() {
            self.handle_placement_input(input);
        } else {
            let shoot = input.is_down(&self.config.movement.key_bindings.shoot);
            if shoot || (input.clicked && input.pointer.is_some()) {
                systems::weapon::fire(
                    &mut self.world,
                    &mut self.weapon,
                    &self.player,
                    input.pointer,
                    &self.config,
                    now,
                    &mut self.events,
                );
            }
        }

        systems::enemy::run(
            &mut self.world,
            &mut self.rng,
            &mut self.wave,
            &self.config,
            self.player.position,
            self.base.position,
            now,
            &mut self.events,
        );
        systems::weapon::advance_projectiles(
            &mut self.world,
            self.config.canvas.bounds(),
            &mut self.despawn_buffer,
        );
        systems::particles::run(&mut self.world, &self.config.particles, &mut self.despawn_buffer);
        systems::base::repair(&mut self.base, &self.config.base, delta_ms, now, &mut self.events);

        let mark = self.events.len();
        systems::resources::run(
            &mut self.world,
            self.player.position,
            &self.config.resources,
            delta_ms,
            now,
            &mut self.events,
            &mut self.despawn_buffer,
        );
        systems::buildings::run(&mut self.world, &self.config, now, &mut self.events);
        self.apply_cross_events(mark);

        systems::collision::run(
            &mut self.world,
            &mut self.rng,
            &self.config,
            &mut self.player,
            &mut self.base,
            &mut self.wave,
            now,
            &mut self.events,
            &mut self.despawn_buffer,
        );
        systems::progression::run(&mut self.player, &self.config, now, &mut self.events);

        self.check_game_over();
    }

    /// Turret shots and currency credits raised since `mark` are applied
    /// here rather than by the subsystem that raised them.
    fn apply_cross_events(&mut self, mark: usize) {
        let raised: Vec<GameEventKind> = self.events[mark..]
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    GameEventKind::TurretFired { .. } | GameEventKind::ResourceCollected { .. }
                )
            })
            .map(|e| e.kind.clone())
            .collect();

        for kind in raised {
            match kind {
                GameEventKind::TurretFired {
                    origin,
                    target,
                    damage,
                    ..
                } => systems::weapon::spawn_turret_bullet(
                    &mut self.world,
                    origin,
                    target,
                    damage,
                    self.sim_ms,
                    &mut self.events,
                ),
                GameEventKind::ResourceCollected { tier, value } => {
                    systems::progression::credit(&mut self.player, tier, value, &self.config);
                }
                _ => {}
            }
        }
    }

    fn handle_pause_key(&mut self, input: &InputSnapshot) {
        let down = input.is_down(&self.config.movement.key_bindings.pause) || input.is_down(ESCAPE_KEY);
        let rising = down && !self.pause_key_was_down;
        self.pause_key_was_down = down;
        if !rising {
            return;
        }
        let debounced = self
            .last_pause_toggle_ms
            .map_or(true, |last| self.now_ms - last >= PAUSE_DEBOUNCE_MS);
        if debounced {
            self.last_pause_toggle_ms = Some(self.now_ms);
            let paused = !self.paused;
            self.apply_pause(paused, EventSink::Current);
        }
    }

    fn handle_placement_input(&mut self, input: &InputSnapshot) {
        let Some(type_id) = self.placement_type.clone() else {
            return;
        };
        let Some(pointer) = input.pointer else {
            self.placement_preview = None;
            return;
        };
        self.placement_preview = Some(systems::buildings::preview(
            &self.world,
            &self.config,
            &type_id,
            pointer,
            self.player.level,
        ));
        if input.clicked && self.place(&type_id, pointer, EventSink::Current).is_ok() {
            self.placement_type = None;
            self.placement_preview = None;
        }
    }

    fn check_game_over(&mut self) {
        let reason = if self.player.health <= 0.0 {
            GameOverReason::PlayerDestroyed
        } else if self.base.health <= 0.0 {
            GameOverReason::BaseDestroyed
        } else {
            return;
        };
        self.game_over = true;
        info!(wave = self.wave.number, ?reason, "game over");
        self.events.push(GameEvent::new(
            GameEventKind::GameOver {
                wave: self.wave.number,
                reason,
            },
            self.now_ms,
        ));
    }

    fn sink(&mut self, sink: EventSink) -> &mut Vec<GameEvent> {
        match sink {
            EventSink::Current => &mut self.events,
            EventSink::Pending => &mut self.pending,
        }
    }

    fn apply_pause(&mut self, paused: bool, sink: EventSink) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        debug!(paused, "pause toggled");
        let kind = if paused {
            GameEventKind::GamePaused
        } else {
            GameEventKind::GameResumed
        };
        let now = self.now_ms;
        self.sink(sink).push(GameEvent::new(kind, now));
    }

    fn place(&mut self, type_id: &str, position: DVec2, sink: EventSink) -> Result<u32, PlacementError> {
        let now = self.sim_ms;
        let mut events = Vec::new();
        let result = systems::buildings::place(
            &mut self.world,
            &self.config,
            type_id,
            position,
            self.player.level,
            &mut self.next_building_id,
            now,
            &mut events,
        );
        self.sink(sink).append(&mut events);
        result
    }

    // ---- Queries ----

    pub fn snapshot(&self) -> GameStateSnapshot {
        systems::snapshot::build_snapshot(
            &self.world,
            &SnapshotContext {
                now_ms: self.now_ms,
                sim_ms: self.sim_ms,
                paused: self.paused,
                game_over: self.game_over,
                player: &self.player,
                base: &self.base,
                wave: &self.wave,
                weapon: &self.weapon,
                max_ammo: self.config.weapons.max_ammo,
                placement_type: self.placement_type.as_deref(),
                placement_preview: self.placement_preview.as_ref(),
            },
        )
    }

    pub fn wave_number(&self) -> u32 {
        self.wave.number
    }

    pub fn wave_phase(&self) -> WavePhase {
        self.wave.phase
    }

    pub fn wave_time_remaining_ms(&self) -> f64 {
        self.wave.time_remaining_ms(self.now_ms)
    }

    pub fn wave_state(&self) -> &WaveState {
        &self.wave
    }

    pub fn enemies_alive(&self) -> u32 {
        self.wave.enemies_alive
    }

    pub fn enemies_spawned(&self) -> u32 {
        self.wave.enemies_spawned
    }

    pub fn enemy_quota(&self) -> u32 {
        self.wave.enemies_total
    }

    pub fn ammo(&self) -> u32 {
        self.weapon.ammo
    }

    pub fn max_ammo(&self) -> u32 {
        self.config.weapons.max_ammo
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_placing(&self) -> bool {
        self.placement_type.is_some()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn building_types(&self) -> &BTreeMap<String, BuildingTypeConfig> {
        &self.config.buildings.types
    }

    /// Building type ids unlocked at the player's current level.
    pub fn available_buildings(&self) -> &[String] {
        self.config.buildings.available_at(self.player.level)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn sim_ms(&self) -> f64 {
        self.sim_ms
    }

    /// Events raised by the most recent update.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Draw the current state in layer order.
    pub fn render(&self, surface: &mut impl DrawSurface) {
        render::render(&self.snapshot(), &self.config.canvas, surface);
    }

    // ---- Mutators ----

    pub fn set_paused(&mut self, paused: bool) {
        self.apply_pause(paused, EventSink::Pending);
    }

    /// Start over with the original seed. The engine clock keeps running.
    pub fn reset_game(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.world.clear();
        self.player = world_setup::new_player(&self.config);
        self.base = world_setup::new_base(&self.config);
        self.wave = WaveState::new(&self.config.wave, self.now_ms);
        self.weapon = WeaponState::new(&self.config.weapons, self.sim_ms);
        self.placement_type = None;
        self.placement_preview = None;
        self.next_building_id = 1;
        self.paused = false;
        self.last_pause_toggle_ms = None;
        self.game_over = false;
        self.despawn_buffer.clear();
        self.pending.clear();

        info!(seed = self.seed, "game reset");
        self.pending
            .push(GameEvent::new(GameEventKind::GameReset, self.now_ms));
    }

    /// Skip the current wait. Returns false during combat.
    pub fn start_next_wave(&mut self) -> bool {
        systems::wave::start_next_wave(
            &mut self.wave,
            &self.config.wave,
            self.now_ms,
            &mut self.pending,
        )
    }

    pub fn refill_ammo(&mut self) {
        self.weapon.refill(&self.config.weapons);
    }

    /// Debug spawn. Counts as alive but not against the wave quota.
    pub fn spawn_dev_enemy(&mut self, kind: EnemyKind) {
        systems::enemy::spawn(
            &mut self.world,
            &mut self.rng,
            kind,
            self.wave.number,
            &self.config,
            self.sim_ms,
            &mut self.pending,
        );
        self.wave.enemies_alive += 1;
        debug!(?kind, "dev enemy spawned");
    }

    /// Deep-merge a partial config document into the live config. Player
    /// stats are re-derived; nothing else is reset.
    pub fn configure(&mut self, patch: &Value) -> Result<(), ConfigError> {
        let config = self.config.patched(patch)?;
        if config == self.config {
            return Ok(());
        }
        self.config = config;
        systems::progression::derive_stats(&mut self.player, &self.config);
        self.weapon.ammo = self.weapon.ammo.min(self.config.weapons.max_ammo);
        let capacity = self.config.resources.capacity();
        self.player.currencies.clamp_to(&capacity);
        info!("config patched");
        Ok(())
    }

    pub fn begin_placement(&mut self, type_id: &str) -> Result<(), PlacementError> {
        let kind = self
            .config
            .buildings
            .types
            .get(type_id)
            .ok_or_else(|| PlacementError::UnknownType(type_id.to_string()))?;
        if self.player.level < kind.required_level {
            return Err(PlacementError::LevelTooLow {
                required: kind.required_level,
                current: self.player.level,
            });
        }
        self.placement_type = Some(type_id.to_string());
        self.placement_preview = None;
        self.pending.push(GameEvent::new(
            GameEventKind::PlacementModeStarted {
                type_id: type_id.to_string(),
            },
            self.now_ms,
        ));
        Ok(())
    }

    pub fn cancel_placement(&mut self) {
        if self.placement_type.take().is_none() {
            return;
        }
        self.placement_preview = None;
        self.pending
            .push(GameEvent::new(GameEventKind::PlacementModeCancelled, self.now_ms));
    }

    /// Place a building directly, outside placement mode.
    pub fn place_building(&mut self, type_id: &str, position: DVec2) -> Result<u32, PlacementError> {
        self.place(type_id, position, EventSink::Pending)
    }

    pub fn upgrade_stat(&mut self, kind: StatKind) -> Result<u32, UpgradeError> {
        systems::upgrades::purchase_stat(
            &mut self.player,
            kind,
            &self.config,
            self.sim_ms,
            &mut self.pending,
        )
    }

    pub fn upgrade_base(&mut self, kind: BaseUpgradeKind) -> Result<u32, UpgradeError> {
        systems::upgrades::purchase_base(
            &mut self.base,
            &mut self.player,
            kind,
            &self.config,
            self.sim_ms,
            &mut self.pending,
        )
    }

    /// Tear the engine down.
    pub fn dispose(self) {
        debug!(now_ms = self.now_ms, "engine disposed");
    }

    /// Mutable access for scenario tests.
    #[cfg(test)]
    pub(crate) fn parts_mut(&mut self) -> (&mut World, &mut Player, &mut Base, &mut WaveState) {
        (&mut self.world, &mut self.player, &mut self.base, &mut self.wave)
    }
}

#[derive(Clone, Copy)]
enum EventSink {
    Current,
    Pending,
}
