//! Wave phase machine: PREPARATION → COMBAT → (UPGRADE_INTERMISSION →)
//! PREPARATION, with per-wave quota and difficulty flags.

use serde::{Deserialize, Serialize};
use tracing::info;

use bulwark_core::config::WaveConfig;
use bulwark_core::constants::BOSS_WAVE_QUOTA_FACTOR;
use bulwark_core::enums::WavePhase;
use bulwark_core::events::{GameEvent, GameEventKind};
use bulwark_core::state::WaveView;

/// Singleton wave bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveState {
    pub number: u32,
    pub phase: WavePhase,
    pub phase_started_ms: f64,
    pub phase_duration_ms: f64,
    /// Quota fixed when combat starts.
    pub enemies_total: u32,
    pub enemies_spawned: u32,
    pub enemies_alive: u32,
    pub is_boss_wave: bool,
    pub elites_enabled: bool,
    /// Engine time of the last quota spawn; `None` re-arms the spawner.
    pub last_spawn_ms: Option<f64>,
}

impl WaveState {
    /// Wave 1 in PREPARATION, starting at `now_ms`.
    pub fn new(config: &WaveConfig, now_ms: f64) -> Self {
        Self {
            number: 1,
            phase: WavePhase::Preparation,
            phase_started_ms: now_ms,
            phase_duration_ms: config.preparation_duration_ms,
            enemies_total: 0,
            enemies_spawned: 0,
            enemies_alive: 0,
            is_boss_wave: false,
            elites_enabled: false,
            last_spawn_ms: None,
        }
    }

    pub fn time_remaining_ms(&self, now_ms: f64) -> f64 {
        (self.phase_duration_ms - (now_ms - self.phase_started_ms)).max(0.0)
    }

    /// Every quota enemy has been spawned and none are left standing.
    pub fn quota_cleared(&self) -> bool {
        self.enemies_spawned >= self.enemies_total && self.enemies_alive == 0
    }

    pub fn on_enemy_destroyed(&mut self) {
        self.enemies_alive = self.enemies_alive.saturating_sub(1);
    }

    pub fn view(&self, now_ms: f64) -> WaveView {
        WaveView {
            number: self.number,
            phase: self.phase,
            time_remaining_ms: self.time_remaining_ms(now_ms),
            enemies_total: self.enemies_total,
            enemies_spawned: self.enemies_spawned,
            enemies_alive: self.enemies_alive,
            is_boss_wave: self.is_boss_wave,
        }
    }
}

/// Enemy quota for `wave`: `base + (wave - 1) * increase`, 30% fewer
/// (floored) on boss waves.
pub fn enemy_quota(config: &WaveConfig, wave: u32, is_boss_wave: bool) -> u32 {
    let quota = config.base_enemies_per_wave
        + wave.saturating_sub(1) * config.enemies_per_wave_increase;
    if is_boss_wave {
        (f64::from(quota) * BOSS_WAVE_QUOTA_FACTOR).floor() as u32
    } else {
        quota
    }
}

/// Advance the phase machine on elapsed time. Runs even while paused.
pub fn run(state: &mut WaveState, config: &WaveConfig, now_ms: f64, events: &mut Vec<GameEvent>) {
    let elapsed = now_ms - state.phase_started_ms;
    match state.phase {
        WavePhase::Preparation => {
            if elapsed >= state.phase_duration_ms {
                enter_combat(state, config, now_ms, events);
            }
        }
        WavePhase::Combat => {
            if elapsed >= state.phase_duration_ms || state.quota_cleared() {
                finish_combat(state, config, now_ms, events);
            }
        }
        WavePhase::UpgradeIntermission => {
            if elapsed >= state.phase_duration_ms {
                enter_preparation(state, config, now_ms, events);
            }
        }
    }
}

/// Skip the wait. PREPARATION jumps to COMBAT, UPGRADE_INTERMISSION jumps
/// to PREPARATION, COMBAT cannot be skipped. Returns whether anything
/// changed.
pub fn start_next_wave(
    state: &mut WaveState,
    config: &WaveConfig,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> bool {
    match state.phase {
        WavePhase::Preparation => {
            enter_combat(state, config, now_ms, events);
            true
        }
        WavePhase::UpgradeIntermission => {
            enter_preparation(state, config, now_ms, events);
            true
        }
        WavePhase::Combat => false,
    }
}

fn enter_combat(state: &mut WaveState, config: &WaveConfig, now_ms: f64, events: &mut Vec<GameEvent>) {
    state.phase = WavePhase::Combat;
    state.phase_started_ms = now_ms;
    state.phase_duration_ms = config.combat_duration_ms;
    state.is_boss_wave = config.is_boss_wave(state.number);
    state.elites_enabled = config.elites_enabled(state.number);
    state.enemies_total = enemy_quota(config, state.number, state.is_boss_wave);
    state.enemies_spawned = 0;
    state.last_spawn_ms = None;

    info!(
        wave = state.number,
        quota = state.enemies_total,
        boss = state.is_boss_wave,
        "combat started"
    );
    events.push(GameEvent::new(
        GameEventKind::WaveCombatStarted {
            wave: state.number,
            enemy_quota: state.enemies_total,
            is_boss_wave: state.is_boss_wave,
        },
        now_ms,
    ));
}

fn finish_combat(state: &mut WaveState, config: &WaveConfig, now_ms: f64, events: &mut Vec<GameEvent>) {
    let completed = state.number;
    info!(
        wave = completed,
        spawned = state.enemies_spawned,
        alive = state.enemies_alive,
        "wave completed"
    );
    events.push(GameEvent::new(
        GameEventKind::WaveCompleted { wave: completed },
        now_ms,
    ));

    state.number += 1;
    state.enemies_spawned = 0;
    state.enemies_alive = 0;
    state.enemies_total = 0;
    state.is_boss_wave = false;
    state.last_spawn_ms = None;

    if config.intermission_enabled {
        state.phase = WavePhase::UpgradeIntermission;
        state.phase_started_ms = now_ms;
        state.phase_duration_ms = config.intermission_duration_ms;
        events.push(GameEvent::new(
            GameEventKind::WaveIntermissionStarted { wave: state.number },
            now_ms,
        ));
    } else {
        enter_preparation(state, config, now_ms, events);
    }
}

fn enter_preparation(state: &mut WaveState, config: &WaveConfig, now_ms: f64, events: &mut Vec<GameEvent>) {
    state.phase = WavePhase::Preparation;
    state.phase_started_ms = now_ms;
    state.phase_duration_ms = config.preparation_duration_ms;
    events.push(GameEvent::new(
        GameEventKind::WavePreparationStarted { wave: state.number },
        now_ms,
    ));
}
