//! Enemy subsystem: spawn cadence, archetype selection, wave-scaled stats
//! and per-tick steering.

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use bulwark_ai::profiles::get_profile;
use bulwark_ai::steering::{steer, SteeringContext};
use bulwark_core::components::{Enemy, Position, Velocity};
use bulwark_core::config::GameConfig;
use bulwark_core::constants::ENEMY_SPAWN_OFFSET_X;
use bulwark_core::enums::{EnemyKind, TargetKind, WavePhase};
use bulwark_core::events::{GameEvent, GameEventKind};

use crate::systems::wave::WaveState;
use crate::world_setup;

/// `multiplier^(wave - 1)`; wave 1 is unscaled.
fn wave_factor(multiplier: f64, wave: u32) -> f64 {
    multiplier.powi(wave.saturating_sub(1) as i32)
}

/// Health of a fresh enemy on `wave`, floored, never below 1.
pub fn scaled_health(base_health: f64, multiplier: f64, wave: u32) -> f64 {
    (base_health * wave_factor(multiplier, wave)).floor().max(1.0)
}

/// Minimum gap between two quota spawns on `wave` (ms).
pub fn spawn_delay_ms(config: &GameConfig, wave: u32) -> f64 {
    let factor = wave_factor(config.wave.difficulty_scaling.spawn_rate_multiplier, wave);
    if factor > 0.0 {
        config.enemies.wave_spawn_delay_ms / factor
    } else {
        config.enemies.wave_spawn_delay_ms
    }
}

/// Combat is running, the quota is not exhausted and the spawn gap passed.
pub fn should_spawn(state: &WaveState, config: &GameConfig, now_ms: f64) -> bool {
    if state.phase != WavePhase::Combat || state.enemies_spawned >= state.enemies_total {
        return false;
    }
    match state.last_spawn_ms {
        None => true,
        Some(last) => now_ms - last > spawn_delay_ms(config, state.number),
    }
}

/// Boss on boss waves, elite by chance once elites are unlocked, basic
/// otherwise.
pub fn select_kind(state: &WaveState, config: &GameConfig, rng: &mut ChaCha8Rng) -> EnemyKind {
    if state.is_boss_wave {
        return EnemyKind::Boss;
    }
    if state.elites_enabled && rng.gen::<f64>() < config.enemies.elite.spawn_chance {
        return EnemyKind::Elite;
    }
    EnemyKind::Basic
}

/// Spawn one enemy of `kind` just past the right edge at a random height,
/// with stats scaled for `wave`.
pub fn spawn(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    kind: EnemyKind,
    wave: u32,
    config: &GameConfig,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Entity {
    let archetype = config.enemies.archetype(kind);
    let scaling = &config.wave.difficulty_scaling;

    let position = DVec2::new(
        config.canvas.width + ENEMY_SPAWN_OFFSET_X,
        rng.gen::<f64>() * config.canvas.height,
    );
    let health = scaled_health(archetype.health, scaling.health_multiplier, wave);
    let speed = archetype.speed * wave_factor(scaling.speed_multiplier, wave)
        + rng.gen::<f64>() * config.enemies.speed_variation;

    let enemy = Enemy {
        kind,
        speed,
        health,
        max_health: health,
        experience_value: archetype.experience_value,
        base_damage: archetype.base_damage,
        wave,
        hit_flash_ms: None,
        target: TargetKind::Base,
    };
    let entity = world_setup::spawn_enemy(world, position, archetype.size, &archetype.color, enemy);

    trace!(?kind, wave, health, speed, "enemy spawned");
    events.push(GameEvent::new(
        GameEventKind::EnemySpawned {
            kind,
            position,
            health,
            speed,
        },
        now_ms,
    ));
    entity
}

/// Steer every enemy, spawn the next quota enemy if due, then sync the
/// wave's alive counter to the live enemy count.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    wave: &mut WaveState,
    config: &GameConfig,
    player_pos: DVec2,
    base_pos: DVec2,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    for (_entity, (pos, vel, enemy)) in
        world.query_mut::<(&mut Position, &mut Velocity, &mut Enemy)>()
    {
        let profile = get_profile(enemy.kind, &config.enemies);
        let update = steer(
            &profile,
            &SteeringContext {
                position: pos.0,
                speed: enemy.speed,
                player: player_pos,
                base: base_pos,
            },
        );
        pos.0 = update.position;
        vel.0 = update.velocity;
        enemy.target = update.target;
    }

    if should_spawn(wave, config, now_ms) {
        let kind = select_kind(wave, config, rng);
        spawn(world, rng, kind, wave.number, config, now_ms, events);
        wave.enemies_spawned += 1;
        wave.last_spawn_ms = Some(now_ms);
    }

    wave.enemies_alive = world.query_mut::<&Enemy>().into_iter().count() as u32;
}
