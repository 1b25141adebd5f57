//! Cross-subsystem collision resolution.
//!
//! Order per tick: projectile vs enemy, then enemy vs base, then enemy vs
//! player. An enemy that hits the base is gone before the player check.

use glam::DVec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use bulwark_core::components::{Base, Bullet, Color, Enemy, Player, Position, Size};
use bulwark_core::config::GameConfig;
use bulwark_core::constants::PLAYER_COLLISION_DAMAGE;
use bulwark_core::enums::{DestroyCause, EnemyKind};
use bulwark_core::events::{GameEvent, GameEventKind};
use bulwark_core::math::boxes_overlap;

use crate::systems::wave::WaveState;
use crate::systems::{base as base_system, particles, progression, resources};

struct EnemyContact {
    entity: Entity,
    position: DVec2,
    size: f64,
    color: String,
    kind: EnemyKind,
    base_damage: f64,
    experience_value: u32,
    alive: bool,
}

/// Damage the player takes from one ram after armor.
pub fn ram_damage(player: &Player) -> f64 {
    (PLAYER_COLLISION_DAMAGE * (1.0 - player.armor)).max(0.0)
}

/// Resolve all contacts for this tick.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    config: &GameConfig,
    player: &mut Player,
    base: &mut Base,
    wave: &mut WaveState,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    let bullets: Vec<(Entity, DVec2, f64, f64)> = world
        .query::<(&Position, &Size, &Bullet)>()
        .iter()
        .map(|(entity, (pos, size, bullet))| (entity, pos.0, size.0, bullet.damage))
        .collect();
    let mut enemies: Vec<EnemyContact> = world
        .query::<(&Position, &Size, &Color, &Enemy)>()
        .iter()
        .map(|(entity, (pos, size, color, enemy))| EnemyContact {
            entity,
            position: pos.0,
            size: size.0,
            color: color.0.clone(),
            kind: enemy.kind,
            base_damage: enemy.base_damage,
            experience_value: enemy.experience_value,
            alive: true,
        })
        .collect();

    // 1. Projectiles vs enemies. A bullet is spent on its first contact.
    for (bullet, bullet_pos, bullet_size, damage) in bullets {
        let Some(target) = enemies
            .iter_mut()
            .find(|e| e.alive && boxes_overlap(bullet_pos, bullet_size, e.position, e.size))
        else {
            continue;
        };
        despawn_buffer.push(bullet);
        events.push(GameEvent::new(
            GameEventKind::BulletDestroyed {
                position: bullet_pos,
            },
            now_ms,
        ));

        let remaining = match world.get::<&mut Enemy>(target.entity) {
            Ok(mut enemy) => {
                enemy.health = (enemy.health - damage).max(0.0);
                enemy.hit_flash_ms = Some(now_ms);
                enemy.health
            }
            Err(_) => continue,
        };
        events.push(GameEvent::new(
            GameEventKind::EnemyDamaged {
                kind: target.kind,
                damage,
                remaining_health: remaining,
            },
            now_ms,
        ));
        if remaining > 0.0 {
            continue;
        }

        target.alive = false;
        despawn_buffer.push(target.entity);
        wave.on_enemy_destroyed();
        events.push(GameEvent::new(
            GameEventKind::EnemyDestroyed {
                kind: target.kind,
                position: target.position,
                cause: DestroyCause::Projectile,
            },
            now_ms,
        ));
        particles::explode(world, rng, target.position, &target.color, &config.particles, now_ms, events);
        progression::gain_experience(player, target.experience_value, now_ms, events);
        resources::drop_loot(world, rng, target.kind, target.position, player.luck, config, now_ms, events);
    }

    // 2. Enemies vs base, 3. enemies vs player.
    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        let cause = if boxes_overlap(enemy.position, enemy.size, base.position, base.size) {
            base_system::apply_damage(base, enemy.base_damage, now_ms, events);
            DestroyCause::BaseImpact
        } else if boxes_overlap(enemy.position, enemy.size, player.position, player.size) {
            progression::take_damage(player, ram_damage(player), now_ms, events);
            DestroyCause::PlayerImpact
        } else {
            continue;
        };

        enemy.alive = false;
        despawn_buffer.push(enemy.entity);
        wave.on_enemy_destroyed();
        events.push(GameEvent::new(
            GameEventKind::EnemyDestroyed {
                kind: enemy.kind,
                position: enemy.position,
                cause,
            },
            now_ms,
        ));
        particles::explode(world, rng, enemy.position, &enemy.color, &config.particles, now_ms, events);
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
