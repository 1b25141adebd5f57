//! Weapon subsystem: cooldown-gated firing from a regenerating ammo pool,
//! projectile advancement and out-of-bounds culling.

use glam::DVec2;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use bulwark_core::components::{Bullet, Player, Position, Velocity};
use bulwark_core::config::{GameConfig, WeaponsConfig};
use bulwark_core::constants::*;
use bulwark_core::enums::BulletSource;
use bulwark_core::events::{GameEvent, GameEventKind};
use bulwark_core::math::{direction, Bounds};

use crate::world_setup;

/// The shared ammo pool and firing clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    pub ammo: u32,
    pub last_shot_ms: Option<f64>,
    pub last_regen_ms: f64,
}

impl WeaponState {
    pub fn new(config: &WeaponsConfig, now_ms: f64) -> Self {
        Self {
            ammo: config.max_ammo,
            last_shot_ms: None,
            last_regen_ms: now_ms,
        }
    }

    pub fn refill(&mut self, config: &WeaponsConfig) {
        self.ammo = config.max_ammo;
    }
}

/// Regain at most one round per regen interval. A full pool holds the regen
/// clock at `now` so the first round after a shot takes a whole interval.
pub fn regenerate(state: &mut WeaponState, config: &WeaponsConfig, now_ms: f64) {
    if state.ammo >= config.max_ammo {
        state.ammo = config.max_ammo;
        state.last_regen_ms = now_ms;
        return;
    }
    if now_ms - state.last_regen_ms >= config.regen_interval_ms() {
        state.ammo += 1;
        state.last_regen_ms = now_ms;
    }
}

/// Check cooldown and ammo; on success consume a round and return the
/// projectile's spawn point and velocity. With no aim point the shot goes
/// straight up.
pub fn try_fire(
    state: &mut WeaponState,
    player: &Player,
    aim: Option<DVec2>,
    config: &WeaponsConfig,
    now_ms: f64,
) -> Option<(DVec2, DVec2)> {
    let cooled = state
        .last_shot_ms
        .map_or(true, |last| now_ms - last >= player.shoot_cooldown_ms);
    if !cooled || state.ammo == 0 {
        return None;
    }

    let origin = DVec2::new(player.position.x, player.position.y - player.size);
    let dir = aim
        .and_then(|target| direction(origin, target))
        .unwrap_or(DVec2::NEG_Y);

    state.ammo -= 1;
    state.last_shot_ms = Some(now_ms);
    Some((origin, dir * config.bullet_speed))
}

/// Fire the player's weapon and spawn the projectile. Returns whether a
/// shot went out.
pub fn fire(
    world: &mut World,
    state: &mut WeaponState,
    player: &Player,
    aim: Option<DVec2>,
    config: &GameConfig,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> bool {
    let Some((origin, velocity)) = try_fire(state, player, aim, &config.weapons, now_ms) else {
        return false;
    };
    world_setup::spawn_bullet(
        world,
        origin,
        velocity,
        config.weapons.bullet_size,
        &config.weapons.bullet_color,
        Bullet {
            damage: player.damage,
            source: BulletSource::Player,
        },
    );
    events.push(GameEvent::new(
        GameEventKind::BulletFired {
            position: origin,
            velocity,
            source: BulletSource::Player,
        },
        now_ms,
    ));
    true
}

/// Spawn a turret projectile aimed from `origin` at `target`.
pub fn spawn_turret_bullet(
    world: &mut World,
    origin: DVec2,
    target: DVec2,
    damage: f64,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    let dir = direction(origin, target).unwrap_or(DVec2::NEG_Y);
    let velocity = dir * TURRET_BULLET_SPEED;
    world_setup::spawn_bullet(
        world,
        origin,
        velocity,
        TURRET_BULLET_SIZE,
        TURRET_BULLET_COLOR,
        Bullet {
            damage,
            source: BulletSource::Turret,
        },
    );
    events.push(GameEvent::new(
        GameEventKind::BulletFired {
            position: origin,
            velocity,
            source: BulletSource::Turret,
        },
        now_ms,
    ));
}

/// Advance every projectile by its velocity and drop the ones that left the
/// play area.
pub fn advance_projectiles(world: &mut World, bounds: Bounds, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();
    for (entity, (pos, vel, _bullet)) in world.query_mut::<(&mut Position, &Velocity, &Bullet)>() {
        pos.0 += vel.0;
        if !bounds.contains(pos.0) {
            despawn_buffer.push(entity);
        }
    }
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
