//! Entity spawn factories.
//!
//! Builds the player and base singletons and the component bundles for
//! every transient entity kind.

use glam::DVec2;
use hecs::{Entity, World};

use bulwark_core::components::*;
use bulwark_core::config::{BuildingTypeConfig, GameConfig};
use bulwark_core::enums::*;

/// Fresh player at the configured start position and level.
pub fn new_player(config: &GameConfig) -> Player {
    let p = &config.player;
    let mut player = Player {
        position: p.starting_position,
        velocity: DVec2::ZERO,
        size: p.size,
        color: p.color.clone(),
        health: p.starting_health,
        max_health: p.starting_health,
        level: p.starting_level,
        experience: 0,
        experience_to_next: p.starting_level * p.experience_per_level,
        speed: p.starting_speed,
        currencies: Currencies::default(),
        stat_levels: StatLevels::default(),
        damage: config.weapons.damage,
        shoot_cooldown_ms: config.weapons.shoot_cooldown_ms,
        luck: 0.0,
        armor: 0.0,
        dead: false,
    };
    crate::systems::progression::derive_stats(&mut player, config);
    player.health = player.max_health;
    player
}

/// Fresh base with no upgrades.
pub fn new_base(config: &GameConfig) -> Base {
    let b = &config.base;
    Base {
        position: b.position,
        size: b.size,
        color: b.color.clone(),
        health: b.starting_health.min(b.max_health),
        max_health: b.max_health,
        shield: 0.0,
        max_shield: 0.0,
        armor: 0.0,
        repair_rate: b.repair_rate,
        last_damage_ms: None,
        upgrade_levels: BaseUpgradeLevels::default(),
        destroyed: false,
    }
}

pub fn spawn_enemy(world: &mut World, position: DVec2, size: f64, color: &str, enemy: Enemy) -> Entity {
    world.spawn((
        Position(position),
        Velocity(DVec2::ZERO),
        Size(size),
        Color(color.to_string()),
        enemy,
    ))
}

pub fn spawn_bullet(
    world: &mut World,
    position: DVec2,
    velocity: DVec2,
    size: f64,
    color: &str,
    bullet: Bullet,
) -> Entity {
    world.spawn((
        Position(position),
        Velocity(velocity),
        Size(size),
        Color(color.to_string()),
        bullet,
    ))
}

pub fn spawn_particle(
    world: &mut World,
    position: DVec2,
    velocity: DVec2,
    size: f64,
    color: &str,
    life: f64,
) -> Entity {
    world.spawn((
        Position(position),
        Velocity(velocity),
        Size(size),
        Color(color.to_string()),
        Particle {
            life,
            max_life: life,
        },
    ))
}

pub fn spawn_pickup(
    world: &mut World,
    position: DVec2,
    tier: ResourceTier,
    value: u32,
    config: &GameConfig,
) -> Entity {
    let tier_cfg = config.resources.tier(tier);
    let lifetime = config.resources.lifetime_ms;
    world.spawn((
        Position(position),
        Size(tier_cfg.size),
        Color(tier_cfg.color.clone()),
        Pickup {
            tier,
            value,
            life_ms: lifetime,
            max_life_ms: lifetime,
            base_size: tier_cfg.size,
            pickup_started_ms: None,
            credited: false,
        },
    ))
}

/// Spawn a building in CONSTRUCTING status.
pub fn spawn_building(
    world: &mut World,
    id: u32,
    type_id: &str,
    kind: &BuildingTypeConfig,
    position: DVec2,
    now_ms: f64,
    construction_ms: f64,
) -> Entity {
    world.spawn((
        Position(position),
        Size(kind.size),
        Color(kind.color.clone()),
        Building {
            id,
            type_id: type_id.to_string(),
            status: BuildingStatus::Constructing,
            health: kind.health,
            max_health: kind.health,
            level: 1,
            powered_by: Vec::new(),
            connected_to: Vec::new(),
            construction_started_ms: now_ms,
            construction_duration_ms: construction_ms,
            last_fire_ms: None,
            effects: kind.effects.clone(),
        },
    ))
}
